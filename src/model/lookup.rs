//! Tree-walking lookups over one dashboard model.
//!
//! All helpers are pure reads (or plain mutable projections) that signal
//! absence with `None`. Event routing treats a miss as a normal outcome;
//! a widget may well have been removed between event emission and
//! handling.

use super::core::{Column, ColumnId, DashboardModel, Row, WidgetId, WidgetInstance};

/// Depth-first, row-major search for a column by id, recursing into
/// split columns. Ids are unique, so first match is only match.
pub fn find_column(model: &DashboardModel, id: ColumnId) -> Option<&Column> {
    find_column_in_rows(&model.rows, id)
}

pub fn find_column_mut(model: &mut DashboardModel, id: ColumnId) -> Option<&mut Column> {
    find_column_in_rows_mut(&mut model.rows, id)
}

fn find_column_in_rows(rows: &[Row], id: ColumnId) -> Option<&Column> {
    for row in rows {
        for column in &row.columns {
            if column.id == Some(id) {
                return Some(column);
            }
            if let Some(found) = find_column_in_rows(&column.rows, id) {
                return Some(found);
            }
        }
    }
    None
}

fn find_column_in_rows_mut(rows: &mut [Row], id: ColumnId) -> Option<&mut Column> {
    for row in rows {
        for column in &mut row.columns {
            if column.id == Some(id) {
                return Some(column);
            }
            if let Some(found) = find_column_in_rows_mut(&mut column.rows, id) {
                return Some(found);
            }
        }
    }
    None
}

/// Linear scan of one column's widget sequence.
pub fn find_widget(column: &Column, id: WidgetId) -> Option<&WidgetInstance> {
    column.widgets.iter().find(|w| w.id == Some(id))
}

pub fn find_widget_mut(column: &mut Column, id: WidgetId) -> Option<&mut WidgetInstance> {
    column.widgets.iter_mut().find(|w| w.id == Some(id))
}

/// Whole-tree widget search, leaf columns in traversal order.
pub fn locate_widget(model: &DashboardModel, id: WidgetId) -> Option<&WidgetInstance> {
    locate_in_rows(&model.rows, id)
}

fn locate_in_rows(rows: &[Row], id: WidgetId) -> Option<&WidgetInstance> {
    for row in rows {
        for column in &row.columns {
            if column.is_split() {
                if let Some(found) = locate_in_rows(&column.rows, id) {
                    return Some(found);
                }
            } else if let Some(found) = find_widget(column, id) {
                return Some(found);
            }
        }
    }
    None
}

/// First column able to host widgets, in the same row-major traversal
/// order the reconciler uses.
pub fn first_leaf_column_mut(model: &mut DashboardModel) -> Option<&mut Column> {
    first_leaf_in_rows_mut(&mut model.rows)
}

fn first_leaf_in_rows_mut(rows: &mut [Row]) -> Option<&mut Column> {
    for row in rows {
        for column in &mut row.columns {
            if column.is_split() {
                if let Some(found) = first_leaf_in_rows_mut(&mut column.rows) {
                    return Some(found);
                }
            } else {
                return Some(column);
            }
        }
    }
    None
}

/// Detach a widget instance from its owning column. Returning the
/// instance ends its placement; the caller owns what happens next.
pub fn detach_widget(model: &mut DashboardModel, id: WidgetId) -> Option<WidgetInstance> {
    detach_in_rows(&mut model.rows, id)
}

fn detach_in_rows(rows: &mut [Row], id: WidgetId) -> Option<WidgetInstance> {
    for row in rows {
        for column in &mut row.columns {
            if column.is_split() {
                if let Some(found) = detach_in_rows(&mut column.rows, id) {
                    return Some(found);
                }
            } else if let Some(pos) = column.widgets.iter().position(|w| w.id == Some(id)) {
                return Some(column.widgets.remove(pos));
            }
        }
    }
    None
}

/// Visit every widget in the tree mutably, leaf columns in traversal
/// order. Used by config-update routing.
pub(crate) fn for_each_widget_mut<F>(model: &mut DashboardModel, mut visit: F)
where
    F: FnMut(&mut WidgetInstance),
{
    visit_rows(&mut model.rows, &mut |w| visit(w));
}

fn visit_rows(rows: &mut [Row], visit: &mut dyn FnMut(&mut WidgetInstance)) {
    for row in rows {
        for column in &mut row.columns {
            if column.is_split() {
                visit_rows(&mut column.rows, visit);
            } else {
                for widget in &mut column.widgets {
                    visit(widget);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::core::{Column, DashboardModel, Row, WidgetInstance};

    fn nested_model() -> DashboardModel {
        // Split column two levels deep; the innermost leaf holds widget 42.
        let target = WidgetInstance {
            id: Some(42),
            ..WidgetInstance::new("stats")
        };
        DashboardModel::new(vec![Row::new(vec![
            Column {
                id: Some(1),
                ..Column::leaf("s4")
            },
            Column {
                id: Some(2),
                ..Column::split(
                    "s8",
                    vec![Row::new(vec![Column {
                        id: Some(3),
                        ..Column::split(
                            "s12",
                            vec![Row::new(vec![Column {
                                id: Some(4),
                                ..Column::leaf("s6").with_widgets(vec![target])
                            }])],
                        )
                    }])],
                )
            },
        ])])
    }

    #[test]
    fn finds_column_inside_nested_splits() {
        let model = nested_model();
        let column = find_column(&model, 4).expect("column 4");
        assert_eq!(column.style_class, "s6");

        let widget = find_widget(column, 42).expect("widget 42");
        assert_eq!(widget.id, Some(42));
        assert_eq!(widget.widget_type, "stats");
    }

    #[test]
    fn missing_ids_return_none() {
        let model = nested_model();
        assert!(find_column(&model, 77).is_none());
        let column = find_column(&model, 4).unwrap();
        assert!(find_widget(column, 77).is_none());
        assert!(locate_widget(&model, 77).is_none());
    }

    #[test]
    fn locate_widget_searches_the_whole_tree() {
        let model = nested_model();
        let widget = locate_widget(&model, 42).expect("widget 42");
        assert_eq!(widget.widget_type, "stats");
    }

    #[test]
    fn first_leaf_column_follows_traversal_order() {
        let mut model = nested_model();
        let first = first_leaf_column_mut(&mut model).expect("leaf");
        assert_eq!(first.id, Some(1));

        // With a leading split column, the first leaf sits inside it.
        let mut model = DashboardModel::new(vec![Row::new(vec![Column::split(
            "wrap",
            vec![Row::new(vec![Column::leaf("inner")])],
        )])]);
        let first = first_leaf_column_mut(&mut model).expect("leaf");
        assert_eq!(first.style_class, "inner");
    }

    #[test]
    fn detach_widget_removes_from_owning_column() {
        let mut model = nested_model();
        let removed = detach_widget(&mut model, 42).expect("widget 42");
        assert_eq!(removed.id, Some(42));
        assert!(locate_widget(&model, 42).is_none());
        assert!(detach_widget(&mut model, 42).is_none());
    }
}
