use crate::error::Result;
use crate::identity::IdGenerator;
use crate::model::{DashboardModel, Row, WidgetInstance, ensure_ids};
use crate::registry::StructureRegistry;

/// Outcome of one structure change, for logging and metrics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Leaf columns of the new tree that received an old column's widgets.
    pub leaf_columns_filled: usize,
    /// Widgets re-parented into the new tree.
    pub widgets_moved: usize,
    /// Widgets whose old column had no destination left in the new tree.
    pub widgets_dropped: usize,
}

/// Re-apply a named structure to the model, preserving widget placement.
///
/// Three phases over the tree, all synchronous:
/// collect — the current tree's leaf columns, depth-first row-major,
/// each keeping its widget sequence; split columns are recursed into but
/// never collected. replace — the model's rows become a fresh instance
/// of the registry prototype. fill — walk the new tree in the same
/// order with one global cursor; every leaf column drains the collected
/// column at the cursor and advances it, split columns recurse without
/// consuming a slot. Surplus collected columns are dropped; surplus new
/// leaves start empty.
///
/// The old rows are consumed up front, so the two trees never alias
/// mid-pass. An unknown structure name fails before any mutation.
pub fn change_structure(
    model: &mut DashboardModel,
    name: &str,
    structures: &StructureRegistry,
    ids: &IdGenerator,
) -> Result<ReconcileReport> {
    let fresh_rows = structures.instantiate(name)?;

    let old_rows = std::mem::take(&mut model.rows);
    let mut runs = collect_widget_runs(old_rows);

    model.rows = fresh_rows;

    let mut cursor = 0;
    let mut moved = 0;
    fill_rows(&mut model.rows, &mut runs, &mut cursor, &mut moved);
    let dropped = runs[cursor..].iter().map(Vec::len).sum();

    model.structure = Some(name.to_string());
    // The new tree is a fresh copy with no column ids; moved widgets keep
    // theirs so event routing survives the swap.
    ensure_ids(model, ids);

    Ok(ReconcileReport {
        leaf_columns_filled: cursor,
        widgets_moved: moved,
        widgets_dropped: dropped,
    })
}

/// Widget sequences of every leaf column, in traversal order. Empty leaf
/// columns still occupy a slot.
fn collect_widget_runs(rows: Vec<Row>) -> Vec<Vec<WidgetInstance>> {
    let mut runs = Vec::new();
    collect_rows(rows, &mut runs);
    runs
}

fn collect_rows(rows: Vec<Row>, runs: &mut Vec<Vec<WidgetInstance>>) {
    for row in rows {
        for column in row.columns {
            if column.is_split() {
                collect_rows(column.rows, runs);
            } else {
                runs.push(column.widgets);
            }
        }
    }
}

fn fill_rows(
    rows: &mut [Row],
    runs: &mut [Vec<WidgetInstance>],
    cursor: &mut usize,
    moved: &mut usize,
) {
    for row in rows {
        for column in &mut row.columns {
            if column.is_split() {
                fill_rows(&mut column.rows, runs, cursor, moved);
            } else if let Some(run) = runs.get_mut(*cursor) {
                *moved += run.len();
                column.widgets.append(run);
                *cursor += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Column, WidgetId, lookup};
    use crate::registry::Structure;

    fn widget(id: WidgetId, widget_type: &str) -> WidgetInstance {
        WidgetInstance {
            id: Some(id),
            ..WidgetInstance::new(widget_type)
        }
    }

    fn registry() -> StructureRegistry {
        let mut structures = StructureRegistry::new();
        structures.register(
            "one-column",
            Structure::new(vec![Row::new(vec![Column::leaf("s12")])]),
        );
        structures.register(
            "two-column",
            Structure::new(vec![Row::new(vec![
                Column::leaf("s4"),
                Column::leaf("s8"),
            ])]),
        );
        structures.register(
            "three-column",
            Structure::new(vec![Row::new(vec![
                Column::leaf("s4"),
                Column::leaf("s4"),
                Column::leaf("s4"),
            ])]),
        );
        structures.register(
            "split-first",
            Structure::new(vec![Row::new(vec![
                Column::split(
                    "s8",
                    vec![
                        Row::new(vec![Column::leaf("top")]),
                        Row::new(vec![Column::leaf("bottom")]),
                    ],
                ),
                Column::leaf("s4"),
            ])]),
        );
        structures
    }

    fn leaf_widget_ids(model: &DashboardModel) -> Vec<Vec<WidgetId>> {
        fn walk(rows: &[Row], out: &mut Vec<Vec<WidgetId>>) {
            for row in rows {
                for column in &row.columns {
                    if column.is_split() {
                        walk(&column.rows, out);
                    } else {
                        out.push(column.widgets.iter().filter_map(|w| w.id).collect());
                    }
                }
            }
        }
        let mut out = Vec::new();
        walk(&model.rows, &mut out);
        out
    }

    #[test]
    fn widgets_keep_count_and_order_across_swap() {
        let mut model = DashboardModel::new(vec![Row::new(vec![
            Column::leaf("a").with_widgets(vec![widget(1, "clock"), widget(2, "news")]),
            Column::leaf("b").with_widgets(vec![widget(3, "links")]),
            Column::leaf("c"),
        ])]);

        let ids = IdGenerator::new();
        let report = change_structure(&mut model, "three-column", &registry(), &ids).unwrap();

        assert_eq!(report.widgets_moved, 3);
        assert_eq!(report.widgets_dropped, 0);
        assert_eq!(report.leaf_columns_filled, 3);
        assert_eq!(model.widget_count(), 3);
        assert_eq!(leaf_widget_ids(&model), vec![vec![1, 2], vec![3], vec![]]);
        assert_eq!(model.structure.as_deref(), Some("three-column"));
    }

    #[test]
    fn split_columns_never_consume_a_slot() {
        // Old side: the split wrapper is traversed, only its leaf counts.
        let mut model = DashboardModel::new(vec![Row::new(vec![
            Column::leaf("a").with_widgets(vec![widget(1, "clock")]),
            Column::split(
                "wrap",
                vec![Row::new(vec![
                    Column::leaf("inner").with_widgets(vec![widget(2, "news")]),
                ])],
            ),
        ])]);

        let ids = IdGenerator::new();
        change_structure(&mut model, "two-column", &registry(), &ids).unwrap();
        assert_eq!(leaf_widget_ids(&model), vec![vec![1], vec![2]]);

        // New side: the split column's leaves share the global cursor.
        change_structure(&mut model, "split-first", &registry(), &ids).unwrap();
        assert_eq!(leaf_widget_ids(&model), vec![vec![1], vec![2], vec![]]);
    }

    #[test]
    fn shrink_drops_widgets_beyond_last_slot() {
        // [A], [B, C], [D] into two columns: D has no destination.
        let mut model = DashboardModel::new(vec![Row::new(vec![
            Column::leaf("a").with_widgets(vec![widget(1, "a")]),
            Column::leaf("b").with_widgets(vec![widget(2, "b"), widget(3, "c")]),
            Column::leaf("c").with_widgets(vec![widget(4, "d")]),
        ])]);

        let ids = IdGenerator::new();
        let report = change_structure(&mut model, "two-column", &registry(), &ids).unwrap();

        assert_eq!(report.widgets_moved, 3);
        assert_eq!(report.widgets_dropped, 1);
        assert_eq!(model.widget_count(), 3);
        assert_eq!(leaf_widget_ids(&model), vec![vec![1], vec![2, 3]]);
        assert!(lookup::locate_widget(&model, 4).is_none());
    }

    #[test]
    fn bootstrap_from_empty_model_instantiates_structure() {
        let mut model = DashboardModel::default();
        let ids = IdGenerator::new();
        let report = change_structure(&mut model, "two-column", &registry(), &ids).unwrap();

        assert_eq!(report.widgets_moved, 0);
        assert_eq!(report.leaf_columns_filled, 0);
        assert_eq!(model.rows.len(), 1);
        assert_eq!(model.rows[0].columns.len(), 2);
        assert!(model.rows[0].columns.iter().all(|c| c.widgets.is_empty()));
        assert_eq!(model.structure.as_deref(), Some("two-column"));
    }

    #[test]
    fn unknown_structure_leaves_model_untouched() {
        let mut model = DashboardModel::new(vec![Row::new(vec![
            Column::leaf("a").with_widgets(vec![widget(1, "clock")]),
        ])]);
        model.structure = Some("one-column".into());
        let before = serde_json::to_value(&model).unwrap();

        let ids = IdGenerator::new();
        let err = change_structure(&mut model, "nonexistent", &registry(), &ids).unwrap_err();

        assert!(matches!(
            err,
            crate::error::DashboardError::StructureNotFound(_)
        ));
        assert_eq!(serde_json::to_value(&model).unwrap(), before);
    }

    #[test]
    fn columns_get_fresh_ids_widgets_keep_theirs() {
        let ids = IdGenerator::new();
        let mut model = DashboardModel::new(vec![Row::new(vec![
            Column::leaf("a").with_widgets(vec![WidgetInstance::new("clock")]),
        ])]);
        ensure_ids(&mut model, &ids);

        let old_column_id = model.rows[0].columns[0].id.unwrap();
        let widget_id = model.rows[0].columns[0].widgets[0].id.unwrap();

        change_structure(&mut model, "two-column", &registry(), &ids).unwrap();

        let new_first = &model.rows[0].columns[0];
        assert_ne!(new_first.id.unwrap(), old_column_id);
        assert_eq!(new_first.widgets[0].id, Some(widget_id));
    }

    #[test]
    fn grow_leaves_extra_columns_empty() {
        let mut model = DashboardModel::new(vec![Row::new(vec![
            Column::leaf("a").with_widgets(vec![widget(1, "clock")]),
        ])]);

        let ids = IdGenerator::new();
        change_structure(&mut model, "three-column", &registry(), &ids).unwrap();

        assert_eq!(leaf_widget_ids(&model), vec![vec![1], vec![], vec![]]);
    }

    #[test]
    fn empty_leaf_columns_still_consume_slots() {
        // An empty middle column shifts nothing: each old leaf maps to the
        // new leaf at the same traversal position.
        let mut model = DashboardModel::new(vec![Row::new(vec![
            Column::leaf("a").with_widgets(vec![widget(1, "clock")]),
            Column::leaf("b"),
            Column::leaf("c").with_widgets(vec![widget(2, "news")]),
        ])]);

        let ids = IdGenerator::new();
        change_structure(&mut model, "three-column", &registry(), &ids).unwrap();

        assert_eq!(leaf_widget_ids(&model), vec![vec![1], vec![], vec![2]]);
    }
}
