//! Workflow reconciliation.
//!
//! Workflow labels (the `{...}` part of a column name) both reflect and
//! drive a card's column. The forward path reacts to a label landing on an
//! issue; the reverse path reacts to a card landing in a column. Both are
//! pure: they read snapshots and describe the delta, the planner turns the
//! delta into remote actions.

use crate::columns;
use crate::models::{Column, Label};

/// Delta for the forward path: an issue gained `new_label`, the card should
/// follow it onto the board.
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardDelta {
    /// The single stale workflow label to strip, if one is present. Only
    /// the first qualifying label (label-list order) is removed; further
    /// mis-tagged labels are left alone.
    pub stale_label: Option<String>,
    /// Column whose workflow declaration contains the new label.
    pub target: Column,
    /// False when the card already sits in the target column.
    pub needs_move: bool,
}

/// First column (board order) whose workflow labels contain `new_label`,
/// plus the stale-label/move computation. `None` means the label is not a
/// workflow label anywhere and nothing happens.
pub fn reconcile_forward(
    board: &[Column],
    issue_labels: &[Label],
    new_label: &str,
    current_column_id: Option<u64>,
) -> Option<ForwardDelta> {
    let target = board.iter().find(|column| {
        columns::workflow_labels(column)
            .iter()
            .any(|declared| declared.eq_ignore_ascii_case(new_label))
    })?;

    let known_workflow_labels = columns::all_workflow_labels(board);
    let stale_label = issue_labels
        .iter()
        .find(|label| {
            !label.name.eq_ignore_ascii_case(new_label)
                && known_workflow_labels
                    .iter()
                    .any(|declared| declared.eq_ignore_ascii_case(&label.name))
        })
        .map(|label| label.name.clone());

    Some(ForwardDelta {
        stale_label,
        target: target.clone(),
        needs_move: current_column_id != Some(target.id),
    })
}

/// Delta for the reverse path: a card landed in `destination`, the issue's
/// labels should follow. Removals before the addition, so a racing forward
/// reconciliation never sees two workflow labels at once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReverseDelta {
    /// Workflow labels the issue holds that belong to other columns.
    pub remove: Vec<String>,
    /// The destination column's first declared workflow label, unless the
    /// issue already holds it.
    pub add: Option<String>,
}

impl ReverseDelta {
    pub fn is_empty(&self) -> bool {
        self.remove.is_empty() && self.add.is_none()
    }
}

/// Compute the label delta for a card sitting in `destination`. Empty when
/// the destination declares no workflow labels, or when the issue already
/// carries exactly the right one (re-running the path is a no-op).
pub fn reconcile_reverse(
    board: &[Column],
    destination: &Column,
    issue_labels: &[Label],
) -> ReverseDelta {
    let own_labels = columns::workflow_labels(destination);
    let Some(wanted) = own_labels.first() else {
        return ReverseDelta::default();
    };

    let known_workflow_labels = columns::all_workflow_labels(board);
    let remove: Vec<String> = issue_labels
        .iter()
        .filter(|label| {
            known_workflow_labels
                .iter()
                .any(|declared| declared.eq_ignore_ascii_case(&label.name))
                && !own_labels
                    .iter()
                    .any(|own| own.eq_ignore_ascii_case(&label.name))
        })
        .map(|label| label.name.clone())
        .collect();

    let already_correct = issue_labels
        .iter()
        .any(|label| label.name.eq_ignore_ascii_case(wanted));

    ReverseDelta {
        remove,
        add: (!already_correct).then(|| wanted.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(id: u64, name: &str) -> Column {
        Column {
            id,
            node_id: format!("PC_{id}"),
            name: name.to_string(),
        }
    }

    fn labels(names: &[&str]) -> Vec<Label> {
        names.iter().map(|n| Label::new(*n)).collect()
    }

    fn board() -> Vec<Column> {
        vec![
            column(1, "(n) Triage"),
            column(2, "Doing {in-review, blocked}"),
            column(3, "QA {qa}"),
            column(4, "(d) Done"),
        ]
    }

    #[test]
    fn forward_path_moves_card_and_strips_stale_label() {
        let delta =
            reconcile_forward(&board(), &labels(&["blocked"]), "qa", Some(2)).unwrap();
        assert_eq!(delta.stale_label.as_deref(), Some("blocked"));
        assert_eq!(delta.target.id, 3);
        assert!(delta.needs_move);
    }

    #[test]
    fn forward_path_ignores_non_workflow_labels() {
        assert_eq!(
            reconcile_forward(&board(), &labels(&["blocked"]), "bug", Some(2)),
            None
        );
    }

    #[test]
    fn forward_path_skips_move_when_card_already_there() {
        let delta =
            reconcile_forward(&board(), &labels(&["blocked", "qa"]), "qa", Some(3)).unwrap();
        // Stale removal is independent of whether the move happens.
        assert_eq!(delta.stale_label.as_deref(), Some("blocked"));
        assert!(!delta.needs_move);
    }

    #[test]
    fn forward_path_matches_case_insensitively() {
        let delta = reconcile_forward(&board(), &labels(&["Blocked"]), "QA", Some(1)).unwrap();
        assert_eq!(delta.target.id, 3);
        assert_eq!(delta.stale_label.as_deref(), Some("Blocked"));
    }

    #[test]
    fn forward_path_removes_only_first_stale_label() {
        // Two mis-tagged workflow labels: only the first in label-list
        // order is removed, the other stays.
        let delta = reconcile_forward(
            &board(),
            &labels(&["in-review", "blocked"]),
            "qa",
            Some(2),
        )
        .unwrap();
        assert_eq!(delta.stale_label.as_deref(), Some("in-review"));
    }

    #[test]
    fn forward_path_with_unknown_current_column_still_moves() {
        let delta = reconcile_forward(&board(), &labels(&[]), "qa", None).unwrap();
        assert!(delta.needs_move);
        assert_eq!(delta.stale_label, None);
    }

    #[test]
    fn reverse_path_strips_foreign_labels_then_adds_own() {
        let delta = reconcile_reverse(&board(), &board()[2], &labels(&["blocked"]));
        assert_eq!(delta.remove, vec!["blocked".to_string()]);
        assert_eq!(delta.add.as_deref(), Some("qa"));
    }

    #[test]
    fn reverse_path_is_idempotent() {
        let delta = reconcile_reverse(&board(), &board()[2], &labels(&["qa"]));
        assert!(delta.is_empty());
    }

    #[test]
    fn reverse_path_only_removes_labels_the_issue_holds() {
        let delta = reconcile_reverse(&board(), &board()[2], &labels(&["bug", "in-review"]));
        assert_eq!(delta.remove, vec!["in-review".to_string()]);
        assert_eq!(delta.add.as_deref(), Some("qa"));
    }

    #[test]
    fn reverse_path_adds_first_declared_label_of_multi_label_column() {
        let delta = reconcile_reverse(&board(), &board()[1], &labels(&["qa"]));
        assert_eq!(delta.remove, vec!["qa".to_string()]);
        assert_eq!(delta.add.as_deref(), Some("in-review"));
    }

    #[test]
    fn reverse_path_keeps_any_of_the_destinations_own_labels() {
        // "blocked" belongs to the destination column; it is not stripped
        // even though "in-review" is the label the column implies.
        let delta = reconcile_reverse(&board(), &board()[1], &labels(&["blocked"]));
        assert!(delta.remove.is_empty());
        assert_eq!(delta.add.as_deref(), Some("in-review"));
    }

    #[test]
    fn reverse_path_without_workflow_declaration_is_a_no_op() {
        let delta = reconcile_reverse(&board(), &board()[0], &labels(&["blocked"]));
        assert!(delta.is_empty());
    }
}
