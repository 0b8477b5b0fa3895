//! Action planning.
//!
//! Turns a classified event plus the fetched board state into an ordered
//! list of remote actions. Planning is pure; execution order matters and
//! the processor runs the list strictly sequentially, stopping at the
//! first failure.

use crate::columns;
use crate::errors::AutomationError;
use crate::events::EventCard;
use crate::models::{BoardSnapshot, CardContext, Issue, LinkedCard, Repository};
use crate::reconciler;
use crate::selector;
use std::fmt;
use tracing::info;

/// One remote mutation. Each is an atomic call with no partial-success
/// shape; the gateway executes them one at a time.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    CreateCard {
        column_id: u64,
        issue_id: u64,
    },
    MoveCard {
        card_id: u64,
        column_id: u64,
    },
    AddLabel {
        repo_full_name: String,
        issue_number: u64,
        label: String,
    },
    RemoveLabel {
        repo_full_name: String,
        issue_number: u64,
        label: String,
    },
    CloseIssue {
        repo_full_name: String,
        issue_number: u64,
    },
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::CreateCard { column_id, issue_id } => {
                write!(f, "create card for issue {issue_id} in column {column_id}")
            }
            Action::MoveCard { card_id, column_id } => {
                write!(f, "move card {card_id} to column {column_id}")
            }
            Action::AddLabel {
                repo_full_name,
                issue_number,
                label,
            } => write!(f, "add label \"{label}\" to {repo_full_name}#{issue_number}"),
            Action::RemoveLabel {
                repo_full_name,
                issue_number,
                label,
            } => write!(
                f,
                "remove label \"{label}\" from {repo_full_name}#{issue_number}"
            ),
            Action::CloseIssue {
                repo_full_name,
                issue_number,
            } => write!(f, "close {repo_full_name}#{issue_number}"),
        }
    }
}

/// Issue opened: resolve the project, pick the start column, create the
/// card there. Uses the freshly fetched labels, which may already differ
/// from the webhook payload.
pub fn plan_issue_opened(
    snapshot: &BoardSnapshot,
    repository: &Repository,
    issue: &Issue,
    automation_project_name: &str,
) -> Result<Vec<Action>, AutomationError> {
    let project = selector::resolve_project(snapshot, repository, issue, automation_project_name)?;
    let column = selector::select_start_column(project, &snapshot.issue_labels, repository)?;
    info!(
        issue = %issue.title,
        repository = %repository.full_name,
        column = %column.name,
        project = %project.name,
        "placing card for new issue"
    );
    Ok(vec![Action::CreateCard {
        column_id: column.id,
        issue_id: issue.id,
    }])
}

/// Issue closed: the card must already exist and the project must declare
/// a closed-marker column; both absences are configuration errors.
pub fn plan_issue_closed(
    card: Option<&LinkedCard>,
    repository: &Repository,
    issue: &Issue,
) -> Result<Vec<Action>, AutomationError> {
    let card = card.ok_or_else(|| {
        AutomationError::Configuration(format!(
            "issue \"{}\" in repo \"{}\" is not linked to any card",
            issue.title, repository.full_name
        ))
    })?;

    let closed_column = card
        .project
        .columns
        .iter()
        .find(|c| columns::is_closed_column(c))
        .ok_or_else(|| {
            AutomationError::Configuration(format!(
                "project \"{}\" in repo \"{}\" is missing the column for closed issues \
                 (should be named \"(d) column_name\")",
                card.project.name, repository.full_name
            ))
        })?;

    Ok(vec![Action::MoveCard {
        card_id: card.id,
        column_id: closed_column.id,
    }])
}

/// Issue labeled: forward reconciliation. An issue without a card, or a
/// label that is not a workflow label anywhere, plans nothing.
pub fn plan_issue_labeled(
    card: Option<&LinkedCard>,
    repository: &Repository,
    issue: &Issue,
    new_label: &str,
) -> Vec<Action> {
    let Some(card) = card else {
        return Vec::new();
    };

    let Some(delta) = reconciler::reconcile_forward(
        &card.project.columns,
        &issue.labels,
        new_label,
        card.column_id,
    ) else {
        return Vec::new();
    };

    let mut actions = Vec::new();
    if let Some(stale) = delta.stale_label {
        actions.push(Action::RemoveLabel {
            repo_full_name: repository.full_name.clone(),
            issue_number: issue.number,
            label: stale,
        });
    }
    if delta.needs_move {
        actions.push(Action::MoveCard {
            card_id: card.id,
            column_id: delta.target.id,
        });
    }
    actions
}

/// Card created/converted/moved: reverse reconciliation, then close the
/// issue when the destination is a closed-marker column.
pub fn plan_card_placed(context: &CardContext, card: &EventCard) -> Vec<Action> {
    let Some(destination) = context.columns.iter().find(|c| c.id == card.column_id) else {
        // Column vanished between the event and the snapshot.
        return Vec::new();
    };

    let mut actions = Vec::new();

    let delta = reconciler::reconcile_reverse(&context.columns, destination, &context.issue_labels);
    for label in delta.remove {
        actions.push(Action::RemoveLabel {
            repo_full_name: context.repository.full_name.clone(),
            issue_number: card.issue_number,
            label,
        });
    }
    if let Some(label) = delta.add {
        actions.push(Action::AddLabel {
            repo_full_name: context.repository.full_name.clone(),
            issue_number: card.issue_number,
            label,
        });
    }

    if columns::is_closed_column(destination) {
        actions.push(Action::CloseIssue {
            repo_full_name: context.repository.full_name.clone(),
            issue_number: card.issue_number,
        });
    }

    actions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Column, IssueState, Label, Project};

    fn column(id: u64, name: &str) -> Column {
        Column {
            id,
            node_id: format!("PC_{id}"),
            name: name.to_string(),
        }
    }

    fn board() -> Vec<Column> {
        vec![
            column(1, "(n) Triage"),
            column(2, "Doing {in-review, blocked}"),
            column(3, "QA {qa}"),
            column(4, "(d) Done"),
        ]
    }

    fn project() -> Project {
        Project {
            id: 7,
            node_id: "P_7".to_string(),
            name: "Cards Automation".to_string(),
            columns: board(),
        }
    }

    fn repository() -> Repository {
        Repository {
            id: 1,
            node_id: "R_1".to_string(),
            name: "board".to_string(),
            full_name: "acme/board".to_string(),
        }
    }

    fn issue(labels: &[&str]) -> Issue {
        Issue {
            id: 10,
            node_id: "I_10".to_string(),
            number: 42,
            title: "broken".to_string(),
            state: IssueState::Open,
            labels: labels.iter().map(|n| Label::new(*n)).collect(),
        }
    }

    fn linked_card(column_id: Option<u64>) -> LinkedCard {
        LinkedCard {
            id: 77,
            node_id: "PRC_77".to_string(),
            column_id,
            project: project(),
        }
    }

    fn event_card(column_id: u64) -> EventCard {
        EventCard {
            id: 77,
            node_id: "PRC_77".to_string(),
            column_id,
            issue_number: 42,
        }
    }

    fn context(issue_labels: &[&str]) -> CardContext {
        CardContext {
            repository: repository(),
            columns: board(),
            issue_labels: issue_labels.iter().map(|n| Label::new(*n)).collect(),
        }
    }

    #[test]
    fn opened_issue_gets_a_card_in_the_selected_column() {
        let snapshot = BoardSnapshot {
            issue_labels: vec![Label::new("bug")],
            automation_project: Some(project()),
            ..Default::default()
        };
        let plan =
            plan_issue_opened(&snapshot, &repository(), &issue(&[]), "Cards Automation").unwrap();
        assert_eq!(
            plan,
            vec![Action::CreateCard {
                column_id: 1,
                issue_id: 10
            }]
        );
    }

    #[test]
    fn closed_issue_moves_card_to_the_closed_column() {
        let plan =
            plan_issue_closed(Some(&linked_card(Some(2))), &repository(), &issue(&[])).unwrap();
        assert_eq!(
            plan,
            vec![Action::MoveCard {
                card_id: 77,
                column_id: 4
            }]
        );
    }

    #[test]
    fn closed_issue_without_card_is_a_configuration_error() {
        let err = plan_issue_closed(None, &repository(), &issue(&[])).unwrap_err();
        assert!(err.to_string().contains("not linked to any card"));
    }

    #[test]
    fn closed_issue_without_closed_column_is_a_configuration_error() {
        let mut card = linked_card(Some(2));
        card.project.columns.retain(|c| !c.name.starts_with("(d)"));
        let err = plan_issue_closed(Some(&card), &repository(), &issue(&[])).unwrap_err();
        assert!(err.to_string().contains("(d) column_name"));
    }

    #[test]
    fn labeled_issue_strips_stale_label_then_moves() {
        let plan = plan_issue_labeled(
            Some(&linked_card(Some(1))),
            &repository(),
            &issue(&["blocked", "in-review"]),
            "in-review",
        );
        assert_eq!(
            plan,
            vec![
                Action::RemoveLabel {
                    repo_full_name: "acme/board".to_string(),
                    issue_number: 42,
                    label: "blocked".to_string(),
                },
                Action::MoveCard {
                    card_id: 77,
                    column_id: 2
                },
            ]
        );
    }

    #[test]
    fn labeled_issue_without_card_plans_nothing() {
        let plan = plan_issue_labeled(None, &repository(), &issue(&["qa"]), "qa");
        assert!(plan.is_empty());
    }

    #[test]
    fn labeled_issue_with_non_workflow_label_plans_nothing() {
        let plan = plan_issue_labeled(
            Some(&linked_card(Some(2))),
            &repository(),
            &issue(&["bug"]),
            "bug",
        );
        assert!(plan.is_empty());
    }

    #[test]
    fn card_placed_replans_labels_in_strip_then_add_order() {
        let plan = plan_card_placed(&context(&["blocked"]), &event_card(3));
        assert_eq!(
            plan,
            vec![
                Action::RemoveLabel {
                    repo_full_name: "acme/board".to_string(),
                    issue_number: 42,
                    label: "blocked".to_string(),
                },
                Action::AddLabel {
                    repo_full_name: "acme/board".to_string(),
                    issue_number: 42,
                    label: "qa".to_string(),
                },
            ]
        );
    }

    #[test]
    fn card_placed_in_closed_column_closes_the_issue() {
        let plan = plan_card_placed(&context(&[]), &event_card(4));
        assert_eq!(
            plan,
            vec![Action::CloseIssue {
                repo_full_name: "acme/board".to_string(),
                issue_number: 42,
            }]
        );
    }

    #[test]
    fn card_placed_when_labels_already_correct_plans_nothing() {
        let plan = plan_card_placed(&context(&["qa"]), &event_card(3));
        assert!(plan.is_empty());
    }

    #[test]
    fn card_placed_in_unknown_column_plans_nothing() {
        let plan = plan_card_placed(&context(&["qa"]), &event_card(99));
        assert!(plan.is_empty());
    }
}
