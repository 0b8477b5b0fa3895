//! Column selection for newly opened issues.
//!
//! Resolves which project a card belongs to, then which column it starts
//! in. Every tie breaks by declared order: first project returned, first
//! column on the board.

use crate::columns;
use crate::errors::AutomationError;
use crate::models::{BoardSnapshot, Column, Issue, Label, Project, Repository};
use tracing::warn;

/// Pick the project a new card goes on.
///
/// Prefers the open project named after the automation convention, falls
/// back to the repository's first open project with a logged notice. No
/// open project at all, or an issue that is already carded somewhere, is a
/// configuration error: no placement is possible.
pub fn resolve_project<'a>(
    snapshot: &'a BoardSnapshot,
    repository: &Repository,
    issue: &Issue,
    automation_project_name: &str,
) -> Result<&'a Project, AutomationError> {
    if let Some(project_name) = &snapshot.existing_card_project {
        return Err(AutomationError::Configuration(format!(
            "the issue \"{}#{}\" is already linked to a card in the project \"{}\"",
            repository.full_name, issue.number, project_name
        )));
    }

    if let Some(project) = &snapshot.automation_project {
        return Ok(project);
    }

    let fallback = snapshot.fallback_project.as_ref().ok_or_else(|| {
        AutomationError::Configuration(format!(
            "repository \"{}\" does not have any GitHub Projects",
            repository.full_name
        ))
    })?;

    warn!(
        repository = %repository.full_name,
        fallback_project = %fallback.name,
        "repository is missing a \"{automation_project_name}\" project: falling back"
    );
    Ok(fallback)
}

/// Pick the column a new card starts in.
///
/// First column whose category labels intersect the issue's labels
/// (case-insensitively); else the first open-marker column; else the first
/// column of the board, with a notice that the opened convention column is
/// missing.
pub fn select_start_column<'a>(
    project: &'a Project,
    issue_labels: &[Label],
    repository: &Repository,
) -> Result<&'a Column, AutomationError> {
    let category_column = project.columns.iter().find(|column| {
        let category = columns::category_labels(column);
        issue_labels.iter().any(|label| {
            category
                .iter()
                .any(|candidate| candidate.eq_ignore_ascii_case(&label.name))
        })
    });

    if let Some(column) = category_column {
        return Ok(column);
    }

    if let Some(column) = project.columns.iter().find(|c| columns::is_open_column(c)) {
        return Ok(column);
    }

    let first = project.columns.first().ok_or_else(|| {
        AutomationError::Configuration(format!(
            "project \"{}\" in repo \"{}\" has no columns",
            project.name, repository.full_name
        ))
    })?;

    warn!(
        project = %project.name,
        repository = %repository.full_name,
        "project is missing the column for opened issues (should be named \"(n) column_name\"): \
         falling back to the first column"
    );
    Ok(first)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::IssueState;

    fn column(id: u64, name: &str) -> Column {
        Column {
            id,
            node_id: format!("PC_{id}"),
            name: name.to_string(),
        }
    }

    fn project(name: &str, columns: Vec<Column>) -> Project {
        Project {
            id: 7,
            node_id: "P_7".to_string(),
            name: name.to_string(),
            columns,
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

    fn issue() -> Issue {
        Issue {
            id: 10,
            node_id: "I_10".to_string(),
            number: 42,
            title: "broken".to_string(),
            state: IssueState::Open,
            labels: vec![],
        }
    }

    fn labels(names: &[&str]) -> Vec<Label> {
        names.iter().map(|n| Label::new(*n)).collect()
    }

    #[test]
    fn category_match_wins_over_open_column() {
        let project = project(
            "Board",
            vec![
                column(1, "Backlog"),
                column(2, "Bugs [ui, backend]"),
                column(3, "(n) Triage"),
            ],
        );
        let chosen = select_start_column(&project, &labels(&["ui"]), &repository()).unwrap();
        assert_eq!(chosen.id, 2);
    }

    #[test]
    fn category_match_is_case_insensitive() {
        let project = project("Board", vec![column(1, "Bugs [UI]"), column(2, "(n) Triage")]);
        let chosen = select_start_column(&project, &labels(&["ui"]), &repository()).unwrap();
        assert_eq!(chosen.id, 1);
    }

    #[test]
    fn open_column_when_no_category_matches() {
        let project = project(
            "Board",
            vec![
                column(1, "Backlog"),
                column(2, "Bugs [ui, backend]"),
                column(3, "(n) Triage"),
            ],
        );
        let chosen = select_start_column(&project, &labels(&["other"]), &repository()).unwrap();
        assert_eq!(chosen.id, 3);
    }

    #[test]
    fn first_column_is_the_last_resort() {
        let project = project(
            "Board",
            vec![column(1, "Backlog"), column(2, "Bugs [ui, backend]")],
        );
        let chosen = select_start_column(&project, &labels(&["other"]), &repository()).unwrap();
        assert_eq!(chosen.id, 1);
    }

    #[test]
    fn ties_break_by_column_order() {
        let project = project(
            "Board",
            vec![column(1, "A [shared]"), column(2, "B [shared]")],
        );
        let chosen = select_start_column(&project, &labels(&["shared"]), &repository()).unwrap();
        assert_eq!(chosen.id, 1);
    }

    #[test]
    fn empty_board_is_a_configuration_error() {
        let project = project("Board", vec![]);
        let err = select_start_column(&project, &labels(&["ui"]), &repository()).unwrap_err();
        assert!(matches!(err, AutomationError::Configuration(_)));
    }

    #[test]
    fn automation_project_is_preferred() {
        let snapshot = BoardSnapshot {
            automation_project: Some(project("Cards Automation", vec![column(1, "(n) Triage")])),
            fallback_project: Some(project("Other", vec![column(2, "Inbox")])),
            ..Default::default()
        };
        let chosen = resolve_project(&snapshot, &repository(), &issue(), "Cards Automation").unwrap();
        assert_eq!(chosen.name, "Cards Automation");
    }

    #[test]
    fn falls_back_to_first_open_project() {
        let snapshot = BoardSnapshot {
            fallback_project: Some(project("Other", vec![column(2, "Inbox")])),
            ..Default::default()
        };
        let chosen = resolve_project(&snapshot, &repository(), &issue(), "Cards Automation").unwrap();
        assert_eq!(chosen.name, "Other");
    }

    #[test]
    fn no_project_at_all_is_a_hard_failure() {
        let snapshot = BoardSnapshot::default();
        let err = resolve_project(&snapshot, &repository(), &issue(), "Cards Automation")
            .unwrap_err();
        assert!(matches!(err, AutomationError::Configuration(_)));
    }

    #[test]
    fn already_carded_issue_is_rejected() {
        let snapshot = BoardSnapshot {
            existing_card_project: Some("Cards Automation".to_string()),
            automation_project: Some(project("Cards Automation", vec![column(1, "(n) Triage")])),
            ..Default::default()
        };
        let err = resolve_project(&snapshot, &repository(), &issue(), "Cards Automation")
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("already linked"), "{message}");
        assert!(message.contains("acme/board#42"), "{message}");
    }
}
