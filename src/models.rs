use serde::{Deserialize, Serialize};

/// A column of a classic project board. The `name` is the sole carrier of
/// workflow semantics; markers and label sets are re-derived from it on
/// every use (see `crate::columns`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub id: u64,
    pub node_id: String,
    pub name: String,
}

/// A project board with its columns in board order. Column order matters:
/// it is the tie-break for category/workflow matches and the last-resort
/// placement fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: u64,
    pub node_id: String,
    pub name: String,
    pub columns: Vec<Column>,
}

/// Label identity is its name, compared case-insensitively throughout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
}

impl Label {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    Open,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub id: u64,
    pub node_id: String,
    pub number: u64,
    pub title: String,
    pub state: IssueState,
    pub labels: Vec<Label>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    pub id: u64,
    pub node_id: String,
    pub name: String,
    pub full_name: String,
}

impl Repository {
    /// Owner half of `owner/repo`.
    pub fn owner(&self) -> &str {
        self.full_name.split('/').next().unwrap_or(&self.full_name)
    }
}

/// A card as the gateway sees it: linked to an issue, sitting in at most
/// one column of one project.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkedCard {
    pub id: u64,
    pub node_id: String,
    /// Current column, when the query asked for it.
    pub column_id: Option<u64>,
    pub project: Project,
}

/// Everything needed to place a card for a freshly opened issue, fetched in
/// one round trip before planning.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoardSnapshot {
    /// Name of the project the issue is already carded in, if any.
    pub existing_card_project: Option<String>,
    /// The issue's labels as GitHub sees them right now, which may be
    /// fresher than the webhook payload.
    pub issue_labels: Vec<Label>,
    /// The open project matching the automation project name.
    pub automation_project: Option<Project>,
    /// The repository's first open project, used when no automation
    /// project exists.
    pub fallback_project: Option<Project>,
}

/// Context for a card-level event, fetched by card node id.
#[derive(Debug, Clone, PartialEq)]
pub struct CardContext {
    pub repository: Repository,
    pub columns: Vec<Column>,
    /// Labels currently held by the card's linked issue.
    pub issue_labels: Vec<Label>,
}
