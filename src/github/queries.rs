//! GraphQL query strings and their response envelopes.
//!
//! The aliases (`node_id: id`, `id: databaseId`, `full_name:
//! nameWithOwner`) line up the wire shape with the domain structs so the
//! responses deserialize straight into `crate::models` types.

use super::errors::GitHubError;
use crate::models::{Column, Label, Project, Repository};
use serde::de::DeserializeOwned;
use serde::Deserialize;

pub const BOARD_SNAPSHOT_QUERY: &str = r#"
  query BoardSnapshot($repositoryNodeId: ID!, $issueNodeId: ID!, $projectName: String!) {
    fresh_issue: node(id: $issueNodeId) {
      ... on Issue {
        project_cards: projectCards(first: 1) {
          nodes {
            project {
              name
            }
          }
        }
        labels(first: 100) {
          nodes {
            name
          }
        }
      }
    }
    repository: node(id: $repositoryNodeId) {
      ... on Repository {
        automation_project: projects(search: $projectName, states: OPEN, first: 1) {
          nodes {
            node_id: id
            id: databaseId
            name
            columns(first: 100) {
              nodes {
                node_id: id
                id: databaseId
                name
              }
            }
          }
        }
        fallback_project: projects(states: OPEN, first: 1) {
          nodes {
            node_id: id
            id: databaseId
            name
            columns(first: 100) {
              nodes {
                node_id: id
                id: databaseId
                name
              }
            }
          }
        }
      }
    }
  }
"#;

pub const ISSUE_CARD_QUERY: &str = r#"
  query IssueCard($issueNodeId: ID!) {
    issue: node(id: $issueNodeId) {
      ... on Issue {
        project_cards: projectCards(first: 1) {
          nodes {
            node_id: id
            id: databaseId
            column {
              id: databaseId
            }
            project {
              node_id: id
              id: databaseId
              name
              columns(first: 100) {
                nodes {
                  node_id: id
                  id: databaseId
                  name
                }
              }
            }
          }
        }
      }
    }
  }
"#;

pub const CARD_CONTEXT_QUERY: &str = r#"
  query CardContext($cardNodeId: ID!) {
    card: node(id: $cardNodeId) {
      ... on ProjectCard {
        content {
          ... on Issue {
            repository {
              node_id: id
              id: databaseId
              name
              full_name: nameWithOwner
            }
            labels(first: 100) {
              nodes {
                name
              }
            }
          }
          ... on PullRequest {
            repository {
              node_id: id
              id: databaseId
              name
              full_name: nameWithOwner
            }
            labels(first: 100) {
              nodes {
                name
              }
            }
          }
        }
        project {
          columns(first: 100) {
            nodes {
              node_id: id
              id: databaseId
              name
            }
          }
        }
      }
    }
  }
"#;

#[derive(Debug, Deserialize)]
pub struct NodeList<T> {
    pub nodes: Vec<T>,
}

impl<T> Default for NodeList<T> {
    fn default() -> Self {
        Self { nodes: Vec::new() }
    }
}

#[derive(Debug, Deserialize)]
pub struct ProjectNode {
    pub id: u64,
    pub node_id: String,
    pub name: String,
    #[serde(default)]
    pub columns: NodeList<Column>,
}

impl From<ProjectNode> for Project {
    fn from(node: ProjectNode) -> Self {
        Project {
            id: node.id,
            node_id: node.node_id,
            name: node.name,
            columns: node.columns.nodes,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct BoardSnapshotData {
    pub fresh_issue: Option<FreshIssueNode>,
    pub repository: Option<RepositoryProjectsNode>,
}

/// `node(id:)` on a non-Issue yields an empty object; every field defaults.
#[derive(Debug, Default, Deserialize)]
pub struct FreshIssueNode {
    #[serde(default)]
    pub project_cards: NodeList<CardProjectName>,
    #[serde(default)]
    pub labels: NodeList<Label>,
}

#[derive(Debug, Deserialize)]
pub struct CardProjectName {
    pub project: ProjectName,
}

#[derive(Debug, Deserialize)]
pub struct ProjectName {
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct RepositoryProjectsNode {
    #[serde(default)]
    pub automation_project: NodeList<ProjectNode>,
    #[serde(default)]
    pub fallback_project: NodeList<ProjectNode>,
}

#[derive(Debug, Deserialize)]
pub struct IssueCardData {
    pub issue: Option<IssueCardsNode>,
}

#[derive(Debug, Default, Deserialize)]
pub struct IssueCardsNode {
    #[serde(default)]
    pub project_cards: NodeList<IssueCardNode>,
}

#[derive(Debug, Deserialize)]
pub struct IssueCardNode {
    pub id: u64,
    pub node_id: String,
    pub column: Option<ColumnRef>,
    pub project: ProjectNode,
}

#[derive(Debug, Deserialize)]
pub struct ColumnRef {
    pub id: u64,
}

#[derive(Debug, Deserialize)]
pub struct CardContextData {
    pub card: Option<CardContextNode>,
}

#[derive(Debug, Deserialize)]
pub struct CardContextNode {
    pub content: Option<CardContentNode>,
    pub project: Option<ProjectColumnsNode>,
}

#[derive(Debug, Deserialize)]
pub struct CardContentNode {
    pub repository: Repository,
    #[serde(default)]
    pub labels: NodeList<Label>,
}

#[derive(Debug, Deserialize)]
pub struct ProjectColumnsNode {
    #[serde(default)]
    pub columns: NodeList<Column>,
}

/// Unwrap a raw GraphQL response: surface `errors` as a failure, then
/// deserialize `data` into the query's envelope type.
pub fn decode_data<T: DeserializeOwned>(response: serde_json::Value) -> Result<T, GitHubError> {
    if let Some(errors) = response.get("errors").and_then(|e| e.as_array()) {
        if !errors.is_empty() {
            let message = errors
                .iter()
                .filter_map(|e| e.get("message").and_then(|m| m.as_str()))
                .collect::<Vec<_>>()
                .join("; ");
            return Err(GitHubError::Graphql {
                message: if message.is_empty() {
                    errors.len().to_string() + " unnamed errors"
                } else {
                    message
                },
            });
        }
    }

    let data = response
        .get("data")
        .cloned()
        .ok_or_else(|| GitHubError::unexpected("GraphQL response carries no data"))?;
    serde_json::from_value(data)
        .map_err(|e| GitHubError::unexpected(format!("GraphQL data did not match the query: {e}")))
}
