//! Remote-state gateway.
//!
//! The planner never talks to the network; everything it needs to read or
//! mutate goes through `BoardGateway`. The octocrab implementation reads
//! board state over GraphQL, mutates labels and issue state through the
//! typed issues API, and drives classic project cards through the REST
//! routes the Projects API exposes.

use super::client::build_client;
use super::errors::GitHubError;
use super::queries;
use crate::models::{BoardSnapshot, CardContext, Issue, LinkedCard, Repository};
use crate::planner::Action;
use async_trait::async_trait;
use octocrab::Octocrab;
use serde_json::json;

#[async_trait]
pub trait BoardGateway: Send + Sync {
    /// Projects, columns, and fresh issue labels for placing a new card.
    async fn fetch_board_snapshot(
        &self,
        repository: &Repository,
        issue: &Issue,
    ) -> Result<BoardSnapshot, GitHubError>;

    /// The card an issue is linked to, with its project's columns.
    async fn fetch_issue_card(
        &self,
        issue_node_id: &str,
    ) -> Result<Option<LinkedCard>, GitHubError>;

    /// Repository, columns, and linked-issue labels for a card event.
    async fn fetch_card_context(&self, card_node_id: &str) -> Result<CardContext, GitHubError>;

    /// Perform one planned mutation. Atomic from the planner's view: it
    /// either took effect or failed, with no partial-success shape.
    async fn execute(&self, action: &Action) -> Result<(), GitHubError>;
}

pub struct OctocrabGateway {
    octocrab: Octocrab,
    automation_project_name: String,
}

impl OctocrabGateway {
    pub fn new(token: &str, automation_project_name: &str) -> Result<Self, GitHubError> {
        Ok(Self {
            octocrab: build_client(token)?,
            automation_project_name: automation_project_name.to_string(),
        })
    }

    async fn graphql(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<serde_json::Value, GitHubError> {
        let response: serde_json::Value = self
            .octocrab
            .graphql(&json!({ "query": query, "variables": variables }))
            .await?;
        Ok(response)
    }

    fn issues_handler(
        &self,
        repo_full_name: &str,
    ) -> Result<octocrab::issues::IssueHandler<'_>, GitHubError> {
        let (owner, repo) = split_full_name(repo_full_name)?;
        Ok(self.octocrab.issues(owner, repo))
    }
}

fn split_full_name(full_name: &str) -> Result<(&str, &str), GitHubError> {
    full_name
        .split_once('/')
        .ok_or_else(|| GitHubError::unexpected(format!("malformed repository name: {full_name}")))
}

#[async_trait]
impl BoardGateway for OctocrabGateway {
    async fn fetch_board_snapshot(
        &self,
        repository: &Repository,
        issue: &Issue,
    ) -> Result<BoardSnapshot, GitHubError> {
        let response = self
            .graphql(
                queries::BOARD_SNAPSHOT_QUERY,
                json!({
                    "repositoryNodeId": repository.node_id,
                    "issueNodeId": issue.node_id,
                    "projectName": self.automation_project_name,
                }),
            )
            .await?;
        let data: queries::BoardSnapshotData = queries::decode_data(response)?;

        let fresh_issue = data.fresh_issue.unwrap_or_default();
        let projects = data.repository.unwrap_or_default();

        Ok(BoardSnapshot {
            existing_card_project: fresh_issue
                .project_cards
                .nodes
                .into_iter()
                .next()
                .map(|card| card.project.name),
            issue_labels: fresh_issue.labels.nodes,
            automation_project: projects
                .automation_project
                .nodes
                .into_iter()
                .next()
                .map(Into::into),
            fallback_project: projects
                .fallback_project
                .nodes
                .into_iter()
                .next()
                .map(Into::into),
        })
    }

    async fn fetch_issue_card(
        &self,
        issue_node_id: &str,
    ) -> Result<Option<LinkedCard>, GitHubError> {
        let response = self
            .graphql(queries::ISSUE_CARD_QUERY, json!({ "issueNodeId": issue_node_id }))
            .await?;
        let data: queries::IssueCardData = queries::decode_data(response)?;

        Ok(data
            .issue
            .unwrap_or_default()
            .project_cards
            .nodes
            .into_iter()
            .next()
            .map(|card| LinkedCard {
                id: card.id,
                node_id: card.node_id,
                column_id: card.column.map(|column| column.id),
                project: card.project.into(),
            }))
    }

    async fn fetch_card_context(&self, card_node_id: &str) -> Result<CardContext, GitHubError> {
        let response = self
            .graphql(queries::CARD_CONTEXT_QUERY, json!({ "cardNodeId": card_node_id }))
            .await?;
        let data: queries::CardContextData = queries::decode_data(response)?;

        let card = data
            .card
            .ok_or_else(|| GitHubError::unexpected(format!("card {card_node_id} not found")))?;
        let content = card.content.ok_or_else(|| {
            GitHubError::unexpected(format!("card {card_node_id} has no linked content"))
        })?;

        Ok(CardContext {
            repository: content.repository,
            columns: card.project.map(|p| p.columns.nodes).unwrap_or_default(),
            issue_labels: content.labels.nodes,
        })
    }

    async fn execute(&self, action: &Action) -> Result<(), GitHubError> {
        match action {
            Action::CreateCard { column_id, issue_id } => {
                // The typed `post` maps error statuses to `Err`; the raw
                // `_post` would hand back a 4xx response as a success.
                let _: serde_json::Value = self
                    .octocrab
                    .post(
                        format!("/projects/columns/{column_id}/cards"),
                        Some(&json!({ "content_id": issue_id, "content_type": "Issue" })),
                    )
                    .await?;
            }
            Action::MoveCard { card_id, column_id } => {
                let _: serde_json::Value = self
                    .octocrab
                    .post(
                        format!("/projects/columns/cards/{card_id}/moves"),
                        Some(&json!({ "position": "top", "column_id": column_id })),
                    )
                    .await?;
            }
            Action::AddLabel {
                repo_full_name,
                issue_number,
                label,
            } => {
                self.issues_handler(repo_full_name)?
                    .add_labels(*issue_number, &[label.clone()])
                    .await?;
            }
            Action::RemoveLabel {
                repo_full_name,
                issue_number,
                label,
            } => {
                self.issues_handler(repo_full_name)?
                    .remove_label(*issue_number, label.as_str())
                    .await?;
            }
            Action::CloseIssue {
                repo_full_name,
                issue_number,
            } => {
                self.issues_handler(repo_full_name)?
                    .update(*issue_number)
                    .state(octocrab::models::IssueState::Closed)
                    .send()
                    .await?;
            }
        }
        Ok(())
    }
}
