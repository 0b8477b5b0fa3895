//! Event orchestration.
//!
//! One webhook delivery runs one linear chain: classify, fetch the board
//! state the event needs, plan, then execute the planned actions strictly
//! in order. Later actions may depend on earlier ones having landed, so
//! nothing runs concurrently; the first failure stops the chain and prior
//! side effects stay applied.

use crate::config::AutomationConfig;
use crate::errors::AutomationError;
use crate::events::{classify, Event};
use crate::github::BoardGateway;
use crate::planner;
use crate::planner::Action;
use tracing::{error, info, warn};

/// How a delivery ended, when it did not fail. `Ignored` covers every
/// intentionally-unactionable shape: unrecognized events, self-authored
/// events, no-op moves.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Completed { actions_executed: usize },
    Ignored { reason: String },
}

/// The HTTP-shaped answer the webhook caller gets. GitHub cannot act on
/// fine-grained diagnostics, so this only distinguishes "your payload is
/// not an event we know" from "we failed"; detail goes to the log sink.
#[derive(Debug, Clone, PartialEq)]
pub struct WebhookResponse {
    pub status_code: u16,
    pub body: String,
}

impl WebhookResponse {
    fn ok() -> Self {
        Self {
            status_code: 200,
            body: "Ok".to_string(),
        }
    }

    fn unknown_event() -> Self {
        Self {
            status_code: 403,
            body: "Unknown Event".to_string(),
        }
    }

    fn internal(message: String) -> Self {
        Self {
            status_code: 500,
            body: message,
        }
    }
}

pub struct WebhookProcessor<G> {
    gateway: G,
    bot_login: String,
    automation_project_name: String,
}

impl<G: BoardGateway> WebhookProcessor<G> {
    pub fn new(gateway: G, config: &AutomationConfig) -> Self {
        Self {
            gateway,
            bot_login: config.github.bot_login.clone(),
            automation_project_name: config.github.automation_project.clone(),
        }
    }

    /// Process one delivery end to end and fold the result into the
    /// response envelope.
    pub async fn process(&self, event_name: &str, payload: &serde_json::Value) -> WebhookResponse {
        let event = match classify(event_name, payload, &self.bot_login) {
            Ok(event) => event,
            Err(unknown) => {
                info!(event = event_name, detail = %unknown.detail, "undecodable event payload");
                return WebhookResponse::unknown_event();
            }
        };

        match self.handle(event).await {
            Ok(Outcome::Completed { actions_executed }) => {
                info!(actions = actions_executed, "event processed");
                WebhookResponse::ok()
            }
            Ok(Outcome::Ignored { reason }) => {
                info!(%reason, "event ignored");
                WebhookResponse::ok()
            }
            Err(err) => {
                error!(error = %err, "event processing failed");
                WebhookResponse::internal(err.to_string())
            }
        }
    }

    /// Fetch, plan, and execute for one classified event.
    pub async fn handle(&self, event: Event) -> Result<Outcome, AutomationError> {
        match event {
            Event::Ignored { reason } => Ok(Outcome::Ignored { reason }),

            Event::IssueOpened { repository, issue } => {
                info!(
                    issue = %issue.title,
                    repository = %repository.full_name,
                    "new issue opened"
                );
                let snapshot = self.gateway.fetch_board_snapshot(&repository, &issue).await?;
                let plan = planner::plan_issue_opened(
                    &snapshot,
                    &repository,
                    &issue,
                    &self.automation_project_name,
                )?;
                self.execute_plan(plan).await
            }

            Event::IssueClosed { repository, issue } => {
                info!(
                    issue = %issue.title,
                    repository = %repository.full_name,
                    "issue closed"
                );
                let card = self.gateway.fetch_issue_card(&issue.node_id).await?;
                let plan = planner::plan_issue_closed(card.as_ref(), &repository, &issue)?;
                self.execute_plan(plan).await
            }

            Event::IssueLabeled {
                repository,
                issue,
                label,
            } => {
                info!(
                    issue = %issue.title,
                    repository = %repository.full_name,
                    label = %label.name,
                    "issue labeled"
                );
                let card = self.gateway.fetch_issue_card(&issue.node_id).await?;
                let plan =
                    planner::plan_issue_labeled(card.as_ref(), &repository, &issue, &label.name);
                self.execute_plan(plan).await
            }

            Event::CardPlaced { repository, card } => {
                match &repository {
                    Some(repository) => info!(
                        card = card.id,
                        repository = %repository.full_name,
                        column = card.column_id,
                        "card placed"
                    ),
                    None => info!(card = card.id, column = card.column_id, "card placed"),
                }
                let context = self.gateway.fetch_card_context(&card.node_id).await?;
                let plan = planner::plan_card_placed(&context, &card);
                self.execute_plan(plan).await
            }
        }
    }

    /// Run the actions one at a time, in order, stopping at the first
    /// failure. No retry and no rollback: prior actions stay applied.
    async fn execute_plan(&self, plan: Vec<Action>) -> Result<Outcome, AutomationError> {
        let total = plan.len();
        for (index, action) in plan.into_iter().enumerate() {
            info!(step = index + 1, total, %action, "executing");
            if let Err(err) = self.gateway.execute(&action).await {
                warn!(step = index + 1, total, %action, "action failed, dropping the rest");
                return Err(err.into());
            }
        }
        Ok(Outcome::Completed {
            actions_executed: total,
        })
    }
}
