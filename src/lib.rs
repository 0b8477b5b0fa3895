// projects-automation - GitHub project board workflow automation
// Column names declare the workflow; webhooks keep the board honest.

pub mod columns;
pub mod config;
pub mod errors;
pub mod events;
pub mod github;
pub mod models;
pub mod planner;
pub mod processor;
pub mod reconciler;
pub mod selector;
pub mod telemetry;

// Re-export key types for easy access
pub use config::AutomationConfig;
pub use errors::AutomationError;
pub use events::{classify, Event, EventCard, UnknownEvent};
pub use github::{BoardGateway, GitHubError, OctocrabGateway};
pub use models::{
    BoardSnapshot, CardContext, Column, Issue, IssueState, Label, LinkedCard, Project, Repository,
};
pub use planner::Action;
pub use processor::{Outcome, WebhookProcessor, WebhookResponse};
pub use telemetry::{create_delivery_span, generate_delivery_id, init_telemetry};
