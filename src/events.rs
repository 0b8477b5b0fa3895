//! Event classification.
//!
//! Decodes raw webhook payloads (wire field names are snake_case) into the
//! event variants the planner understands. Unknown or irrelevant shapes are
//! not errors here: they classify as `Event::Ignored` and become the
//! planner's no-op branch. Only a payload that fails even the base shape is
//! a client-input problem.

use crate::models::{Issue, IssueState, Label, Repository};
use serde::Deserialize;
use thiserror::Error;

/// The payload did not match the base webhook shape at all.
#[derive(Debug, Error)]
#[error("unknown event payload: {detail}")]
pub struct UnknownEvent {
    pub detail: String,
}

/// Card fields relevant to planning, extracted from a project_card event.
#[derive(Debug, Clone, PartialEq)]
pub struct EventCard {
    pub id: u64,
    pub node_id: String,
    pub column_id: u64,
    /// Parsed from the tail of the card's content URL.
    pub issue_number: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    IssueOpened {
        repository: Repository,
        issue: Issue,
    },
    IssueClosed {
        repository: Repository,
        issue: Issue,
    },
    IssueLabeled {
        repository: Repository,
        issue: Issue,
        label: Label,
    },
    /// A card was created, converted, or moved to a different column.
    CardPlaced {
        repository: Option<Repository>,
        card: EventCard,
    },
    Ignored {
        reason: String,
    },
}

#[derive(Debug, Deserialize)]
struct Sender {
    login: String,
}

#[derive(Debug, Deserialize)]
struct BasePayload {
    action: Option<String>,
    sender: Sender,
    #[allow(dead_code)]
    installation: Installation,
}

#[derive(Debug, Deserialize)]
struct Installation {
    #[allow(dead_code)]
    id: u64,
}

#[derive(Debug, Deserialize)]
struct IssuePayload {
    action: String,
    issue: Issue,
    repository: Repository,
    label: Option<Label>,
}

#[derive(Debug, Deserialize)]
struct CardPayload {
    action: String,
    project_card: WireCard,
    repository: Option<Repository>,
    changes: Option<CardChanges>,
}

#[derive(Debug, Deserialize)]
struct WireCard {
    id: u64,
    node_id: String,
    column_id: u64,
    /// Non-null for note cards, which carry no issue and are ignored.
    note: Option<String>,
    content_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CardChanges {
    column_id: ColumnIdChange,
}

#[derive(Debug, Deserialize)]
struct ColumnIdChange {
    from: u64,
}

/// Issue number encoded at the tail of a card's content URL, e.g.
/// `https://api.github.com/repos/acme/board/issues/42`.
fn issue_number_from_content_url(content_url: &str) -> Option<u64> {
    content_url.rsplit('/').next()?.parse().ok()
}

/// Classify a webhook delivery. `event_name` is the `X-GitHub-Event`
/// header value; `payload` is the request body.
pub fn classify(
    event_name: &str,
    payload: &serde_json::Value,
    bot_login: &str,
) -> Result<Event, UnknownEvent> {
    let base: BasePayload =
        serde_json::from_value(payload.clone()).map_err(|e| UnknownEvent {
            detail: e.to_string(),
        })?;

    // The automation's own writes come back as webhooks; reacting to them
    // would loop forever.
    if base.sender.login == bot_login {
        let action = base
            .action
            .as_deref()
            .map(|a| format!(":{a}"))
            .unwrap_or_default();
        return Ok(Event::Ignored {
            reason: format!("event \"{event_name}{action}\" was sent by \"{bot_login}\""),
        });
    }

    match event_name {
        "issues" => classify_issue_event(payload, &base),
        "project_card" => classify_card_event(payload, &base),
        _ => Ok(ignored(event_name, &base)),
    }
}

fn ignored(event_name: &str, base: &BasePayload) -> Event {
    let action = base
        .action
        .as_deref()
        .map(|a| format!(":{a}"))
        .unwrap_or_default();
    Event::Ignored {
        reason: format!("event \"{event_name}{action}\" is not actionable"),
    }
}

fn classify_issue_event(
    payload: &serde_json::Value,
    base: &BasePayload,
) -> Result<Event, UnknownEvent> {
    let Ok(event) = serde_json::from_value::<IssuePayload>(payload.clone()) else {
        return Ok(ignored("issues", base));
    };

    let IssuePayload {
        action,
        issue,
        repository,
        label,
    } = event;

    Ok(match action.as_str() {
        "opened" => Event::IssueOpened { repository, issue },
        "closed" => Event::IssueClosed { repository, issue },
        "labeled" => match label {
            Some(label) if issue.state == IssueState::Open => Event::IssueLabeled {
                repository,
                issue,
                label,
            },
            Some(_) => Event::Ignored {
                reason: format!(
                    "issue \"{}#{}\" is already closed",
                    repository.full_name, issue.number
                ),
            },
            None => ignored("issues", base),
        },
        _ => ignored("issues", base),
    })
}

fn classify_card_event(
    payload: &serde_json::Value,
    base: &BasePayload,
) -> Result<Event, UnknownEvent> {
    let Ok(event) = serde_json::from_value::<CardPayload>(payload.clone()) else {
        return Ok(ignored("project_card", base));
    };

    if event.project_card.note.is_some() {
        return Ok(Event::Ignored {
            reason: format!("card \"{}\" is a note, not an issue", event.project_card.id),
        });
    }

    let Some(issue_number) = event
        .project_card
        .content_url
        .as_deref()
        .and_then(issue_number_from_content_url)
    else {
        return Ok(Event::Ignored {
            reason: format!(
                "card \"{}\" is not linked to an issue",
                event.project_card.id
            ),
        });
    };

    let placed = match event.action.as_str() {
        "created" | "converted" => true,
        // A move within the same column changes nothing on the board.
        "moved" => match &event.changes {
            Some(changes) => changes.column_id.from != event.project_card.column_id,
            None => false,
        },
        _ => false,
    };

    if !placed {
        return Ok(ignored("project_card", base));
    }

    Ok(Event::CardPlaced {
        repository: event.repository,
        card: EventCard {
            id: event.project_card.id,
            node_id: event.project_card.node_id,
            column_id: event.project_card.column_id,
            issue_number,
        },
    })
}
