use serde::Deserialize;
use thiserror::Error;

/// Errors resolving the base/head commit range from a trigger event.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RefError {
    #[error("only pull_request and push events are supported, got {event_name}")]
    UnsupportedEvent { event_name: String },
    #[error("the {event_name} payload is missing its base and head commits")]
    MissingCommits { event_name: String },
}

/// A workflow trigger: the event name plus its decoded payload.
///
/// Passed in explicitly rather than read from ambient context so that ref
/// resolution is testable on its own.
#[derive(Debug, Clone)]
pub struct TriggerEvent {
    pub event_name: String,
    pub payload: EventPayload,
}

/// The subset of the workflow event payload the pipeline consumes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventPayload {
    #[serde(default)]
    pub pull_request: Option<PullRequestPayload>,
    #[serde(default)]
    pub issue: Option<IssuePayload>,
    /// Push events: the commit the ref pointed at before the push.
    #[serde(default)]
    pub before: Option<String>,
    /// Push events: the commit the ref points at after the push.
    #[serde(default)]
    pub after: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestPayload {
    pub number: u64,
    pub base: CommitRef,
    pub head: CommitRef,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitRef {
    pub sha: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IssuePayload {
    pub number: u64,
}

/// The base and head commits being compared in one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRange {
    pub base: String,
    pub head: String,
}

impl TriggerEvent {
    /// The pull request number the event refers to, if any.
    pub fn pull_number(&self) -> Option<u64> {
        self.payload
            .pull_request
            .as_ref()
            .map(|pr| pr.number)
            .or_else(|| self.payload.issue.as_ref().map(|issue| issue.number))
    }
}

/// Extract the commit range to compare from a trigger event.
pub fn resolve_refs(event: &TriggerEvent) -> Result<CommitRange, RefError> {
    let (base, head) = match event.event_name.as_str() {
        "pull_request" => {
            let pr = event.payload.pull_request.as_ref();
            (
                pr.map(|pr| pr.base.sha.clone()),
                pr.map(|pr| pr.head.sha.clone()),
            )
        }
        "push" => (event.payload.before.clone(), event.payload.after.clone()),
        _ => {
            return Err(RefError::UnsupportedEvent {
                event_name: event.event_name.clone(),
            })
        }
    };

    match (base, head) {
        (Some(base), Some(head)) if !base.is_empty() && !head.is_empty() => {
            Ok(CommitRange { base, head })
        }
        _ => Err(RefError::MissingCommits {
            event_name: event.event_name.clone(),
        }),
    }
}
