use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use shepherd_core::{
    reconcile, resolve_owners, resolve_refs, Config, EventPayload, ReviewSnapshot, TriageFlags,
    TriggerEvent,
};

use crate::config::ActionConfig;
use crate::github::{GitHubClient, RequestReviewersError};

/// Execute one triage pass: resolve the owners of the changed files and
/// bring the pull request's assignees and requested reviewers up to date.
///
/// The pass is a single linear sequence of external calls over immutable
/// snapshots; re-running it against unchanged platform state is a no-op.
pub async fn run(config: &ActionConfig) -> Result<()> {
    let event = load_trigger_event(config).await?;

    let range = resolve_refs(&event)?;
    debug!("Base commit: {}", range.base);
    debug!("Head commit: {}", range.head);

    let pull_number = event
        .pull_number()
        .context("The event payload does not name a pull request")?;

    let client = GitHubClient::new(
        config.repo_token.clone(),
        config.repo_owner.clone(),
        config.repo_name.clone(),
    )?;

    let raw_config = client
        .get_file_contents(&range.head, &config.config_file)
        .await
        .with_context(|| format!("Failed to fetch owners config {}", config.config_file))?;
    let owners_config = Config::parse(&raw_config)
        .with_context(|| format!("Failed to parse owners config {}", config.config_file))?;

    let changed_files = client
        .compare_commits(&range.base, &range.head)
        .await
        .context("Failed to compare base and head commits")?;

    let owners = resolve_owners(&owners_config, &changed_files);
    info!(
        "{} owner(s) found: {}",
        owners.len(),
        owners
            .iter()
            .map(|owner| owner.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    );

    let author = client
        .get_pull_author(pull_number)
        .await
        .context("Failed to look up the pull request author")?;

    let requested = client
        .get_requested_reviewers(pull_number)
        .await
        .context("Failed to fetch pending review requests")?;
    let reviews = client
        .list_reviews(pull_number)
        .await
        .context("Failed to fetch submitted reviews")?;

    let snapshot = ReviewSnapshot {
        requested_users: requested.users.into_iter().collect(),
        requested_teams: requested.teams.into_iter().collect(),
        reviews,
    };

    let flags = TriageFlags {
        assign_owners: config.assign_owners,
        request_owner_reviews: config.request_owner_reviews,
    };

    let plan = reconcile(
        &owners,
        &author,
        &owners_config.ignored_authors.0,
        &snapshot,
        flags,
    );

    if plan.short_circuited {
        info!("Author {} is ignored, skipping triage", author);
        return Ok(());
    }

    if plan.assignees.contains(&author) {
        info!("Pull request author {} is a component owner", author);
    }

    if plan.should_dispatch_assignment() {
        info!("Adding assignees");
        let assignees: Vec<String> = plan.assignees.iter().cloned().collect();
        client
            .add_assignees(pull_number, &assignees)
            .await
            .context("Failed to add assignees")?;
    }

    if plan.should_dispatch_review_request() {
        info!("Adding reviewers");
        let users: Vec<String> = plan.review_users.iter().cloned().collect();
        let teams: Vec<String> = plan.review_teams.iter().cloned().collect();

        match client.request_reviewers(pull_number, &users, &teams).await {
            Ok(()) => {}
            Err(RequestReviewersError::CollaboratorIneligible(message)) => {
                warn!("Review request refused, continuing: {}", message);
            }
            Err(RequestReviewersError::Other(e)) => {
                return Err(e.context("Failed to request reviews from owners"));
            }
        }
    }

    Ok(())
}

async fn load_trigger_event(config: &ActionConfig) -> Result<TriggerEvent> {
    let raw = tokio::fs::read_to_string(&config.event_path)
        .await
        .with_context(|| {
            format!(
                "Failed to read event payload {}",
                config.event_path.display()
            )
        })?;

    let payload: EventPayload =
        serde_json::from_str(&raw).context("Failed to parse event payload")?;

    Ok(TriggerEvent {
        event_name: config.event_name.clone(),
        payload,
    })
}
