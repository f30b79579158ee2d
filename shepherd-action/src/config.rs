use anyhow::{anyhow, Context, Result};
use std::env;
use std::path::PathBuf;

/// Runtime configuration for one action invocation, read from the workflow
/// environment. Action inputs arrive as `INPUT_*` variables, uppercased by
/// the runner.
#[derive(Debug, Clone)]
pub struct ActionConfig {
    pub repo_token: String,
    pub config_file: String,
    pub assign_owners: bool,
    pub request_owner_reviews: bool,
    pub repo_owner: String,
    pub repo_name: String,
    pub event_name: String,
    pub event_path: PathBuf,
}

impl ActionConfig {
    pub fn from_env() -> Result<Self> {
        let repo_token = env::var("INPUT_REPO-TOKEN")
            .context("INPUT_REPO-TOKEN environment variable is required")?;

        let config_file = env::var("INPUT_CONFIG-FILE")
            .context("INPUT_CONFIG-FILE environment variable is required")?;

        let assign_owners = parse_bool_input(
            &env::var("INPUT_ASSIGN-OWNERS")
                .context("INPUT_ASSIGN-OWNERS environment variable is required")?,
        )
        .context("INPUT_ASSIGN-OWNERS must be true or false")?;

        let request_owner_reviews = parse_bool_input(
            &env::var("INPUT_REQUEST-OWNER-REVIEWS")
                .context("INPUT_REQUEST-OWNER-REVIEWS environment variable is required")?,
        )
        .context("INPUT_REQUEST-OWNER-REVIEWS must be true or false")?;

        let repository = env::var("GITHUB_REPOSITORY")
            .context("GITHUB_REPOSITORY environment variable is required")?;
        let (repo_owner, repo_name) = parse_repository(&repository)?;

        let event_name = env::var("GITHUB_EVENT_NAME")
            .context("GITHUB_EVENT_NAME environment variable is required")?;

        let event_path = env::var("GITHUB_EVENT_PATH")
            .map(PathBuf::from)
            .context("GITHUB_EVENT_PATH environment variable is required")?;

        Ok(ActionConfig {
            repo_token,
            config_file,
            assign_owners,
            request_owner_reviews,
            repo_owner,
            repo_name,
            event_name,
            event_path,
        })
    }
}

/// Parse a boolean action input the way the workflow runner supplies it.
fn parse_bool_input(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(anyhow!("expected true or false, got {:?}", other)),
    }
}

/// Split the `owner/repo` pair supplied in GITHUB_REPOSITORY.
fn parse_repository(repository: &str) -> Result<(String, String)> {
    match repository.split_once('/') {
        Some((owner, name)) if !owner.is_empty() && !name.is_empty() => {
            Ok((owner.to_string(), name.to_string()))
        }
        _ => Err(anyhow!(
            "GITHUB_REPOSITORY must look like owner/repo, got {:?}",
            repository
        )),
    }
}
