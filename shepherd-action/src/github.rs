use anyhow::{anyhow, Context, Result};
use base64::{engine::general_purpose, Engine as _};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info};

use shepherd_core::{ChangedFile, FileStatus, SubmittedReview};

const API_ROOT: &str = "https://api.github.com";
const USER_AGENT: &str = "shepherd-action";

/// The message GitHub returns (as part of a 422) when a requested reviewer
/// is not a collaborator on the repository.
const COLLABORATOR_SIGNATURE: &str = "Reviews may only be requested from collaborators";

/// Review-request dispatch failure.
///
/// `CollaboratorIneligible` is the one recoverable kind: GitHub refuses the
/// whole request when any named reviewer is not a repository collaborator,
/// and the run should continue past that. Everything else is fatal.
#[derive(Debug, Error)]
pub enum RequestReviewersError {
    #[error("GitHub refused the review request: {0}")]
    CollaboratorIneligible(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Minimal GitHub REST client scoped to a single repository, authenticated
/// with the workflow-provided repository token.
#[derive(Clone)]
pub struct GitHubClient {
    client: Client,
    token: String,
    repo_owner: String,
    repo_name: String,
}

/// Reviewers with a currently pending review request.
#[derive(Debug, Clone, Default)]
pub struct RequestedReviewers {
    pub users: Vec<String>,
    pub teams: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct FileContentsResponse {
    content: String,
}

#[derive(Debug, Deserialize)]
struct CompareResponse {
    status: String,
    #[serde(default)]
    files: Vec<FileChange>,
}

#[derive(Debug, Deserialize)]
struct FileChange {
    filename: String,
    status: FileStatus,
}

#[derive(Debug, Deserialize)]
struct User {
    login: String,
}

#[derive(Debug, Deserialize)]
struct Team {
    slug: String,
}

#[derive(Debug, Deserialize)]
struct PullRequestResponse {
    user: Option<User>,
}

#[derive(Debug, Deserialize)]
struct RequestedReviewersResponse {
    users: Vec<User>,
    teams: Vec<Team>,
}

#[derive(Debug, Deserialize)]
struct ReviewResponse {
    user: Option<User>,
    state: String,
}

#[derive(Debug, Serialize)]
struct AddAssigneesRequest<'a> {
    assignees: &'a [String],
}

#[derive(Debug, Serialize)]
struct RequestReviewersRequest<'a> {
    reviewers: &'a [String],
    team_reviewers: &'a [String],
}

fn is_collaborator_ineligible(status: StatusCode, body: &str) -> bool {
    status == StatusCode::UNPROCESSABLE_ENTITY && body.contains(COLLABORATOR_SIGNATURE)
}

impl GitHubClient {
    pub fn new(token: String, repo_owner: String, repo_name: String) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to construct HTTP client")?;

        Ok(Self {
            client,
            token,
            repo_owner,
            repo_name,
        })
    }

    fn get(&self, url: &str) -> RequestBuilder {
        self.client
            .get(url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github.v3+json")
    }

    fn post(&self, url: &str) -> RequestBuilder {
        self.client
            .post(url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github.v3+json")
    }

    /// Fetch a file from the repository at the given ref, decoding the
    /// base64 contents payload.
    pub async fn get_file_contents(&self, git_ref: &str, file_path: &str) -> Result<String> {
        let url = format!(
            "{}/repos/{}/{}/contents/{}?ref={}",
            API_ROOT, self.repo_owner, self.repo_name, file_path, git_ref
        );

        info!("Fetching file contents: {} at {}", file_path, git_ref);

        let response = self
            .get(&url)
            .send()
            .await
            .context("Failed to send file contents request")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .context("Failed to read error response body")?;
            error!(
                "GitHub API error fetching file: {} - {}",
                status, error_text
            );
            return Err(anyhow!(
                "GitHub API error fetching file: {} - {}",
                status,
                error_text
            ));
        }

        let file_response: FileContentsResponse = response
            .json()
            .await
            .context("Failed to parse file contents response")?;

        let decoded = general_purpose::STANDARD
            .decode(file_response.content.replace('\n', ""))
            .context("Failed to decode base64 file content")?;
        let content = String::from_utf8(decoded).context("File content is not valid UTF-8")?;
        info!("Successfully fetched file contents ({} bytes)", content.len());

        Ok(content)
    }

    /// Compare base and head, returning the changed files in API order.
    /// The head must be strictly ahead of the base or the comparison is
    /// unusable.
    pub async fn compare_commits(&self, base: &str, head: &str) -> Result<Vec<ChangedFile>> {
        let url = format!(
            "{}/repos/{}/{}/compare/{}...{}",
            API_ROOT, self.repo_owner, self.repo_name, base, head
        );

        info!("Fetching changed files from {}...{}", base, head);

        let response = self
            .get(&url)
            .send()
            .await
            .context("Failed to send compare request")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .context("Failed to read error response body")?;
            error!(
                "GitHub API error fetching compare: {} - {}",
                status, error_text
            );
            return Err(anyhow!(
                "GitHub API error fetching compare: {} - {}",
                status,
                error_text
            ));
        }

        let compare: CompareResponse = response
            .json()
            .await
            .context("Failed to parse compare response")?;

        if compare.status != "ahead" {
            return Err(anyhow!(
                "Head commit {} is not ahead of base commit {} (comparison status: {})",
                head,
                base,
                compare.status
            ));
        }

        let changed_files: Vec<ChangedFile> = compare
            .files
            .into_iter()
            .map(|file| ChangedFile {
                path: file.filename,
                status: file.status,
            })
            .collect();

        info!("Found {} changed files", changed_files.len());
        Ok(changed_files)
    }

    /// Look up the author of a pull request.
    pub async fn get_pull_author(&self, pull_number: u64) -> Result<String> {
        let url = format!(
            "{}/repos/{}/{}/pulls/{}",
            API_ROOT, self.repo_owner, self.repo_name, pull_number
        );

        info!("Fetching author of PR #{}", pull_number);

        let response = self
            .get(&url)
            .send()
            .await
            .context("Failed to send pull request request")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .context("Failed to read error response body")?;
            error!(
                "GitHub API error fetching pull request: {} - {}",
                status, error_text
            );
            return Err(anyhow!(
                "GitHub API error fetching pull request: {} - {}",
                status,
                error_text
            ));
        }

        let pull: PullRequestResponse = response
            .json()
            .await
            .context("Failed to parse pull request response")?;

        pull.user
            .map(|user| user.login)
            .ok_or_else(|| anyhow!("Pull request #{} has no resolvable author", pull_number))
    }

    /// Fetch the reviewers whose review request is still pending.
    pub async fn get_requested_reviewers(&self, pull_number: u64) -> Result<RequestedReviewers> {
        let url = format!(
            "{}/repos/{}/{}/pulls/{}/requested_reviewers",
            API_ROOT, self.repo_owner, self.repo_name, pull_number
        );

        info!("Fetching pending review requests for PR #{}", pull_number);

        let response = self
            .get(&url)
            .send()
            .await
            .context("Failed to send requested reviewers request")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .context("Failed to read error response body")?;
            error!(
                "GitHub API error fetching requested reviewers: {} - {}",
                status, error_text
            );
            return Err(anyhow!(
                "GitHub API error fetching requested reviewers: {} - {}",
                status,
                error_text
            ));
        }

        let reviewers: RequestedReviewersResponse = response
            .json()
            .await
            .context("Failed to parse requested reviewers response")?;

        Ok(RequestedReviewers {
            users: reviewers.users.into_iter().map(|user| user.login).collect(),
            teams: reviewers.teams.into_iter().map(|team| team.slug).collect(),
        })
    }

    /// Fetch every submitted review on a pull request, oldest first.
    pub async fn list_reviews(&self, pull_number: u64) -> Result<Vec<SubmittedReview>> {
        let mut all_reviews = Vec::new();
        let mut page = 1;
        let per_page = 100;

        info!("Fetching submitted reviews for PR #{}", pull_number);

        loop {
            let url = format!(
                "{}/repos/{}/{}/pulls/{}/reviews?page={}&per_page={}",
                API_ROOT, self.repo_owner, self.repo_name, pull_number, page, per_page
            );

            let response = self
                .get(&url)
                .send()
                .await
                .context("Failed to send reviews request")?;

            if !response.status().is_success() {
                let status = response.status();
                let error_text = response
                    .text()
                    .await
                    .context("Failed to read error response body")?;
                error!(
                    "GitHub API error fetching reviews: {} - {}",
                    status, error_text
                );
                return Err(anyhow!(
                    "GitHub API error fetching reviews: {} - {}",
                    status,
                    error_text
                ));
            }

            let reviews: Vec<ReviewResponse> = response
                .json()
                .await
                .context("Failed to parse reviews response")?;
            let count = reviews.len();

            all_reviews.extend(reviews.into_iter().map(|review| SubmittedReview {
                reviewer: review.user.map(|user| user.login),
                state: review.state,
            }));

            if count < per_page {
                break;
            }
            page += 1;
        }

        info!("Found {} submitted reviews", all_reviews.len());
        Ok(all_reviews)
    }

    /// Add assignees to the pull request's underlying issue.
    pub async fn add_assignees(&self, pull_number: u64, assignees: &[String]) -> Result<()> {
        let url = format!(
            "{}/repos/{}/{}/issues/{}/assignees",
            API_ROOT, self.repo_owner, self.repo_name, pull_number
        );

        info!(
            "Assigning {} owner(s) to PR #{}",
            assignees.len(),
            pull_number
        );

        let request_body = AddAssigneesRequest { assignees };

        let response = self
            .post(&url)
            .body(serde_json::to_string(&request_body)?)
            .header("Content-Type", "application/json")
            .send()
            .await
            .context("Failed to send assignees request")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .context("Failed to read error response body")?;
            error!(
                "GitHub API error adding assignees: {} - {}",
                status, error_text
            );
            return Err(anyhow!(
                "GitHub API error adding assignees: {} - {}",
                status,
                error_text
            ));
        }

        Ok(())
    }

    /// Request reviews from the given users and teams in one call.
    pub async fn request_reviewers(
        &self,
        pull_number: u64,
        users: &[String],
        teams: &[String],
    ) -> Result<(), RequestReviewersError> {
        let url = format!(
            "{}/repos/{}/{}/pulls/{}/requested_reviewers",
            API_ROOT, self.repo_owner, self.repo_name, pull_number
        );

        info!(
            "Requesting review from {} user(s) and {} team(s) on PR #{}",
            users.len(),
            teams.len(),
            pull_number
        );

        let request_body = RequestReviewersRequest {
            reviewers: users,
            team_reviewers: teams,
        };
        let body = serde_json::to_string(&request_body)
            .context("Failed to encode review request body")
            .map_err(RequestReviewersError::Other)?;

        let response = self
            .post(&url)
            .body(body)
            .header("Content-Type", "application/json")
            .send()
            .await
            .context("Failed to send review request")
            .map_err(RequestReviewersError::Other)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .context("Failed to read error response body")
                .map_err(RequestReviewersError::Other)?;

            if is_collaborator_ineligible(status, &error_text) {
                return Err(RequestReviewersError::CollaboratorIneligible(error_text));
            }

            error!(
                "GitHub API error requesting reviewers: {} - {}",
                status, error_text
            );
            return Err(RequestReviewersError::Other(anyhow!(
                "GitHub API error requesting reviewers: {} - {}",
                status,
                error_text
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collaborator_signature_requires_422_and_message() {
        let body = r#"{"message":"Reviews may only be requested from collaborators. One or more of the users or teams you specified is not a collaborator of the example/repo repository."}"#;

        assert!(is_collaborator_ineligible(
            StatusCode::UNPROCESSABLE_ENTITY,
            body
        ));
        assert!(!is_collaborator_ineligible(StatusCode::FORBIDDEN, body));
        assert!(!is_collaborator_ineligible(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"message":"Validation Failed"}"#
        ));
    }

    #[test]
    fn test_compare_response_deserializes_changed_files() {
        let json = r#"{
            "status": "ahead",
            "ahead_by": 2,
            "files": [
                {"filename": "api/server.py", "status": "modified"},
                {"filename": "docs/index.md", "status": "added"},
                {"filename": "weird.bin", "status": "somenewstatus"}
            ]
        }"#;

        let compare: CompareResponse = serde_json::from_str(json).unwrap();
        assert_eq!(compare.status, "ahead");
        assert_eq!(compare.files.len(), 3);
        assert_eq!(compare.files[0].filename, "api/server.py");
        assert_eq!(compare.files[0].status, FileStatus::Modified);
        assert_eq!(compare.files[1].status, FileStatus::Added);
        // Unrecognized statuses fall through rather than failing the run.
        assert_eq!(compare.files[2].status, FileStatus::Other);
    }

    #[test]
    fn test_compare_response_tolerates_missing_files() {
        let compare: CompareResponse = serde_json::from_str(r#"{"status": "behind"}"#).unwrap();
        assert!(compare.files.is_empty());
    }

    #[test]
    fn test_review_response_tolerates_missing_user() {
        let reviews: Vec<ReviewResponse> = serde_json::from_str(
            r#"[
                {"user": {"login": "alice"}, "state": "APPROVED"},
                {"user": null, "state": "COMMENTED"}
            ]"#,
        )
        .unwrap();

        assert_eq!(reviews[0].user.as_ref().unwrap().login, "alice");
        assert!(reviews[1].user.is_none());
    }

    #[test]
    fn test_requested_reviewers_response_shape() {
        let reviewers: RequestedReviewersResponse = serde_json::from_str(
            r#"{"users": [{"login": "alice"}], "teams": [{"slug": "team-x"}]}"#,
        )
        .unwrap();

        assert_eq!(reviewers.users[0].login, "alice");
        assert_eq!(reviewers.teams[0].slug, "team-x");
    }
}
