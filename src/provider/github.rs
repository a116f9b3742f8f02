//! GitHub metadata provider using octocrab

use crate::error::{Error, Result};
use crate::provider::MetadataProvider;
use crate::types::{PrMetadata, RepoInfo};
use async_trait::async_trait;
use octocrab::Octocrab;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

/// Commit entry from the PR commits endpoint
#[derive(Deserialize)]
struct PrCommit {
    sha: String,
}

/// Review entry from the PR reviews endpoint
#[derive(Deserialize)]
struct PrReview {
    state: String,
    user: ReviewUser,
}

#[derive(Deserialize)]
struct ReviewUser {
    login: String,
}

/// Public profile, for `Reviewed-By` formatting
#[derive(Deserialize)]
struct UserProfile {
    name: Option<String>,
    email: Option<String>,
}

/// GitHub metadata provider
pub struct GitHubProvider {
    client: Octocrab,
    info: RepoInfo,
    /// Token for raw HTTP requests (endpoints octocrab doesn't cover)
    token: Option<String>,
    /// HTTP client for raw requests
    http_client: Client,
    /// API host for raw requests
    api_host: String,
}

impl GitHubProvider {
    /// Create a provider for the repository in `info`
    ///
    /// The token comes from `GITHUB_TOKEN` when present; anonymous access
    /// works for public repositories at reduced rate limits.
    pub fn new(info: RepoInfo, token: Option<String>) -> Result<Self> {
        let mut builder = Octocrab::builder();
        if let Some(ref t) = token {
            builder = builder.personal_token(t.clone());
        }

        let api_host = if let Some(ref h) = info.host {
            let base_url = format!("https://{h}/api/v3");
            builder = builder
                .base_uri(&base_url)
                .map_err(|e| Error::Provider(e.to_string()))?;
            format!("{h}/api/v3")
        } else {
            "api.github.com".to_string()
        };

        let client = builder.build().map_err(|e| Error::Provider(e.to_string()))?;

        let http_client = Client::builder()
            .user_agent("landr")
            .build()
            .map_err(|e| Error::Provider(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            info,
            token,
            http_client,
            api_host,
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!(
            "https://{}/repos/{}/{}/{path}",
            self.api_host, self.info.owner, self.info.repo
        );
        let mut request = self
            .http_client
            .get(&url)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28");
        if let Some(ref token) = self.token {
            request = request.header("Authorization", format!("Bearer {token}"));
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Provider(format!("Failed to fetch {url}: {e}")))?;
        if !response.status().is_success() {
            return Err(Error::Provider(format!(
                "{url} returned {}",
                response.status()
            )));
        }
        response
            .json()
            .await
            .map_err(|e| Error::Provider(format!("Failed to parse {url}: {e}")))
    }

    /// Format a `Reviewed-By` line for an approving reviewer
    async fn reviewed_by_line(&self, login: &str) -> Result<String> {
        let url = format!("https://{}/users/{login}", self.api_host);
        let mut request = self
            .http_client
            .get(&url)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28");
        if let Some(ref token) = self.token {
            request = request.header("Authorization", format!("Bearer {token}"));
        }

        let profile: UserProfile = match request.send().await {
            Ok(resp) if resp.status().is_success() => resp.json().await.unwrap_or(UserProfile {
                name: None,
                email: None,
            }),
            _ => UserProfile {
                name: None,
                email: None,
            },
        };

        let name = profile.name.unwrap_or_else(|| login.to_string());
        let email = profile
            .email
            .unwrap_or_else(|| format!("{login}@users.noreply.github.com"));
        Ok(format!("Reviewed-By: {name} <{email}>"))
    }
}

#[async_trait]
impl MetadataProvider for GitHubProvider {
    async fn pr_metadata(&self, pr_id: u64, backport: bool) -> Result<PrMetadata> {
        debug!(pr_id, backport, "fetching PR metadata");

        let pr = self
            .client
            .pulls(&self.info.owner, &self.info.repo)
            .get(pr_id)
            .await
            .map_err(|e| Error::Provider(format!("Failed to fetch PR #{pr_id}: {e}")))?;
        let title = pr.title.as_deref().unwrap_or_default().to_string();
        let html_url = pr
            .html_url
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| {
                format!(
                    "https://{}/{}/{}/pull/{pr_id}",
                    self.info.host.as_deref().unwrap_or("github.com"),
                    self.info.owner,
                    self.info.repo
                )
            });

        let commits: Vec<PrCommit> = self
            .get_json(&format!("pulls/{pr_id}/commits?per_page=100"))
            .await?;
        let expected_shas: Vec<String> = commits.into_iter().map(|c| c.sha).collect();
        if expected_shas.is_empty() {
            return Err(Error::Provider(format!("PR #{pr_id} has no commits")));
        }

        let reviews: Vec<PrReview> = self.get_json(&format!("pulls/{pr_id}/reviews")).await?;
        // Last review per reviewer wins; only approvals become trailers
        let mut approvers: Vec<String> = Vec::new();
        for review in &reviews {
            if review.state == "APPROVED" {
                if !approvers.contains(&review.user.login) {
                    approvers.push(review.user.login.clone());
                }
            } else if review.state == "CHANGES_REQUESTED" {
                approvers.retain(|l| l != &review.user.login);
            }
        }

        let mut trailer_lines = Vec::with_capacity(approvers.len() + 1);
        if backport {
            trailer_lines.push(format!("Backport-PR-URL: {html_url}"));
        } else {
            trailer_lines.push(format!("PR-URL: {html_url}"));
        }
        for login in &approvers {
            trailer_lines.push(self.reviewed_by_line(login).await?);
        }

        debug!(
            commits = expected_shas.len(),
            trailers = trailer_lines.len(),
            "PR metadata assembled"
        );
        Ok(PrMetadata {
            number: pr_id,
            title,
            html_url,
            expected_shas,
            trailer_lines,
        })
    }
}
