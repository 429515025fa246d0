//! GitHub host service implementation

use crate::error::{Error, Result};
use crate::platform::HostService;
use crate::types::{
    CommitInfo, Mergeability, MergeableState, MergeMethod, MergeRequest, MergeResult,
    PermissionLevel, PlatformConfig, PrState, PullRequestSnapshot, Reaction, Review,
};
use async_trait::async_trait;
use octocrab::Octocrab;
use reqwest::{Client, Method, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

/// Default public GitHub REST endpoint
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Page size for paginated REST listings
const PER_PAGE: usize = 100;

// GraphQL response types for the review thread query

#[derive(Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReviewThreadsData {
    repository: Option<ThreadsRepository>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThreadsRepository {
    pull_request: Option<ThreadsPullRequest>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThreadsPullRequest {
    review_threads: ReviewThreadConnection,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReviewThreadConnection {
    nodes: Vec<ReviewThreadNode>,
    page_info: PageInfo,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReviewThreadNode {
    is_resolved: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    has_next_page: bool,
    end_cursor: Option<String>,
}

// REST response types octocrab does not model the way we need

#[derive(Deserialize)]
struct RawPull {
    number: u64,
    state: String,
    #[serde(default)]
    locked: bool,
    #[serde(default)]
    draft: bool,
    #[serde(default)]
    merged: bool,
    mergeable: Option<bool>,
    mergeable_state: Option<String>,
    #[serde(default)]
    title: String,
    user: Option<RawUser>,
    head: RawRef,
    base: RawRef,
}

#[derive(Deserialize)]
struct RawUser {
    login: String,
}

#[derive(Deserialize)]
struct RawRef {
    sha: String,
    #[serde(rename = "ref")]
    ref_field: String,
    repo: Option<RawRepo>,
}

#[derive(Deserialize)]
struct RawRepo {
    full_name: String,
}

impl From<RawPull> for PullRequestSnapshot {
    fn from(pr: RawPull) -> Self {
        let is_fork = match (&pr.head.repo, &pr.base.repo) {
            (Some(head), Some(base)) => head.full_name != base.full_name,
            // Head repository deleted: can only have been a fork
            (None, _) => true,
            (Some(_), None) => false,
        };
        Self {
            number: pr.number,
            state: if pr.state == "open" {
                PrState::Open
            } else {
                PrState::Closed
            },
            locked: pr.locked,
            draft: pr.draft,
            merged: pr.merged,
            mergeable: Mergeability::from(pr.mergeable),
            mergeable_state: pr
                .mergeable_state
                .map_or(MergeableState::Unknown, MergeableState::from),
            head_sha: pr.head.sha,
            head_ref: pr.head.ref_field,
            base_ref: pr.base.ref_field,
            author: pr.user.map(|u| u.login).unwrap_or_default(),
            is_fork,
            title: pr.title,
        }
    }
}

#[derive(Deserialize)]
struct RawCommit {
    sha: String,
    commit: RawCommitDetail,
}

#[derive(Deserialize)]
struct RawCommitDetail {
    message: String,
    author: Option<RawGitAuthor>,
}

#[derive(Deserialize)]
struct RawGitAuthor {
    name: Option<String>,
    email: Option<String>,
}

impl From<RawCommit> for CommitInfo {
    fn from(c: RawCommit) -> Self {
        let (author_name, author_email) = c
            .commit
            .author
            .map_or((None, None), |a| (a.name, a.email));
        Self {
            sha: c.sha,
            message: c.commit.message,
            author_name: author_name.filter(|n| !n.trim().is_empty()),
            author_email: author_email.filter(|e| !e.trim().is_empty()),
        }
    }
}

#[derive(Deserialize)]
struct RawPermission {
    permission: Option<String>,
    role_name: Option<String>,
}

#[derive(Deserialize)]
struct RawMergeResponse {
    sha: Option<String>,
    #[serde(default)]
    merged: bool,
    message: Option<String>,
}

#[derive(Deserialize)]
struct RawErrorBody {
    message: Option<String>,
}

/// GitHub service using octocrab and raw REST calls
pub struct GitHubService {
    client: Octocrab,
    config: PlatformConfig,
    /// Token for raw HTTP requests
    token: String,
    /// HTTP client for raw requests
    http_client: Client,
}

impl GitHubService {
    /// Create a new GitHub service
    pub fn new(token: &str, config: PlatformConfig) -> Result<Self> {
        let mut builder = Octocrab::builder().personal_token(token.to_string());

        if config.api_url != DEFAULT_API_URL {
            builder = builder
                .base_uri(config.api_url.as_str())
                .map_err(|e| Error::GitHubApi(e.to_string()))?;
        }

        let client = builder
            .build()
            .map_err(|e| Error::GitHubApi(e.to_string()))?;

        let http_client = Client::builder()
            .user_agent("merge-gate")
            .build()
            .map_err(|e| Error::GitHubApi(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            config,
            token: token.to_string(),
            http_client,
        })
    }

    fn repo_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}{}",
            self.config.api_url, self.config.owner, self.config.repo, path
        )
    }

    fn graphql_url(&self) -> String {
        graphql_url(&self.config.api_url)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.http_client
            .request(method, url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self.request(Method::GET, url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = error_message(response).await;
            return Err(Error::GitHubApi(format!("GET {url} returned {status}: {message}")));
        }

        Ok(response.json().await?)
    }

    /// Fetch every page of a REST listing
    async fn get_all_pages<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut page = 1;
        loop {
            let url = format!("{}?per_page={PER_PAGE}&page={page}", self.repo_url(path));
            let batch: Vec<T> = self.get_json(&url).await?;
            let last = batch.len() < PER_PAGE;
            items.extend(batch);
            if last {
                break;
            }
            page += 1;
        }
        Ok(items)
    }
}

/// GraphQL endpoint for a REST base URL
///
/// GitHub Enterprise Server serves REST under `/api/v3` and GraphQL under
/// `/api/graphql`; github.com serves GraphQL at `/graphql` next to REST.
fn graphql_url(api_url: &str) -> String {
    match api_url.strip_suffix("/api/v3") {
        Some(host) => format!("{host}/api/graphql"),
        None => format!("{api_url}/graphql"),
    }
}

/// Best-effort extraction of GitHub's `message` field from an error response
async fn error_message(response: reqwest::Response) -> String {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    serde_json::from_str::<RawErrorBody>(&text)
        .ok()
        .and_then(|b| b.message)
        .unwrap_or_else(|| {
            if text.is_empty() {
                status.to_string()
            } else {
                text
            }
        })
}

#[async_trait]
impl HostService for GitHubService {
    async fn get_pull_request(&self, pr_number: u64) -> Result<PullRequestSnapshot> {
        debug!(pr_number, "fetching PR snapshot");
        let raw: RawPull = self
            .get_json(&self.repo_url(&format!("/pulls/{pr_number}")))
            .await?;
        let snapshot = PullRequestSnapshot::from(raw);
        debug!(
            pr_number,
            sha = %snapshot.head_sha,
            mergeable = ?snapshot.mergeable,
            mergeable_state = %snapshot.mergeable_state,
            "fetched PR snapshot"
        );
        Ok(snapshot)
    }

    async fn list_approved_reviews(&self, pr_number: u64) -> Result<Vec<Review>> {
        debug!(pr_number, "listing reviews");
        let first = self
            .client
            .pulls(&self.config.owner, &self.config.repo)
            .list_reviews(pr_number)
            .per_page(100)
            .send()
            .await?;
        let reviews = self.client.all_pages(first).await?;

        let approved: Vec<Review> = reviews
            .into_iter()
            .filter(|r| {
                r.state
                    .as_ref()
                    .is_some_and(|s| *s == octocrab::models::pulls::ReviewState::Approved)
            })
            .map(|r| Review {
                id: r.id.0,
                reviewer: r.user.map(|u| u.login),
                commit_id: r.commit_id,
            })
            .collect();
        debug!(pr_number, count = approved.len(), "listed approved reviews");
        Ok(approved)
    }

    async fn dismiss_review(&self, pr_number: u64, review_id: u64, message: &str) -> bool {
        debug!(pr_number, review_id, "dismissing review");
        let url = self.repo_url(&format!("/pulls/{pr_number}/reviews/{review_id}/dismissals"));
        let result = self
            .request(Method::PUT, &url)
            .json(&serde_json::json!({ "message": message, "event": "DISMISS" }))
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                debug!(pr_number, review_id, "dismissed review");
                true
            }
            Ok(response) => {
                let status = response.status();
                let message = error_message(response).await;
                warn!(pr_number, review_id, %status, %message, "review dismissal rejected");
                false
            }
            Err(e) => {
                warn!(pr_number, review_id, error = %e, "review dismissal failed");
                false
            }
        }
    }

    async fn list_pr_commits(&self, pr_number: u64) -> Result<Vec<CommitInfo>> {
        debug!(pr_number, "listing PR commits");
        let raw: Vec<RawCommit> = self
            .get_all_pages(&format!("/pulls/{pr_number}/commits"))
            .await?;
        let commits: Vec<CommitInfo> = raw.into_iter().map(CommitInfo::from).collect();
        debug!(pr_number, count = commits.len(), "listed PR commits");
        Ok(commits)
    }

    async fn count_unresolved_threads(&self, pr_number: u64) -> Result<usize> {
        debug!(pr_number, "counting unresolved review threads");
        let url = self.graphql_url();
        let mut cursor: Option<String> = None;
        let mut unresolved = 0;

        loop {
            let response = self
                .request(Method::POST, &url)
                .json(&serde_json::json!({
                    "query": r"
                        query ReviewThreads($owner: String!, $repo: String!, $number: Int!, $cursor: String) {
                            repository(owner: $owner, name: $repo) {
                                pullRequest(number: $number) {
                                    reviewThreads(first: 100, after: $cursor) {
                                        nodes { isResolved }
                                        pageInfo { hasNextPage endCursor }
                                    }
                                }
                            }
                        }
                    ",
                    "variables": {
                        "owner": self.config.owner,
                        "repo": self.config.repo,
                        "number": pr_number,
                        "cursor": cursor,
                    }
                }))
                .send()
                .await
                .map_err(|e| Error::GitHubApi(format!("GraphQL query failed: {e}")))?;

            if !response.status().is_success() {
                let status = response.status();
                let message = error_message(response).await;
                return Err(Error::GitHubApi(format!(
                    "GraphQL query returned {status}: {message}"
                )));
            }
            let response: GraphQlResponse<ReviewThreadsData> = response.json().await?;

            if let Some(errors) = response.errors
                && !errors.is_empty()
            {
                let messages: Vec<_> = errors.into_iter().map(|e| e.message).collect();
                return Err(Error::GitHubApi(format!(
                    "GraphQL error: {}",
                    messages.join(", ")
                )));
            }

            let threads = response
                .data
                .and_then(|d| d.repository)
                .and_then(|r| r.pull_request)
                .map(|pr| pr.review_threads)
                .ok_or_else(|| Error::GitHubApi("No data in GraphQL response".to_string()))?;

            unresolved += threads.nodes.iter().filter(|t| !t.is_resolved).count();

            if !threads.page_info.has_next_page {
                break;
            }
            cursor = threads.page_info.end_cursor;
            if cursor.is_none() {
                break;
            }
        }

        debug!(pr_number, unresolved, "counted unresolved review threads");
        Ok(unresolved)
    }

    async fn get_permission(&self, login: &str) -> PermissionLevel {
        debug!(login, "looking up permission");
        let url = self.repo_url(&format!(
            "/collaborators/{}/permission",
            urlencoding::encode(login)
        ));

        match self.get_json::<RawPermission>(&url).await {
            Ok(raw) => {
                // role_name distinguishes maintain/triage, permission folds them
                let level = raw
                    .role_name
                    .as_deref()
                    .map(PermissionLevel::parse)
                    .filter(|l| *l != PermissionLevel::None)
                    .or_else(|| raw.permission.as_deref().map(PermissionLevel::parse))
                    .unwrap_or(PermissionLevel::None);
                debug!(login, %level, "resolved permission");
                level
            }
            Err(e) => {
                warn!(login, error = %e, "permission lookup failed, treating as none");
                PermissionLevel::None
            }
        }
    }

    async fn create_comment(&self, pr_number: u64, body: &str) -> Result<()> {
        debug!(pr_number, "creating PR comment");
        self.client
            .issues(&self.config.owner, &self.config.repo)
            .create_comment(pr_number, body)
            .await?;
        debug!(pr_number, "created PR comment");
        Ok(())
    }

    async fn add_reaction(&self, comment_id: u64, reaction: Reaction) -> Result<()> {
        debug!(comment_id, reaction = reaction.as_str(), "adding reaction");
        let url = self.repo_url(&format!("/issues/comments/{comment_id}/reactions"));
        let response = self
            .request(Method::POST, &url)
            .json(&serde_json::json!({ "content": reaction.as_str() }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = error_message(response).await;
            return Err(Error::GitHubApi(format!(
                "adding reaction returned {status}: {message}"
            )));
        }
        Ok(())
    }

    async fn merge_pull_request(&self, request: &MergeRequest) -> Result<MergeResult> {
        let pr_number = request.pr_number;
        debug!(pr_number, method = %request.method, sha = %request.expected_head_sha, "merging PR");

        let merge_method = match request.method {
            MergeMethod::Squash => "squash",
            MergeMethod::Merge => "merge",
        };
        let url = self.repo_url(&format!("/pulls/{pr_number}/merge"));
        let response = self
            .request(Method::PUT, &url)
            .json(&serde_json::json!({
                "merge_method": merge_method,
                "sha": request.expected_head_sha,
                "commit_title": request.commit_title,
                "commit_message": request.commit_message,
            }))
            .send()
            .await
            .map_err(|e| Error::GitHubApi(format!("Merge failed: {e}")))?;

        let merge_result = if response.status().is_success() {
            let body: RawMergeResponse = response.json().await?;
            MergeResult {
                merged: body.merged,
                sha: body.sha,
                message: body.message,
            }
        } else {
            // 405 (not mergeable) and 409 (head moved) carry the reason in `message`
            MergeResult {
                merged: false,
                sha: None,
                message: Some(error_message(response).await),
            }
        };

        debug!(
            pr_number,
            merged = merge_result.merged,
            sha = ?merge_result.sha,
            "merge complete"
        );
        Ok(merge_result)
    }
}
