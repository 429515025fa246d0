//! Shared command context for the `run` command
//!
//! Collects the configuration, trigger event and host service before the
//! pipeline starts, so configuration errors surface before any remote call.

use crate::cli::RunOptions;
use merge_gate::auth::get_github_auth;
use merge_gate::config::{MergeConfig, resolve_config};
use merge_gate::error::{Error, Result};
use merge_gate::platform::{GitHubService, HostService};
use merge_gate::trigger::TriggerEvent;
use merge_gate::types::PlatformConfig;
use tracing::debug;

/// Everything needed to run the pipeline once
pub struct CommandContext {
    /// Parsed trigger event
    pub event: TriggerEvent,
    /// Validated configuration
    pub config: MergeConfig,
    /// Host service (GitHub)
    pub platform: Box<dyn HostService>,
}

impl CommandContext {
    /// Build the context
    ///
    /// - Resolve and validate configuration
    /// - Validate the repository slug and API URL
    /// - Read the event payload
    /// - Resolve the token and create the host service
    pub async fn new(options: &RunOptions) -> Result<Self> {
        let config = resolve_config(options.config_path.as_deref(), &options.overrides)?;

        let repository = options
            .repository
            .as_deref()
            .ok_or_else(|| Error::config("repository", "<unset>", "owner/repo (GITHUB_REPOSITORY)"))?;
        let api_url = validate_api_url(&options.api_url)?;
        let platform_config = PlatformConfig::from_slug(repository, &api_url)
            .ok_or_else(|| Error::config("repository", repository, "owner/repo"))?;

        let event_path = options
            .event_path
            .as_deref()
            .ok_or_else(|| Error::config("event-path", "<unset>", "a path (GITHUB_EVENT_PATH)"))?;
        let event = TriggerEvent::from_path(event_path)?;

        let auth = get_github_auth().await?;
        debug!(
            source = ?auth.source,
            owner = %platform_config.owner,
            repo = %platform_config.repo,
            "creating GitHub service"
        );
        let platform = Box::new(GitHubService::new(&auth.token, platform_config)?);

        Ok(Self {
            event,
            config,
            platform,
        })
    }
}

/// Parse the API base URL; trailing slashes are dropped
fn validate_api_url(raw: &str) -> Result<String> {
    let parsed = url::Url::parse(raw)
        .map_err(|e| Error::config("api-url", raw, format!("an absolute URL ({e})")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(Error::config("api-url", raw, "an http(s) URL"));
    }
    Ok(raw.trim_end_matches('/').to_string())
}
