use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use tracing::debug;

use crate::error::MonitorError;
use crate::rate_limit::RateLimitTracker;

/// Public GitHub REST API base URL
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// A repository as returned by the org and user repository listings
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Repository {
    pub name: String,
    #[serde(rename = "html_url")]
    pub url: String,
    pub updated_at: DateTime<Utc>,
}

/// An organization member
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Member {
    pub login: String,
}

/// The three API endpoints the monitor reads from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// Public repositories of an organization
    OrgRepos(String),
    /// Members of an organization
    OrgMembers(String),
    /// Repositories owned by a user
    UserRepos(String),
}

impl Endpoint {
    pub fn path(&self) -> String {
        match self {
            Self::OrgRepos(org) => format!("/orgs/{}/repos", org),
            Self::OrgMembers(org) => format!("/orgs/{}/members", org),
            Self::UserRepos(login) => format!("/users/{}/repos", login),
        }
    }

    pub fn query(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::OrgRepos(_) => &[("type", "public")],
            Self::OrgMembers(_) => &[],
            Self::UserRepos(_) => &[("type", "owner")],
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GET {}", self.path())
    }
}

/// Source of repositories and members
///
/// Implemented by [`GitHubClient`]; the orchestrator only depends on this
/// trait so it can be driven by any provider speaking the same shapes.
#[async_trait]
pub trait RepositorySource: Send + Sync {
    /// Public repositories of `org`
    async fn fetch_org_repos(
        &self,
        org: &str,
        rate_limit: &RateLimitTracker,
    ) -> Result<Vec<Repository>, MonitorError>;

    /// Members of `org`
    async fn fetch_org_members(
        &self,
        org: &str,
        rate_limit: &RateLimitTracker,
    ) -> Result<Vec<Member>, MonitorError>;

    /// Repositories owned by `login`
    async fn fetch_user_repos(
        &self,
        login: &str,
        rate_limit: &RateLimitTracker,
    ) -> Result<Vec<Repository>, MonitorError>;
}

/// Token-authenticated GitHub REST client
///
/// Fetches a single page per endpoint; no pagination and no retries.
#[derive(Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    api_url: String,
    token: String,
}

impl GitHubClient {
    /// Create a client for `api_url` authenticating with `token`
    ///
    /// The token is attached as-is; validating it is the caller's job.
    pub fn new(api_url: &str, token: &str, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );

        let http = reqwest::Client::builder()
            .user_agent(concat!("ghmon/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .context("Failed to create GitHub HTTP client")?;

        Ok(Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// GET an endpoint and decode its JSON body
    ///
    /// Rate-limit headers of a successful response are recorded before the
    /// body is decoded; error responses leave the snapshot untouched.
    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &Endpoint,
        rate_limit: &RateLimitTracker,
    ) -> Result<T, MonitorError> {
        let url = format!("{}{}", self.api_url, endpoint.path());
        debug!("{} ({})", endpoint, url);

        let response = self
            .http
            .get(&url)
            .query(endpoint.query())
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|source| MonitorError::Transport {
                context: endpoint.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(MonitorError::Api {
                context: endpoint.to_string(),
                status: status.as_u16(),
            });
        }

        rate_limit.record(response.headers());

        let body = response
            .bytes()
            .await
            .map_err(|source| MonitorError::Transport {
                context: endpoint.to_string(),
                source,
            })?;

        serde_json::from_slice(&body).map_err(|source| MonitorError::Decode {
            context: endpoint.to_string(),
            source,
        })
    }
}

#[async_trait]
impl RepositorySource for GitHubClient {
    async fn fetch_org_repos(
        &self,
        org: &str,
        rate_limit: &RateLimitTracker,
    ) -> Result<Vec<Repository>, MonitorError> {
        let repos: Vec<Repository> = self
            .get_json(&Endpoint::OrgRepos(org.to_string()), rate_limit)
            .await?;
        debug!(org, count = repos.len(), "Fetched organization repositories");
        Ok(repos)
    }

    async fn fetch_org_members(
        &self,
        org: &str,
        rate_limit: &RateLimitTracker,
    ) -> Result<Vec<Member>, MonitorError> {
        let members: Vec<Member> = self
            .get_json(&Endpoint::OrgMembers(org.to_string()), rate_limit)
            .await?;
        debug!(org, count = members.len(), "Fetched organization members");
        Ok(members)
    }

    async fn fetch_user_repos(
        &self,
        login: &str,
        rate_limit: &RateLimitTracker,
    ) -> Result<Vec<Repository>, MonitorError> {
        let repos: Vec<Repository> = self
            .get_json(&Endpoint::UserRepos(login.to_string()), rate_limit)
            .await?;
        debug!(member = login, count = repos.len(), "Fetched member repositories");
        Ok(repos)
    }
}
