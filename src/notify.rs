//! Report rendering and delivery
//!
//! The report is either written to the console or posted to a chat webhook
//! as `{"text": "..."}`. Nothing is delivered for an empty report.

use serde::Serialize;
use std::io::Write;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::MonitorError;
use crate::github::Repository;

/// First line of every report
pub const REPORT_HEADER: &str = "Repositories updated in the last hour:";

/// Webhook payload
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub text: String,
}

impl ChatMessage {
    pub fn for_repositories(repos: &[Repository]) -> Self {
        Self {
            text: format!("{}\n{}", REPORT_HEADER, render_report(repos)),
        }
    }
}

/// How a report was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Nothing to report
    Skipped,
    /// Written to the console
    Console,
    /// Posted to the webhook
    Webhook,
}

/// One `Name: <name>, URL: <url>` line, without trailing newline
pub fn render_line(repo: &Repository) -> String {
    format!("Name: {}, URL: {}", repo.name, repo.url)
}

/// All report lines, each terminated by a newline
pub fn render_report(repos: &[Repository]) -> String {
    repos
        .iter()
        .map(|repo| format!("{}\n", render_line(repo)))
        .collect()
}

/// Delivers reports to the console or a chat webhook
pub struct Notifier {
    http: reqwest::Client,
    webhook_url: Option<String>,
}

impl Notifier {
    pub fn new(webhook_url: Option<String>, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("ghmon/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            webhook_url: webhook_url.filter(|url| !url.is_empty()),
        })
    }

    pub fn webhook_url(&self) -> Option<&str> {
        self.webhook_url.as_deref()
    }

    /// Deliver the report for `repos`
    ///
    /// Console writes are best-effort. A webhook answering outside 2xx
    /// yields [`MonitorError::Notify`]; the POST is attempted exactly once.
    pub async fn notify(
        &self,
        repos: &[Repository],
        out: &mut dyn Write,
    ) -> Result<Delivery, MonitorError> {
        if repos.is_empty() {
            return Ok(Delivery::Skipped);
        }

        let Some(webhook_url) = self.webhook_url.as_deref() else {
            let _ = writeln!(out, "{}", REPORT_HEADER);
            let _ = write!(out, "{}", render_report(repos));
            return Ok(Delivery::Console);
        };

        let message = ChatMessage::for_repositories(repos);
        debug!(repositories = repos.len(), "Posting report to chat webhook");

        let response = self
            .http
            .post(webhook_url)
            .json(&message)
            .send()
            .await
            .map_err(|source| MonitorError::Transport {
                context: "POST chat webhook".to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(MonitorError::Notify {
                status: status.as_u16(),
            });
        }

        info!(repositories = repos.len(), "Sent chat notification");
        Ok(Delivery::Webhook)
    }
}
