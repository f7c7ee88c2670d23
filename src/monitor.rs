//! Monitor - the fetch, filter and notify pipeline
//!
//! A run fetches the organization's repositories and members, fans out over
//! the members to fetch their own repositories, keeps everything updated in
//! the trailing window and hands the result to the [`Notifier`].

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use std::io::Write;
use tracing::{debug, info, warn};

use crate::error::MonitorError;
use crate::filter::UpdateFilter;
use crate::github::{Member, Repository, RepositorySource};
use crate::notify::{render_line, Delivery, Notifier};
use crate::rate_limit::{RateLimitSnapshot, RateLimitTracker};

/// Printed when the window contains no updates
pub const NOTHING_UPDATED: &str = "No repos updated in the last 1 hour";

/// A member whose repositories could not be fetched
#[derive(Debug)]
pub struct MemberFailure {
    pub login: String,
    pub error: MonitorError,
}

/// Outcome of a completed run
#[derive(Debug)]
pub struct RunSummary {
    /// Updated repositories, org repositories first, then members in API order
    pub updated: Vec<Repository>,
    pub member_failures: Vec<MemberFailure>,
    pub delivery: Delivery,
    pub rate_limit: RateLimitSnapshot,
}

/// Runs the monitoring pipeline against a [`RepositorySource`]
pub struct Monitor<S> {
    source: S,
    notifier: Notifier,
    max_parallel: usize,
    rate_limit: RateLimitTracker,
}

impl<S: RepositorySource> Monitor<S> {
    pub fn new(source: S, notifier: Notifier, max_parallel: usize) -> Self {
        Self {
            source,
            notifier,
            max_parallel: max_parallel.max(1),
            rate_limit: RateLimitTracker::new(),
        }
    }

    /// Latest rate-limit values observed by this monitor
    pub fn rate_limit(&self) -> RateLimitSnapshot {
        self.rate_limit.snapshot()
    }

    /// Run one pass using the current time as the end of the window
    pub async fn run(&self, org: &str, out: &mut dyn Write) -> Result<RunSummary> {
        self.run_at(org, Utc::now(), out).await
    }

    /// Run one pass with the window ending at `now`
    ///
    /// Org repository and member fetches are fatal; a failing member is
    /// logged and skipped. Matches are written to `out` as they are found.
    pub async fn run_at(
        &self,
        org: &str,
        now: DateTime<Utc>,
        out: &mut dyn Write,
    ) -> Result<RunSummary> {
        info!(org, "Checking for repositories updated since {}", now);

        let org_repos = self
            .source
            .fetch_org_repos(org, &self.rate_limit)
            .await
            .context("fetching org repos")?;

        let members = self
            .source
            .fetch_org_members(org, &self.rate_limit)
            .await
            .context("fetching org members")?;

        info!(
            org,
            repositories = org_repos.len(),
            members = members.len(),
            "Fetched organization"
        );

        let filter = UpdateFilter::last_hour(now);
        let mut updated = Vec::new();

        let (org_updated, _) = filter.partition(org_repos);
        for repo in org_updated {
            let _ = writeln!(out, "Org Repo - {}", render_line(&repo));
            updated.push(repo);
        }

        let mut member_failures = Vec::new();
        let results = self.member_repos(&members);
        futures::pin_mut!(results);

        while let Some((member, result)) = results.next().await {
            match result {
                Ok(repos) => {
                    let (member_updated, _) = filter.partition(repos);
                    for repo in member_updated {
                        let _ = writeln!(out, "User {} Repo - {}", member.login, render_line(&repo));
                        updated.push(repo);
                    }
                }
                Err(error) => {
                    warn!(member = %member.login, "Error fetching repos for user: {}", error);
                    member_failures.push(MemberFailure {
                        login: member.login.clone(),
                        error,
                    });
                }
            }
        }

        debug!(
            updated = updated.len(),
            failures = member_failures.len(),
            "Collected updated repositories"
        );

        let delivery = self
            .notifier
            .notify(&updated, out)
            .await
            .context("sending chat notification")?;

        if delivery == Delivery::Skipped {
            let _ = writeln!(out, "{}", NOTHING_UPDATED);
        }

        let rate_limit = self.rate_limit.snapshot();
        if !rate_limit.is_empty() {
            let _ = writeln!(out, "{}", rate_limit);
        }

        Ok(RunSummary {
            updated,
            member_failures,
            delivery,
            rate_limit,
        })
    }

    /// Print every member login of `org`
    pub async fn list_members(&self, org: &str, out: &mut dyn Write) -> Result<Vec<Member>> {
        let members = self
            .source
            .fetch_org_members(org, &self.rate_limit)
            .await
            .context("fetching org members")?;

        for member in &members {
            let _ = writeln!(out, "{}", member.login);
        }

        self.print_rate_limit(out);
        Ok(members)
    }

    /// Print every org repository and every member's own repository, unfiltered
    pub async fn list_repositories(
        &self,
        org: &str,
        out: &mut dyn Write,
    ) -> Result<Vec<Repository>> {
        let mut all = self
            .source
            .fetch_org_repos(org, &self.rate_limit)
            .await
            .context("fetching org repos")?;

        let members = self
            .source
            .fetch_org_members(org, &self.rate_limit)
            .await
            .context("fetching org members")?;

        for repo in &all {
            let _ = writeln!(out, "Org Repo - {}", render_line(repo));
        }

        let results = self.member_repos(&members);
        futures::pin_mut!(results);
        while let Some((member, result)) = results.next().await {
            match result {
                Ok(repos) => {
                    for repo in repos {
                        let _ = writeln!(out, "User {} Repo - {}", member.login, render_line(&repo));
                        all.push(repo);
                    }
                }
                Err(error) => {
                    warn!(member = %member.login, "Error fetching repos for user: {}", error);
                }
            }
        }

        self.print_rate_limit(out);
        Ok(all)
    }

    /// Fetch each member's repositories with at most `max_parallel` requests
    /// in flight, yielding results in member order
    fn member_repos<'a>(
        &'a self,
        members: &'a [Member],
    ) -> impl futures::Stream<Item = (&'a Member, Result<Vec<Repository>, MonitorError>)> + 'a
    {
        stream::iter(members)
            .map(move |member| async move {
                let result = self
                    .source
                    .fetch_user_repos(&member.login, &self.rate_limit)
                    .await;
                (member, result)
            })
            .buffered(self.max_parallel)
    }

    fn print_rate_limit(&self, out: &mut dyn Write) {
        let rate_limit = self.rate_limit.snapshot();
        if !rate_limit.is_empty() {
            let _ = writeln!(out, "{}", rate_limit);
        }
    }
}
