//! ghmon - GitHub Organization Activity Monitor
//!
//! ghmon checks an organization's public repositories and the repositories
//! owned by its members, picks out the ones updated within the last hour and
//! reports them to the console or to a chat webhook. Every run is a single,
//! stateless pass.
//!
//! ## Modules
//!
//! - [`config`]: Configuration file and run settings
//! - [`github`]: GitHub REST client and the [`RepositorySource`] trait
//! - [`rate_limit`]: Rate-limit header bookkeeping
//! - [`filter`]: The trailing update window
//! - [`notify`]: Report rendering and webhook delivery
//! - [`monitor`]: The pipeline tying the above together

pub mod config;
pub mod error;
pub mod filter;
pub mod github;
pub mod monitor;
pub mod notify;
pub mod rate_limit;

pub use config::{Config, Settings};
pub use error::MonitorError;
pub use filter::UpdateFilter;
pub use github::{GitHubClient, Member, Repository, RepositorySource};
pub use monitor::{Monitor, RunSummary};
pub use notify::{ChatMessage, Delivery, Notifier};
pub use rate_limit::{RateLimitSnapshot, RateLimitTracker};
