//! Trailing time-window filter for repository updates

use chrono::{DateTime, Duration, Utc};

use crate::github::Repository;

/// Length of the update window in hours
pub const UPDATE_WINDOW_HOURS: i64 = 1;

/// Decides whether a repository was updated inside the trailing window
///
/// The cutoff is computed once from `now`; a repository counts as updated
/// only if its `updated_at` is strictly after the cutoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateFilter {
    cutoff: DateTime<Utc>,
}

impl UpdateFilter {
    pub fn new(now: DateTime<Utc>, window: Duration) -> Self {
        Self {
            cutoff: now - window,
        }
    }

    /// Filter for the standard one-hour window ending at `now`
    pub fn last_hour(now: DateTime<Utc>) -> Self {
        Self::new(now, Duration::hours(UPDATE_WINDOW_HOURS))
    }

    pub fn cutoff(&self) -> DateTime<Utc> {
        self.cutoff
    }

    pub fn is_updated(&self, repo: &Repository) -> bool {
        repo.updated_at > self.cutoff
    }

    /// Split repositories into (updated, not updated), preserving order
    pub fn partition(&self, repos: Vec<Repository>) -> (Vec<Repository>, Vec<Repository>) {
        repos.into_iter().partition(|repo| self.is_updated(repo))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use quickcheck_macros::quickcheck;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn repo_updated_at(name: &str, updated_at: DateTime<Utc>) -> Repository {
        Repository {
            name: name.to_string(),
            url: format!("https://github.com/acme/{}", name),
            updated_at,
        }
    }

    #[test]
    fn test_boundary_is_excluded() {
        let filter = UpdateFilter::last_hour(now());
        let at_boundary = repo_updated_at("edge", now() - Duration::hours(1));

        assert!(!filter.is_updated(&at_boundary));
    }

    #[test]
    fn test_just_inside_window_is_included() {
        let filter = UpdateFilter::last_hour(now());
        let inside = repo_updated_at(
            "fresh",
            now() - Duration::hours(1) + Duration::milliseconds(1),
        );

        assert!(filter.is_updated(&inside));
    }

    #[test]
    fn test_partition_keeps_order() {
        let filter = UpdateFilter::last_hour(now());
        let repos = vec![
            repo_updated_at("a", now() - Duration::minutes(30)),
            repo_updated_at("b", now() - Duration::hours(2)),
            repo_updated_at("c", now() - Duration::minutes(5)),
        ];

        let (updated, stale) = filter.partition(repos);

        let names: Vec<_> = updated.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["a", "c"]);
        assert_eq!(stale.len(), 1);
        assert_eq!(stale[0].name, "b");
    }

    #[test]
    fn test_timezone_offsets_compare_as_absolute_time() {
        let filter = UpdateFilter::last_hour(now());
        // 13:30 at +02:00 is 11:30 UTC, 30 minutes before now
        let offset_time = DateTime::parse_from_rfc3339("2024-05-01T13:30:00+02:00")
            .unwrap()
            .with_timezone(&Utc);

        assert!(filter.is_updated(&repo_updated_at("tz", offset_time)));
    }

    #[quickcheck]
    fn prop_updated_iff_after_cutoff(offset_secs: i32) -> bool {
        let offset = Duration::seconds(i64::from(offset_secs));
        let filter = UpdateFilter::last_hour(now());
        let repo = repo_updated_at("prop", now() - offset);

        filter.is_updated(&repo) == (offset < Duration::hours(UPDATE_WINDOW_HOURS))
    }
}
