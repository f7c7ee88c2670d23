//! Common test utilities and helpers for ghmon tests
#![allow(dead_code)]

use chrono::{Duration, Utc};
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mock GitHub repository data for testing
#[derive(Debug, Clone)]
pub struct MockRepository {
    pub name: String,
    pub owner: String,
    pub updated_minutes_ago: i64,
}

impl MockRepository {
    pub fn new(name: &str, owner: &str) -> Self {
        Self {
            name: name.to_string(),
            owner: owner.to_string(),
            updated_minutes_ago: 30,
        }
    }

    pub fn with_age_minutes(mut self, minutes: i64) -> Self {
        self.updated_minutes_ago = minutes;
        self
    }

    pub fn url(&self) -> String {
        format!("https://github.com/{}/{}", self.owner, self.name)
    }

    pub fn to_json(&self) -> Value {
        let updated_at = Utc::now() - Duration::minutes(self.updated_minutes_ago);
        json!({
            "name": self.name,
            "full_name": format!("{}/{}", self.owner, self.name),
            "html_url": self.url(),
            "updated_at": updated_at.to_rfc3339(),
            "private": false
        })
    }
}

fn repos_json(repos: &[MockRepository]) -> Value {
    Value::Array(repos.iter().map(MockRepository::to_json).collect())
}

/// Response carrying GitHub-style rate-limit headers
pub fn with_rate_limit(template: ResponseTemplate, remaining: u32) -> ResponseTemplate {
    template
        .insert_header("x-ratelimit-limit", "5000")
        .insert_header("x-ratelimit-remaining", remaining.to_string().as_str())
        .insert_header("x-ratelimit-reset", "1700000000")
}

pub async fn mount_org_repos(server: &MockServer, org: &str, repos: &[MockRepository]) {
    Mock::given(method("GET"))
        .and(path(format!("/orgs/{}/repos", org)))
        .and(query_param("type", "public"))
        .respond_with(with_rate_limit(
            ResponseTemplate::new(200).set_body_json(repos_json(repos)),
            4999,
        ))
        .mount(server)
        .await;
}

pub async fn mount_members(server: &MockServer, org: &str, logins: &[&str]) {
    let body: Vec<Value> = logins.iter().map(|login| json!({ "login": login })).collect();
    Mock::given(method("GET"))
        .and(path(format!("/orgs/{}/members", org)))
        .respond_with(with_rate_limit(
            ResponseTemplate::new(200).set_body_json(body),
            4998,
        ))
        .mount(server)
        .await;
}

pub async fn mount_user_repos(server: &MockServer, login: &str, repos: &[MockRepository]) {
    Mock::given(method("GET"))
        .and(path(format!("/users/{}/repos", login)))
        .and(query_param("type", "owner"))
        .respond_with(with_rate_limit(
            ResponseTemplate::new(200).set_body_json(repos_json(repos)),
            4997,
        ))
        .mount(server)
        .await;
}

pub async fn mount_user_error(server: &MockServer, login: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(format!("/users/{}/repos", login)))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Assertion helpers for test validation
pub fn assert_contains_all(text: &str, expected: &[&str]) {
    for item in expected {
        assert!(
            text.contains(item),
            "Expected text to contain '{}', but it didn't. Text: {}",
            item,
            text
        );
    }
}
