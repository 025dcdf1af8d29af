//! Fetch client trait and the `reqwest`-backed GitHub implementation.

use futures::future::BoxFuture;
use reqwest::{StatusCode, Url, header};

use crate::config::Config;
use crate::data_models::RepoSummary;
use crate::error::FetchError;

/// Result of exactly one fetch attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Success(Vec<RepoSummary>),
    NotFound,
    Error(String),
}

impl From<Result<Vec<RepoSummary>, FetchError>> for FetchOutcome {
    fn from(result: Result<Vec<RepoSummary>, FetchError>) -> Self {
        match result {
            Ok(repos) => FetchOutcome::Success(repos),
            Err(FetchError::NotFound) => FetchOutcome::NotFound,
            Err(e) => FetchOutcome::Error(e.to_string()),
        }
    }
}

/// Source of repository listings for an identity.
///
/// Implementations make a single attempt per call and never cache. Every
/// failure is reported through [`FetchOutcome`], never by panicking.
pub trait RepoFetcher: Send + Sync {
    fn fetch_repositories<'a>(&'a self, identity: &'a str) -> BoxFuture<'a, FetchOutcome>;
}

#[derive(Debug, Clone)]
pub struct GithubClient {
    base_url: Url,
    accept: String,
    http: reqwest::Client,
}

impl GithubClient {
    pub fn new(config: &Config) -> Result<GithubClient, FetchError> {
        let base_url = Url::parse(&config.base_url).map_err(|e| FetchError::InvalidBaseUrl {
            url: config.base_url.clone(),
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(FetchError::InvalidBaseUrl {
                url: config.base_url.clone(),
                reason: "not a hierarchical url".to_string(),
            });
        }

        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.request_timeout())
            .build()?;

        Ok(GithubClient {
            base_url,
            accept: config.accept_header.clone(),
            http,
        })
    }

    /// `{base}/users/{identity}/repos`, with `identity` encoded as one path segment.
    pub fn repos_url(&self, identity: &str) -> Result<Url, FetchError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| FetchError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: "not a hierarchical url".to_string(),
            })?
            .pop_if_empty()
            .extend(["users", identity, "repos"]);
        Ok(url)
    }

    async fn request_repositories(&self, identity: &str) -> Result<Vec<RepoSummary>, FetchError> {
        let url = self.repos_url(identity)?;
        log::debug!("fetching repositories from {url}");

        let response = self
            .http
            .get(url)
            .header(header::ACCEPT, self.accept.as_str())
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound);
        }
        if !status.is_success() {
            return Err(FetchError::UnexpectedStatus {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let repos: Vec<RepoSummary> = serde_json::from_str(&body)?;
        Ok(repos)
    }
}

impl RepoFetcher for GithubClient {
    fn fetch_repositories<'a>(&'a self, identity: &'a str) -> BoxFuture<'a, FetchOutcome> {
        Box::pin(async move { self.request_repositories(identity).await.into() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_for(base_url: &str) -> GithubClient {
        let config = Config {
            base_url: base_url.to_string(),
            ..Config::default()
        };
        GithubClient::new(&config).unwrap()
    }

    #[test]
    fn test_repos_url_for_default_host() {
        let client = client_for("https://api.github.com");
        assert_eq!(
            client.repos_url("octocat").unwrap().as_str(),
            "https://api.github.com/users/octocat/repos"
        );
    }

    #[test]
    fn test_repos_url_keeps_base_path_prefix() {
        let client = client_for("http://localhost:9000/api/v3/");
        assert_eq!(
            client.repos_url("octocat").unwrap().as_str(),
            "http://localhost:9000/api/v3/users/octocat/repos"
        );
    }

    #[test]
    fn test_repos_url_encodes_identity_as_single_segment() {
        let client = client_for("https://api.github.com");
        assert_eq!(
            client.repos_url("octo cat/../x").unwrap().as_str(),
            "https://api.github.com/users/octo%20cat%2F..%2Fx/repos"
        );
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        for base_url in ["not a url", "mailto:someone@example.com"] {
            let config = Config {
                base_url: base_url.to_string(),
                ..Config::default()
            };
            match GithubClient::new(&config) {
                Err(FetchError::InvalidBaseUrl { url, .. }) => assert_eq!(url, base_url),
                other => panic!("expected InvalidBaseUrl for {base_url}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_outcome_from_result() {
        let ok: Result<Vec<RepoSummary>, FetchError> = Ok(vec![RepoSummary::new(1, "a")]);
        assert_eq!(
            FetchOutcome::from(ok),
            FetchOutcome::Success(vec![RepoSummary::new(1, "a")])
        );
        assert_eq!(
            FetchOutcome::from(Err(FetchError::NotFound)),
            FetchOutcome::NotFound
        );
        assert_eq!(
            FetchOutcome::from(Err(FetchError::UnexpectedStatus { status: 502 })),
            FetchOutcome::Error("unexpected status 502".to_string())
        );
    }
}
