use std::fmt;

use serde::Deserialize;

use crate::client::FetchOutcome;

/// One repository as listed by `GET /users/{identity}/repos`.
/// Every other field of the response object is ignored.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RepoSummary {
    pub id: u64,
    pub name: String,
}

impl RepoSummary {
    pub fn new(id: u64, name: impl Into<String>) -> RepoSummary {
        RepoSummary {
            id,
            name: name.into(),
        }
    }
}

/// Sequence number minted for every issued fetch.
/// Only the most recent one is allowed to update the result state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(u64);

impl RequestId {
    pub(crate) fn new(value: u64) -> RequestId {
        RequestId(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What the presentation layer should show for the current query.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ResultState {
    /// Nothing typed yet, or the query was cleared.
    #[default]
    Idle,
    /// Waiting for the debounce window (`request == None`) or for the fetch.
    Loading {
        query: String,
        request: Option<RequestId>,
    },
    /// Repositories in server order; empty means the identity has none.
    Loaded {
        query: String,
        repos: Vec<RepoSummary>,
    },
    NotFound {
        query: String,
    },
    Failed {
        query: String,
        error: String,
    },
}

impl ResultState {
    /// Map a fetch outcome for `query` onto the state it settles into.
    pub fn resolved(query: String, outcome: FetchOutcome) -> ResultState {
        match outcome {
            FetchOutcome::Success(repos) => ResultState::Loaded { query, repos },
            FetchOutcome::NotFound => ResultState::NotFound { query },
            FetchOutcome::Error(error) => ResultState::Failed { query, error },
        }
    }

    pub fn query(&self) -> Option<&str> {
        match self {
            ResultState::Idle => None,
            ResultState::Loading { query, .. }
            | ResultState::Loaded { query, .. }
            | ResultState::NotFound { query }
            | ResultState::Failed { query, .. } => Some(query),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ResultState::Loading { .. })
    }

    /// True for states that persist until the next query change.
    pub fn is_settled(&self) -> bool {
        !self.is_loading()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_summary_ignores_extra_fields() {
        let body = r#"[
            {"id": 1296269, "name": "Hello-World", "full_name": "octocat/Hello-World", "private": false},
            {"id": 2, "name": "Spoon-Knife", "owner": {"login": "octocat"}}
        ]"#;
        let repos: Vec<RepoSummary> = serde_json::from_str(body).unwrap();
        assert_eq!(
            repos,
            vec![
                RepoSummary::new(1296269, "Hello-World"),
                RepoSummary::new(2, "Spoon-Knife"),
            ]
        );
    }

    #[test]
    fn test_repo_summary_requires_id_and_name() {
        assert!(serde_json::from_str::<Vec<RepoSummary>>(r#"[{"name": "no-id"}]"#).is_err());
        assert!(serde_json::from_str::<Vec<RepoSummary>>(r#"[{"id": 7}]"#).is_err());
    }

    #[test]
    fn test_resolved_keeps_empty_success_distinct_from_not_found() {
        assert_eq!(
            ResultState::resolved("x".into(), FetchOutcome::Success(vec![])),
            ResultState::Loaded {
                query: "x".into(),
                repos: vec![]
            }
        );
        assert_eq!(
            ResultState::resolved("x".into(), FetchOutcome::NotFound),
            ResultState::NotFound { query: "x".into() }
        );
        assert_eq!(
            ResultState::resolved("x".into(), FetchOutcome::Error("timed out".into())),
            ResultState::Failed {
                query: "x".into(),
                error: "timed out".into()
            }
        );
    }

    #[test]
    fn test_query_and_settled() {
        assert_eq!(ResultState::default(), ResultState::Idle);
        assert_eq!(ResultState::Idle.query(), None);
        assert!(ResultState::Idle.is_settled());

        let loading = ResultState::Loading {
            query: "octocat".into(),
            request: Some(RequestId::new(3)),
        };
        assert_eq!(loading.query(), Some("octocat"));
        assert!(loading.is_loading());
        assert!(!loading.is_settled());

        let failed = ResultState::Failed {
            query: "octocat".into(),
            error: "boom".into(),
        };
        assert!(failed.is_settled());
        assert_eq!(RequestId::new(3).to_string(), "#3");
    }
}
