use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use reposearch::client::GithubClient;
use reposearch::config::Config;
use reposearch::data_models::ResultState;
use reposearch::search_controller::SearchController;

/// Type a username per line and watch its repositories load.
#[derive(Parser, Debug)]
#[command(name = "reposearch", version)]
struct Args {
    /// API host, e.g. a GitHub Enterprise `https://ghe.example.com/api/v3`
    #[arg(long)]
    base_url: Option<String>,

    /// Quiet period after the last edit before a search is issued
    #[arg(long)]
    debounce_ms: Option<u64>,

    #[arg(long)]
    timeout_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Handles both tracing and log crate records; stdout stays for results.
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    dotenvy::dotenv().ok();
    let args = Args::parse();
    let mut config = Config::from_env()?;
    if let Some(base_url) = args.base_url {
        config.base_url = base_url;
    }
    if let Some(debounce_ms) = args.debounce_ms {
        config.debounce_ms = debounce_ms;
    }
    if let Some(timeout_ms) = args.timeout_ms {
        config.request_timeout_ms = timeout_ms;
    }

    let client = GithubClient::new(&config)?;
    let controller = SearchController::from_config(Arc::new(client), &config)?;

    println!("{}", render(&controller.current_state()));
    let mut transitions = controller.subscribe();
    let printer = tokio::spawn(async move {
        while let Some(state) = transitions.recv().await {
            println!("{}", render(&state));
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        controller.on_query_changed(line.trim());
    }

    let mut latest = controller.watch();
    latest.wait_for(ResultState::is_settled).await?;
    drop(controller);
    printer.await?;
    Ok(())
}

fn render(state: &ResultState) -> String {
    match state {
        ResultState::Idle => "Search something".to_string(),
        ResultState::Loading { .. } => "Loading ...".to_string(),
        ResultState::Loaded { query, repos } if repos.is_empty() => {
            format!("== {query} ==\nNo repositories")
        }
        ResultState::Loaded { query, repos } => {
            let names: Vec<&str> = repos.iter().map(|repo| repo.name.as_str()).collect();
            format!("== {query} ==\n{}", names.join("\n"))
        }
        ResultState::NotFound { .. } => "Not Found".to_string(),
        ResultState::Failed { error, .. } => format!("Something went wrong: {error}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reposearch::data_models::RepoSummary;

    #[test]
    fn test_render_idle_and_loading() {
        assert_eq!(render(&ResultState::Idle), "Search something");
        assert_eq!(
            render(&ResultState::Loading {
                query: "octocat".into(),
                request: None
            }),
            "Loading ..."
        );
    }

    #[test]
    fn test_render_loaded_lists_names_under_header() {
        let state = ResultState::Loaded {
            query: "octocat".into(),
            repos: vec![
                RepoSummary::new(1, "Hello-World"),
                RepoSummary::new(2, "Spoon-Knife"),
            ],
        };
        assert_eq!(render(&state), "== octocat ==\nHello-World\nSpoon-Knife");
    }

    #[test]
    fn test_render_empty_loaded_differs_from_not_found() {
        let empty = render(&ResultState::Loaded {
            query: "octocat".into(),
            repos: vec![],
        });
        let not_found = render(&ResultState::NotFound {
            query: "octocat".into(),
        });
        assert_eq!(empty, "== octocat ==\nNo repositories");
        assert_eq!(not_found, "Not Found");
        assert_ne!(empty, not_found);
    }

    #[test]
    fn test_render_failed_carries_error() {
        let failed = render(&ResultState::Failed {
            query: "octocat".into(),
            error: "unexpected status 500".into(),
        });
        assert_eq!(failed, "Something went wrong: unexpected status 500");
        assert_ne!(failed, render(&ResultState::NotFound { query: "octocat".into() }));
    }
}
