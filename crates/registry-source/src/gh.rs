//! Change-request listing through the GitHub CLI.

use async_trait::async_trait;
use pending_core::{ChangeRequestLister, ListedChangeRequest, ReconcileConfig};
use serde::Deserialize;

use crate::command::CommandRunner;
use crate::error::SourceError;

/// Fields requested from `gh pr list --json`.
pub const PR_LIST_FIELDS: &str = "number,title,author,files";

#[derive(Debug, Deserialize)]
struct GhPullRequest {
    number: u64,
    #[serde(default)]
    title: String,
    /// `null` for deleted accounts.
    #[serde(default)]
    author: Option<GhAuthor>,
    #[serde(default)]
    files: Vec<GhFile>,
}

#[derive(Debug, Deserialize)]
struct GhAuthor {
    #[serde(default)]
    login: String,
}

#[derive(Debug, Deserialize)]
struct GhFile {
    path: String,
}

/// Parse `gh pr list --json number,title,author,files` output, keeping pull
/// requests that touch `tracked_file` in listing order.
pub fn parse_pr_list(
    json: &str,
    tracked_file: &str,
) -> Result<Vec<ListedChangeRequest>, SourceError> {
    let prs: Vec<GhPullRequest> = serde_json::from_str(json)?;
    Ok(prs
        .into_iter()
        .filter(|pr| pr.files.iter().any(|f| f.path == tracked_file))
        .map(|pr| {
            let login = pr
                .author
                .map(|a| a.login.to_lowercase())
                .unwrap_or_default();
            ListedChangeRequest::new(pr.number, login, pr.title)
        })
        .collect())
}

/// Lists open pull requests of the registry repository with `gh`.
#[derive(Debug, Clone)]
pub struct GhChangeRequestLister {
    repo: String,
    tracked_file: String,
    limit: usize,
    runner: CommandRunner,
}

impl GhChangeRequestLister {
    pub fn new(config: &ReconcileConfig, runner: CommandRunner) -> Self {
        Self {
            repo: config.repo.clone(),
            tracked_file: config.tracked_file.clone(),
            limit: config.list_limit,
            runner,
        }
    }

    fn args(&self) -> Vec<String> {
        vec![
            "pr".to_string(),
            "list".to_string(),
            "--repo".to_string(),
            self.repo.clone(),
            "--state".to_string(),
            "open".to_string(),
            "--limit".to_string(),
            self.limit.to_string(),
            "--json".to_string(),
            PR_LIST_FIELDS.to_string(),
        ]
    }
}

#[async_trait]
impl ChangeRequestLister for GhChangeRequestLister {
    async fn list_change_requests(&self) -> pending_core::Result<Vec<ListedChangeRequest>> {
        let args = self.args();
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let json = self.runner.run("gh", &args).await?;
        let listed = parse_pr_list(&json, &self.tracked_file)?;
        tracing::info!(
            repo = %self.repo,
            tracked = listed.len(),
            "listed open pull requests"
        );
        Ok(listed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
        {"number": 12, "title": "Add plugin: Foo", "author": {"login": "Alice"},
         "files": [{"path": "community-plugins.json", "additions": 8, "deletions": 0}]},
        {"number": 11, "title": "Update theme", "author": {"login": "bob"},
         "files": [{"path": "community-css-themes.json"}]},
        {"number": 10, "title": "Add plugin: Bar", "author": null,
         "files": [{"path": "README.md"}, {"path": "community-plugins.json"}]}
    ]"#;

    #[test]
    fn test_parse_keeps_tracked_file_only_in_listing_order() {
        let listed = parse_pr_list(SAMPLE, "community-plugins.json").unwrap();
        let numbers: Vec<_> = listed.iter().map(|cr| cr.number).collect();
        assert_eq!(numbers, vec![12, 10]);
    }

    #[test]
    fn test_parse_lowercases_login_and_tolerates_ghost_author() {
        let listed = parse_pr_list(SAMPLE, "community-plugins.json").unwrap();
        assert_eq!(listed[0].owner_login, "alice");
        assert_eq!(listed[1].owner_login, "");
        assert_eq!(listed[1].title, "Add plugin: Bar");
    }

    #[test]
    fn test_parse_rejects_non_json() {
        assert!(matches!(
            parse_pr_list("gh: not logged in", "community-plugins.json"),
            Err(SourceError::Json(_))
        ));
    }

    #[test]
    fn test_args_follow_config() {
        let config = ReconcileConfig {
            list_limit: 50,
            ..ReconcileConfig::default()
        };
        let lister = GhChangeRequestLister::new(&config, CommandRunner::default());
        let args = lister.args();
        assert_eq!(
            args,
            vec![
                "pr",
                "list",
                "--repo",
                "obsidianmd/obsidian-releases",
                "--state",
                "open",
                "--limit",
                "50",
                "--json",
                "number,title,author,files",
            ]
        );
    }
}
