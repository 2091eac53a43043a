use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

use super::{api_error, GitHubClient};
use crate::model::item::GitHubItem;

const API_BASE: &str = "https://api.github.com";
const PER_PAGE: usize = 100;
// Search never returns more than this many results for a query.
const SEARCH_RESULT_CAP: usize = 1000;

pub struct GitHubApi {
    token: String,
    client: reqwest::Client,
}

impl GitHubApi {
    pub fn new(token: String) -> Self {
        Self {
            token,
            client: reqwest::Client::new(),
        }
    }

    async fn search_page(&self, query: &str, page: usize) -> Result<SearchPage> {
        let resp = self
            .client
            .get(format!("{API_BASE}/search/issues"))
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .header(
                "User-Agent",
                concat!("github-todoist-sync/", env!("CARGO_PKG_VERSION")),
            )
            .query(&[
                ("q", query.to_string()),
                ("per_page", PER_PAGE.to_string()),
                ("page", page.to_string()),
            ])
            .send()
            .await
            .context("GitHub search request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(api_error("GitHub search", status, &body));
        }

        resp.json().await.context("Failed to parse GitHub search response")
    }
}

#[derive(Deserialize)]
struct SearchPage {
    total_count: usize,
    items: Vec<SearchItem>,
}

#[derive(Deserialize)]
struct SearchItem {
    id: u64,
    title: String,
    html_url: String,
    repository_url: String,
}

/// True once a page is short or everything search will return has been collected.
fn is_last_page(fetched: usize, total_so_far: usize, total_count: usize) -> bool {
    fetched < PER_PAGE || total_so_far >= total_count.min(SEARCH_RESULT_CAP)
}

/// `https://api.github.com/repos/owner/repo` -> `owner/repo`
fn repo_full_name(repository_url: &str) -> Option<String> {
    let (_, rest) = repository_url.split_once("/repos/")?;
    let mut parts = rest.trim_end_matches('/').splitn(2, '/');
    let owner = parts.next().filter(|s| !s.is_empty())?;
    let repo = parts.next().filter(|s| !s.is_empty() && !s.contains('/'))?;
    Some(format!("{owner}/{repo}"))
}

fn into_items(items: Vec<SearchItem>) -> Result<Vec<GitHubItem>> {
    items
        .into_iter()
        .map(|item| {
            let repository = repo_full_name(&item.repository_url).with_context(|| {
                format!("Unrecognised repository_url: {}", item.repository_url)
            })?;
            Ok(GitHubItem {
                id: item.id,
                title: item.title,
                html_url: item.html_url,
                repository,
            })
        })
        .collect()
}

#[async_trait]
impl GitHubClient for GitHubApi {
    async fn search_issues(&self, query: &str) -> Result<Vec<GitHubItem>> {
        let mut results = Vec::new();
        let mut page = 1;

        loop {
            let batch = self.search_page(query, page).await?;
            let total_count = batch.total_count;
            let fetched = batch.items.len();
            results.extend(into_items(batch.items)?);

            if is_last_page(fetched, results.len(), total_count) {
                break;
            }
            page += 1;
        }

        tracing::debug!(query, count = results.len(), "GitHub search finished");
        Ok(results)
    }
}
