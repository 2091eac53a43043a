pub mod github;
pub mod todoist;

use anyhow::Result;
use async_trait::async_trait;

use crate::model::item::GitHubItem;
use crate::model::task::{CreatedTask, NewTask};

#[async_trait]
pub trait GitHubClient: Send + Sync {
    /// Runs a GitHub issue search and returns every matching item in result order.
    async fn search_issues(&self, query: &str) -> Result<Vec<GitHubItem>>;
}

#[async_trait]
pub trait TodoistClient: Send + Sync {
    async fn add_task(&self, task: NewTask) -> Result<CreatedTask>;
}

// Bytes of response body kept in error messages.
const MAX_ERROR_BODY: usize = 500;

/// Error for a non-success HTTP response, keeping the start of the body.
fn api_error(operation: &str, status: reqwest::StatusCode, body: &str) -> anyhow::Error {
    let body = body.trim();
    if body.is_empty() {
        return anyhow::anyhow!("{operation} returned {status}");
    }
    let excerpt: String = body.chars().take(MAX_ERROR_BODY).collect();
    anyhow::anyhow!("{operation} returned {status}: {excerpt}")
}

#[cfg(test)]
pub mod tests;
