use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;

use super::{api_error, GitHubClient, TodoistClient};
use crate::model::item::GitHubItem;
use crate::model::task::{CreatedTask, NewTask};

/// Hands out queued search results in call order and records every query.
/// Once the queue is drained each further search returns no items.
pub struct MockGitHub {
    responses: Mutex<VecDeque<Result<Vec<GitHubItem>>>>,
    pub queries: Arc<Mutex<Vec<String>>>,
}

impl MockGitHub {
    pub fn new(responses: Vec<Vec<GitHubItem>>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().map(Ok).collect()),
            queries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Queue a failing search after the already-queued responses.
    pub fn then_fail(self, message: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(anyhow::anyhow!(message.to_string())));
        self
    }
}

#[async_trait]
impl GitHubClient for MockGitHub {
    async fn search_issues(&self, query: &str) -> Result<Vec<GitHubItem>> {
        self.queries.lock().unwrap().push(query.to_string());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// Records every task request and answers with sequential ids.
pub struct MockTodoist {
    pub calls: Arc<Mutex<Vec<NewTask>>>,
    next_id: Mutex<u64>,
    fail_after: Option<usize>,
}

impl MockTodoist {
    pub fn new() -> Self {
        Self::starting_at(1000)
    }

    pub fn starting_at(first_id: u64) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            next_id: Mutex::new(first_id),
            fail_after: None,
        }
    }

    /// Succeed for the first `n` calls, fail afterwards.
    pub fn failing_after(mut self, n: usize) -> Self {
        self.fail_after = Some(n);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl TodoistClient for MockTodoist {
    async fn add_task(&self, task: NewTask) -> Result<CreatedTask> {
        let mut calls = self.calls.lock().unwrap();
        if self.fail_after.is_some_and(|n| calls.len() >= n) {
            anyhow::bail!("Mock Todoist failure");
        }
        calls.push(task);
        let mut next = self.next_id.lock().unwrap();
        let id = *next;
        *next += 1;
        Ok(CreatedTask { id })
    }
}

pub fn make_item(id: u64, title: &str, repository: &str) -> GitHubItem {
    GitHubItem {
        id,
        title: title.to_string(),
        html_url: format!("https://github.com/{repository}/issues/{id}"),
        repository: repository.to_string(),
    }
}

#[tokio::test]
async fn mock_github_replays_responses_in_order() {
    let github = MockGitHub::new(vec![
        vec![make_item(1, "first", "o/r")],
        vec![make_item(2, "second", "o/r")],
    ]);

    assert_eq!(github.search_issues("a").await.unwrap()[0].id, 1);
    assert_eq!(github.search_issues("b").await.unwrap()[0].id, 2);
    assert!(github.search_issues("c").await.unwrap().is_empty());
    assert_eq!(github.queries.lock().unwrap().as_slice(), &["a", "b", "c"]);
}

#[tokio::test]
async fn mock_todoist_is_usable_as_trait_object() {
    let todoist: Box<dyn TodoistClient> = Box::new(MockTodoist::starting_at(7));
    let task = NewTask {
        content: "x".into(),
        project_id: 1,
        labels: vec![],
        description: String::new(),
    };

    assert_eq!(todoist.add_task(task.clone()).await.unwrap().id, 7);
    assert_eq!(todoist.add_task(task).await.unwrap().id, 8);
}

#[tokio::test]
async fn mock_todoist_failure_propagates() {
    let todoist = MockTodoist::new().failing_after(0);
    let task = NewTask {
        content: "x".into(),
        project_id: 1,
        labels: vec![],
        description: String::new(),
    };

    let err = todoist.add_task(task).await.unwrap_err();
    assert!(err.to_string().contains("Mock Todoist failure"));
    assert_eq!(todoist.call_count(), 0);
}

#[test]
fn api_error_includes_status_and_body() {
    let err = api_error(
        "GitHub search",
        reqwest::StatusCode::UNPROCESSABLE_ENTITY,
        r#"{"message":"Validation Failed"}"#,
    );
    assert_eq!(
        err.to_string(),
        r#"GitHub search returned 422 Unprocessable Entity: {"message":"Validation Failed"}"#
    );
}

#[test]
fn api_error_without_body() {
    let err = api_error("Todoist add task", reqwest::StatusCode::UNAUTHORIZED, "  \n");
    assert_eq!(err.to_string(), "Todoist add task returned 401 Unauthorized");
}

#[test]
fn api_error_truncates_long_body() {
    let body = "x".repeat(2000);
    let err = api_error("Todoist add task", reqwest::StatusCode::BAD_GATEWAY, &body);
    let message = err.to_string();
    assert!(message.starts_with("Todoist add task returned 502 Bad Gateway: "));
    assert!(message.len() < 600);
}
