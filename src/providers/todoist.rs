use anyhow::{Context, Result};
use async_trait::async_trait;

use super::{api_error, TodoistClient};
use crate::model::task::{CreatedTask, NewTask};

const API_BASE: &str = "https://api.todoist.com/rest/v2";

pub struct TodoistApi {
    token: String,
    client: reqwest::Client,
}

impl TodoistApi {
    pub fn new(token: String) -> Self {
        Self {
            token,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl TodoistClient for TodoistApi {
    async fn add_task(&self, task: NewTask) -> Result<CreatedTask> {
        let resp = self
            .client
            .post(format!("{API_BASE}/tasks"))
            .bearer_auth(&self.token)
            .json(&task)
            .send()
            .await
            .context("Todoist API request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(api_error("Todoist add task", status, &body));
        }

        resp.json().await.context("Failed to parse Todoist response")
    }
}
