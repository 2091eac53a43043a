use thiserror::Error;

use crate::classifier::{get_issues, get_pull_requests};
use crate::config::RepoProjectMap;
use crate::mapping::{ItemTaskMapping, MappingError, MappingStore};
use crate::model::item::{dedup_key, task_description, task_label, Category, GitHubItem, ItemKind};
use crate::model::task::NewTask;
use crate::providers::{GitHubClient, TodoistClient};

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("repository {repository} has no Todoist project configured")]
    UnconfiguredRepository { repository: String },
    #[error(transparent)]
    Transport(#[from] anyhow::Error),
    #[error(transparent)]
    Store(#[from] MappingError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    Created(u64),
    AlreadySynced(u64),
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub created: usize,
    pub already_synced: usize,
    pub skipped_unconfigured: usize,
}

/// Creates the Todoist task for one (item, category) pair unless one was
/// created before.
///
/// The mapping only gains an entry after Todoist confirms the task, and the
/// file is rewritten before returning, so a failure at any point leaves no
/// record claiming the item is synced.
pub async fn create_todoist_task(
    kind: ItemKind,
    category: Category,
    item: &GitHubItem,
    repo_project_map: &RepoProjectMap,
    mapping_store: &MappingStore,
    mapping: &mut ItemTaskMapping,
    todoist: &dyn TodoistClient,
) -> Result<TaskOutcome, SyncError> {
    let project_id = *repo_project_map.get(&item.repository).ok_or_else(|| {
        SyncError::UnconfiguredRepository {
            repository: item.repository.clone(),
        }
    })?;

    let key = dedup_key(kind, category, item);
    if let Some(&task_id) = mapping.get(&key) {
        tracing::debug!(%key, task_id, "already synced");
        return Ok(TaskOutcome::AlreadySynced(task_id));
    }

    let task = NewTask {
        content: item.title.clone(),
        project_id,
        labels: vec![task_label(kind, category)],
        description: task_description(item),
    };
    let created = todoist.add_task(task).await?;

    mapping.insert(key.clone(), created.id);
    mapping_store.save(mapping)?;

    tracing::info!(
        %key,
        task_id = created.id,
        project_id,
        title = %item.title,
        "created Todoist task"
    );
    Ok(TaskOutcome::Created(created.id))
}

/// One reconciliation pass: issues first, then pull requests, in classifier order.
///
/// Items from repositories without a project are skipped with a warning. Any
/// other error aborts the pass; entries already saved stay valid.
pub async fn run_cycle(
    github: &dyn GitHubClient,
    todoist: &dyn TodoistClient,
    username: &str,
    repo_project_map: &RepoProjectMap,
    mapping_store: &MappingStore,
) -> Result<SyncReport, SyncError> {
    let mut mapping = mapping_store.load()?;
    tracing::debug!(
        path = %mapping_store.path().display(),
        entries = mapping.len(),
        "loaded item/task mapping"
    );
    let mut report = SyncReport::default();

    let issues = get_issues(github, username).await?;
    let pull_requests = get_pull_requests(github, username).await?;

    let entries = issues
        .into_iter()
        .map(|(category, item)| (ItemKind::Issue, category, item))
        .chain(
            pull_requests
                .into_iter()
                .map(|(category, item)| (ItemKind::PullRequest, category, item)),
        );

    for (kind, category, item) in entries {
        let outcome = create_todoist_task(
            kind,
            category,
            &item,
            repo_project_map,
            mapping_store,
            &mut mapping,
            todoist,
        )
        .await;

        match outcome {
            Ok(TaskOutcome::Created(_)) => report.created += 1,
            Ok(TaskOutcome::AlreadySynced(_)) => report.already_synced += 1,
            Err(SyncError::UnconfiguredRepository { repository }) => {
                tracing::warn!(
                    %repository,
                    item_id = item.id,
                    "skipping item from unconfigured repository"
                );
                report.skipped_unconfigured += 1;
            }
            Err(e) => return Err(e),
        }
    }

    tracing::info!(
        created = report.created,
        already_synced = report.already_synced,
        skipped = report.skipped_unconfigured,
        "sync cycle finished"
    );
    Ok(report)
}
