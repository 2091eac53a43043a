use std::fmt;

/// Snapshot of a GitHub issue or pull request as returned by search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitHubItem {
    pub id: u64,
    pub title: String,
    pub html_url: String,
    /// Full name of the owning repository, e.g. `owner/repo`.
    pub repository: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    Issue,
    PullRequest,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Issue => "issue",
            ItemKind::PullRequest => "pull_request",
        }
    }

    /// Search qualifier selecting this kind of item.
    pub fn qualifier(&self) -> &'static str {
        match self {
            ItemKind::Issue => "is:issue",
            ItemKind::PullRequest => "is:pr",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the user relates to an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Assigned,
    Created,
    Mentioned,
    ReviewRequested,
}

impl Category {
    pub const ISSUE: [Category; 3] = [Category::Assigned, Category::Created, Category::Mentioned];

    pub const PULL_REQUEST: [Category; 4] = [
        Category::Assigned,
        Category::Created,
        Category::Mentioned,
        Category::ReviewRequested,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Assigned => "assigned",
            Category::Created => "created",
            Category::Mentioned => "mentioned",
            Category::ReviewRequested => "review_requested",
        }
    }

    /// GitHub search qualifier matching this category for `username`.
    pub fn qualifier(&self, username: &str) -> String {
        match self {
            Category::Assigned => format!("assignee:{username}"),
            Category::Created => format!("author:{username}"),
            Category::Mentioned => format!("mentions:{username}"),
            Category::ReviewRequested => format!("review-requested:{username}"),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Todoist label attached to tasks created for `kind`/`category`.
pub fn task_label(kind: ItemKind, category: Category) -> String {
    format!("{kind}:{category}")
}

/// Key under which the task created for an (item, category) pair is recorded.
pub fn dedup_key(kind: ItemKind, category: Category, item: &GitHubItem) -> String {
    format!("{kind}:{category}:{}", item.id)
}

/// Task description linking back to the GitHub item.
pub fn task_description(item: &GitHubItem) -> String {
    format!("url: {} \nid: {}", item.html_url, item.id)
}
