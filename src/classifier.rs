use anyhow::Result;

use crate::model::item::{Category, GitHubItem, ItemKind};
use crate::providers::GitHubClient;

/// Open issues involving `username`, tagged as assigned, created, then mentioned.
pub async fn get_issues(
    github: &dyn GitHubClient,
    username: &str,
) -> Result<Vec<(Category, GitHubItem)>> {
    classify(github, username, ItemKind::Issue, &Category::ISSUE).await
}

/// Open pull requests involving `username`, tagged as assigned, created,
/// mentioned, then review requested.
pub async fn get_pull_requests(
    github: &dyn GitHubClient,
    username: &str,
) -> Result<Vec<(Category, GitHubItem)>> {
    classify(github, username, ItemKind::PullRequest, &Category::PULL_REQUEST).await
}

pub fn search_query(kind: ItemKind, category: Category, username: &str) -> String {
    format!("{} is:open {}", kind.qualifier(), category.qualifier(username))
}

// One search per category, run in order. The same item can show up under
// several categories; each occurrence is kept.
async fn classify(
    github: &dyn GitHubClient,
    username: &str,
    kind: ItemKind,
    categories: &[Category],
) -> Result<Vec<(Category, GitHubItem)>> {
    let mut tagged = Vec::new();
    for &category in categories {
        let query = search_query(kind, category, username);
        let items = github.search_issues(&query).await?;
        tracing::debug!(%kind, %category, count = items.len(), "classified items");
        tagged.extend(items.into_iter().map(|item| (category, item)));
    }
    Ok(tagged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::tests::{make_item, MockGitHub};

    fn titles(entries: &[(Category, GitHubItem)]) -> Vec<(Category, &str)> {
        entries.iter().map(|(c, i)| (*c, i.title.as_str())).collect()
    }

    #[tokio::test]
    async fn issues_are_tagged_in_query_order() {
        let github = MockGitHub::new(vec![
            vec![make_item(1, "Assigned issue", "o/r")],
            vec![make_item(2, "Created issue", "o/r")],
            vec![make_item(3, "Mentioned issue", "o/r")],
        ]);

        let issues = get_issues(&github, "testuser").await.unwrap();

        assert_eq!(
            titles(&issues),
            vec![
                (Category::Assigned, "Assigned issue"),
                (Category::Created, "Created issue"),
                (Category::Mentioned, "Mentioned issue"),
            ]
        );
    }

    #[tokio::test]
    async fn issue_queries_are_issued_in_fixed_order() {
        let github = MockGitHub::empty();

        get_issues(&github, "testuser").await.unwrap();

        assert_eq!(
            github.queries.lock().unwrap().as_slice(),
            &[
                "is:issue is:open assignee:testuser",
                "is:issue is:open author:testuser",
                "is:issue is:open mentions:testuser",
            ]
        );
    }

    #[tokio::test]
    async fn pull_requests_are_tagged_in_query_order() {
        let github = MockGitHub::new(vec![
            vec![make_item(1, "Assigned PR", "o/r")],
            vec![make_item(2, "Created PR", "o/r")],
            vec![make_item(3, "Mentioned PR", "o/r")],
            vec![make_item(4, "Review requested PR", "o/r")],
        ]);

        let prs = get_pull_requests(&github, "testuser").await.unwrap();

        assert_eq!(
            titles(&prs),
            vec![
                (Category::Assigned, "Assigned PR"),
                (Category::Created, "Created PR"),
                (Category::Mentioned, "Mentioned PR"),
                (Category::ReviewRequested, "Review requested PR"),
            ]
        );
        assert_eq!(
            github.queries.lock().unwrap().last().map(String::as_str),
            Some("is:pr is:open review-requested:testuser")
        );
    }

    #[tokio::test]
    async fn no_results_yield_empty_sequence() {
        let github = MockGitHub::empty();
        assert!(get_issues(&github, "testuser").await.unwrap().is_empty());

        let github = MockGitHub::empty();
        assert!(get_pull_requests(&github, "testuser").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_category_contributes_nothing() {
        let github = MockGitHub::new(vec![
            vec![make_item(1, "Assigned issue", "o/r")],
            vec![],
            vec![make_item(3, "Mentioned issue", "o/r")],
        ]);

        let issues = get_issues(&github, "testuser").await.unwrap();

        assert_eq!(
            titles(&issues),
            vec![
                (Category::Assigned, "Assigned issue"),
                (Category::Mentioned, "Mentioned issue"),
            ]
        );
    }

    #[tokio::test]
    async fn same_item_in_two_categories_is_kept_twice() {
        let item = make_item(5, "Busy issue", "o/r");
        let github = MockGitHub::new(vec![vec![item.clone()], vec![], vec![item.clone()]]);

        let issues = get_issues(&github, "testuser").await.unwrap();

        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0], (Category::Assigned, item.clone()));
        assert_eq!(issues[1], (Category::Mentioned, item));
    }

    #[tokio::test]
    async fn query_failure_propagates_and_stops() {
        let github = MockGitHub::new(vec![vec![make_item(1, "Assigned issue", "o/r")]])
            .then_fail("rate limited");

        let err = get_issues(&github, "testuser").await.unwrap_err();

        assert!(err.to_string().contains("rate limited"));
        assert_eq!(github.queries.lock().unwrap().len(), 2);
    }
}
