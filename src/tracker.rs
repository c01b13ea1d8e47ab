//! The seam between the tool layer and Jira.
//!
//! [`IssueTracker`] is implemented by [`crate::jira_client::JiraClient`] for
//! real deployments; everything above it only ever sees the trait.

use crate::error::Result;
use crate::models::{FieldInfo, IssueListResponse, JiraIssue, TraversalStep};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashSet, VecDeque};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub jql: String,
    pub max_results: u32,
    pub fields: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescendantOptions {
    pub depth: usize,
    pub include_subtasks: bool,
    pub include_links: bool,
    pub include_parent_links: bool,
    pub parent_link_field: String,
}

/// Flat result of a descendant walk, root included.
#[derive(Debug, Default)]
pub struct DescendantWalk {
    /// `(key, raw issue)` in the order the issues were first reached.
    pub issues: Vec<(String, Value)>,
    pub traversal_order: Vec<TraversalStep>,
}

impl DescendantWalk {
    fn record(&mut self, key: &str, depth: usize, raw: Value) {
        self.issues.push((key.to_string(), raw));
        self.traversal_order.push(TraversalStep {
            issue_key: key.to_string(),
            depth,
        });
    }
}

/// Read-only operations the tools need from an issue tracker.
///
/// Implementations must be `Send + Sync`: one instance is shared by every
/// in-flight tool call.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Base URL of the tracker UI, used to build `/browse/` links.
    fn base_url(&self) -> &str;

    async fn search(&self, query: &SearchQuery) -> Result<IssueListResponse>;

    async fn get_issue(&self, key: &str, expand: Option<&str>) -> Result<Value>;

    async fn get_descendants(&self, key: &str, options: &DescendantOptions)
        -> Result<DescendantWalk>;

    async fn get_remote_links(&self, key: &str) -> Result<Vec<Value>>;

    /// Keys of issues whose `field_name` field points at `key`.
    async fn get_parent_link_children(&self, key: &str, field_name: &str) -> Result<Vec<String>>;

    async fn get_field_by_name(&self, name: &str) -> Result<Option<FieldInfo>>;

    /// Edit metadata (field schemas) for one issue.
    async fn get_edit_meta(&self, key: &str) -> Result<Value>;
}

/// Breadth-first descendant walk built on the primitive tracker calls.
///
/// The root fetch must succeed; failures further down only drop the affected
/// child.
pub async fn walk_descendants<T: IssueTracker + ?Sized>(
    tracker: &T,
    root_key: &str,
    options: &DescendantOptions,
) -> Result<DescendantWalk> {
    let mut walk = DescendantWalk::default();
    let mut visited = HashSet::from([root_key.to_string()]);
    let mut queue = VecDeque::new();

    let root = tracker.get_issue(root_key, None).await?;
    let root_issue = JiraIssue::from_value(&root)?;
    walk.record(root_key, 0, root);
    queue.push_back((root_key.to_string(), 0, root_issue));

    while let Some((key, depth, issue)) = queue.pop_front() {
        if depth >= options.depth {
            continue;
        }

        for child_key in child_keys(tracker, &key, &issue, options).await {
            if !visited.insert(child_key.clone()) {
                continue;
            }
            let raw = match tracker.get_issue(&child_key, None).await {
                Ok(raw) => raw,
                Err(e) => {
                    warn!(issue = %child_key, error = %e, "Skipping descendant that could not be fetched");
                    continue;
                }
            };
            let child = match JiraIssue::from_value(&raw) {
                Ok(child) => child,
                Err(e) => {
                    warn!(issue = %child_key, error = %e, "Skipping malformed descendant");
                    continue;
                }
            };
            walk.record(&child_key, depth + 1, raw);
            queue.push_back((child_key, depth + 1, child));
        }
    }

    debug!(root = %root_key, reached = walk.issues.len(), "Descendant walk finished");
    Ok(walk)
}

async fn child_keys<T: IssueTracker + ?Sized>(
    tracker: &T,
    key: &str,
    issue: &JiraIssue,
    options: &DescendantOptions,
) -> Vec<String> {
    let mut keys = Vec::new();

    if options.include_subtasks {
        keys.extend(issue.subtask_keys());
    }

    if options.include_links {
        keys.extend(issue.fields.issue_links.iter().filter_map(|link| {
            link.inward_issue
                .as_ref()
                .or(link.outward_issue.as_ref())
                .and_then(|linked| linked.key.clone())
        }));
    }

    if options.include_parent_links {
        match tracker
            .get_parent_link_children(key, &options.parent_link_field)
            .await
        {
            Ok(children) => keys.extend(children),
            Err(e) => warn!(issue = %key, error = %e, "Could not list parent-link children"),
        }
    }

    keys
}
