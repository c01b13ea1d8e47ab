//! Tool implementations exposed by the MCP server.
//!
//! Every tool is read-only. Failures of the primary Jira call are returned
//! unchanged; the few places that degrade instead say so in their docs.

use crate::discovery::FieldDiscovery;
use crate::error::Result;
use crate::links::{filter_links, normalize_links};
use crate::models::{
    AncestorTree, DescendantTree, IssueDetails, IssueLink, IssueRelationships, IssueSummary,
    JiraIssue, ParentInfo, TraversalStep,
};
use crate::parent::ParentResolver;
use crate::schema_cache::SchemaCache;
use crate::tracker::{DescendantOptions, IssueTracker, SearchQuery};
use itertools::Itertools;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_MAX_RESULTS: u32 = 20;
pub const MAX_RESULTS_LIMIT: u32 = 100;
pub const DEFAULT_ANCESTOR_DEPTH: usize = 10;
pub const DEFAULT_DESCENDANT_DEPTH: usize = 3;
pub const SEARCH_FIELDS: [&str; 2] = ["summary", "status"];

pub const IDENTIFIER_HINT: &str = "JIRA issue identifiers have the form <PROJECT>-<NUMBER>: \
an upper-case project key, a hyphen and the issue number, e.g. RFE-7877 or PROJ-123. \
Pass the full identifier to get_issue and the relationship tools; use search_issues \
with JQL (e.g. `project = RFE AND status = Open`) or free text to find identifiers.";

/// Clamps a requested page size into `1..=100`.
pub fn clamp_max_results(requested: i64) -> u32 {
    requested.clamp(1, i64::from(MAX_RESULTS_LIMIT)) as u32
}

/// True when `query` looks like JQL rather than free text.
pub fn is_jql(query: &str) -> bool {
    query.contains('=')
        || query
            .split_whitespace()
            .any(|token| token == "AND" || token == "OR")
}

/// JQL to send for a user query: JQL as-is, free text as a `text ~` clause.
pub fn to_jql(query: &str) -> String {
    if is_jql(query) {
        query.to_string()
    } else {
        format!("text ~ \"{}\"", query.replace('\\', "\\\\").replace('"', "\\\""))
    }
}

pub struct JiraTools {
    tracker: Arc<dyn IssueTracker>,
    parents: ParentResolver,
}

impl JiraTools {
    pub fn new(tracker: Arc<dyn IssueTracker>, field_cache_ttl: Duration) -> Self {
        let discovery = FieldDiscovery::new(tracker.clone(), SchemaCache::new(field_cache_ttl));
        Self {
            parents: ParentResolver::new(tracker.clone(), discovery),
            tracker,
        }
    }

    fn summarize(&self, issue: &JiraIssue, fallback_key: &str) -> IssueSummary {
        issue.to_summary(fallback_key, self.tracker.base_url())
    }

    async fn fetch_summary(&self, key: &str) -> Result<IssueSummary> {
        let raw = self.tracker.get_issue(key, None).await?;
        Ok(self.summarize(&JiraIssue::from_value(&raw)?, key))
    }

    async fn fetch_issue(&self, key: &str) -> Result<JiraIssue> {
        let raw = self.tracker.get_issue(key, None).await?;
        Ok(JiraIssue::from_value(&raw)?)
    }

    pub async fn search_issues(
        &self,
        query: &str,
        max_results: Option<i64>,
    ) -> Result<Vec<IssueSummary>> {
        let search = SearchQuery {
            jql: to_jql(query),
            max_results: clamp_max_results(max_results.unwrap_or(i64::from(DEFAULT_MAX_RESULTS))),
            fields: SEARCH_FIELDS.iter().map(|f| f.to_string()).collect(),
        };
        debug!(jql = %search.jql, max_results = search.max_results, "Searching issues");

        let response = self.tracker.search(&search).await?;
        debug!(total = response.total, returned = response.issues.len(), "Search finished");
        let issues = response
            .issues
            .iter()
            .map(JiraIssue::from_value)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(issues
            .iter()
            .map(|issue| self.summarize(issue, ""))
            .collect())
    }

    pub async fn get_issue(&self, key: &str, expand: Option<&str>) -> Result<IssueDetails> {
        let raw = self.tracker.get_issue(key, expand).await?;
        let issue = JiraIssue::from_value(&raw)?;
        Ok(IssueDetails {
            key: issue.key.clone().unwrap_or_else(|| key.to_string()),
            summary: issue.summary(),
            description: issue.description(),
            status: issue.status(),
            raw,
        })
    }

    pub fn identifier_hint(&self) -> &'static str {
        IDENTIFIER_HINT
    }

    pub async fn get_issue_relationships(&self, key: &str) -> Result<IssueRelationships> {
        let issue = self.fetch_issue(key).await?;
        let remote_links = self.tracker.get_remote_links(key).await?;

        Ok(IssueRelationships {
            issue_key: key.to_string(),
            parent: issue.parent_key().map(str::to_string),
            subtasks: issue.subtask_keys(),
            issue_links: normalize_links(&issue.fields.issue_links),
            remote_links_count: remote_links.len(),
        })
    }

    /// Direct children: subtasks, then (optionally) issues pointing here through
    /// `parent_link_field`. A parent-linked child that cannot be fetched is
    /// left out.
    pub async fn get_children(
        &self,
        key: &str,
        include_subtasks: bool,
        include_parent_links: bool,
        parent_link_field: &str,
    ) -> Result<Vec<IssueSummary>> {
        let issue = self.fetch_issue(key).await?;
        let mut children = Vec::new();

        if include_subtasks {
            children.extend(
                issue
                    .fields
                    .subtasks
                    .iter()
                    .filter_map(|subtask| {
                        let subtask_key = subtask.key.as_deref()?;
                        Some(self.summarize(subtask, subtask_key))
                    }),
            );
        }

        if include_parent_links {
            let linked = self
                .tracker
                .get_parent_link_children(key, parent_link_field)
                .await?;
            debug!(issue = %key, field = %parent_link_field, children = %linked.iter().join(","), "Parent-link children");

            for child_key in linked {
                match self.fetch_summary(&child_key).await {
                    Ok(summary) => children.push(summary),
                    Err(e) => {
                        warn!(issue = %child_key, error = %e, "Omitting parent-link child that could not be fetched")
                    }
                }
            }
        }

        Ok(children)
    }

    pub async fn get_descendants(
        &self,
        key: &str,
        max_depth: usize,
        include_subtasks: bool,
        include_links: bool,
        include_parent_links: bool,
        parent_link_field: &str,
    ) -> Result<DescendantTree> {
        let options = DescendantOptions {
            depth: max_depth,
            include_subtasks,
            include_links,
            include_parent_links,
            parent_link_field: parent_link_field.to_string(),
        };
        let walk = self.tracker.get_descendants(key, &options).await?;

        let mut issues = Vec::new();
        for (issue_key, raw) in &walk.issues {
            if issue_key.as_str() != key {
                issues.push(self.summarize(&JiraIssue::from_value(raw)?, issue_key));
            }
        }

        Ok(DescendantTree {
            root_issue: key.to_string(),
            max_depth,
            total_issues: issues.len(),
            issues,
            traversal_order: walk.traversal_order,
        })
    }

    pub async fn get_linked_issues(
        &self,
        key: &str,
        link_type: Option<&str>,
    ) -> Result<Vec<IssueLink>> {
        let issue = self.fetch_issue(key).await?;
        Ok(filter_links(normalize_links(&issue.fields.issue_links), link_type))
    }

    pub async fn get_parent(
        &self,
        key: &str,
        include_parent_links: bool,
        parent_link_field: &str,
    ) -> Result<ParentInfo> {
        self.parents
            .resolve_parent(key, include_parent_links, parent_link_field)
            .await
    }

    /// Walks parents upwards, nearest first.
    ///
    /// The walk ends at the first issue without a parent, at a parent that was
    /// already visited, after `max_depth` hops, or when a hop cannot be
    /// fetched. In the last case the ancestors found so far are returned.
    pub async fn get_ancestors(
        &self,
        key: &str,
        max_depth: usize,
        include_parent_links: bool,
        parent_link_field: &str,
    ) -> Result<AncestorTree> {
        let mut visited = HashSet::from([key.to_string()]);
        let mut ancestors = Vec::new();
        let mut traversal_order = Vec::new();
        let mut current = key.to_string();
        let mut depth = 0;

        while depth < max_depth {
            let parent = match self
                .get_parent(&current, include_parent_links, parent_link_field)
                .await
            {
                Ok(parent) => parent,
                Err(e) => {
                    warn!(issue = %current, error = %e, "Stopping ancestor walk");
                    break;
                }
            };
            let Some(parent_key) = parent.parent_key else {
                break;
            };
            if visited.contains(&parent_key) {
                debug!(issue = %current, parent = %parent_key, "Cycle in parent chain");
                break;
            }

            let summary = match self.fetch_summary(&parent_key).await {
                Ok(summary) => summary,
                Err(e) => {
                    warn!(issue = %parent_key, error = %e, "Stopping ancestor walk");
                    break;
                }
            };

            depth += 1;
            ancestors.push(summary);
            traversal_order.push(TraversalStep {
                issue_key: parent_key.clone(),
                depth,
            });
            visited.insert(parent_key.clone());
            current = parent_key;
        }

        Ok(AncestorTree {
            root_issue: key.to_string(),
            max_depth,
            total_ancestors: ancestors.len(),
            ancestors,
            traversal_order,
        })
    }
}

#[cfg(test)]
#[path = "tools_tests.rs"]
mod tests;
