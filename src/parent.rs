//! Parent resolution across the different ways Jira links an issue upwards.
//!
//! Strategies are tried in [`ParentStrategy::ORDER`]; the first one that
//! produces a key wins and later strategies are not consulted.

use crate::discovery::FieldDiscovery;
use crate::error::Result;
use crate::models::{JiraIssue, ParentInfo};
use crate::tracker::IssueTracker;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

pub const DEFAULT_PARENT_LINK_FIELD: &str = "Parent Link";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentStrategy {
    /// Native `fields.parent` of a subtask.
    Subtask,
    /// First discovered Epic Link / Parent Link field carrying a value.
    DiscoveredField,
    /// Field looked up by its display name.
    NamedField,
}

impl ParentStrategy {
    pub const ORDER: [ParentStrategy; 3] = [
        ParentStrategy::Subtask,
        ParentStrategy::DiscoveredField,
        ParentStrategy::NamedField,
    ];
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParentKind {
    Subtask,
    Field(String),
    ParentLink(String),
}

impl fmt::Display for ParentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParentKind::Subtask => write!(f, "subtask"),
            ParentKind::Field(id) => write!(f, "parent_field({id})"),
            ParentKind::ParentLink(name) => write!(f, "parent_link({name})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentMatch {
    pub key: String,
    pub kind: ParentKind,
    /// Known without another fetch (embedded subtask parent).
    pub summary: Option<String>,
}

/// Extracts an issue key from a parent-link field value.
///
/// Epic Link stores the key as a plain string; Parent Link may be an object
/// with `key` or `data.key`.
pub fn parent_key_from_value(value: &Value) -> Option<String> {
    let key = match value {
        Value::String(key) => Some(key.as_str()),
        Value::Object(map) => map
            .get("key")
            .and_then(Value::as_str)
            .or_else(|| value.pointer("/data/key").and_then(Value::as_str)),
        _ => None,
    }?;
    let key = key.trim();
    (!key.is_empty()).then(|| key.to_string())
}

pub struct ParentResolver {
    tracker: Arc<dyn IssueTracker>,
    discovery: FieldDiscovery,
}

impl ParentResolver {
    pub fn new(tracker: Arc<dyn IssueTracker>, discovery: FieldDiscovery) -> Self {
        Self { tracker, discovery }
    }

    pub async fn resolve_parent(
        &self,
        issue_key: &str,
        include_parent_links: bool,
        fallback_field: &str,
    ) -> Result<ParentInfo> {
        let raw = self.tracker.get_issue(issue_key, None).await?;
        let issue = JiraIssue::from_value(&raw)?;

        let strategies: &[ParentStrategy] = if include_parent_links {
            &ParentStrategy::ORDER
        } else {
            &[ParentStrategy::Subtask]
        };

        for &strategy in strategies {
            let Some(found) = self
                .try_strategy(strategy, issue_key, &issue, fallback_field)
                .await?
            else {
                continue;
            };
            debug!(issue = %issue_key, parent = %found.key, kind = %found.kind, "Resolved parent");

            let parent_summary = match found.summary {
                Some(summary) => Some(summary),
                None => {
                    let parent = self.tracker.get_issue(&found.key, None).await?;
                    JiraIssue::from_value(&parent)?.fields.summary
                }
            };
            return Ok(ParentInfo {
                issue_key: issue_key.to_string(),
                parent_key: Some(found.key),
                parent_summary,
                parent_type: Some(found.kind.to_string()),
            });
        }

        Ok(ParentInfo::none(issue_key))
    }

    /// Runs a single strategy against an already fetched issue.
    pub async fn try_strategy(
        &self,
        strategy: ParentStrategy,
        issue_key: &str,
        issue: &JiraIssue,
        fallback_field: &str,
    ) -> Result<Option<ParentMatch>> {
        match strategy {
            ParentStrategy::Subtask => Ok(issue.fields.parent.as_ref().and_then(|parent| {
                Some(ParentMatch {
                    key: parent.key.clone()?,
                    kind: ParentKind::Subtask,
                    summary: parent.fields.summary.clone(),
                })
            })),
            ParentStrategy::DiscoveredField => {
                let fields = self
                    .discovery
                    .discover_parent_fields(issue_key, issue.project_key(), issue.issue_type_name())
                    .await;
                Ok(fields.into_iter().find_map(|field_id| {
                    let key = parent_key_from_value(issue.field(&field_id)?)?;
                    Some(ParentMatch {
                        key,
                        kind: ParentKind::Field(field_id),
                        summary: None,
                    })
                }))
            }
            ParentStrategy::NamedField => {
                if fallback_field.is_empty() {
                    return Ok(None);
                }
                let Some(field) = self.tracker.get_field_by_name(fallback_field).await? else {
                    return Ok(None);
                };
                Ok(issue
                    .field(&field.id)
                    .and_then(parent_key_from_value)
                    .map(|key| ParentMatch {
                        key,
                        kind: ParentKind::ParentLink(fallback_field.to_string()),
                        summary: None,
                    }))
            }
        }
    }
}
