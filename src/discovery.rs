//! Discovery of parent-link custom fields.
//!
//! Field ids such as `customfield_10014` differ between Jira instances, so the
//! fields are recognised by the custom type declared in their schema instead.

use crate::error::Result;
use crate::schema_cache::SchemaCache;
use crate::tracker::IssueTracker;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, warn};

/// Jira Software "Epic Link".
pub const EPIC_LINK_TYPE: &str = "com.pyxis.greenhopper.jira:gh-epic-link";
/// Advanced Roadmaps "Parent Link".
pub const PARENT_LINK_TYPE: &str = "com.atlassian.jpo:jpo-custom-field-parent";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentFieldKind {
    EpicLink,
    ParentLink,
}

impl ParentFieldKind {
    pub fn classify(custom_type: &str) -> Option<Self> {
        match custom_type {
            EPIC_LINK_TYPE => Some(Self::EpicLink),
            PARENT_LINK_TYPE => Some(Self::ParentLink),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
struct EditMeta {
    #[serde(default)]
    fields: Map<String, Value>,
}

#[derive(Deserialize)]
struct FieldMeta {
    schema: Option<FieldSchema>,
}

#[derive(Deserialize)]
struct FieldSchema {
    custom: Option<String>,
}

/// Ids of parent-link candidates in an edit-metadata payload, in payload order.
pub fn parent_link_fields(edit_meta: &Value) -> Result<Vec<String>> {
    let meta = EditMeta::deserialize(edit_meta)?;
    Ok(meta
        .fields
        .iter()
        .filter(|(_, field)| {
            FieldMeta::deserialize(*field)
                .ok()
                .and_then(|meta| meta.schema)
                .and_then(|schema| schema.custom)
                .and_then(|custom| ParentFieldKind::classify(&custom))
                .is_some()
        })
        .map(|(id, _)| id.clone())
        .collect())
}

pub struct FieldDiscovery {
    tracker: Arc<dyn IssueTracker>,
    cache: SchemaCache,
}

impl FieldDiscovery {
    pub fn new(tracker: Arc<dyn IssueTracker>, cache: SchemaCache) -> Self {
        Self { tracker, cache }
    }

    /// Candidate parent-link field ids for issues of `project`/`issue_type`.
    ///
    /// Never fails: if edit metadata cannot be read the result is empty and
    /// callers fall back to the named-field lookup.
    pub async fn discover_parent_fields(
        &self,
        issue_key: &str,
        project: Option<&str>,
        issue_type: Option<&str>,
    ) -> Vec<String> {
        let (Some(project), Some(issue_type)) = (project, issue_type) else {
            return Vec::new();
        };

        if let Some(fields) = self.cache.get(project, issue_type).await {
            debug!(project, issue_type, ?fields, "Parent fields served from cache");
            return fields;
        }

        // A failure is cached as an empty list so the lookup is not repeated
        // until the entry expires.
        let fields = match self.fetch(issue_key).await {
            Ok(fields) => {
                debug!(project, issue_type, ?fields, ttl = ?self.cache.ttl(), "Discovered parent fields");
                fields
            }
            Err(e) => {
                warn!(issue = %issue_key, error = %e, "Field discovery failed, falling back");
                Vec::new()
            }
        };

        self.cache.put(project, issue_type, fields.clone()).await;
        fields
    }

    async fn fetch(&self, issue_key: &str) -> Result<Vec<String>> {
        let meta = self.tracker.get_edit_meta(issue_key).await?;
        parent_link_fields(&meta)
    }
}
