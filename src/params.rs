//! Tool parameters.
//!
//! Optional fields fall back to the defaults in [`crate::tools`] and
//! [`crate::parent::DEFAULT_PARENT_LINK_FIELD`].

use crate::parent::DEFAULT_PARENT_LINK_FIELD;
use crate::tools::{DEFAULT_ANCESTOR_DEPTH, DEFAULT_DESCENDANT_DEPTH};
use schemars::JsonSchema;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SearchIssuesParams {
    /// JQL (e.g. `project = RFE AND status = Open`) or free text.
    pub query: String,

    /// Page size, clamped to 1..=100. Defaults to 20.
    #[serde(default)]
    pub max_results: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetIssueParams {
    /// Issue key, e.g. RFE-7877.
    pub issue_key: String,

    /// Comma-separated JIRA expansions, e.g. `changelog,renderedFields`.
    #[serde(default)]
    pub expand: Option<String>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct IssueKeyParams {
    /// Issue key, e.g. RFE-7877.
    pub issue_key: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetChildrenParams {
    /// Issue key, e.g. RFE-7877.
    pub issue_key: String,

    /// Include subtasks (default true).
    #[serde(default)]
    pub include_subtasks: Option<bool>,

    /// Include issues pointing here through the parent-link field (default false).
    #[serde(default)]
    pub include_parent_links: Option<bool>,

    /// Name of the parent-link field (default "Parent Link").
    #[serde(default)]
    pub parent_link_field: Option<String>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetDescendantsParams {
    /// Issue key, e.g. RFE-7877.
    pub issue_key: String,

    /// Levels to descend (default 3).
    #[serde(default)]
    pub max_depth: Option<usize>,

    /// Follow subtasks (default true).
    #[serde(default)]
    pub include_subtasks: Option<bool>,

    /// Follow issue links in both directions (default false).
    #[serde(default)]
    pub include_links: Option<bool>,

    /// Follow the parent-link field (default false).
    #[serde(default)]
    pub include_parent_links: Option<bool>,

    /// Name of the parent-link field (default "Parent Link").
    #[serde(default)]
    pub parent_link_field: Option<String>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetLinkedIssuesParams {
    /// Issue key, e.g. RFE-7877.
    pub issue_key: String,

    /// Only links of this type, case-insensitive (e.g. "Blocks").
    #[serde(default)]
    pub link_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetParentParams {
    /// Issue key, e.g. RFE-7877.
    pub issue_key: String,

    /// Also consider epic links and parent-link fields (default true).
    #[serde(default)]
    pub include_parent_links: Option<bool>,

    /// Name of the parent-link field (default "Parent Link").
    #[serde(default)]
    pub parent_link_field: Option<String>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetAncestorsParams {
    /// Issue key, e.g. RFE-7877.
    pub issue_key: String,

    /// Levels to climb (default 10).
    #[serde(default)]
    pub max_depth: Option<usize>,

    /// Also consider epic links and parent-link fields (default true).
    #[serde(default)]
    pub include_parent_links: Option<bool>,

    /// Name of the parent-link field (default "Parent Link").
    #[serde(default)]
    pub parent_link_field: Option<String>,
}

fn field_or_default(field: Option<String>) -> String {
    field.unwrap_or_else(|| DEFAULT_PARENT_LINK_FIELD.to_string())
}

impl GetChildrenParams {
    pub fn parent_link_field(&self) -> String {
        field_or_default(self.parent_link_field.clone())
    }
}

impl GetDescendantsParams {
    pub fn max_depth(&self) -> usize {
        self.max_depth.unwrap_or(DEFAULT_DESCENDANT_DEPTH)
    }

    pub fn parent_link_field(&self) -> String {
        field_or_default(self.parent_link_field.clone())
    }
}

impl GetParentParams {
    pub fn parent_link_field(&self) -> String {
        field_or_default(self.parent_link_field.clone())
    }
}

impl GetAncestorsParams {
    pub fn max_depth(&self) -> usize {
        self.max_depth.unwrap_or(DEFAULT_ANCESTOR_DEPTH)
    }

    pub fn parent_link_field(&self) -> String {
        field_or_default(self.parent_link_field.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn optional_fields_take_defaults() {
        let params: GetAncestorsParams =
            serde_json::from_value(json!({ "issue_key": "TEST-1" })).unwrap();
        assert_eq!(params.max_depth(), DEFAULT_ANCESTOR_DEPTH);
        assert_eq!(params.include_parent_links, None);
        assert_eq!(params.parent_link_field(), "Parent Link");

        let params: GetDescendantsParams =
            serde_json::from_value(json!({ "issue_key": "TEST-1" })).unwrap();
        assert_eq!(params.max_depth(), DEFAULT_DESCENDANT_DEPTH);
    }

    #[test]
    fn explicit_values_are_kept() {
        let params: GetChildrenParams = serde_json::from_value(json!({
            "issue_key": "TEST-1",
            "include_subtasks": false,
            "parent_link_field": "Feature Link"
        }))
        .unwrap();
        assert_eq!(params.include_subtasks, Some(false));
        assert_eq!(params.parent_link_field(), "Feature Link");
    }

    #[test]
    fn issue_key_is_required() {
        assert!(serde_json::from_value::<IssueKeyParams>(json!({})).is_err());
    }
}
