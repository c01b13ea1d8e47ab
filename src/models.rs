use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// Raw Jira payloads. Every field is optional: tools must tolerate partial
// records (search results only carry `summary,status`, links may be half
// populated, and so on).

#[derive(Debug, Default, Deserialize)]
pub struct IssueListResponse {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub issues: Vec<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct JiraIssue {
    pub key: Option<String>,
    #[serde(default)]
    pub fields: JiraIssueFields,
}

#[derive(Debug, Default, Deserialize)]
pub struct JiraIssueFields {
    pub summary: Option<String>,
    pub description: Option<Value>,
    pub status: Option<Named>,
    pub parent: Option<Box<JiraIssue>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub subtasks: Vec<JiraIssue>,
    /// Entries that do not match the expected shape are dropped.
    #[serde(rename = "issuelinks", default, deserialize_with = "well_formed_entries")]
    pub issue_links: Vec<RawIssueLink>,
    pub project: Option<ProjectRef>,
    #[serde(rename = "issuetype")]
    pub issue_type: Option<Named>,
    /// Everything else, custom fields included, keyed by field id.
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn well_formed_entries<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(entries) => entries
            .into_iter()
            .filter_map(|entry| T::deserialize(entry).ok())
            .collect(),
        _ => Vec::new(),
    })
}

#[derive(Debug, Default, Deserialize)]
pub struct Named {
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProjectRef {
    pub key: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct IssueRef {
    pub key: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawIssueLink {
    #[serde(rename = "type")]
    pub link_type: Option<RawLinkType>,
    #[serde(rename = "inwardIssue")]
    pub inward_issue: Option<IssueRef>,
    #[serde(rename = "outwardIssue")]
    pub outward_issue: Option<IssueRef>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawLinkType {
    pub name: Option<String>,
    pub inward: Option<String>,
    pub outward: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FieldInfo {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

impl JiraIssue {
    pub fn from_value(value: &Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(value)
    }

    pub fn summary(&self) -> String {
        self.fields.summary.clone().unwrap_or_default()
    }

    pub fn status(&self) -> String {
        self.fields
            .status
            .as_ref()
            .and_then(|status| status.name.clone())
            .unwrap_or_default()
    }

    pub fn description(&self) -> Option<String> {
        match self.fields.description.as_ref()? {
            Value::Null => None,
            Value::String(text) => Some(text.clone()),
            other => Some(other.to_string()),
        }
    }

    pub fn project_key(&self) -> Option<&str> {
        self.fields.project.as_ref()?.key.as_deref()
    }

    pub fn issue_type_name(&self) -> Option<&str> {
        self.fields.issue_type.as_ref()?.name.as_deref()
    }

    pub fn parent_key(&self) -> Option<&str> {
        self.fields.parent.as_ref()?.key.as_deref()
    }

    pub fn subtask_keys(&self) -> Vec<String> {
        self.fields
            .subtasks
            .iter()
            .filter_map(|subtask| subtask.key.clone())
            .collect()
    }

    /// Value of an arbitrary (usually custom) field, if present and non-null.
    pub fn field(&self, field_id: &str) -> Option<&Value> {
        self.fields
            .other
            .get(field_id)
            .filter(|value| !value.is_null())
    }

    pub fn to_summary(&self, fallback_key: &str, base_url: &str) -> IssueSummary {
        let key = self.key.clone().unwrap_or_else(|| fallback_key.to_string());
        IssueSummary {
            url: browse_url(base_url, &key),
            key,
            summary: self.summary(),
            status: self.status(),
        }
    }
}

pub fn browse_url(base_url: &str, key: &str) -> String {
    format!("{}/browse/{}", base_url.trim_end_matches('/'), key)
}

// Tool results.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct IssueSummary {
    pub key: String,
    pub summary: String,
    pub status: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct IssueDetails {
    pub key: String,
    pub summary: String,
    pub description: Option<String>,
    pub status: String,
    /// The full record as returned by Jira.
    pub raw: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum LinkDirection {
    Inward,
    Outward,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct IssueLink {
    pub issue_key: String,
    pub link_type: String,
    pub relationship: String,
    pub direction: LinkDirection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct IssueRelationships {
    pub issue_key: String,
    pub parent: Option<String>,
    pub subtasks: Vec<String>,
    pub issue_links: Vec<IssueLink>,
    pub remote_links_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ParentInfo {
    pub issue_key: String,
    pub parent_key: Option<String>,
    pub parent_summary: Option<String>,
    /// `subtask`, `parent_field(<field id>)` or `parent_link(<field name>)`.
    pub parent_type: Option<String>,
}

impl ParentInfo {
    pub fn none(issue_key: &str) -> Self {
        Self {
            issue_key: issue_key.to_string(),
            parent_key: None,
            parent_summary: None,
            parent_type: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TraversalStep {
    pub issue_key: String,
    pub depth: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DescendantTree {
    pub root_issue: String,
    pub max_depth: usize,
    pub total_issues: usize,
    pub issues: Vec<IssueSummary>,
    pub traversal_order: Vec<TraversalStep>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AncestorTree {
    pub root_issue: String,
    pub max_depth: usize,
    pub total_ancestors: usize,
    pub ancestors: Vec<IssueSummary>,
    pub traversal_order: Vec<TraversalStep>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn partial_issue_deserializes_with_defaults() {
        let issue = JiraIssue::from_value(&json!({"fields": {}})).unwrap();
        assert_eq!(issue.key, None);
        assert_eq!(issue.summary(), "");
        assert_eq!(issue.status(), "");
        assert!(issue.subtask_keys().is_empty());
        assert!(issue.fields.issue_links.is_empty());
    }

    #[test]
    fn null_collections_are_empty() {
        let issue = JiraIssue::from_value(&json!({
            "key": "TEST-1",
            "fields": {"subtasks": null, "issuelinks": null, "parent": null}
        }))
        .unwrap();
        assert!(issue.subtask_keys().is_empty());
        assert!(issue.fields.issue_links.is_empty());
        assert_eq!(issue.parent_key(), None);
    }

    #[test]
    fn malformed_link_entries_are_dropped() {
        let issue = JiraIssue::from_value(&json!({
            "key": "TEST-1",
            "fields": {"issuelinks": [
                {"type": {"name": "Blocks"}, "inwardIssue": {"key": "TEST-2"}},
                {"type": "Relates", "outwardIssue": {"key": "TEST-3"}},
                null,
                {"type": {"name": "Relates"}, "outwardIssue": {"key": 123}}
            ]}
        }))
        .unwrap();
        assert_eq!(issue.fields.issue_links.len(), 1);

        let issue =
            JiraIssue::from_value(&json!({"fields": {"issuelinks": "not a list"}})).unwrap();
        assert!(issue.fields.issue_links.is_empty());
    }

    #[test]
    fn custom_fields_are_reachable_by_id() {
        let issue = JiraIssue::from_value(&json!({
            "key": "TEST-1",
            "fields": {
                "summary": "Has epic",
                "customfield_10014": "TEST-EPIC",
                "customfield_10015": null,
                "project": {"key": "TEST"},
                "issuetype": {"name": "Story"}
            }
        }))
        .unwrap();

        assert_eq!(issue.field("customfield_10014"), Some(&json!("TEST-EPIC")));
        assert_eq!(issue.field("customfield_10015"), None);
        assert_eq!(issue.project_key(), Some("TEST"));
        assert_eq!(issue.issue_type_name(), Some("Story"));
    }

    #[test]
    fn non_string_description_is_rendered_as_json() {
        let issue = JiraIssue::from_value(&json!({
            "fields": {"description": {"type": "doc"}}
        }))
        .unwrap();
        assert_eq!(issue.description().as_deref(), Some(r#"{"type":"doc"}"#));
    }

    #[test]
    fn summary_uses_fallback_key_and_browse_url() {
        let issue = JiraIssue::from_value(&json!({
            "fields": {"summary": "Parent", "status": {"name": "Open"}}
        }))
        .unwrap();
        let summary = issue.to_summary("TEST-9", "https://test.jira.com/");
        assert_eq!(summary.key, "TEST-9");
        assert_eq!(summary.url, "https://test.jira.com/browse/TEST-9");
        assert_eq!(summary.status, "Open");
    }

    #[test]
    fn link_direction_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(LinkDirection::Inward).unwrap(),
            json!("inward")
        );
    }
}
