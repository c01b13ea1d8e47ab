//! In-memory [`IssueTracker`] used by the unit tests.

use crate::error::{Error, Result};
use crate::models::{FieldInfo, IssueListResponse};
use crate::tracker::{walk_descendants, DescendantOptions, DescendantWalk, IssueTracker, SearchQuery};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

pub const BASE_URL: &str = "https://test.jira.com";

#[derive(Default)]
pub struct FakeTracker {
    issues: HashMap<String, Value>,
    failing_issues: HashSet<String>,
    search_results: Vec<Value>,
    fail_search: bool,
    parent_link_children: HashMap<String, Vec<String>>,
    remote_links: HashMap<String, usize>,
    failing_remote_links: HashSet<String>,
    fields: HashMap<String, String>,
    edit_meta: HashMap<String, Value>,
    calls: Mutex<Calls>,
}

#[derive(Default)]
struct Calls {
    issues: Vec<(String, Option<String>)>,
    searches: Vec<SearchQuery>,
    descendants: Vec<(String, DescendantOptions)>,
    parent_links: Vec<(String, String)>,
    edit_meta: Vec<String>,
    field_lookups: Vec<String>,
}

fn not_found(path: String) -> Error {
    Error::Status {
        status: reqwest::StatusCode::NOT_FOUND,
        url: format!("{BASE_URL}{path}"),
        body: "Issue Does Not Exist".to_string(),
    }
}

impl FakeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an issue under its own `key`.
    pub fn with_issue(self, issue: Value) -> Self {
        let key = issue["key"]
            .as_str()
            .expect("fixture issues need a key")
            .to_string();
        self.with_issue_at(&key, issue)
    }

    /// Registers a record under `key` regardless of its content.
    pub fn with_issue_at(mut self, key: &str, issue: Value) -> Self {
        self.issues.insert(key.to_string(), issue);
        self
    }

    pub fn failing_issue(mut self, key: &str) -> Self {
        self.failing_issues.insert(key.to_string());
        self
    }

    pub fn with_search_results(mut self, issues: Vec<Value>) -> Self {
        self.search_results = issues;
        self
    }

    pub fn failing_search(mut self) -> Self {
        self.fail_search = true;
        self
    }

    pub fn with_parent_link_children(mut self, key: &str, children: &[&str]) -> Self {
        self.parent_link_children.insert(
            key.to_string(),
            children.iter().map(|child| child.to_string()).collect(),
        );
        self
    }

    pub fn with_remote_links(mut self, key: &str, count: usize) -> Self {
        self.remote_links.insert(key.to_string(), count);
        self
    }

    pub fn failing_remote_links(mut self, key: &str) -> Self {
        self.failing_remote_links.insert(key.to_string());
        self
    }

    pub fn with_field(mut self, name: &str, id: &str) -> Self {
        self.fields.insert(name.to_string(), id.to_string());
        self
    }

    /// Edit metadata built from `(field id, schema.custom)` pairs, in order.
    pub fn with_edit_meta(mut self, key: &str, fields: &[(&str, &str)]) -> Self {
        let mut map = serde_json::Map::new();
        for (id, custom) in fields {
            map.insert(
                id.to_string(),
                json!({"name": id, "schema": {"type": "any", "custom": custom}}),
            );
        }
        self.edit_meta
            .insert(key.to_string(), json!({"fields": Value::Object(map)}));
        self
    }

    pub fn with_raw_edit_meta(mut self, key: &str, meta: Value) -> Self {
        self.edit_meta.insert(key.to_string(), meta);
        self
    }

    pub fn issue_calls(&self) -> Vec<(String, Option<String>)> {
        self.calls.lock().unwrap().issues.clone()
    }

    pub fn issue_call_count(&self) -> usize {
        self.calls.lock().unwrap().issues.len()
    }

    pub fn searches(&self) -> Vec<SearchQuery> {
        self.calls.lock().unwrap().searches.clone()
    }

    pub fn descendant_requests(&self) -> Vec<(String, DescendantOptions)> {
        self.calls.lock().unwrap().descendants.clone()
    }

    pub fn parent_link_queries(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().parent_links.clone()
    }

    pub fn edit_meta_calls(&self) -> usize {
        self.calls.lock().unwrap().edit_meta.len()
    }

    pub fn field_lookups(&self) -> Vec<String> {
        self.calls.lock().unwrap().field_lookups.clone()
    }
}

#[async_trait]
impl IssueTracker for FakeTracker {
    fn base_url(&self) -> &str {
        BASE_URL
    }

    async fn search(&self, query: &SearchQuery) -> Result<IssueListResponse> {
        self.calls.lock().unwrap().searches.push(query.clone());
        if self.fail_search {
            return Err(Error::Status {
                status: reqwest::StatusCode::UNAUTHORIZED,
                url: format!("{BASE_URL}/rest/api/2/search"),
                body: "401 Unauthorized".to_string(),
            });
        }
        Ok(IssueListResponse {
            total: self.search_results.len() as u64,
            issues: self.search_results.clone(),
        })
    }

    async fn get_issue(&self, key: &str, expand: Option<&str>) -> Result<Value> {
        self.calls
            .lock()
            .unwrap()
            .issues
            .push((key.to_string(), expand.map(str::to_string)));
        if self.failing_issues.contains(key) {
            return Err(not_found(format!("/rest/api/2/issue/{key}")));
        }
        self.issues
            .get(key)
            .cloned()
            .ok_or_else(|| not_found(format!("/rest/api/2/issue/{key}")))
    }

    async fn get_descendants(
        &self,
        key: &str,
        options: &DescendantOptions,
    ) -> Result<DescendantWalk> {
        self.calls
            .lock()
            .unwrap()
            .descendants
            .push((key.to_string(), options.clone()));
        walk_descendants(self, key, options).await
    }

    async fn get_remote_links(&self, key: &str) -> Result<Vec<Value>> {
        if self.failing_remote_links.contains(key) {
            return Err(not_found(format!("/rest/api/2/issue/{key}/remotelink")));
        }
        let count = self.remote_links.get(key).copied().unwrap_or(0);
        Ok((0..count).map(|id| json!({"id": id})).collect())
    }

    async fn get_parent_link_children(&self, key: &str, field_name: &str) -> Result<Vec<String>> {
        self.calls
            .lock()
            .unwrap()
            .parent_links
            .push((key.to_string(), field_name.to_string()));
        Ok(self.parent_link_children.get(key).cloned().unwrap_or_default())
    }

    async fn get_field_by_name(&self, name: &str) -> Result<Option<FieldInfo>> {
        self.calls.lock().unwrap().field_lookups.push(name.to_string());
        Ok(self.fields.get(name).map(|id| FieldInfo {
            id: id.clone(),
            name: name.to_string(),
        }))
    }

    async fn get_edit_meta(&self, key: &str) -> Result<Value> {
        self.calls.lock().unwrap().edit_meta.push(key.to_string());
        self.edit_meta
            .get(key)
            .cloned()
            .ok_or_else(|| not_found(format!("/rest/api/2/issue/{key}/editmeta")))
    }
}
