use crate::config::{Auth, Config};
use crate::error::{Error, Result};
use crate::models::{FieldInfo, IssueListResponse};
use crate::tracker::{walk_descendants, DescendantOptions, DescendantWalk, IssueTracker, SearchQuery};
use async_trait::async_trait;
use itertools::Itertools;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

const API_PATH: &str = "/rest/api/2";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const PAGE_SIZE: u64 = 100;

pub struct JiraClient {
    client: reqwest::Client,
    base_url: String,
    auth: Auth,
}

impl JiraClient {
    pub fn new(config: &Config) -> Result<Self> {
        let auth = config.auth();
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/json"),
        );
        if let Auth::Bearer(token) = &auth {
            let mut value: reqwest::header::HeaderValue = format!("Bearer {token}").parse()?;
            value.set_sensitive(true);
            headers.insert(reqwest::header::AUTHORIZATION, value);
        }

        Ok(Self {
            client: reqwest::Client::builder()
                .default_headers(headers)
                .timeout(REQUEST_TIMEOUT)
                .build()?,
            base_url: config.url.trim_end_matches('/').to_string(),
            auth,
        })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, API_PATH, path)
    }

    async fn _get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = self.api_url(path);
        debug!(%url, ?query, "GET");

        let mut request = self.client.get(&url).query(query);
        if let Auth::Basic { username, secret } = &self.auth {
            request = request.basic_auth(username, Some(secret));
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Status { status, url, body });
        }
        Ok(response.json::<T>().await?)
    }

    /// Every issue matching `jql`, following `startAt` pagination.
    pub async fn get_jql(&self, jql: &str, fields: &str) -> Result<Vec<Value>> {
        let mut issues: Vec<Value> = Vec::new();
        let mut start_at = 0;

        loop {
            let issues_response = self
                ._get::<IssueListResponse>(
                    "/search",
                    &[
                        ("jql", jql.to_string()),
                        ("fields", fields.to_string()),
                        ("startAt", start_at.to_string()),
                        ("maxResults", PAGE_SIZE.to_string()),
                    ],
                )
                .await?;

            let total = issues_response.total;
            let page_size = issues_response.issues.len() as u64;

            issues.extend(issues_response.issues);
            start_at += page_size;

            if page_size == 0 || start_at >= total {
                break;
            }
        }

        Ok(issues)
    }
}

#[async_trait]
impl IssueTracker for JiraClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn search(&self, query: &SearchQuery) -> Result<IssueListResponse> {
        self._get(
            "/search",
            &[
                ("jql", query.jql.clone()),
                ("maxResults", query.max_results.to_string()),
                ("fields", query.fields.iter().join(",")),
            ],
        )
        .await
    }

    async fn get_issue(&self, key: &str, expand: Option<&str>) -> Result<Value> {
        let query: Vec<(&str, String)> = expand
            .map(|expand| ("expand", expand.to_string()))
            .into_iter()
            .collect();
        self._get(&format!("/issue/{key}"), &query).await
    }

    async fn get_descendants(
        &self,
        key: &str,
        options: &DescendantOptions,
    ) -> Result<DescendantWalk> {
        walk_descendants(self, key, options).await
    }

    async fn get_remote_links(&self, key: &str) -> Result<Vec<Value>> {
        self._get(&format!("/issue/{key}/remotelink"), &[]).await
    }

    async fn get_parent_link_children(&self, key: &str, field_name: &str) -> Result<Vec<String>> {
        let jql = format!("\"{}\" = {}", field_name.replace('"', "\\\""), key);
        let issues = self.get_jql(&jql, "key").await?;
        Ok(issues
            .iter()
            .filter_map(|issue| issue["key"].as_str().map(str::to_string))
            .collect())
    }

    async fn get_field_by_name(&self, name: &str) -> Result<Option<FieldInfo>> {
        let fields: Vec<FieldInfo> = self._get("/field", &[]).await?;
        Ok(fields.into_iter().find(|field| field.name == name))
    }

    async fn get_edit_meta(&self, key: &str) -> Result<Value> {
        self._get(&format!("/issue/{key}/editmeta"), &[]).await
    }
}
