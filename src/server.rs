//! MCP server wiring: one read-only tool per [`JiraTools`] operation.

use crate::params::{
    GetAncestorsParams, GetChildrenParams, GetDescendantsParams, GetIssueParams,
    GetLinkedIssuesParams, GetParentParams, IssueKeyParams, SearchIssuesParams,
};
use crate::tools::JiraTools;
use crate::tracker::IssueTracker;
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{
    handler::server::ServerHandler, tool, tool_handler, tool_router, ErrorData as McpError,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

pub const SERVER_NAME: &str = "JIRA Read-Only MCP Server";

const INSTRUCTIONS: &str = "You are a JIRA expert assistant with read-only access to a JIRA \
instance. Issue keys look like RFE-7877; call identifier_hint when unsure. Use search_issues \
to find issues, get_issue for details, and get_issue_relationships, get_children, \
get_descendants, get_linked_issues, get_parent or get_ancestors to navigate hierarchies \
(subtasks, epic links, Parent Link fields and issue links). Nothing here modifies JIRA.";

fn respond<T: Serialize>(
    tool: &str,
    result: crate::Result<T>,
) -> Result<CallToolResult, McpError> {
    match result {
        Ok(value) => Ok(CallToolResult::success(vec![Content::json(value)?])),
        Err(e) => {
            warn!(tool, error = %e, "Tool call failed");
            Err(McpError::internal_error(e.to_string(), None))
        }
    }
}

#[derive(Clone)]
pub struct JiraMcpServer {
    tools: Arc<JiraTools>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl JiraMcpServer {
    #[tool(
        description = "Search JIRA issues with JQL (e.g. `project = RFE AND status = Open`) or free text. Returns key, summary, status and URL for each hit.",
        annotations(read_only_hint = true, destructive_hint = false, idempotent_hint = true, open_world_hint = false)
    )]
    async fn search_issues(
        &self,
        Parameters(params): Parameters<SearchIssuesParams>,
    ) -> Result<CallToolResult, McpError> {
        respond(
            "search_issues",
            self.tools.search_issues(&params.query, params.max_results).await,
        )
    }

    #[tool(
        description = "Get one JIRA issue by key: summary, description, status and the raw JIRA payload.",
        annotations(read_only_hint = true, destructive_hint = false, idempotent_hint = true, open_world_hint = false)
    )]
    async fn get_issue(
        &self,
        Parameters(params): Parameters<GetIssueParams>,
    ) -> Result<CallToolResult, McpError> {
        respond(
            "get_issue",
            self.tools
                .get_issue(&params.issue_key, params.expand.as_deref())
                .await,
        )
    }

    #[tool(
        description = "Explain the JIRA issue identifier format (<PROJECT>-<NUMBER>, e.g. RFE-7877).",
        annotations(read_only_hint = true, destructive_hint = false, idempotent_hint = true, open_world_hint = false)
    )]
    async fn identifier_hint(&self) -> Result<CallToolResult, McpError> {
        Ok(CallToolResult::success(vec![Content::text(
            self.tools.identifier_hint(),
        )]))
    }

    #[tool(
        description = "Summarize every relationship of an issue: native parent, subtasks, issue links and the number of remote links.",
        annotations(read_only_hint = true, destructive_hint = false, idempotent_hint = true, open_world_hint = false)
    )]
    async fn get_issue_relationships(
        &self,
        Parameters(params): Parameters<IssueKeyParams>,
    ) -> Result<CallToolResult, McpError> {
        respond(
            "get_issue_relationships",
            self.tools.get_issue_relationships(&params.issue_key).await,
        )
    }

    #[tool(
        description = "List direct children of an issue: subtasks and, optionally, issues whose Parent Link field points at it.",
        annotations(read_only_hint = true, destructive_hint = false, idempotent_hint = true, open_world_hint = false)
    )]
    async fn get_children(
        &self,
        Parameters(params): Parameters<GetChildrenParams>,
    ) -> Result<CallToolResult, McpError> {
        let field = params.parent_link_field();
        respond(
            "get_children",
            self.tools
                .get_children(
                    &params.issue_key,
                    params.include_subtasks.unwrap_or(true),
                    params.include_parent_links.unwrap_or(false),
                    &field,
                )
                .await,
        )
    }

    #[tool(
        description = "Walk down from an issue breadth-first through subtasks, optionally issue links and Parent Link children, up to max_depth levels.",
        annotations(read_only_hint = true, destructive_hint = false, idempotent_hint = true, open_world_hint = false)
    )]
    async fn get_descendants(
        &self,
        Parameters(params): Parameters<GetDescendantsParams>,
    ) -> Result<CallToolResult, McpError> {
        let field = params.parent_link_field();
        respond(
            "get_descendants",
            self.tools
                .get_descendants(
                    &params.issue_key,
                    params.max_depth(),
                    params.include_subtasks.unwrap_or(true),
                    params.include_links.unwrap_or(false),
                    params.include_parent_links.unwrap_or(false),
                    &field,
                )
                .await,
        )
    }

    #[tool(
        description = "List the issue links of an issue with their direction, optionally only one link type (case-insensitive).",
        annotations(read_only_hint = true, destructive_hint = false, idempotent_hint = true, open_world_hint = false)
    )]
    async fn get_linked_issues(
        &self,
        Parameters(params): Parameters<GetLinkedIssuesParams>,
    ) -> Result<CallToolResult, McpError> {
        respond(
            "get_linked_issues",
            self.tools
                .get_linked_issues(&params.issue_key, params.link_type.as_deref())
                .await,
        )
    }

    #[tool(
        description = "Find the parent of an issue: subtask parent, then epic link or Parent Link fields discovered for the project and issue type, then the named parent-link field.",
        annotations(read_only_hint = true, destructive_hint = false, idempotent_hint = true, open_world_hint = false)
    )]
    async fn get_parent(
        &self,
        Parameters(params): Parameters<GetParentParams>,
    ) -> Result<CallToolResult, McpError> {
        let field = params.parent_link_field();
        respond(
            "get_parent",
            self.tools
                .get_parent(
                    &params.issue_key,
                    params.include_parent_links.unwrap_or(true),
                    &field,
                )
                .await,
        )
    }

    #[tool(
        description = "Walk up the parent chain of an issue, nearest ancestor first, up to max_depth levels. Stops at cycles.",
        annotations(read_only_hint = true, destructive_hint = false, idempotent_hint = true, open_world_hint = false)
    )]
    async fn get_ancestors(
        &self,
        Parameters(params): Parameters<GetAncestorsParams>,
    ) -> Result<CallToolResult, McpError> {
        let field = params.parent_link_field();
        respond(
            "get_ancestors",
            self.tools
                .get_ancestors(
                    &params.issue_key,
                    params.max_depth(),
                    params.include_parent_links.unwrap_or(true),
                    &field,
                )
                .await,
        )
    }
}

impl JiraMcpServer {
    pub fn new(tracker: Arc<dyn IssueTracker>, field_cache_ttl: Duration) -> Self {
        Self {
            tools: Arc::new(JiraTools::new(tracker, field_cache_ttl)),
            tool_router: Self::tool_router(),
        }
    }
}

#[tool_handler]
impl ServerHandler for JiraMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: SERVER_NAME.into(),
                version: env!("CARGO_PKG_VERSION").into(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(INSTRUCTIONS.into()),
        }
    }
}
