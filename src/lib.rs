//! Read-only MCP server for JIRA.
//!
//! Besides search and issue lookup, the server resolves issue hierarchies:
//! subtask parents, epic links and Advanced Roadmaps "Parent Link" fields
//! (discovered per project and issue type from edit metadata), issue links,
//! and breadth-first walks up and down those relationships.
//!
//! # Tools
//! - `search_issues`, `get_issue`, `identifier_hint`
//! - `get_issue_relationships`, `get_linked_issues`
//! - `get_parent`, `get_ancestors`
//! - `get_children`, `get_descendants`

pub mod cli;
pub mod config;
pub mod discovery;
pub mod error;
pub mod jira_client;
pub mod links;
pub mod models;
pub mod params;
pub mod parent;
pub mod schema_cache;
pub mod server;
pub mod tools;
pub mod tracker;

#[cfg(test)]
mod testing;

pub use error::{Error, Result};
pub use jira_client::JiraClient;
pub use server::JiraMcpServer;
pub use tools::JiraTools;
