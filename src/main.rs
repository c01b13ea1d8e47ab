use clap::Parser;
use jira_mcp_server::cli::Cli;
use jira_mcp_server::config::{Config, FileConfig};
use jira_mcp_server::{JiraClient, JiraMcpServer};
use rmcp::ServiceExt;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // stdout carries the MCP protocol
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let file = FileConfig::load(cli.config.as_deref())?;
    let config = Config::resolve(cli.overrides(), file)?;

    tracing::info!(url = %config.url, "Starting JIRA MCP server");

    let client = JiraClient::new(&config)?;
    let server = JiraMcpServer::new(Arc::new(client), config.field_cache_ttl);
    server
        .serve(rmcp::transport::stdio())
        .await?
        .waiting()
        .await?;

    Ok(())
}
