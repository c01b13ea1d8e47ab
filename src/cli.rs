use crate::config::FileConfig;
use clap::Parser;
use std::path::PathBuf;

/// Read-only MCP server for JIRA, speaking MCP over stdio.
#[derive(Debug, Parser)]
#[command(name = "jira-mcp-server", version, about)]
pub struct Cli {
    /// YAML or JSON config file (defaults to $MCP_JIRA_CONFIG, then ./mcp_jira_server.yaml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Base URL of the JIRA instance, e.g. https://issues.example.com
    #[arg(long, env = "JIRA_URL")]
    pub url: Option<String>,

    #[arg(long, env = "JIRA_USERNAME")]
    pub username: Option<String>,

    #[arg(long, env = "JIRA_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// API token, used together with --username
    #[arg(long, env = "JIRA_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Personal access token sent as a bearer token
    #[arg(long, env = "JIRA_BEARER_TOKEN", hide_env_values = true)]
    pub bearer_token: Option<String>,

    /// Seconds to remember discovered parent-link fields
    #[arg(long, env = "JIRA_FIELD_CACHE_TTL")]
    pub field_cache_ttl: Option<u64>,
}

impl Cli {
    /// The flags as a config layer to put on top of the file.
    pub fn overrides(&self) -> FileConfig {
        FileConfig {
            url: self.url.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            token: self.token.clone(),
            bearer_token: self.bearer_token.clone(),
            field_cache_ttl: self.field_cache_ttl,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_flags() {
        let cli = Cli::try_parse_from([
            "jira-mcp-server",
            "--config",
            "/path/to/config.yaml",
            "--url",
            "https://cli.jira.com",
            "--username",
            "cliuser",
            "--password",
            "clipass",
            "--token",
            "clitoken",
            "--bearer-token",
            "clibearer",
            "--field-cache-ttl",
            "60",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("/path/to/config.yaml")));
        assert_eq!(
            cli.overrides(),
            FileConfig {
                url: Some("https://cli.jira.com".into()),
                username: Some("cliuser".into()),
                password: Some("clipass".into()),
                token: Some("clitoken".into()),
                bearer_token: Some("clibearer".into()),
                field_cache_ttl: Some(60),
            }
        );
    }

    #[test]
    fn rejects_non_numeric_ttl() {
        assert!(Cli::try_parse_from(["jira-mcp-server", "--field-cache-ttl", "soon"]).is_err());
    }
}
