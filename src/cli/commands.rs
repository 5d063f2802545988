//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Records connector API command-line client
#[derive(Parser, Debug)]
#[command(name = "records-connector")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Settings file (JSON). Missing fields fall back to RECORDS_* environment variables
    #[arg(short, long, global = true)]
    pub settings: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Acquire an access token and show its type and expiry
    Token,

    /// Authenticated GET of a connector API resource, printed as JSON
    Get {
        /// Resource path below /connector/api, e.g. `ConnectorConfigurations/abc`
        path: String,

        /// Query parameter (repeatable)
        #[arg(short, long = "query", value_parser = parse_key_value)]
        query: Vec<(String, String)>,
    },

    /// List pending notifications
    Notifications {
        /// Connector id (defaults to the configured one)
        #[arg(long)]
        connector_id: Option<String>,
    },
}

/// Parse `key=value`
pub(crate) fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("connectorId=abc", Some(("connectorId", "abc")) ; "simple")]
    #[test_case("q=a=b", Some(("q", "a=b")) ; "value keeps later equals")]
    #[test_case("empty=", Some(("empty", "")) ; "empty value")]
    #[test_case("novalue", None ; "missing equals")]
    #[test_case("=x", None ; "missing key")]
    fn test_parse_key_value(raw: &str, expected: Option<(&str, &str)>) {
        let parsed = parse_key_value(raw).ok();
        assert_eq!(
            parsed,
            expected.map(|(k, v)| (k.to_string(), v.to_string()))
        );
    }

    #[test]
    fn test_parse_get_command() {
        let cli = Cli::try_parse_from([
            "records-connector",
            "--settings",
            "appsettings.json",
            "get",
            "Items/ExternalId/doc-1",
            "-q",
            "pagesize=5",
        ])
        .unwrap();

        assert_eq!(cli.settings, Some(PathBuf::from("appsettings.json")));
        match cli.command {
            Commands::Get { path, query } => {
                assert_eq!(path, "Items/ExternalId/doc-1");
                assert_eq!(query, vec![("pagesize".to_string(), "5".to_string())]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_verbose_is_global() {
        let cli = Cli::try_parse_from(["records-connector", "token", "-v"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Token));
    }
}
