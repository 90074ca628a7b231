//! Sheets MCP Server - Rust Implementation
//!
//! A Model Context Protocol (MCP) server for Google Sheets integration.
//! Runs as a stdio tool server by default, or as an HTTP/REST API with the
//! `http` subcommand.

use std::sync::Arc;

use clap::{Parser, Subcommand};

use sheets_mcp_server_rust::config::Config;
use sheets_mcp_server_rust::error::Result;
use sheets_mcp_server_rust::http::keys::ApiKeys;
use sheets_mcp_server_rust::http::server::{self as http_server, AppState};
use sheets_mcp_server_rust::mcp::server::McpServer;
use sheets_mcp_server_rust::registry::ToolRegistry;
use sheets_mcp_server_rust::sheets::auth::Authenticator;
use sheets_mcp_server_rust::sheets::client::SheetsClient;

/// Sheets MCP Server
#[derive(Parser)]
#[command(name = "sheets-mcp-server")]
#[command(author, version, about = "Google Sheets tool server (MCP stdio + HTTP API)")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API server instead of the stdio server
    Http {
        /// Host to bind to
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Port to bind to
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },

    /// Verify the service-account credential end to end
    CheckAuth,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logging goes to stderr; stdout belongs to the stdio protocol
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = Config::new()?;

    if !config.service_account_key_exists() {
        eprintln!("Error: service account key file not found.");
        eprintln!(
            "Set SERVICE_ACCOUNT_PATH or place the key at {}",
            config.service_account_path.display()
        );
        std::process::exit(1);
    }

    match cli.command {
        Some(Commands::Http { host, port }) => run_http_server(config, &host, port).await,
        Some(Commands::CheckAuth) => check_auth(config).await,
        None => run_stdio_server(config).await,
    }
}

/// Wire up the shared registry from the configuration
fn build_registry(config: &Config) -> Result<Arc<ToolRegistry>> {
    let authenticator = Arc::new(Authenticator::new(config)?);
    let client = Arc::new(SheetsClient::new(
        authenticator,
        config.drive_folder_id.clone(),
    ));
    Ok(Arc::new(ToolRegistry::new(client)))
}

async fn run_stdio_server(config: Config) -> Result<()> {
    let registry = build_registry(&config)?;
    let mut server = McpServer::new(registry);
    server.run_stdio().await
}

async fn run_http_server(config: Config, host: &str, port: u16) -> Result<()> {
    let api_keys = Arc::new(ApiKeys::load(&config.api_keys_path)?);
    let registry = build_registry(&config)?;

    let state = AppState { registry, api_keys };
    http_server::run(host, port, state).await
}

/// Mint a token and list a few spreadsheets to prove the credential works
async fn check_auth(config: Config) -> Result<()> {
    let authenticator = Arc::new(Authenticator::new(&config)?);
    eprintln!("Service account: {}", authenticator.client_email());

    authenticator.get_access_token().await?;
    eprintln!("Token exchange: OK");

    let client = SheetsClient::new(authenticator, config.drive_folder_id.clone());
    let files = client.list_spreadsheets(None).await?;
    eprintln!("Visible spreadsheets: {}", files.len());
    for file in files.iter().take(5) {
        eprintln!("  {} ({})", file.name, file.id);
    }

    Ok(())
}
