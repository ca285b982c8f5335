//! Parserator MCP Server - Main entry point

use parserator_mcp::McpServer;
use parserator_sdk::ClientConfig;
use std::env;
use tracing_subscriber::EnvFilter;

fn main() {
    // Log to stderr; stdout carries JSON-RPC
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut config = ClientConfig::default();
    if let Ok(base_url) = env::var("PARSERATOR_BASE_URL") {
        config.base_url = base_url;
    }
    if let Ok(api_key) = env::var("PARSERATOR_API_KEY") {
        config.api_key = Some(api_key);
    }

    let server = match McpServer::new(config) {
        Ok(server) => server,
        Err(e) => {
            eprintln!("Failed to create MCP server: {}", e);
            std::process::exit(1);
        }
    };

    // Run server (blocks until stdin closes)
    if let Err(e) = server.run() {
        eprintln!("MCP server error: {}", e);
        std::process::exit(1);
    }
}
