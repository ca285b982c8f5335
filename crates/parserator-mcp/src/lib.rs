//! Parserator MCP Server
//!
//! Model Context Protocol server that exposes Parserator to AI agent hosts
//! (Claude Desktop, Cline, etc.). Each tool maps onto the SDK's adapter
//! call and returns the normalized result JSON.
//!
//! Provides 4 MCP tools:
//! - `parserator_parse` - Parse text with a caller-supplied schema
//! - `parserator_parse_preset` - Parse text with a built-in preset
//! - `parserator_list_presets` - List presets and their schemas
//! - `parserator_health` - Probe the service
//!
//! # Example
//!
//! ```no_run
//! use parserator_mcp::McpServer;
//! use parserator_sdk::ClientConfig;
//!
//! let server = McpServer::new(ClientConfig::default().with_api_key("pk_live_...")).unwrap();
//! server.run().unwrap();
//! ```

#![warn(missing_docs)]

mod error;
mod protocol;
mod server;
mod tools;

pub use error::McpError;
pub use protocol::PROTOCOL_VERSION;
pub use server::McpServer;
