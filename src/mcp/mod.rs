//! MCP transport layer.
//!
//! Newline-delimited JSON-RPC 2.0 over stdio, routed to the tool dispatcher
//! and the resource catalog.

pub mod codec;
pub mod handler;
pub mod protocol;
pub mod server;

pub use handler::{McpHandler, SERVER_NAME};
pub use protocol::{JsonRpcRequest, JsonRpcResponse, RpcError, PROTOCOL_VERSION};
pub use server::McpServer;
