//! # PatternStack MCP - protocol adapter for the PatternStack API
//!
//! Exposes a fixed catalog of dependency/stack intelligence tools and a few
//! documentation resources over MCP. Tool calls are validated, forwarded to
//! the PatternStack API with a per-tool deadline, and the JSON result is
//! rendered as text. No analysis happens locally.
//!
//! ## Architecture
//!
//! ```text
//!                   ┌──────────────────────────────────────┐
//!  stdin (JSON-RPC) │  McpServer ──► McpHandler            │
//!  ───────────────► │                  │                   │
//!                   │      ┌───────────┴──────────┐        │
//!                   │      ▼                      ▼        │
//!                   │  Dispatcher           ResourceCatalog│
//!                   │   │  ToolRegistry         (docs)     │
//!                   │   ▼                                  │
//!                   │  ToolTransport ──► PatternStack API  │
//!                   │   │                                  │
//!                   │   ▼                                  │
//!                   │  format::render ──► text             │
//!                   └──────────────────────────────────────┘
//! ```

// Enforce strict safety at compile time
#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]

pub mod dispatch;
pub mod format;
pub mod mcp;
pub mod resources;
pub mod tools;
pub mod types;
pub mod upstream;

// Internal utilities
pub mod observability;

pub use dispatch::{Dispatcher, ToolOutput};
pub use types::{Config, Error, Result};
