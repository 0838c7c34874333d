//! Tool infrastructure — registry metadata and input schemas.
//!
//! The adapter owns tool *metadata* and argument validation. Everything a tool
//! actually computes happens in the PatternStack API.

pub mod catalog;
pub mod schemas;

pub use catalog::{Tier, ToolDescriptor, ToolEntry, ToolRegistry, TOOLS};
pub use schemas::{input_schema, Ecosystem, SchemaValidator};
