//! Tool abstraction — the contract between the conversational driver and
//! the onboarding core.

pub mod builtin;
pub mod registry;
pub mod tool;

pub use registry::ToolRegistry;
pub use tool::*;
