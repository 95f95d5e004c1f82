//! Vendor Assist — vendor-onboarding workflow core.
//!
//! Pairs a step-state machine for the onboarding conversation with a
//! namespaced semantic retrieval subsystem, exposed to an external
//! conversational driver through a typed tool-dispatch contract.

pub mod config;
pub mod context;
pub mod error;
pub mod orchestrator;
pub mod retrieval;
pub mod session;
pub mod tools;
