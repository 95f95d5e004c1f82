//! Built-in tools: the vendor-onboarding action set.

pub mod onboarding;

pub use onboarding::register_onboarding_tools;
