//! Modules layer - Infrastructure components for external integrations
//!
//! Contains clients and adapters for external services. Business policy
//! (fallbacks, thresholds) lives in the feature services that use them.

pub mod ai;
