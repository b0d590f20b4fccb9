//! Shared types and configuration for Kasdes.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for type-safe entity references
//! - Amount helpers with decimal precision
//! - Pagination types for list endpoints
//! - Configuration management

pub mod config;
pub mod types;

pub use config::{AppConfig, CacheConfig, DatabaseConfig, ServerConfig};
