//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the trend data client:
//! - Logging and tracing infrastructure
//! - Configuration management
//! - Event bus system
//!
//! ## Overview
//!
//! This crate contains the runtime utilities that the other core crates
//! depend on. It establishes the logging conventions, the dependency-injected
//! configuration and the event broadcasting used throughout the system.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
