//! Workspace placeholder crate.
//!
//! This crate exposes feature flags that map onto the individual workspace
//! crates (`core-service`, `core-trends`). Host applications can depend on
//! `trend-client-workspace` and pick a feature instead of wiring each crate
//! individually.

#[cfg(feature = "desktop-shims")]
pub use core_service;

#[cfg(feature = "trends-only")]
pub use core_trends;
