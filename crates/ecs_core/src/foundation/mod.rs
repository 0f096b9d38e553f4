//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the runtime:
//! - Math types for the render boundary
//! - Time measurement for system diagnostics
//! - Logging utilities

pub mod math;
pub mod time;
pub mod logging;
