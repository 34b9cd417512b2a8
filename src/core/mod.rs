//! Core application modules
//!
//! This module contains configuration, constants and logging.

pub mod config;
pub mod constants;
pub mod logging;
