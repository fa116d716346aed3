//! Configuration module for keycask
//!
//! This module provides configuration management including:
//! - XDG-compliant path resolution
//! - User settings persistence

pub mod paths;
pub mod settings;

pub use paths::KeycaskPaths;
pub use settings::{PasswordGenerationSettings, Settings};
