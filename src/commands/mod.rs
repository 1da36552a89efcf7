//! Command implementations for the CLI
//!
//! - serve: Start the web server
//! - analyze: Analyze one image file from the terminal
//! - config: Configuration display and validation

pub mod analyze;
pub mod config;
pub mod serve;
