//! CLI-specific utilities for yyc-route
//!
//! Terminal output for the command-line interface, kept apart from the library.

pub mod progress;
pub mod render;

pub use progress::SpinnerIndicator;
