//! Planner integration tests
//!
//! End-to-end runs of [`crate::Planner`] against literal fixtures:
//! - Descriptor parsing and manifest location
//! - Master / media playlist handling
//! - Input and stream selection
//! - Rendered engine arguments and file names
