//! Integration and unit tests for the Assets+ server.
//!
//! ## Test Modules
//!
//! - **api_tests**: panel API through the full router
//! - **error_tests**: error mapping and JSON error bodies
//! - **config_tests**: configuration loading and validation
//! - **health_api_tests**: health, readiness, metrics and version endpoints
//!
//! Individual test modules can be run with:
//! ```bash
//! cargo test api_tests
//! ```

pub mod support;
pub mod api_tests;
