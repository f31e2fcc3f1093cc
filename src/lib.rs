//! # Assets+ Backend Library
//!
//! Server side of the Assets+ panel: a media gallery over the `output` and
//! `input` directories of a generator host. It lists files newest first with
//! cursor paging and live polling, renders cached thumbnails, exposes the
//! workflow embedded in generated PNGs and removes files by trashing,
//! deleting or hiding them.
//!
//! ## Architecture
//!
//! - **Axum**: HTTP server and routing
//! - **Tokio**: async runtime; filesystem walks and image decoding run on the
//!   blocking pool
//! - **assets-plus-gallery**: wire types shared with the web UI
//!
//! ## Core Components
//!
//! - [`config`]: layered server configuration and the user `config.json`
//! - [`error`]: centralized error handling and HTTP error responses
//! - [`library`]: directory scan and cursor paging
//! - [`paths`]: relpath resolution that never leaves a root
//! - [`hidden`]: hidden-marker side index
//! - [`metadata`]: PNG text-chunk workflow extraction
//! - [`thumbs`]: thumbnail rendering and cache
//! - [`removal`]: trash/delete/hide semantics
//! - [`i18n`]: message catalogs
//! - [`metrics`]: request counters
//! - [`middleware`]: auth, rate limiting, validation and security headers
//! - [`routes`]: HTTP endpoint handlers
//! - [`state`]: shared application state

pub mod config;
pub mod error;
pub mod hidden;
pub mod i18n;
pub mod library;
pub mod metadata;
pub mod metrics;
pub mod middleware;
pub mod paths;
pub mod removal;
pub mod routes;
pub mod state;
pub mod thumbs;
pub mod types;

#[cfg(test)]
mod tests;
