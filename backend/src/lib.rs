//! Backend for a visual neural-network architecture builder.
//!
//! Serves the catalog of layer types (with their parameter schemas and icons) and keeps
//! the networks clients assemble in memory.

pub mod ai;
pub mod api;
pub mod config;
pub mod error;
