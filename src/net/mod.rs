//! Networking modules for the sweets REST API.
//!
//! SYSTEM CONTEXT
//! ==============
//! `http` owns the reqwest client and bearer attachment, `api` exposes the
//! auth and catalog operations as traits, and `types` defines the wire schema.

pub mod api;
pub mod http;
pub mod types;
