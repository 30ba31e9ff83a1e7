//! Sweetshop client: session, role-gated navigation, cart, and inventory
//! administration against the sweets REST API.
//!
//! SYSTEM CONTEXT
//! ==============
//! The REST backend lives elsewhere. This crate owns only client-side state:
//! `state::session` decodes the bearer token into an identity, `router`
//! decides which screens that identity may open, `state::cart` keeps the
//! shopping cart, and `state::admin` drives catalog mutations. `app::Shop`
//! composes them into one explicitly owned object.

pub mod app;
pub mod config;
pub mod net;
pub mod router;
pub mod shell;
pub mod state;

#[cfg(test)]
mod test_support;
