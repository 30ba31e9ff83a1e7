//! Client-side stores.
//!
//! SYSTEM CONTEXT
//! ==============
//! Each store is a plain owned value. `app::Shop` holds exactly one of each
//! for the lifetime of the running client; nothing here is module-level
//! global state.

pub mod admin;
pub mod cart;
pub mod catalog;
pub mod notice;
pub mod sequence;
pub mod session;
pub mod storage;
