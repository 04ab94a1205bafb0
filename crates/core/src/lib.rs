//! Domain logic for the session-tracking service.
//!
//! Everything in this crate is pure and synchronous: no HTTP, no sockets, no
//! host lookups. Time is read through [`clock::Clock`] so callers (and tests)
//! decide what "now" means.

pub mod clock;
pub mod display;
pub mod duration;
pub mod error;
pub mod network;
pub mod session;
pub mod store;
pub mod types;
