//! Request handlers.
//!
//! Both submodules drive the same [`SessionStore`](sessiond_core::store::SessionStore)
//! and differ only in how the session id reaches the server: an explicit
//! path segment (`sessions`) or the session cookie (`current_session`).

pub mod current_session;
pub mod sessions;
