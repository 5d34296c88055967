//! Client data layer for Orbitmarks front ends.
//!
//! - [`http`]: typed wrappers around each REST endpoint
//! - [`cache`]: the bookmark list cache and the optimistic delete path
//! - [`layout_buffer`]: batching of drag results for the layout endpoint
//! - [`auth_gate`]: anonymous/authenticated state and login redirects
//! - [`scene`]: default node placement by category

pub mod auth_gate;
pub mod cache;
pub mod http;
pub mod layout_buffer;
pub mod scene;

pub use auth_gate::AuthGate;
pub use cache::{optimistic_delete, BookmarkCache};
pub use http::{ApiClient, BookmarkApi};
pub use layout_buffer::LayoutBuffer;
