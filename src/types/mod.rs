// Orbitmarks shared type definitions
// Each submodule defines types used across the server and the client data layer.

pub mod bookmark;
pub mod errors;
pub mod session;
pub mod settings;
pub mod user;
