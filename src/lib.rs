//! Orbitmarks, a personal bookmark manager for a 3D scene.
//!
//! The library exposes the REST server (`api`, `app`, `managers`, `database`)
//! and the client data layer (`client`) used by front ends and by the
//! integration tests.

pub mod api;
pub mod app;
pub mod client;
pub mod config;
pub mod database;
pub mod managers;
pub mod services;
pub mod types;
