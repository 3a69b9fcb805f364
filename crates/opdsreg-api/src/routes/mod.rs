//! # Route Modules
//!
//! Each module defines an Axum Router for one API surface area.
//! Routers are merged in `lib.rs` into the application.

pub mod health;
pub mod libraries;
pub mod lookup;
