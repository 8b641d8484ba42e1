//! Registry HTTP API
//!
//! Exposes the node's locked maps over HTTP. `NotFound` maps to 404,
//! `User` to 400 and `Internal` to 500.

pub mod handlers;
pub mod protocol;
