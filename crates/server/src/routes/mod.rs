//! API route handlers.

pub mod actions;
pub mod collections;
pub mod health;
