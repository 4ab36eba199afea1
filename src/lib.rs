//! Lorekeeper: a game-encyclopedia answer worker.
//!
//! Consumes typed lookup requests from a message bus, resolves them against
//! the dofusdude catalogue API through a cache-aside aggregator and publishes
//! one answer per request.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
