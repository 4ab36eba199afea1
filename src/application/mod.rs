//! Application services: request dispatch, source aggregation and mapping.

pub mod consumer;
pub mod dispatcher;
pub mod equipments;
pub mod error;
pub mod mappers;
pub mod sources;
