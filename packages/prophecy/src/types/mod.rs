//! Data types for the estimation pipeline.

pub mod config;
pub mod features;
pub mod geography;
pub mod prediction;
pub mod record;
