//! Data types shared across the translation engine.

pub mod citation;
pub mod config;
pub mod definitions;
pub mod field_name;
pub mod webpage;
