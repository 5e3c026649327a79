//! Support library for the `dupes` and `until-term` binaries.

pub mod config;
pub mod files;
pub mod telemetry;
