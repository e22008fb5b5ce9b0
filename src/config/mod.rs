//! Configuration management for the job-processing service.

mod server_config;
pub use server_config::*;
