//! Club Management Backend: Async Job Core
//!
//! This library implements the job-processing subsystem of a club-management
//! backend: a durable Redis-backed queue plus the producers and workers that
//! deliver notifications, scan uploaded binaries for malware, and generate
//! large exports off the request path. It includes:
//!
//! - Per-queue storages with retry/backoff and at-least-once consumption
//! - Notification fan-out from group specifications into per-recipient jobs
//! - Persisted, pollable record status for notifications, media and exports
//! - Best-effort audit events emitted by workers
//!
//! # Module Structure
//!
//! - `config`: environment-driven configuration
//! - `logging`: logging setup with rolled log files
//! - `models`: record types and status state machines
//! - `repositories`: record stores
//! - `jobs`: queues, producers, workers
//! - `services`: producer APIs and ports to external collaborators
//! - `init`: application wiring

pub mod config;
pub mod constants;
pub mod init;
pub mod jobs;
pub mod logging;
pub mod models;
pub mod repositories;
pub mod services;
pub mod utils;

pub use models::AppState;
