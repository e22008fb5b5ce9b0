//! # Workers
//! Initialise and starts the workers for the application

use apalis::{layers::ErrorHandlingLayer, prelude::*};
use apalis_cron::{CronStream, Schedule};
use eyre::Result;
use log::{error, info};
use std::{str::FromStr, time::Duration};
use tokio::signal::unix::SignalKind;

use crate::{
    constants::{
        WINDOW_SCHEDULER_CRON, WORKER_DEFAULT_CONCURRENCY, WORKER_DEFAULT_RATE_LIMIT,
        WORKER_DEFAULT_RATE_LIMIT_DURATION,
    },
    jobs::{
        export_handler, media_scan_handler, notification_handler, window_tick_handler,
        BackoffRetryPolicy, Queue,
    },
    AppState,
};

const NOTIFICATION_SENDER: &str = "notification_sender";
const MEDIA_SCANNER: &str = "media_scanner";
const EXPORT_GENERATOR: &str = "export_generator";
const WINDOW_SCHEDULER: &str = "window_scheduler";

/// Builds the queue workers and the cron scheduler and runs them under one
/// monitor until a shutdown signal arrives.
pub async fn initialize_workers(app_state: AppState, queue: Queue) -> Result<()> {
    let notification_queue_worker = WorkerBuilder::new(NOTIFICATION_SENDER)
        .layer(ErrorHandlingLayer::new())
        .enable_tracing()
        .catch_panic()
        .rate_limit(WORKER_DEFAULT_RATE_LIMIT, WORKER_DEFAULT_RATE_LIMIT_DURATION)
        .retry(BackoffRetryPolicy::default())
        .concurrency(WORKER_DEFAULT_CONCURRENCY)
        .data(app_state.clone())
        .backend(queue.notification_queue.clone())
        .build_fn(notification_handler);

    let media_queue_worker = WorkerBuilder::new(MEDIA_SCANNER)
        .layer(ErrorHandlingLayer::new())
        .enable_tracing()
        .catch_panic()
        .rate_limit(WORKER_DEFAULT_RATE_LIMIT, WORKER_DEFAULT_RATE_LIMIT_DURATION)
        .retry(BackoffRetryPolicy::default())
        .concurrency(WORKER_DEFAULT_CONCURRENCY)
        .data(app_state.clone())
        .backend(queue.media_queue.clone())
        .build_fn(media_scan_handler);

    let export_queue_worker = WorkerBuilder::new(EXPORT_GENERATOR)
        .layer(ErrorHandlingLayer::new())
        .enable_tracing()
        .catch_panic()
        .rate_limit(WORKER_DEFAULT_RATE_LIMIT, WORKER_DEFAULT_RATE_LIMIT_DURATION)
        .retry(BackoffRetryPolicy::default())
        .concurrency(WORKER_DEFAULT_CONCURRENCY)
        .data(app_state.clone())
        .backend(queue.export_queue.clone())
        .build_fn(export_handler);

    let schedule = Schedule::from_str(WINDOW_SCHEDULER_CRON)
        .map_err(|e| eyre::eyre!("Invalid scheduler cron expression: {}", e))?;
    let window_scheduler_worker = WorkerBuilder::new(WINDOW_SCHEDULER)
        .layer(ErrorHandlingLayer::new())
        .enable_tracing()
        .catch_panic()
        .data(app_state.clone())
        .backend(CronStream::new(schedule))
        .build_fn(window_tick_handler);

    Monitor::new()
        .register(notification_queue_worker)
        .register(media_queue_worker)
        .register(export_queue_worker)
        .register(window_scheduler_worker)
        .on_event(monitor_handle_event)
        .shutdown_timeout(Duration::from_millis(5000))
        .run_with_signal(async {
            let mut sigint = tokio::signal::unix::signal(SignalKind::interrupt())
                .expect("Failed to create SIGINT signal");
            let mut sigterm = tokio::signal::unix::signal(SignalKind::terminate())
                .expect("Failed to create SIGTERM signal");

            info!("Monitor started");

            tokio::select! {
                _ = sigint.recv() => info!("Received SIGINT."),
                _ = sigterm.recv() => info!("Received SIGTERM."),
            };

            info!("Monitor shutting down");

            Ok(())
        })
        .await?;

    info!("Monitor shutdown complete");
    Ok(())
}

fn monitor_handle_event(e: Worker<Event>) {
    let worker_id = e.id();
    match e.inner() {
        Event::Engage(task_id) => {
            info!("Worker [{worker_id}] got a job with id: {task_id}");
        }
        Event::Error(e) => {
            error!("Worker [{worker_id}] encountered an error: {e}");
        }
        Event::Exit => {
            info!("Worker [{worker_id}] exited");
        }
        Event::Idle => {
            info!("Worker [{worker_id}] is idle");
        }
        Event::Start => {
            info!("Worker [{worker_id}] started");
        }
        Event::Stop => {
            info!("Worker [{worker_id}] stopped");
        }
        _ => {}
    }
}
