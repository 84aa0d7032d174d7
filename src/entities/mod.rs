pub mod ai_context;
pub mod day_log;
pub mod goal;
pub mod job_metrics;
pub mod progress_log;
pub mod task;
pub mod user;
