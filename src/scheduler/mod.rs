//! Cron jobs for housekeeping tasks.

pub mod log_pruning;
