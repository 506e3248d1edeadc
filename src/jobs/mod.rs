pub mod backup_scheduler;
pub mod cache_janitor;
