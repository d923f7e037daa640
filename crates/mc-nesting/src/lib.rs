pub mod candidates;
pub mod compact;
pub mod config;
pub mod error;
pub mod filler;
pub mod layout;
pub mod placer;
pub mod scheduler;

pub use config::NestingConfig;
pub use error::NestingError;
pub use layout::ScheduleSummary;
pub use scheduler::{
    OrderRanges, ScheduleOutcome, schedule, schedule_with_progress, validate_inputs,
};
