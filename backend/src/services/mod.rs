pub mod holds;
pub mod jobs;
pub mod reports;
