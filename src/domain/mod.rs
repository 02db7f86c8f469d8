pub mod clock;
pub mod error;
pub mod repository;
pub mod rollover;
pub mod task;
