pub mod application;
pub mod ids;
pub mod job;
pub mod stats;
pub mod user;
