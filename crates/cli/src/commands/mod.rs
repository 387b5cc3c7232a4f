pub mod config;
pub mod feedback;
