pub mod app;
pub mod batch;
pub mod cli;
pub mod config;
pub mod logging;
pub mod report;
