pub mod backend;
pub mod config;
pub mod credentials;
pub mod errors;
pub mod logging;
pub mod types;
pub mod ui;
pub mod workflow;
