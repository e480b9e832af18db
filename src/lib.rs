pub mod api;
pub mod board;
pub mod cli;
pub mod config;
pub mod error;
pub mod shutdown;
pub mod source;
pub mod worker;
