pub mod available;
pub mod config;
pub mod list;
pub mod packages;
pub mod update;
