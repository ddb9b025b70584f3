pub mod catalog;
pub mod config;
pub mod download;
pub mod extract;
pub mod installed;
pub mod listing;
pub mod packages;
pub mod transport;
pub mod updater;
