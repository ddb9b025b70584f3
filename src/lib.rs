//! blupd8 library
//!
//! Finds the newest release of a project on a directory-listing server,
//! downloads the matching package and unpacks it into a versioned install
//! directory. The `blupd8` binary is a thin CLI over [`core::updater::Updater`].

pub mod commands;
pub mod core;
pub mod error;
pub mod utils;
