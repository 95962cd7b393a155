//! Process-level infrastructure shared by the relay's crates: configuration
//! parsing and global logger setup.

pub mod config;
pub mod logging;
