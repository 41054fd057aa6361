//! Command handlers. Each translates parsed arguments into core calls and
//! renders the result; none holds generation logic.

pub mod completions;
pub mod config;
pub mod init;
pub mod mobile;
pub mod server;
pub mod status;

mod workspace;
