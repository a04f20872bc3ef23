mod command_result;
pub mod extract;
pub mod init;
pub mod manifest;
pub mod prune;
pub mod revert;
pub mod scan;

pub use command_result::*;
