//! Command implementations.

mod init;
mod send;
mod status;

pub use init::cmd_init;
pub use send::cmd_send;
pub use status::cmd_status;
