pub mod exec;
pub mod init;
pub mod split;

pub use exec::{exec_command, RunFlags};
pub use init::init_command;
pub use split::split_command;
