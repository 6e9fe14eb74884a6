mod admin;
mod init;
mod seed;

pub use admin::{cmd_admin_add, cmd_admin_link, cmd_admin_list, cmd_admin_remove};
pub use init::cmd_init;
pub use seed::cmd_seed;
