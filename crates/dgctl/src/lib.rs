pub mod cmd_adjust;
pub mod cmd_inspect;
pub mod cmd_rpc;
pub mod cmd_size;
pub mod common;
