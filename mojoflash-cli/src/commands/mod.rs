//! CLI command implementations.

mod completions;
mod ports;
mod upload;

pub(crate) use completions::cmd_completions;
pub(crate) use ports::cmd_list_ports;
pub(crate) use upload::cmd_upload;
