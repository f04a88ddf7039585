//! Concrete checks
//!
//! - [`CommandCheck`] - run a program, inspect exit code and output
//! - [`TcpCheck`] - connect to a TCP endpoint

mod command;
mod tcp;

pub use command::CommandCheck;
pub use tcp::{DEFAULT_CONNECT_TIMEOUT, TcpCheck};
