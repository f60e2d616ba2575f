pub mod command;
pub mod runner;

pub use command::ServerCommand;
pub use runner::{ProcessRunner, RestartPolicy, ServerRunner};
