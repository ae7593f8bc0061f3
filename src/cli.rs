mod args;

pub use args::{Cli, FailOn, OutputFormat};
