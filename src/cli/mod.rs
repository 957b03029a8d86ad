//! Command-line interface module.

mod args;
pub mod demo;

pub use args::{Cli, Commands, DemoArgs};
