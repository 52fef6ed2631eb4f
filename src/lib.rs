pub mod cli;
pub mod load_config;
pub mod logging;

pub use cli::{main_with, parse_args, run, Cli, ParseOutcome};
