use std::path::Path;
use std::process::ExitCode;

use frozen_archive::cli::main_with;
use frozen_archive::load_config::DEFAULT_CONFIG_PATH;

// Exit 0 tells the retention policy it may delete the bucket; anything else keeps it.
#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    ExitCode::from(main_with(Path::new(DEFAULT_CONFIG_PATH), std::env::args_os()).await)
}
