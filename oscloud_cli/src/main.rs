mod ui;

use crate::ui::cli;
use clap::Parser;
use oscloud_core::utils::logging::init_logging;

#[tokio::main]
async fn main() {
    let args = cli::Args::parse();
    init_logging(args.log_level());
    match cli::run_cli(args).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("oscloud error: {e:?}");
            std::process::exit(2);
        }
    }
}
