// minipack command line entry point

use minipack::cli::CliHandler;
use minipack::utils::BuildReporter;

#[tokio::main]
async fn main() {
    let handler = CliHandler::new();

    if let Err(e) = handler.run().await {
        BuildReporter::new().show_failure(&e.format_detailed());
        std::process::exit(1);
    }
}
