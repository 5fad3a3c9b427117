// src/main.rs

use pairdag::errors::PairdagError;
use pairdag::{cli, logging, run};

#[tokio::main]
async fn main() {
    let args = cli::parse();
    if let Err(err) = logging::init_logging(args.log_level) {
        eprintln!("pairdag error: {err:?}");
        std::process::exit(1);
    }

    if let Err(err) = run(args).await {
        report_and_exit(err);
    }
}

/// Configuration-class failures exit 1, result-integrity failures exit 2;
/// partial success is never reported as success.
fn report_and_exit(err: PairdagError) -> ! {
    eprintln!("pairdag error: {err}");
    std::process::exit(err.exit_code());
}
