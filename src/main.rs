use anyhow::Result;
use clap::Parser;
use incus_inventory::cli::Cli;
use incus_inventory::cli::inventory::{run, usage, usage_exit_code};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // stdout carries the inventory JSON, so diagnostics go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("INCUS_INVENTORY_LOG")
                .unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = usage_exit_code(&err);
            if code == 0 {
                err.exit();
            }
            let program = std::env::args()
                .next()
                .unwrap_or_else(|| "incus-inventory".to_string());
            eprintln!("{}", usage(&program));
            std::process::exit(code);
        }
    };

    let stdout = std::io::stdout();
    run(&cli, &mut stdout.lock())
}
