mod cli;
mod input;
mod output;
mod utils;

use anyhow::{Context, Result};
use clap::Parser;
use radiomail_core::{Driver, Session, UdpAir};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::cli::Cli;
use crate::output::{OutputFormat, render_event};
use crate::utils::print_info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Set up logging
    setup_logging(&cli);

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Table
    };

    let config = cli.radio_config();
    info!("Radio configuration: {config:?}");

    let air = UdpAir::bind(config, cli.air_port)
        .await
        .with_context(|| {
            format!(
                "Failed to join the simulated air as node {address} (base port {port})",
                address = cli.address,
                port = cli.air_port
            )
        })?;

    if format == OutputFormat::Table {
        print_info(&format!(
            "Welcome to radiomail. Listening on address {address}.",
            address = cli.address
        ));
        print_info("Run 'address <new_address>' to move to another address. Run 'help' for more.");
    }

    let mut driver =
        Driver::new(Session::new(air), input::spawn_stdin_reader()).exit_on_eof(cli.exit_on_eof);

    driver
        .run(|event| {
            render_event(&event, format);
            Ok(())
        })
        .await
}

fn setup_logging(cli: &Cli) {
    let filter_level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_level));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}
