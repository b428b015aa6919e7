use clap::Parser;
use cnid_core::ValidatorConfig;
use tracing_subscriber::EnvFilter;

mod cli;
mod cmd;
mod error;
mod format;
mod io;

pub use cli::{Cli, Command, OutputFormat, PathOrStdin};

use error::CliError;

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli);

    if let Err(e) = dispatch(&cli) {
        if !(cli.quiet && matches!(e, CliError::ValidationFailed { .. })) {
            eprintln!("{}", e.message());
        }
        std::process::exit(e.exit_code());
    }
}

/// Installs the stderr log subscriber.
///
/// `RUST_LOG` takes precedence; otherwise the level follows `--quiet` and
/// `--verbose`. JSON output mode switches the log lines to JSON as well.
fn init_tracing(cli: &Cli) {
    let default_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    match cli.format {
        OutputFormat::Json => builder.json().init(),
        OutputFormat::Human => builder
            .with_ansi(!cli.no_color && std::env::var_os("NO_COLOR").is_none())
            .init(),
    }
}

fn dispatch(cli: &Cli) -> Result<(), CliError> {
    match &cli.command {
        Command::Validate {
            ids,
            input,
            forward_excursion,
            backward_excursion,
        } => {
            let mut all = ids.clone();
            if let Some(source) = input {
                let content = io::read_input(source, cli.max_file_size)?;
                all.extend(io::parse_id_lines(&content));
            }
            let config = ValidatorConfig {
                override_root: cli.data_dir.clone(),
                forward_excursion: *forward_excursion,
                backward_excursion: *backward_excursion,
            };
            cmd::validate::run(
                &all,
                config,
                cli.format,
                cli.quiet,
                cli.verbose,
                cli.no_color,
            )
        }
        Command::Versions => {
            cmd::versions::run(cli.data_dir.clone(), cli.format, cli.quiet, cli.no_color)
        }
        Command::Version => {
            println!("{}", cnid_core::version());
            Ok(())
        }
    }
}
