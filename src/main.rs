//! stencil CLI entry point.

use std::path::Path;
use std::process::{Command, ExitCode};

use clap::Parser;
use console::style;
use stencil::cli::Cli;
use stencil::config::RegistrySetting;
use stencil::{download_template, DownloadOptions};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber for logging.
///
/// Log level is controlled by:
/// 1. `--debug`/`--verbose` flags set level to DEBUG
/// 2. `RUST_LOG` environment variable (if set)
/// 3. Default is WARN
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("stencil=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("stencil=warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();
}

/// Apply CLI flags over environment-derived defaults.
fn build_options(cli: &Cli) -> DownloadOptions {
    let mut options = DownloadOptions::from_env();

    options.dir = cli.dir.clone();
    options.cwd = cli.cwd.clone();
    options.force = cli.force;
    options.force_clean = cli.force_clean;
    options.offline = cli.offline;
    options.prefer_offline = cli.prefer_offline;
    if cli.auth.is_some() {
        options.auth = cli.auth.clone();
    }
    if cli.no_registry {
        options.registry = RegistrySetting::Disabled;
    } else if let Some(url) = &cli.registry {
        options.registry = RegistrySetting::Endpoint(url.clone());
    }

    options
}

fn spawn_shell(dir: &Path) {
    let shell = std::env::var("SHELL").unwrap_or_else(|_| "/bin/sh".to_string());
    if let Err(e) = Command::new(&shell).current_dir(dir).status() {
        eprintln!("Failed to spawn {shell}: {e}");
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug || cli.verbose);

    let Some(template) = cli.template.clone() else {
        eprintln!("{} missing template argument", style("error:").red().bold());
        eprintln!("Usage: stencil <template> [dir]");
        return ExitCode::from(1);
    };

    if cli.force_clean {
        eprintln!(
            "{} --force-clean deletes the existing destination",
            style("warning:").yellow().bold()
        );
    }

    match download_template(&template, build_options(&cli)) {
        Ok(result) => {
            println!(
                "{} Extracted {} to {}",
                style("✓").green(),
                style(&result.source).cyan(),
                result.dir.display()
            );
            if cli.shell {
                spawn_shell(&result.dir);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{} {e}", style("error:").red().bold());
            ExitCode::from(1)
        }
    }
}
