//! xtab command-line interface.

#![deny(unsafe_code)]

use std::io::{self, IsTerminal};

use anyhow::{Context, Result};
use clap::{ColorChoice, Parser};
use tracing::level_filters::LevelFilter;
use xtab_cli::commands::{run_dpm, run_render, run_verify, write_dpm};
use xtab_cli::logging::{LogConfig, LogFormat, init_logging};
use xtab_cli::types::RenderResult;
use xtab_layout::{RenderOptions, render_text};
use xtab_model::ParentChildOrder;

mod cli;
mod summary;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg, RenderArgs, RenderFormatArg};
use crate::summary::{print_render_summary, print_verify_summary};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match &cli.command {
        Command::Render(args) => match render(args) {
            Ok(result) => i32::from(result.has_errors()),
            Err(error) => report(&error),
        },
        Command::Dpm(args) => {
            let options = render_options(args.order.order_override());
            match run_dpm(&args.package_dir, &args.table, &options)
                .and_then(|map| write_dpm(&map, args.output.as_deref()))
            {
                Ok(()) => 0,
                Err(error) => report(&error),
            }
        }
        Command::Verify(args) => match run_verify(&args.package_dir) {
            Ok(summary) => {
                print_verify_summary(&summary);
                0
            }
            Err(error) => report(&error),
        },
    };
    std::process::exit(exit_code);
}

fn render(args: &RenderArgs) -> Result<RenderResult> {
    let options = render_options(args.order.order_override());
    let result = run_render(&args.package_dir, args.table.as_deref(), &options)?;
    match args.format {
        RenderFormatArg::Text => {
            for layout in result.layouts() {
                println!("{}", render_text(layout));
            }
            print_render_summary(&result);
        }
        RenderFormatArg::Json => {
            let layouts: Vec<_> = result.layouts().collect();
            let json = serde_json::to_string_pretty(&layouts).context("serialize layouts")?;
            println!("{json}");
            for outcome in &result.tables {
                if let Err(error) = &outcome.layout {
                    eprintln!("error: {error}");
                }
            }
        }
    }
    Ok(result)
}

fn render_options(order_override: Option<ParentChildOrder>) -> RenderOptions {
    RenderOptions { order_override }
}

fn report(error: &anyhow::Error) -> i32 {
    eprintln!("error: {error:#}");
    1
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
