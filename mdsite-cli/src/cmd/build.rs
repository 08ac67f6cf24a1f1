use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use mdsite_core::BuildReport;
use tracing::info;

use crate::config::{DEFAULT_CONFIG_FILE, Settings};

pub fn add_build_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file")
                .default_value(DEFAULT_CONFIG_FILE),
        )
        .arg(
            Arg::new("content")
                .long("content")
                .value_name("DIR")
                .help("Directory containing markdown files [default: ./content]"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("DIR")
                .help("Output directory for generated site [default: ./public]"),
        )
        .arg(
            Arg::new("template")
                .short('t')
                .long("template")
                .value_name("FILE")
                .help("Page template with {{ Title }} and {{ Content }} [default: ./template.html]"),
        )
        .arg(
            Arg::new("static")
                .long("static")
                .value_name("DIR")
                .help("Directory copied into the output as-is [default: ./static]"),
        )
        .arg(
            Arg::new("clean")
                .long("clean")
                .help("Remove the output directory before building")
                .action(ArgAction::SetTrue),
        )
}

pub fn make_subcommand() -> Command {
    add_build_args(Command::new("build")).about("Build static site from markdown files")
}

pub fn execute(args: &ArgMatches) -> Result<()> {
    let settings = Settings::load(args)?;
    let report = build(&settings)?;

    println!(
        "Site built successfully in {} ({} pages, {} assets)",
        settings.site.build.output,
        report.pages.len(),
        report.assets
    );

    Ok(())
}

/// Run one build with the given settings. Shared with `watch`.
pub fn build(settings: &Settings) -> Result<BuildReport> {
    info!("Building from {}", settings.site.build.content);

    settings
        .site
        .generator()
        .build()
        .context("Site build failed")
}
