use anyhow::{Result, bail};
use clap::{Arg, ArgAction, Command};
use tracing_subscriber::EnvFilter;

mod cmd;
mod config;

fn cli() -> Command {
    Command::new("mdsite")
        .about("Turn a folder of markdown into a static site")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Log every block and file as it is processed")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .subcommand(cmd::build::make_subcommand())
        .subcommand(cmd::watch::make_subcommand())
        .subcommand(cmd::inspect::make_subcommand())
}

fn init_logging(verbose: bool) {
    // RUST_LOG wins unless -v asks for everything
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let matches = cli().get_matches();
    init_logging(matches.get_flag("verbose"));

    match matches.subcommand() {
        Some(("build", args)) => cmd::build::execute(args),
        Some(("watch", args)) => cmd::watch::execute(args),
        Some(("inspect", args)) => cmd::inspect::execute(args),
        Some((name, _)) => bail!("Unknown command: {name}"),
        None => bail!("No command given"),
    }
}
