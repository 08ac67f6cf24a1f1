use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use std::path::PathBuf;

pub fn make_subcommand() -> Command {
    Command::new("inspect")
        .about("Print the parsed structure of a markdown file as JSON")
        .arg(
            Arg::new("file")
                .value_name("FILE")
                .help("Markdown file to inspect")
                .required(true)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("blocks")
                .long("blocks")
                .help("Show classified blocks instead of the node tree")
                .action(ArgAction::SetTrue),
        )
}

pub fn execute(args: &ArgMatches) -> Result<()> {
    let file = args
        .get_one::<PathBuf>("file")
        .context("No file given")?;
    let markdown = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    println!("{}", inspect(&markdown, args.get_flag("blocks"))?);

    Ok(())
}

fn inspect(markdown: &str, blocks_only: bool) -> Result<String> {
    let json = if blocks_only {
        serde_json::to_string_pretty(&mdsite_core::blocks(markdown))?
    } else {
        let root = mdsite_core::markdown_to_node(markdown).context("Conversion failed")?;
        serde_json::to_string_pretty(&root)?
    };

    Ok(json)
}
