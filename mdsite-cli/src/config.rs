use anyhow::{Context, Result};
use clap::ArgMatches;
use config::{Config as ConfigBuilder, Environment};
use mdsite_core::Config;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "./mdsite.toml";

/// Settings for one command run, with the file they were read from
#[derive(Debug, Clone)]
pub struct Settings {
    pub config_file: PathBuf,
    pub site: Config,
}

impl Settings {
    /// Resolve the build settings for this run.
    ///
    /// Built-in defaults are overlaid by the config file, then by `MDSITE_*`
    /// variables, and a flag given on the command line beats all of them.
    pub fn load(args: &ArgMatches) -> Result<Self> {
        let config_file = arg(args, "config").unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string());

        // Defaults and the config file come in together; serde fills the gaps
        let file_config = if Path::new(&config_file).exists() {
            Config::read(&config_file)
                .with_context(|| format!("Failed to read config file: {config_file}"))?
        } else {
            Config::default()
        };

        let mut builder = ConfigBuilder::builder()
            .add_source(config::Config::try_from(&file_config)?)
            .add_source(
                Environment::with_prefix("MDSITE")
                    .prefix_separator("_")
                    .separator("__"), // MDSITE_BUILD__OUTPUT -> build.output
            );

        for (name, key) in [
            ("content", "build.content"),
            ("output", "build.output"),
            ("template", "build.template"),
            ("static", "build.static_dir"),
        ] {
            if let Some(value) = arg(args, name) {
                builder = builder.set_override(key, value)?;
            }
        }
        // Only a passed --clean overrides, its absence leaves the file value alone
        if matches!(args.try_get_one::<bool>("clean"), Ok(Some(true))) {
            builder = builder.set_override("build.clean", true)?;
        }

        let site: Config = builder.build()?.try_deserialize()?;

        Ok(Self {
            config_file: PathBuf::from(config_file),
            site,
        })
    }
}

// Not every subcommand defines every argument, so undefined ids read as unset
fn arg(args: &ArgMatches, name: &str) -> Option<String> {
    args.try_get_one::<String>(name).ok().flatten().cloned()
}
