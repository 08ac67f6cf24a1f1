use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::generator::SiteGenerator;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Parsing(#[from] toml::de::Error),
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub build: BuildConfig,
}

impl Config {
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&data)?;

        Ok(config)
    }

    /// A generator set up with every path from `[build]`.
    pub fn generator(&self) -> SiteGenerator {
        let build = &self.build;
        SiteGenerator::new()
            .content_dir(&build.content)
            .output_dir(&build.output)
            .template(&build.template)
            .static_dir(&build.static_dir)
            .clean(build.clean)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct BuildConfig {
    /// Directory holding the markdown sources
    pub content: String,
    /// Where generated pages and assets go
    pub output: String,
    /// Page layout with `{{ Title }}` and `{{ Content }}` placeholders
    pub template: String,
    /// Assets copied into the output untouched
    pub static_dir: String,
    /// Remove the output directory before building
    pub clean: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            content: "./content".to_string(),
            output: "./public".to_string(),
            template: "./template.html".to_string(),
            static_dir: "./static".to_string(),
            clean: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let config: Config = toml::from_str("[build]\noutput = \"./dist\"\n").unwrap();
        assert_eq!(config.build.output, "./dist");
        assert_eq!(config.build.content, "./content");
        assert!(!config.build.clean);
    }

    #[test]
    fn empty_file_is_default() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn read_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[build]\nclean = true\nstatic_dir = \"assets\"").unwrap();

        let config = Config::read(file.path()).unwrap();
        assert!(config.build.clean);
        assert_eq!(config.build.static_dir, "assets");
    }

    #[test]
    fn bad_toml_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[build\nclean = ").unwrap();
        assert!(matches!(Config::read(file.path()), Err(ConfigError::Parsing(_))));
    }
}
