use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::render::{ConvertError, markdown_to_html};
use crate::template::{PageTemplate, TemplateError};
use crate::title::{TitleError, extract_title};

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("Directory does not exist: {}", .0.display())]
    MissingDir(PathBuf),
    #[error("Invalid path: {}", .0.display())]
    InvalidPath(PathBuf),
    #[error(
        "Refusing to clean {}: it contains the content directory {}",
        .output.display(),
        .content.display()
    )]
    OutputOverlapsContent { output: PathBuf, content: PathBuf },
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error("{}: {source}", .path.display())]
    Title {
        path: PathBuf,
        #[source]
        source: TitleError,
    },
    #[error("{}: {source}", .path.display())]
    Convert {
        path: PathBuf,
        #[source]
        source: ConvertError,
    },
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> GenerateError + '_ {
    move |source| GenerateError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// What a build produced.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub pages: Vec<PathBuf>,
    pub assets: usize,
}

pub struct SiteGenerator {
    content_dir: PathBuf,
    output_dir: PathBuf,
    template: PathBuf,
    static_dir: Option<PathBuf>,
    clean: bool,
}

impl Default for SiteGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl SiteGenerator {
    pub fn new() -> Self {
        Self {
            content_dir: PathBuf::from("./content"),
            output_dir: PathBuf::from("./public"),
            template: PathBuf::from("./template.html"),
            static_dir: None,
            clean: false,
        }
    }

    pub fn content_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.content_dir = path.as_ref().to_path_buf();
        self
    }

    pub fn output_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.output_dir = path.as_ref().to_path_buf();
        self
    }

    pub fn template<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.template = path.as_ref().to_path_buf();
        self
    }

    pub fn static_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.static_dir = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn clean(mut self, clean: bool) -> Self {
        self.clean = clean;
        self
    }

    /// Generate the whole site.
    ///
    /// Every `.md` file under the content directory becomes an `.html` file at
    /// the same relative path in the output directory. Files are visited in
    /// name order so repeated builds write pages in the same sequence.
    pub fn build(&self) -> Result<BuildReport, GenerateError> {
        if !self.content_dir.is_dir() {
            return Err(GenerateError::MissingDir(self.content_dir.clone()));
        }

        let template = PageTemplate::load(&self.template)?;

        if self.clean && self.output_dir.exists() {
            self.check_clean_target()?;
            info!("Cleaning {}", self.output_dir.display());
            std::fs::remove_dir_all(&self.output_dir).map_err(io_error(&self.output_dir))?;
        }
        std::fs::create_dir_all(&self.output_dir).map_err(io_error(&self.output_dir))?;

        let assets = match &self.static_dir {
            Some(dir) if dir.is_dir() => copy_static(dir, &self.output_dir)?,
            Some(dir) => {
                warn!("Static directory {} not found, skipping", dir.display());
                0
            }
            None => 0,
        };

        let mut report = BuildReport {
            pages: Vec::new(),
            assets,
        };

        for entry in WalkDir::new(&self.content_dir).sort_by_file_name() {
            let entry = entry?;
            let path = entry.path();
            if !entry.file_type().is_file() || !is_markdown(path) {
                continue;
            }

            let relative = path
                .strip_prefix(&self.content_dir)
                .map_err(|_| GenerateError::InvalidPath(path.to_path_buf()))?;
            let dest = self.output_dir.join(relative).with_extension("html");

            generate_page(path, &template, &dest)?;
            report.pages.push(dest);
        }

        info!(
            pages = report.pages.len(),
            assets = report.assets,
            "Site built in {}",
            self.output_dir.display()
        );
        Ok(report)
    }

    // Cleaning an output dir that is, or sits above, the content dir would
    // delete the sources.
    fn check_clean_target(&self) -> Result<(), GenerateError> {
        let output = self
            .output_dir
            .canonicalize()
            .map_err(io_error(&self.output_dir))?;
        let content = self
            .content_dir
            .canonicalize()
            .map_err(io_error(&self.content_dir))?;

        if content.starts_with(&output) {
            return Err(GenerateError::OutputOverlapsContent { output, content });
        }
        Ok(())
    }
}

/// Convert one markdown file and write it through the template to `dest`.
pub fn generate_page(from: &Path, template: &PageTemplate, dest: &Path) -> Result<(), GenerateError> {
    info!("Generating page from {} to {}", from.display(), dest.display());

    let markdown = std::fs::read_to_string(from).map_err(io_error(from))?;
    let title = extract_title(&markdown).map_err(|source| GenerateError::Title {
        path: from.to_path_buf(),
        source,
    })?;
    let content = markdown_to_html(&markdown).map_err(|source| GenerateError::Convert {
        path: from.to_path_buf(),
        source,
    })?;

    let html = template.render(&title, &content)?;

    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent).map_err(io_error(parent))?;
    }
    std::fs::write(dest, html).map_err(io_error(dest))?;

    Ok(())
}

/// Mirror everything under `from` into `to`. Returns how many files were copied.
pub fn copy_static(from: &Path, to: &Path) -> Result<usize, GenerateError> {
    if !from.is_dir() {
        return Err(GenerateError::MissingDir(from.to_path_buf()));
    }

    let mut copied = 0;
    for entry in WalkDir::new(from).sort_by_file_name() {
        let entry = entry?;
        let path = entry.path();
        let relative = path
            .strip_prefix(from)
            .map_err(|_| GenerateError::InvalidPath(path.to_path_buf()))?;
        let target = to.join(relative);

        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target).map_err(io_error(&target))?;
        } else if entry.file_type().is_file() {
            debug!("Copying {} to {}", path.display(), target.display());
            std::fs::copy(path, &target).map_err(io_error(path))?;
            copied += 1;
        } else {
            warn!("Skipping {}: not a regular file", path.display());
        }
    }

    Ok(copied)
}

fn is_markdown(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "md")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_md_files_are_markdown() {
        assert!(is_markdown(Path::new("a/b.md")));
        assert!(!is_markdown(Path::new("a/b.markdown.txt")));
        assert!(!is_markdown(Path::new("README")));
    }

    #[test]
    fn missing_content_dir() {
        let generator = SiteGenerator::new().content_dir("/no/such/content");
        assert!(matches!(generator.build(), Err(GenerateError::MissingDir(_))));
    }
}
