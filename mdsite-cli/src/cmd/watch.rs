use anyhow::Result;
use clap::{ArgMatches, Command};
use notify::{RecursiveMode, Watcher};
use notify_debouncer_mini::{DebounceEventResult, new_debouncer};
use std::{
    path::{Path, PathBuf},
    sync::mpsc,
    time::Duration,
};
use tracing::{debug, error, info, warn};

use crate::cmd::build::{add_build_args, build};
use crate::config::Settings;

pub fn make_subcommand() -> Command {
    add_build_args(Command::new("watch")).about("Build the site, then rebuild whenever sources change")
}

pub fn execute(args: &ArgMatches) -> Result<()> {
    let mut settings = Settings::load(args)?;
    rebuild(&settings);

    let (tx, rx) = mpsc::channel::<DebounceEventResult>();
    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;

    let mut watched = Vec::new();
    update_watches(debouncer.watcher(), &mut watched, watch_targets(&settings));
    let mut output_dir = absolute(Path::new(&settings.site.build.output));

    info!("Watching source files for changes...");

    for result in rx {
        let events = match result {
            Ok(events) => events,
            Err(e) => {
                warn!("Watch error: {e:?}");
                continue;
            }
        };

        let roots: Vec<PathBuf> = watched.iter().map(|(path, _)| path.clone()).collect();
        let changed: Vec<PathBuf> = events
            .into_iter()
            .map(|event| absolute(&event.path))
            .filter(|path| is_source_change(path, &roots, &output_dir))
            .collect();
        let Some(first) = changed.first() else {
            continue;
        };
        info!("Source file changed: {} ({} total)", first.display(), changed.len());

        // Pick up edits to the config file as well
        match Settings::load(args) {
            Ok(reloaded) => settings = reloaded,
            Err(e) => {
                error!("Config error: {e:#}");
                continue;
            }
        }
        update_watches(debouncer.watcher(), &mut watched, watch_targets(&settings));
        rebuild(&settings);
        output_dir = absolute(Path::new(&settings.site.build.output));
    }

    Ok(())
}

/// Paths a build reads from, with how deep to watch each.
fn watch_targets(settings: &Settings) -> Vec<(PathBuf, RecursiveMode)> {
    let build_config = &settings.site.build;

    [
        (&build_config.content, RecursiveMode::Recursive),
        (&build_config.static_dir, RecursiveMode::Recursive),
        (&build_config.template, RecursiveMode::NonRecursive),
    ]
    .into_iter()
    .map(|(path, mode)| (PathBuf::from(path), mode))
    .chain([(settings.config_file.clone(), RecursiveMode::NonRecursive)])
    .filter_map(|(path, mode)| {
        if path.exists() {
            Some((absolute(&path), mode))
        } else {
            warn!("Not watching {}: it does not exist", path.display());
            None
        }
    })
    .collect()
}

/// Move the watcher from the `watched` set to `targets`, touching only what changed.
fn update_watches<W: Watcher + ?Sized>(
    watcher: &mut W,
    watched: &mut Vec<(PathBuf, RecursiveMode)>,
    targets: Vec<(PathBuf, RecursiveMode)>,
) {
    let (kept, stale) = watch_diff(watched, &targets);

    for (path, _) in stale {
        if let Err(e) = watcher.unwatch(&path) {
            debug!("Could not unwatch {}: {e}", path.display());
        } else {
            info!("Stopped watching {}", path.display());
        }
    }

    let mut now = kept;
    for (path, mode) in targets {
        if now.contains(&(path.clone(), mode)) {
            continue;
        }
        match watcher.watch(&path, mode) {
            Ok(()) => {
                info!("Watching {}", path.display());
                now.push((path, mode));
            }
            Err(e) => warn!("Could not watch {}: {e}", path.display()),
        }
    }

    *watched = now;
}

/// Split the current watches into those still wanted and those to drop.
fn watch_diff(
    watched: &[(PathBuf, RecursiveMode)],
    targets: &[(PathBuf, RecursiveMode)],
) -> (Vec<(PathBuf, RecursiveMode)>, Vec<(PathBuf, RecursiveMode)>) {
    watched
        .iter()
        .cloned()
        .partition(|entry| targets.contains(entry))
}

fn rebuild(settings: &Settings) {
    match build(settings) {
        Ok(report) => info!("Site rebuilt successfully ({} pages)", report.pages.len()),
        Err(e) => error!("Build error: {e:#}"),
    }
}

// Writes into the output dir must not trigger another build when it sits
// inside a watched directory.
fn is_source_change(path: &Path, watched: &[PathBuf], output_dir: &Path) -> bool {
    !path.starts_with(output_dir) && watched.iter().any(|root| path.starts_with(root))
}

fn absolute(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}
