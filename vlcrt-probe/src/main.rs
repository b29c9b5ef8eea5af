//! vlcrt-probe - LibVLC installation check
//!
//! Resolves where LibVLC is expected on this host, loads it through the same
//! sequence bindings use, verifies the major version and reports the result.
//! Exits non-zero if anything fails.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vlcrt_loader::config::{self, ConfigOverrides, LoaderConfig};
use vlcrt_loader::{LibrarySearch, Loader, VersionCheckMode};

mod report;

use report::ProbeReport;

/// Command-line arguments for vlcrt-probe
#[derive(Parser, Debug)]
#[command(name = "vlcrt-probe")]
#[command(about = "Locate, load and version-check the LibVLC runtime")]
#[command(version)]
struct Args {
    /// Directory containing libvlc and libvlccore
    #[arg(long, group = "search")]
    libvlc_dir: Option<PathBuf>,

    /// Let the OS loader search its default library path
    #[arg(long, group = "search")]
    system: bool,

    /// Use the LibVLC package layout next to the executable
    #[arg(long, group = "search")]
    application: bool,

    /// Do not compare LibVLC and binding major versions
    #[arg(long)]
    skip_version_check: bool,

    /// Config file to read instead of the default locations
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        let search = if let Some(dir) = &self.libvlc_dir {
            Some(LibrarySearch::Directory(dir.clone()))
        } else if self.system {
            Some(LibrarySearch::SystemDefault)
        } else if self.application {
            Some(LibrarySearch::ApplicationRelative)
        } else {
            None
        };
        ConfigOverrides {
            search,
            version_check: self
                .skip_version_check
                .then_some(VersionCheckMode::Disabled),
            config_file: self.config.clone(),
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args);

    info!(
        "Starting vlcrt-probe v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let config =
        LoaderConfig::resolve(&args.overrides()).context("Failed to resolve configuration")?;
    let loader = vlcrt_loader::install_global(Loader::new(config)?)
        .context("Failed to install LibVLC loader")?;

    let mut report = ProbeReport::new(loader);
    let outcome = vlcrt_loader::ensure_loaded().and_then(|()| vlcrt_loader::ensure_versions_match());
    report.update(loader);
    match &outcome {
        Ok(check) => report.version = Some(check.clone()),
        Err(e) => {
            error!("{}", e);
            report.error = Some(e.to_string());
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.render_text());
    }

    if report.succeeded() {
        info!("LibVLC is usable from {}", report.search);
    }
    outcome.context("LibVLC probe failed")?;
    Ok(())
}

/// Install the tracing subscriber
///
/// `RUST_LOG` wins; otherwise the config file's `[logging] level` applies
/// to this workspace's crates.
fn init_tracing(args: &Args) {
    let level = args
        .config
        .clone()
        .or_else(config::find_config_file)
        .and_then(|path| config::load_toml_config(&path).ok())
        .map(|file| file.logging.level)
        .unwrap_or_else(|| "info".to_string());

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("vlcrt_probe={level},vlcrt_loader={level}").into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
