//! Command line interface and pipeline orchestration.
//!
//! The pipeline is strictly sequential: each stage's side effects are
//! durable before the next stage starts, and every optional stage is a
//! no-op when its configuration is absent.

mod args;

pub use args::Args;

use crate::bundle::{self, BundleLayout};
use crate::cache::DownloadCache;
use crate::config::{Config, GHIDRA_RELEASE_API_URL};
use crate::error::Result;
use crate::extension;
use crate::release::{ArtifactLocation, ReleaseArtifact};
use crate::runtime::{RuntimeEmbedding, graal, jdk};
use crate::theme;
use crate::tools::{ProcessRunner, ToolRunner};
use crate::dmg;

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    let config = args.config();
    preflight(&args);
    run_pipeline(&ProcessRunner, &config, &args).await?;
    Ok(0)
}

/// Runs the whole assembly pipeline with an injected tool runner.
pub async fn run_pipeline<R: ToolRunner>(runner: &R, config: &Config, args: &Args) -> Result<()> {
    log::info!("downloads will be cached to {}", config.cache_dir.display());
    let cache = DownloadCache::open(&config.cache_dir).await?;

    // Resolve the payload: local path wins, otherwise latest release.
    let artifact = match &args.path {
        Some(path) => ReleaseArtifact::from_local_path(path)?,
        None => {
            let artifact =
                ReleaseArtifact::from_latest_release(GHIDRA_RELEASE_API_URL, &[]).await?;
            if let ArtifactLocation::Remote { name, url } = &artifact.location {
                cache.fetch(url, &cache.path(name)).await?;
            }
            artifact
        }
    };
    log::info!("using Ghidra {}", artifact.version);

    let layout = BundleLayout::new(&config.staging_dir, &artifact.version);
    bundle::assemble(runner, config, &layout, &artifact, &cache).await?;
    bundle::icons::patch_dock_icon(runner, &config.icon_png(), &layout.release_root()).await?;

    if args.dark_mode {
        theme::install_dark_mode(runner, &cache, &layout.release_root()).await?;
    }

    // At most one runtime; the Graal path also yields the mandatory
    // Ghidraal artifact, installed after the user's extensions.
    let mut bootstrapped = None;
    match args.runtime_embedding() {
        RuntimeEmbedding::None => {}
        RuntimeEmbedding::Jdk(path) => jdk::embed(runner, &path, &layout).await?,
        RuntimeEmbedding::Graal => {
            let graal_home = graal::embed(runner, &cache, &layout).await?;
            bootstrapped = Some(
                graal::bootstrap_ghidraal(runner, &cache, config, &layout, &graal_home).await?,
            );
        }
    }

    for entry in &args.extension {
        extension::install_entry(runner, &cache, &layout, entry).await?;
    }
    if let Some(artifact) = bootstrapped {
        extension::install_artifact(&artifact, &layout).await?;
    }

    let image = dmg::package(runner, layout.root(), &args.out).await?;
    log::info!("created {}", image.display());

    // The staging tree served its purpose; downloads stay cached.
    if layout.root().exists() {
        tokio::fs::remove_dir_all(layout.root()).await?;
    }
    Ok(())
}

/// Warns up front about missing external tools the selected stages need.
fn preflight(args: &Args) {
    let mut tools: Vec<&str> = vec!["unzip", "hdiutil", "convert", "jar", "gradle", "git"];
    if args.dark_mode {
        tools.push("python3");
    }
    if args.graal {
        tools.push("tar");
    }

    for tool in tools {
        match which::which(tool) {
            Ok(path) => log::debug!("found {tool} at {}", path.display()),
            Err(_) => log::warn!("{tool} not found in PATH; the stage needing it will fail"),
        }
    }
}
