//! End-to-end pipeline test over a local payload, with external tools
//! replaced by a counting fake.

use ghidra_bundler::cli::{Args, run_pipeline};
use ghidra_bundler::config::Config;
use ghidra_bundler::error::Result;
use ghidra_bundler::tools::{ToolCommand, ToolOutput, ToolRunner};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Succeeds every invocation, counts programs, and snapshots bundle state
/// at image-creation time (the staging tree is removed after success).
struct CountingRunner {
    staging: PathBuf,
    counts: Mutex<HashMap<String, u32>>,
    bundle_ok_at_imaging: Mutex<bool>,
}

impl CountingRunner {
    fn new(staging: &Path) -> Self {
        Self {
            staging: staging.to_path_buf(),
            counts: Mutex::new(HashMap::new()),
            bundle_ok_at_imaging: Mutex::new(false),
        }
    }

    fn count(&self, program: &str) -> u32 {
        *self.counts.lock().unwrap().get(program).unwrap_or(&0)
    }
}

impl ToolRunner for CountingRunner {
    async fn run(&self, cmd: &ToolCommand) -> Result<ToolOutput> {
        *self
            .counts
            .lock()
            .unwrap()
            .entry(cmd.program().to_string())
            .or_insert(0) += 1;

        if cmd.program() == "hdiutil" {
            let launcher = self.staging.join("Ghidra.app/Contents/MacOS/ghidra");
            let payload = self
                .staging
                .join("Ghidra.app/Contents/Resources/ghidra_11.1_PUBLIC");
            let executable = {
                use std::os::unix::fs::PermissionsExt;
                launcher
                    .metadata()
                    .map(|m| m.permissions().mode() & 0o111 == 0o111)
                    .unwrap_or(false)
            };
            *self.bundle_ok_at_imaging.lock().unwrap() =
                executable && payload.join("Ghidra/Extensions").is_dir();
        }

        Ok(ToolOutput {
            success: true,
            code: Some(0),
            stderr: String::new(),
        })
    }
}

fn seed_workspace(root: &Path) -> (Config, PathBuf) {
    let config = Config::rooted_at(root);
    std::fs::create_dir_all(&config.assets_dir).unwrap();
    std::fs::copy("assets/Info.plist", config.plist_template()).unwrap();
    std::fs::write(config.icns(), b"icns").unwrap();
    std::fs::write(config.icon_png(), b"png").unwrap();
    std::fs::write(config.launcher(), b"#!/bin/sh\nexec ghidraRun\n").unwrap();

    let payload = root.join("ghidra_11.1_PUBLIC");
    std::fs::create_dir_all(payload.join("Ghidra/Extensions")).unwrap();
    std::fs::create_dir_all(payload.join("support")).unwrap();
    std::fs::write(
        payload.join("support/launch.properties"),
        "useScreenMenuBar=false\n",
    )
    .unwrap();
    (config, payload)
}

#[tokio::test]
async fn local_payload_without_extensions_or_runtime() {
    let dir = tempfile::tempdir().unwrap();
    let (config, payload) = seed_workspace(dir.path());
    let out_dir = dir.path().join("out");

    let args = Args {
        out: out_dir,
        extension: Vec::new(),
        dark_mode: false,
        path: Some(payload),
        jdk: None,
        graal: false,
        cache_dir: None,
    };

    let runner = CountingRunner::new(&config.staging_dir);
    run_pipeline(&runner, &config, &args).await.unwrap();

    // One icon per framework resolution, one jar update each.
    assert_eq!(runner.count("convert"), 7);
    assert_eq!(runner.count("jar"), 7);
    // Image built once; no retry, no archive extraction, no network tools.
    assert_eq!(runner.count("hdiutil"), 1);
    assert_eq!(runner.count("unzip"), 0);
    assert_eq!(runner.count("git"), 0);

    assert!(*runner.bundle_ok_at_imaging.lock().unwrap());
    // Staging is cleaned up after a successful image; downloads persist.
    assert!(!config.staging_dir.exists());
    assert!(config.cache_dir.exists());
}
