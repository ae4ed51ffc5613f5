use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::LevelFilter;
use recon_pipeline::host::HostCall;
use recon_pipeline::runlog::workflow_log_path;
use recon_pipeline::{Console, DryRunHost, RunLog, RunReport, WorkflowLaunch, run_with_log};
use serde::Serialize;

/// Photogrammetry workflow runner.
#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Run a photogrammetry workflow and print the host call plan"
)]
struct Args {
    /// Path to the workflow JSON config. The workflow name defaults to the
    /// file stem.
    config: Option<PathBuf>,

    /// Workflow name. Without CONFIG, runs `<root>/workflows/<NAME>/config.json`.
    #[arg(long)]
    workflow: Option<String>,

    /// Base directory for logs, bundled workflows and relative output paths.
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Also log debug diagnostics.
    #[arg(short, long)]
    verbose: bool,
}

/// What a dry run prints: the run report and every host call it issued.
#[derive(Debug, Serialize)]
struct DryRunOutput<'a> {
    report: &'a RunReport,
    calls: &'a [HostCall],
}

fn open_log(launch: &WorkflowLaunch, verbose: bool) -> Result<RunLog> {
    let path = workflow_log_path(&launch.root, &launch.workflow);
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let log = RunLog::create(&path)
        .with_context(|| format!("failed to open run log {}", path.display()))?;
    // stdout carries the JSON plan.
    Ok(log.with_console(Console::Stderr).with_max_level(level))
}

fn install_logger(log: &RunLog) {
    let level = log.max_level();
    if log::set_boxed_logger(Box::new(log.clone())).is_ok() {
        log::set_max_level(level);
    }
}

fn run_dry(launch: &WorkflowLaunch, log: &RunLog) -> Result<String> {
    let mut host = DryRunHost::new();
    let report = run_with_log(&mut host, &launch.config_path, &launch.options(), log)?;
    let output = DryRunOutput {
        report: &report,
        calls: host.calls(),
    };
    Ok(serde_json::to_string_pretty(&output)?)
}

fn main() {
    if let Err(err) = try_main() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn try_main() -> Result<()> {
    let args = Args::parse();
    let launch = WorkflowLaunch::resolve(args.config, args.workflow, args.root)?;
    let log = open_log(&launch, args.verbose)?;
    install_logger(&log);
    let json = run_dry(&launch, &log)?;
    println!("{json}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use std::fs;
    use std::path::Path;

    fn write_json(value: &Value, path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        serde_json::to_writer_pretty(fs::File::create(path).unwrap(), value).unwrap();
    }

    fn photo_dir(root: &Path, count: usize) -> PathBuf {
        let dir = root.join("photos");
        fs::create_dir_all(&dir).unwrap();
        for i in 0..count {
            fs::write(dir.join(format!("IMG_{i:04}.jpg")), b"").unwrap();
        }
        dir
    }

    fn operations(json: &Value) -> Vec<String> {
        json["calls"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["operation"].as_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn args_accept_positional_config_and_flags() {
        let args = Args::try_parse_from(["recon", "cfg.json", "--root", "/srv", "-v"]).unwrap();
        assert_eq!(args.config, Some(PathBuf::from("cfg.json")));
        assert_eq!(args.root, PathBuf::from("/srv"));
        assert!(args.verbose);

        let args = Args::try_parse_from(["recon", "--workflow", "aerial_rtk_no_gcps"]).unwrap();
        assert_eq!(args.config, None);
        assert_eq!(args.workflow.as_deref(), Some("aerial_rtk_no_gcps"));
        assert_eq!(args.root, PathBuf::from("."));
    }

    #[test]
    fn dry_run_prints_report_and_plan() {
        let tmp = tempfile::tempdir().unwrap();
        let photos = photo_dir(tmp.path(), 3);
        let config = tmp.path().join("workflows/survey/config.json");
        write_json(
            &json!({
                "input": {"photo_dirs": [photos.to_string_lossy()]},
                "processing": {"stage": "aerial_dem_ortho"}
            }),
            &config,
        );

        let launch =
            WorkflowLaunch::resolve(None, Some("survey".into()), tmp.path().to_path_buf()).unwrap();
        let log = RunLog::in_memory();
        let out: Value = serde_json::from_str(&run_dry(&launch, &log).unwrap()).unwrap();

        assert_eq!(out["report"]["workflow"], "survey");
        assert_eq!(out["report"]["photos"], 3);
        assert_eq!(out["report"]["stage"], "aerial_dem_ortho");
        assert_eq!(out["report"]["qc"]["cameras_total"], 3);
        let ops = operations(&out);
        assert!(ops.contains(&"build_orthomosaic".to_string()));
        assert!(!ops.contains(&"build_model".to_string()));
        assert!(log.contains("Photos found: 3"));
    }

    #[test]
    fn open_log_creates_workflow_log_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let launch = WorkflowLaunch::resolve(
            Some(tmp.path().join("turntable.json")),
            None,
            tmp.path().to_path_buf(),
        )
        .unwrap();
        let log = open_log(&launch, true).unwrap();
        assert_eq!(log.max_level(), LevelFilter::Debug);
        assert!(log.path().unwrap().starts_with(tmp.path().join("logs/turntable")));
    }

    #[test]
    fn failures_surface_as_errors_and_are_logged() {
        let tmp = tempfile::tempdir().unwrap();
        let config = tmp.path().join("empty.json");
        write_json(&json!({"input": {"photo_dirs": []}}), &config);

        let launch = WorkflowLaunch::resolve(Some(config), None, tmp.path().to_path_buf()).unwrap();
        let log = RunLog::in_memory();
        let err = run_dry(&launch, &log).unwrap_err();
        assert!(err.to_string().contains("no photos found"));
        assert!(log.contains("ERROR: no photos found"));
    }
}
