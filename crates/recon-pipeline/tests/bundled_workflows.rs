mod common;

use std::path::{Path, PathBuf};

use recon_pipeline::host::HostCall;
use recon_pipeline::params::{DepthMapsParams, ModelParams, OrthomosaicParams};
use recon_pipeline::{
    DryRunHost, PipelineState, ProcessingHost, RunLog, Stage, config, run_with_log,
};
use serde_json::{Value, json};

use common::{options, write_config, write_photos};

fn workflows_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../workflows")
}

fn bundled(name: &str) -> Value {
    let path = workflows_dir().join(name).join("config.json");
    let text = std::fs::read_to_string(&path).unwrap();
    serde_json::from_str(&text).unwrap()
}

/// Point a bundled config at a scratch photo directory.
fn rebase(mut config: Value, photos: &Path) -> Value {
    config["input"]["photo_dirs"] = json!([photos.to_string_lossy()]);
    config
}

#[test]
fn every_bundled_config_loads_and_resolves() {
    let host = DryRunHost::new();
    let caps = host.capabilities();
    for entry in std::fs::read_dir(workflows_dir()).unwrap() {
        let path = entry.unwrap().path().join("config.json");
        let doc = config::load(&path).unwrap();
        let processing = doc.section("processing").unwrap();
        let stage = Stage::parse(&processing.string_or("stage", Stage::DEFAULT).unwrap()).unwrap();

        DepthMapsParams::from_section(&processing.section("build_depth_maps").unwrap(), caps)
            .unwrap();
        match stage {
            Stage::ObjectModelTexture => {
                ModelParams::from_section(&processing.section("build_model").unwrap(), caps)
                    .unwrap();
            }
            _ => {
                OrthomosaicParams::from_section(
                    &processing.section("build_orthomosaic").unwrap(),
                    caps,
                )
                .unwrap();
            }
        }
    }
}

#[test]
fn aerial_rtk_workflow_plan() {
    let tmp = tempfile::tempdir().unwrap();
    let photos = write_photos(tmp.path(), 5);
    let config = write_config(
        tmp.path(),
        "aerial_rtk_no_gcps",
        &rebase(bundled("aerial_rtk_no_gcps"), &photos),
    );

    let mut host = DryRunHost::new();
    let log = RunLog::in_memory();
    let report = run_with_log(
        &mut host,
        &config,
        &options(tmp.path(), "aerial_rtk_no_gcps"),
        &log,
    )
    .unwrap();

    assert_eq!(report.photos, 5);
    assert_eq!(report.stage, Stage::AerialProducts);
    assert_eq!(report.state, PipelineState::Exported);
    assert_eq!(host.crs().unwrap().definition, "EPSG::4326");
    assert!(tmp.path().join("outputs/aerial_rtk_no_gcps").is_dir());

    let ops = host.operations();
    assert_eq!(ops.iter().filter(|op| **op == "export_raster").count(), 2);
    assert!(ops.contains(&"export_report"));
    assert!(!ops.contains(&"export_model"));
    assert_eq!(ops.last(), Some(&"save_document"));

    let depth = host.calls().iter().find_map(|c| match c {
        HostCall::BuildDepthMaps(p) => Some(p),
        _ => None,
    });
    assert_eq!(depth.unwrap().downscale, 2);
}

#[test]
fn turntable_workflow_plan() {
    let tmp = tempfile::tempdir().unwrap();
    let photos = write_photos(tmp.path(), 3);
    let config = write_config(
        tmp.path(),
        "turntable",
        &rebase(bundled("terrestrial_object_scan_turntable"), &photos),
    );

    let mut host = DryRunHost::new();
    let log = RunLog::in_memory();
    let report = run_with_log(&mut host, &config, &options(tmp.path(), "turntable"), &log).unwrap();

    assert_eq!(report.stage, Stage::ObjectModelTexture);
    assert_eq!(host.chunk_label(), Some("turntable_scan"));
    let ops = host.operations();
    assert!(!ops.contains(&"build_point_cloud"));
    assert!(log.contains("Skipping build_point_cloud (disabled)"));

    let model = host.calls().iter().find_map(|c| match c {
        HostCall::BuildModel(p) => Some(p),
        _ => None,
    });
    let model = model.unwrap();
    assert_eq!(model.face_count.name(), Some("CustomFaceCount"));
    assert_eq!(model.face_count_custom, 500_000);

    match host.calls().iter().rev().nth(1) {
        Some(HostCall::ExportModel(p)) => {
            assert_eq!(p.format.name(), Some("ModelFormatOBJ"));
            assert!(p.path.starts_with(tmp.path().join("outputs/terrestrial_object_scan_turntable")));
        }
        other => panic!("unexpected call {other:?}"),
    }
}
