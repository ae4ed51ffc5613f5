//! Quality-control snapshot of the working chunk.

use std::fmt;

use serde::Serialize;

use crate::host::ChunkIntrospection;
use crate::probe::{Probe, probe};

/// Flat summary of reconstruction progress.
///
/// `None` counts mean the host does not currently expose the metric; they
/// are neither zero nor an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QcSnapshot {
    pub cameras_total: usize,
    pub cameras_aligned: usize,
    pub tie_points_count: Option<u64>,
    pub point_cloud_points_count: Option<u64>,
    pub markers_total: usize,
}

impl fmt::Display for QcSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(json) => f.write_str(&json),
            Err(_) => write!(f, "{self:?}"),
        }
    }
}

/// Inspect `chunk` without ever failing.
///
/// Cameras count as aligned when their transform can be read. Tie points and
/// dense points are probed at two levels (collection, then count) and report
/// `None` if either is unavailable. An unavailable marker collection counts
/// as empty, not unknown.
pub fn qc_snapshot<C: ChunkIntrospection + ?Sized>(chunk: &C) -> QcSnapshot {
    let cameras = probe(chunk, |c| c.cameras()).unwrap_or_default();
    let cameras_aligned = cameras
        .iter()
        .filter(|cam| probe(chunk, |c| c.camera_transform(cam)).is_known())
        .count();

    let tie_points_count = probe(chunk, |c| c.tie_points())
        .and_then(|set| probe(&set, |s| s.point_count()))
        .known();
    let point_cloud_points_count = probe(chunk, |c| c.point_cloud())
        .and_then(|set| probe(&set, |s| s.point_count()))
        .known();

    let markers_total = match probe(chunk, |c| c.markers()) {
        Probe::Known(markers) => markers.len(),
        Probe::Unknown => 0,
    };

    QcSnapshot {
        cameras_total: cameras.len(),
        cameras_aligned,
        tie_points_count,
        point_cloud_points_count,
        markers_total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{
        CameraHandle, HostError, HostResult, MarkerHandle, PointSet, Transform,
    };

    /// Chunk double whose every attribute can be absent or failing.
    #[derive(Default)]
    struct ScriptedChunk {
        cameras: Option<Vec<HostResult<Option<Transform>>>>,
        cameras_fail: bool,
        tie_points: Option<HostResult<Option<PointSet>>>,
        point_cloud: Option<HostResult<Option<PointSet>>>,
        markers: Option<HostResult<Option<Vec<MarkerHandle>>>>,
    }

    fn boom(op: &str) -> HostError {
        HostError::new(op, "attribute raised")
    }

    impl ChunkIntrospection for ScriptedChunk {
        fn cameras(&self) -> HostResult<Option<Vec<CameraHandle>>> {
            if self.cameras_fail {
                return Err(boom("cameras"));
            }
            Ok(self.cameras.as_ref().map(|cams| {
                (0..cams.len())
                    .map(|index| CameraHandle {
                        index,
                        label: format!("cam{index}"),
                    })
                    .collect()
            }))
        }

        fn camera_transform(&self, camera: &CameraHandle) -> HostResult<Option<Transform>> {
            self.cameras.as_ref().unwrap()[camera.index].clone()
        }

        fn tie_points(&self) -> HostResult<Option<PointSet>> {
            self.tie_points.clone().unwrap_or(Ok(None))
        }

        fn point_cloud(&self) -> HostResult<Option<PointSet>> {
            self.point_cloud.clone().unwrap_or(Ok(None))
        }

        fn markers(&self) -> HostResult<Option<Vec<MarkerHandle>>> {
            self.markers.clone().unwrap_or(Ok(None))
        }
    }

    fn marker(label: &str) -> MarkerHandle {
        MarkerHandle {
            label: label.into(),
        }
    }

    #[test]
    fn counts_aligned_cameras_and_swallows_per_camera_failures() {
        let chunk = ScriptedChunk {
            cameras: Some(vec![
                Ok(Some(Transform::IDENTITY)),
                Ok(None),
                Err(boom("transform")),
                Ok(Some(Transform::IDENTITY)),
            ]),
            ..Default::default()
        };
        let qc = qc_snapshot(&chunk);
        assert_eq!(qc.cameras_total, 4);
        assert_eq!(qc.cameras_aligned, 2);
    }

    #[test]
    fn missing_or_failing_camera_collection_is_empty() {
        let qc = qc_snapshot(&ScriptedChunk::default());
        assert_eq!((qc.cameras_total, qc.cameras_aligned), (0, 0));

        let chunk = ScriptedChunk {
            cameras_fail: true,
            ..Default::default()
        };
        assert_eq!(qc_snapshot(&chunk).cameras_total, 0);
    }

    #[test]
    fn point_counts_are_unknown_when_any_level_is_unavailable() {
        let chunk = ScriptedChunk {
            tie_points: Some(Ok(Some(PointSet::uncounted()))),
            point_cloud: Some(Err(boom("point_cloud"))),
            ..Default::default()
        };
        let qc = qc_snapshot(&chunk);
        assert_eq!(qc.tie_points_count, None);
        assert_eq!(qc.point_cloud_points_count, None);

        let chunk = ScriptedChunk {
            tie_points: Some(Ok(Some(PointSet::failing(boom("points"))))),
            point_cloud: Some(Ok(None)),
            ..Default::default()
        };
        let qc = qc_snapshot(&chunk);
        assert_eq!(qc.tie_points_count, None);
        assert_eq!(qc.point_cloud_points_count, None);
    }

    #[test]
    fn empty_collections_report_zero_not_unknown() {
        let chunk = ScriptedChunk {
            tie_points: Some(Ok(Some(PointSet::counted(0)))),
            point_cloud: Some(Ok(Some(PointSet::counted(125_000)))),
            ..Default::default()
        };
        let qc = qc_snapshot(&chunk);
        assert_eq!(qc.tie_points_count, Some(0));
        assert_eq!(qc.point_cloud_points_count, Some(125_000));
    }

    #[test]
    fn absent_markers_count_as_zero() {
        let absent = ScriptedChunk::default();
        let failing = ScriptedChunk {
            markers: Some(Err(boom("markers"))),
            ..Default::default()
        };
        let present = ScriptedChunk {
            markers: Some(Ok(Some(vec![marker("gcp1"), marker("gcp2")]))),
            ..Default::default()
        };
        assert_eq!(qc_snapshot(&absent).markers_total, 0);
        assert_eq!(qc_snapshot(&failing).markers_total, 0);
        assert_eq!(qc_snapshot(&present).markers_total, 2);
    }

    #[test]
    fn snapshot_is_idempotent() {
        let chunk = ScriptedChunk {
            cameras: Some(vec![Ok(Some(Transform::IDENTITY)), Err(boom("t"))]),
            tie_points: Some(Ok(Some(PointSet::counted(42)))),
            markers: Some(Ok(Some(vec![marker("m")]))),
            ..Default::default()
        };
        assert_eq!(qc_snapshot(&chunk), qc_snapshot(&chunk));
    }

    #[test]
    fn works_through_trait_object() {
        use crate::host::{DryRunHost, ProcessingHost};
        use std::path::PathBuf;

        let mut host = DryRunHost::new();
        host.add_chunk("qc").unwrap();
        host.add_photos(&[PathBuf::from("/a.jpg"), PathBuf::from("/b.jpg")])
            .unwrap();
        let chunk: &dyn ChunkIntrospection = &host;
        let qc = qc_snapshot(chunk);
        assert_eq!(qc.cameras_total, 2);
        assert_eq!(qc.cameras_aligned, 0);
        assert_eq!(qc.markers_total, 0);
    }

    #[test]
    fn serializes_unknown_counts_as_null() {
        let qc = qc_snapshot(&ScriptedChunk::default());
        let json = serde_json::to_value(qc).unwrap();
        assert!(json["tie_points_count"].is_null());
        assert!(json["point_cloud_points_count"].is_null());
        assert_eq!(json["markers_total"], 0);
    }
}
