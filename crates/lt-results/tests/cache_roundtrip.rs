use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use lt_config::PipelineConfig;
use lt_results::*;

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    dir.push(format!("{}_{}", prefix, nanos));
    dir
}

const EXPORT: &str = r#"{
    "General-0": {
        "itervars": {"numNodes": "1"},
        "vectors": [
            {"module": "LoRaNetworkTest.loRaNodes[0].LoRaNic.radio.energyConsumer",
             "name": "powerConsumption:vector", "time": [0.0, 1.0], "value": [0.0, 0.5]}
        ]
    }
}"#;

#[test]
fn snapshot_tiers_roundtrip() {
    let dir = unique_temp_dir("lt_results_cache");
    fs::create_dir_all(&dir).expect("failed to create temp dir");
    let store = CacheStore::for_config(&PipelineConfig::for_results_dir(&dir));

    assert!(matches!(
        store.read_export_json(RecordKind::Vector),
        Err(ResultsError::MissingInput { .. })
    ));

    fs::write(store.path(RecordKind::Vector, CacheTier::ExportJson), EXPORT)
        .expect("failed to write export");
    let export = store
        .read_export_json(RecordKind::Vector)
        .expect("failed to parse export");

    let written = store
        .write_snapshot(RecordKind::Vector, &export)
        .expect("failed to write snapshot");
    let (loaded, read_back) = store
        .read_snapshot(RecordKind::Vector)
        .expect("failed to read snapshot");
    assert_eq!(loaded, export);
    assert_eq!(written, read_back);

    let mut runs = BTreeMap::new();
    runs.insert(
        1,
        VectorRun {
            run_id: "General-0".to_string(),
            num_nodes: 1,
            nodes: vec![PowerNode {
                power_samples: vec![0.5],
                power_sum: 0.5,
                ..PowerNode::default()
            }],
            rollup: VectorRollup {
                total_power_sum: 0.5,
                sample_count: 1,
                mean_node_power: 0.5,
                ..VectorRollup::default()
            },
        },
    );
    let clean = CleanVectorData {
        manifest: CleanManifest {
            kind: RecordKind::Vector,
            created_at: "2026-10-15T00:00:00Z".to_string(),
            source_fingerprint: written,
            run_count: 1,
        },
        runs,
    };
    store
        .write_clean(RecordKind::Vector, &clean)
        .expect("failed to write clean snapshot");
    assert!(store.has(RecordKind::Vector, CacheTier::CleanMirror));

    let loaded_clean: CleanVectorData = store
        .read_clean(RecordKind::Vector)
        .expect("failed to read clean snapshot");
    assert_eq!(loaded_clean, clean);

    let mirror = fs::read_to_string(store.path(RecordKind::Vector, CacheTier::CleanMirror))
        .expect("failed to read mirror");
    let mirrored: CleanVectorData = serde_json::from_str(&mirror).expect("mirror is not valid");
    assert_eq!(mirrored, clean);

    store
        .delete(RecordKind::Vector, CacheTier::Clean)
        .expect("failed to delete tier");
    assert!(!store.has(RecordKind::Vector, CacheTier::Clean));
    assert!(store.has(RecordKind::Vector, CacheTier::Snapshot));
}

#[test]
fn series_file_roundtrip() {
    let dir = unique_temp_dir("lt_results_series");
    let store = SeriesStore::new(dir.clone());

    let series = SeriesFile {
        x: vec![10.0, 20.0, 50.0],
        y: vec![92.59, 180.2, 401.0],
    };
    let path = store
        .write_series("throughput", "254", &series)
        .expect("failed to write series");
    assert_eq!(path, dir.join("throughput_254.json"));

    let raw = fs::read_to_string(&path).expect("failed to read series file");
    let value: serde_json::Value = serde_json::from_str(&raw).expect("invalid json");
    assert!(value.get("x").is_some() && value.get("y").is_some());

    let loaded = store
        .read_series("throughput", "254")
        .expect("failed to load series");
    assert_eq!(loaded, series);
}
