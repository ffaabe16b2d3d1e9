//! Parsing of the simulator's JSON export into [`RawExport`].
//!
//! The export is an object keyed by run id. Numbers in `itervars` and
//! `attributes` may arrive as strings or as JSON numbers depending on the
//! exporter version, and sample values may be the strings `"nan"`/`"inf"`.
//! Everything is normalised here so the binary snapshot carries plain types.

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

use crate::types::{RawExport, RawRun, ScalarRecord, VectorRecord};
use crate::{ResultsError, ResultsResult};

#[derive(Deserialize)]
struct JsonRun {
    #[serde(default)]
    itervars: BTreeMap<String, Value>,
    #[serde(default)]
    attributes: BTreeMap<String, Value>,
    #[serde(default)]
    vectors: Vec<JsonVector>,
    #[serde(default)]
    scalars: Vec<JsonScalar>,
}

#[derive(Deserialize)]
struct JsonVector {
    module: String,
    name: String,
    #[serde(default)]
    time: Vec<Value>,
    value: Vec<Value>,
}

#[derive(Deserialize)]
struct JsonScalar {
    module: String,
    name: String,
    value: Value,
}

pub fn parse_export_str(content: &str) -> ResultsResult<RawExport> {
    let document: BTreeMap<String, JsonRun> = serde_json::from_str(content)?;
    let mut runs = Vec::with_capacity(document.len());
    for (run_id, run) in document {
        runs.push(normalize_run(run_id, run)?);
    }
    Ok(RawExport { runs })
}

pub fn read_export_json(path: &Path) -> ResultsResult<RawExport> {
    if !path.exists() {
        return Err(ResultsError::MissingInput {
            path: path.to_path_buf(),
        });
    }
    let content = std::fs::read_to_string(path)?;
    parse_export_str(&content)
}

fn normalize_run(run_id: String, run: JsonRun) -> ResultsResult<RawRun> {
    let itervars = run
        .itervars
        .into_iter()
        .map(|(k, v)| (k, value_to_text(v)))
        .collect();
    let attributes = run
        .attributes
        .into_iter()
        .map(|(k, v)| (k, value_to_text(v)))
        .collect();

    let mut vectors = Vec::with_capacity(run.vectors.len());
    for v in run.vectors {
        let value = numbers(&run_id, &v.module, &v.name, v.value)?;
        let time = numbers(&run_id, &v.module, &v.name, v.time)?;
        vectors.push(VectorRecord {
            module: v.module,
            name: v.name,
            time,
            value,
        });
    }

    let mut scalars = Vec::with_capacity(run.scalars.len());
    for s in run.scalars {
        let value = number(&run_id, &s.module, &s.name, s.value)?;
        scalars.push(ScalarRecord {
            module: s.module,
            name: s.name,
            value,
        });
    }

    Ok(RawRun {
        run_id,
        itervars,
        attributes,
        vectors,
        scalars,
    })
}

fn value_to_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

fn numbers(run: &str, module: &str, name: &str, values: Vec<Value>) -> ResultsResult<Vec<f64>> {
    values
        .into_iter()
        .map(|v| number(run, module, name, v))
        .collect()
}

fn number(run: &str, module: &str, name: &str, value: Value) -> ResultsResult<f64> {
    let parsed = match &value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Null => Some(f64::NAN),
        _ => None,
    };
    parsed.ok_or_else(|| ResultsError::MalformedRecord {
        run: run.to_string(),
        module: module.to_string(),
        name: name.to_string(),
        reason: format!("expected a number, found {}", value),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "General-0-20240101": {
            "attributes": {"configname": "General", "repetition": 0},
            "itervars": {"numNodes": "2"},
            "vectors": [
                {
                    "module": "LoRaNetworkTest.loRaNodes[0].LoRaNic.radio.energyConsumer",
                    "name": "powerConsumption:vector",
                    "time": [0.0, 1.5],
                    "value": [0.0, 0.145]
                }
            ]
        },
        "General-1-20240101": {
            "itervars": {"numNodes": 4},
            "scalars": [
                {
                    "module": "LoRaNetworkTest.loRaNodes[3].LoRaNic.radio.energyConsumer",
                    "name": "totalEnergyConsumed",
                    "value": "1.23"
                }
            ]
        }
    }"#;

    #[test]
    fn parses_and_normalises_runs() {
        let export = parse_export_str(SAMPLE).unwrap();
        assert_eq!(export.runs.len(), 2);

        let first = &export.runs[0];
        assert_eq!(first.run_id, "General-0-20240101");
        assert_eq!(first.itervar("numNodes"), Some("2"));
        assert_eq!(first.attributes.get("repetition").map(String::as_str), Some("0"));
        assert_eq!(first.vectors[0].value, vec![0.0, 0.145]);
        assert_eq!(first.vectors[0].time, vec![0.0, 1.5]);
        assert!(first.scalars.is_empty());

        let second = &export.runs[1];
        assert_eq!(second.itervar("numNodes"), Some("4"));
        assert_eq!(second.scalars[0].value, 1.23);
        assert!(second.vectors.is_empty());
    }

    #[test]
    fn non_finite_strings_are_kept() {
        let content = r#"{"r": {"itervars": {"numNodes": "1"}, "scalars": [
            {"module": "m", "name": "x", "value": "nan"},
            {"module": "m", "name": "y", "value": "inf"}
        ]}}"#;
        let export = parse_export_str(content).unwrap();
        assert!(export.runs[0].scalars[0].value.is_nan());
        assert!(export.runs[0].scalars[1].value.is_infinite());
    }

    #[test]
    fn rejects_non_numeric_samples() {
        let content = r#"{"r": {"vectors": [
            {"module": "m", "name": "v", "value": [1.0, {"oops": true}]}
        ]}}"#;
        let err = parse_export_str(content).unwrap_err();
        assert!(matches!(err, ResultsError::MalformedRecord { .. }));
    }

    #[test]
    fn missing_file_is_reported() {
        let path = std::env::temp_dir().join("lt_results_definitely_missing_export.json");
        let err = read_export_json(&path).unwrap_err();
        assert!(matches!(err, ResultsError::MissingInput { .. }));
    }
}
