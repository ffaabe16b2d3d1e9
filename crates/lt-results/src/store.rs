//! Tiered cache storage.
//!
//! Every record kind moves through the same tiers, each a fixed file inside
//! the results directory:
//!
//! 1. `ExportJson`  - the exporter's JSON output
//! 2. `Snapshot`    - bincode of the parsed [`RawExport`]
//! 3. `Clean`       - bincode of the aggregated [`CleanSnapshot`]
//! 4. `CleanMirror` - pretty JSON copy of tier 3, for inspection only
//!
//! Nothing here checks freshness. A stale tier stays until its file is deleted.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use lt_config::{CacheLayout, PipelineConfig};

use crate::hash::fingerprint_bytes;
use crate::types::{CleanSnapshot, RawExport, RecordKind};
use crate::{ResultsError, ResultsResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheTier {
    ExportJson,
    Snapshot,
    Clean,
    CleanMirror,
}

impl CacheTier {
    pub const ALL: [CacheTier; 4] = [
        CacheTier::ExportJson,
        CacheTier::Snapshot,
        CacheTier::Clean,
        CacheTier::CleanMirror,
    ];

    pub fn label(self) -> &'static str {
        match self {
            CacheTier::ExportJson => "export json",
            CacheTier::Snapshot => "raw snapshot",
            CacheTier::Clean => "clean snapshot",
            CacheTier::CleanMirror => "clean json mirror",
        }
    }
}

#[derive(Clone)]
pub struct CacheStore {
    root_dir: PathBuf,
    layout: CacheLayout,
}

impl CacheStore {
    pub fn new(root_dir: PathBuf, layout: CacheLayout) -> Self {
        Self { root_dir, layout }
    }

    pub fn for_config(config: &PipelineConfig) -> Self {
        Self::new(config.results_dir.clone(), config.cache.clone())
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    pub fn mirrors_json(&self) -> bool {
        self.layout.mirror_json
    }

    pub fn path(&self, kind: RecordKind, tier: CacheTier) -> PathBuf {
        let layout = &self.layout;
        let name = match (kind, tier) {
            (RecordKind::Vector, CacheTier::ExportJson) => &layout.vector_json,
            (RecordKind::Vector, CacheTier::Snapshot) => &layout.vector_snapshot,
            (RecordKind::Vector, CacheTier::Clean) => &layout.vector_clean,
            (RecordKind::Vector, CacheTier::CleanMirror) => &layout.vector_clean_json,
            (RecordKind::Scalar, CacheTier::ExportJson) => &layout.scalar_json,
            (RecordKind::Scalar, CacheTier::Snapshot) => &layout.scalar_snapshot,
            (RecordKind::Scalar, CacheTier::Clean) => &layout.scalar_clean,
            (RecordKind::Scalar, CacheTier::CleanMirror) => &layout.scalar_clean_json,
        };
        self.root_dir.join(name)
    }

    pub fn has(&self, kind: RecordKind, tier: CacheTier) -> bool {
        self.path(kind, tier).exists()
    }

    fn require(&self, kind: RecordKind, tier: CacheTier) -> ResultsResult<PathBuf> {
        let path = self.path(kind, tier);
        if !path.exists() {
            return Err(ResultsError::MissingInput { path });
        }
        Ok(path)
    }

    pub fn read_export_json(&self, kind: RecordKind) -> ResultsResult<RawExport> {
        let path = self.require(kind, CacheTier::ExportJson)?;
        crate::raw::read_export_json(&path)
    }

    /// Write the raw snapshot and return the fingerprint of the written bytes.
    pub fn write_snapshot(&self, kind: RecordKind, export: &RawExport) -> ResultsResult<String> {
        fs::create_dir_all(&self.root_dir)?;
        let bytes = bincode::serialize(export)?;
        let path = self.path(kind, CacheTier::Snapshot);
        write_atomic(&path, &bytes)?;
        debug!(path = %path.display(), bytes = bytes.len(), "wrote raw snapshot");
        Ok(fingerprint_bytes(&bytes))
    }

    /// Read the raw snapshot together with the fingerprint of its bytes.
    pub fn read_snapshot(&self, kind: RecordKind) -> ResultsResult<(RawExport, String)> {
        let path = self.require(kind, CacheTier::Snapshot)?;
        let bytes = fs::read(path)?;
        let export = bincode::deserialize(&bytes)?;
        Ok((export, fingerprint_bytes(&bytes)))
    }

    /// Write the aggregated snapshot and, if enabled, its JSON mirror.
    ///
    /// A failed mirror write removes the clean file again, so the clean tier
    /// is never left behind by a call that returned an error.
    pub fn write_clean<R: Serialize>(
        &self,
        kind: RecordKind,
        snapshot: &CleanSnapshot<R>,
    ) -> ResultsResult<()> {
        fs::create_dir_all(&self.root_dir)?;
        let bytes = bincode::serialize(snapshot)?;
        let path = self.path(kind, CacheTier::Clean);
        write_atomic(&path, &bytes)?;

        if self.layout.mirror_json {
            if let Err(err) = self.write_mirror(kind, snapshot) {
                if let Err(cleanup) = fs::remove_file(&path) {
                    warn!(path = %path.display(), error = %cleanup, "failed to remove clean snapshot");
                }
                return Err(err);
            }
        }
        Ok(())
    }

    /// Pretty JSON copy of an aggregated snapshot. Never read back by the pipeline.
    pub fn write_mirror<R: Serialize>(
        &self,
        kind: RecordKind,
        snapshot: &CleanSnapshot<R>,
    ) -> ResultsResult<()> {
        fs::create_dir_all(&self.root_dir)?;
        let mirror = serde_json::to_string_pretty(snapshot)?;
        write_atomic(&self.path(kind, CacheTier::CleanMirror), mirror.as_bytes())?;
        Ok(())
    }

    pub fn read_clean<R: DeserializeOwned>(
        &self,
        kind: RecordKind,
    ) -> ResultsResult<CleanSnapshot<R>> {
        let path = self.require(kind, CacheTier::Clean)?;
        let bytes = fs::read(path)?;
        Ok(bincode::deserialize(&bytes)?)
    }

    pub fn delete(&self, kind: RecordKind, tier: CacheTier) -> ResultsResult<()> {
        let path = self.path(kind, tier);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}

/// Write through a sibling `.tmp` file and rename it into place. A tier file
/// that exists is always complete.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> ResultsResult<()> {
    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);

    if let Err(err) = fs::write(&tmp, bytes).and_then(|()| fs::rename(&tmp, path)) {
        let _ = fs::remove_file(&tmp);
        return Err(err.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_follow_layout() {
        let store = CacheStore::new(PathBuf::from("results"), CacheLayout::default());
        assert_eq!(
            store.path(RecordKind::Vector, CacheTier::ExportJson),
            PathBuf::from("results/data_vec.json")
        );
        assert_eq!(
            store.path(RecordKind::Vector, CacheTier::Clean),
            PathBuf::from("results/data_clean_vec.bin")
        );
        assert_eq!(
            store.path(RecordKind::Scalar, CacheTier::CleanMirror),
            PathBuf::from("results/data_clean_sca.json")
        );
    }

    fn unique_temp_dir(prefix: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        std::env::temp_dir().join(format!("{}_{}", prefix, nanos))
    }

    #[test]
    fn atomic_write_leaves_no_temp_file() {
        let dir = unique_temp_dir("lt_store_atomic");
        fs::create_dir_all(&dir).unwrap();
        let target = dir.join("data_vec.bin");

        write_atomic(&target, b"first").unwrap();
        write_atomic(&target, b"second").unwrap();

        assert_eq!(fs::read(&target).unwrap(), b"second");
        assert!(!dir.join("data_vec.bin.tmp").exists());
    }

    #[test]
    fn failed_rename_cleans_up_temp_file() {
        let dir = unique_temp_dir("lt_store_rename");
        let target = dir.join("data_clean_vec.json");
        fs::create_dir_all(&target).unwrap();

        assert!(write_atomic(&target, b"{}").is_err());
        assert!(target.is_dir());
        assert!(!dir.join("data_clean_vec.json.tmp").exists());
    }
}
