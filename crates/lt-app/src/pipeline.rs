//! Cache-tier pipeline: export json -> raw snapshot -> clean snapshot (+ mirror).
//!
//! `ensure` is idempotent. If a tier's file exists it is used as-is,
//! otherwise the tier below is ensured first and this tier is produced from
//! it. Aggregation is all-or-nothing: a failing run leaves no clean file.

use std::time::Instant;

use lt_aggregate::Aggregator;
use lt_config::{PipelineConfig, validate_config};
use lt_results::{
    CacheStore, CacheTier, CleanManifest, CleanScalarData, CleanSnapshot, CleanVectorData,
    RecordKind, SeriesStore,
};
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::export_tool;
use crate::progress::{PipelineEvent, PipelineStage};

/// What `ensure` did for the requested tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TierOutcome {
    Cached,
    Produced,
}

#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions {
    /// Run the export tool when the export JSON is missing. When false a
    /// missing export is an error.
    pub run_exporter: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self { run_exporter: true }
    }
}

#[derive(Debug, Clone)]
pub struct TierStatus {
    pub kind: RecordKind,
    pub tier: CacheTier,
    pub path: std::path::PathBuf,
    pub exists: bool,
}

pub struct Pipeline {
    config: PipelineConfig,
    options: PipelineOptions,
    store: CacheStore,
    aggregator: Aggregator,
}

type ProgressCb<'a> = Option<&'a mut dyn FnMut(PipelineEvent)>;

impl Pipeline {
    pub fn new(config: PipelineConfig, options: PipelineOptions) -> AppResult<Self> {
        validate_config(&config)?;
        let store = CacheStore::for_config(&config);
        let aggregator = Aggregator::from_config(&config)?;
        Ok(Self {
            config,
            options,
            store,
            aggregator,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    pub fn series_store(&self) -> SeriesStore {
        SeriesStore::new(self.config.series_dir())
    }

    pub fn status(&self) -> Vec<TierStatus> {
        let mut out = Vec::new();
        for kind in [RecordKind::Vector, RecordKind::Scalar] {
            for tier in CacheTier::ALL {
                let path = self.store.path(kind, tier);
                out.push(TierStatus {
                    kind,
                    tier,
                    exists: path.exists(),
                    path,
                });
            }
        }
        out
    }

    pub fn ensure(&self, kind: RecordKind, tier: CacheTier) -> AppResult<TierOutcome> {
        self.ensure_with_progress(kind, tier, None)
    }

    pub fn ensure_with_progress(
        &self,
        kind: RecordKind,
        tier: CacheTier,
        mut progress_cb: ProgressCb<'_>,
    ) -> AppResult<TierOutcome> {
        let started = Instant::now();
        self.ensure_tier(kind, tier, started, &mut progress_cb)
    }

    fn ensure_tier(
        &self,
        kind: RecordKind,
        tier: CacheTier,
        started: Instant,
        progress_cb: &mut ProgressCb<'_>,
    ) -> AppResult<TierOutcome> {
        if self.store.has(kind, tier) {
            emit(progress_cb, kind, tier, PipelineStage::CacheHit, started);
            return Ok(TierOutcome::Cached);
        }

        match tier {
            CacheTier::ExportJson => self.produce_export(kind, started, progress_cb)?,
            CacheTier::Snapshot => {
                self.ensure_tier(kind, CacheTier::ExportJson, started, progress_cb)?;
                emit(progress_cb, kind, tier, PipelineStage::ReadingJson, started);
                let export = self.store.read_export_json(kind)?;
                emit(progress_cb, kind, tier, PipelineStage::WritingSnapshot, started);
                self.store.write_snapshot(kind, &export)?;
                info!(%kind, runs = export.runs.len(), "wrote raw snapshot");
            }
            CacheTier::Clean => {
                self.ensure_tier(kind, CacheTier::Snapshot, started, progress_cb)?;
                emit(progress_cb, kind, tier, PipelineStage::Aggregating, started);
                self.produce_clean(kind, started, progress_cb)?;
            }
            CacheTier::CleanMirror => {
                if self.ensure_tier(kind, CacheTier::Clean, started, progress_cb)?
                    == TierOutcome::Produced
                    && self.store.has(kind, CacheTier::CleanMirror)
                {
                    return Ok(TierOutcome::Produced);
                }
                emit(progress_cb, kind, tier, PipelineStage::WritingMirror, started);
                match kind {
                    RecordKind::Vector => {
                        let clean: CleanVectorData = self.store.read_clean(kind)?;
                        self.store.write_mirror(kind, &clean)?;
                    }
                    RecordKind::Scalar => {
                        let clean: CleanScalarData = self.store.read_clean(kind)?;
                        self.store.write_mirror(kind, &clean)?;
                    }
                }
            }
        }
        Ok(TierOutcome::Produced)
    }

    fn produce_export(
        &self,
        kind: RecordKind,
        started: Instant,
        progress_cb: &mut ProgressCb<'_>,
    ) -> AppResult<()> {
        let output = self.store.path(kind, CacheTier::ExportJson);
        if !self.options.run_exporter {
            return Err(lt_results::ResultsError::MissingInput { path: output }.into());
        }
        emit(progress_cb, kind, CacheTier::ExportJson, PipelineStage::Exporting, started);
        let command = export_tool::build_export_command(&self.config, kind, &output)?;
        export_tool::run_export(&command)?;
        if !output.exists() {
            return Err(lt_results::ResultsError::MissingInput { path: output }.into());
        }
        Ok(())
    }

    fn produce_clean(
        &self,
        kind: RecordKind,
        started: Instant,
        progress_cb: &mut ProgressCb<'_>,
    ) -> AppResult<()> {
        let (export, source_fingerprint) = self.store.read_snapshot(kind)?;
        let created_at = chrono::Utc::now().to_rfc3339();
        match kind {
            RecordKind::Vector => {
                let runs = self.aggregator.vectors(&export)?;
                let snapshot = CleanSnapshot {
                    manifest: manifest(kind, created_at, source_fingerprint, runs.len()),
                    runs,
                };
                emit(progress_cb, kind, CacheTier::Clean, PipelineStage::WritingClean, started);
                self.store.write_clean(kind, &snapshot)?;
            }
            RecordKind::Scalar => {
                let runs = self.aggregator.scalars(&export)?;
                let snapshot = CleanSnapshot {
                    manifest: manifest(kind, created_at, source_fingerprint, runs.len()),
                    runs,
                };
                emit(progress_cb, kind, CacheTier::Clean, PipelineStage::WritingClean, started);
                self.store.write_clean(kind, &snapshot)?;
            }
        }
        info!(%kind, "wrote clean snapshot");
        Ok(())
    }

    /// Ensure the clean vector tier and load it.
    pub fn load_vectors(&self) -> AppResult<CleanVectorData> {
        self.ensure(RecordKind::Vector, CacheTier::Clean)?;
        Ok(self.store.read_clean(RecordKind::Vector)?)
    }

    /// Ensure the clean scalar tier and load it.
    pub fn load_scalars(&self) -> AppResult<CleanScalarData> {
        self.ensure(RecordKind::Scalar, CacheTier::Clean)?;
        Ok(self.store.read_clean(RecordKind::Scalar)?)
    }

    /// Whether `kind` can be loaded: some tier is already on disk, or the
    /// export tool is enabled and has inputs to read.
    pub fn has_source(&self, kind: RecordKind) -> AppResult<bool> {
        let cached = [CacheTier::ExportJson, CacheTier::Snapshot, CacheTier::Clean]
            .into_iter()
            .any(|tier| self.store.has(kind, tier));
        if cached {
            return Ok(true);
        }
        if !self.options.run_exporter {
            return Ok(false);
        }
        let output = self.store.path(kind, CacheTier::ExportJson);
        match export_tool::build_export_command(&self.config, kind, &output) {
            Ok(_) => Ok(true),
            Err(AppError::NoExportInputs { .. }) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Load every record kind that has a source. A kind without one is
    /// `None`; having neither is an error.
    pub fn load_available(&self) -> AppResult<LoadedData> {
        let vectors = if self.has_source(RecordKind::Vector)? {
            Some(self.load_vectors()?)
        } else {
            None
        };
        let scalars = if self.has_source(RecordKind::Scalar)? {
            Some(self.load_scalars()?)
        } else {
            None
        };
        if vectors.is_none() && scalars.is_none() {
            return Err(AppError::NoResults {
                dir: self.store.root_dir().to_path_buf(),
            });
        }
        info!(
            vectors = vectors.is_some(),
            scalars = scalars.is_some(),
            "loaded clean data"
        );
        Ok(LoadedData { vectors, scalars })
    }
}

/// Clean data of whichever record kinds were available.
#[derive(Debug, Clone)]
pub struct LoadedData {
    pub vectors: Option<CleanVectorData>,
    pub scalars: Option<CleanScalarData>,
}

fn manifest(
    kind: RecordKind,
    created_at: String,
    source_fingerprint: String,
    run_count: usize,
) -> CleanManifest {
    CleanManifest {
        kind,
        created_at,
        source_fingerprint,
        run_count,
    }
}

fn emit(
    progress_cb: &mut ProgressCb<'_>,
    kind: RecordKind,
    tier: CacheTier,
    stage: PipelineStage,
    started: Instant,
) {
    if let Some(cb) = progress_cb.as_deref_mut() {
        cb(PipelineEvent {
            kind,
            tier,
            stage,
            elapsed_wall_s: started.elapsed().as_secs_f64(),
        });
    }
}
