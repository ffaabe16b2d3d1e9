//! Progress events emitted while the pipeline fills cache tiers.

use lt_results::{CacheTier, RecordKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    CacheHit,
    Exporting,
    ReadingJson,
    WritingSnapshot,
    Aggregating,
    WritingClean,
    WritingMirror,
}

impl PipelineStage {
    pub fn label(self) -> &'static str {
        match self {
            PipelineStage::CacheHit => "cache hit",
            PipelineStage::Exporting => "exporting",
            PipelineStage::ReadingJson => "reading json",
            PipelineStage::WritingSnapshot => "writing snapshot",
            PipelineStage::Aggregating => "aggregating",
            PipelineStage::WritingClean => "writing clean snapshot",
            PipelineStage::WritingMirror => "writing json mirror",
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineEvent {
    pub kind: RecordKind,
    pub tier: CacheTier,
    pub stage: PipelineStage,
    pub elapsed_wall_s: f64,
}
