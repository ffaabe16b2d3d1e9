//! Module-path label matching.
//!
//! A pattern names one subsystem of one node, e.g.
//! `LoRaNetworkTest\.loRaNodes\[(\d+)\]\.LoRaNic\.radio\.energyConsumer`,
//! with the node index as its only capture group. Matching always starts at
//! the beginning of the label. In [`MatchMode::Prefix`] a label with extra
//! trailing segments still matches; [`MatchMode::Exact`] requires the pattern
//! to cover the whole label.

use lt_config::{MatchMode, PatternDef};
use regex::Regex;

use crate::error::{AggregateError, AggregateResult};

#[derive(Debug, Clone)]
pub struct LabelMatcher {
    regex: Regex,
    mode: MatchMode,
}

impl LabelMatcher {
    pub fn new(pattern: &str, mode: MatchMode) -> AggregateResult<Self> {
        let anchored = match mode {
            MatchMode::Prefix => format!("^(?:{})", pattern),
            MatchMode::Exact => format!("^(?:{})$", pattern),
        };
        let regex = Regex::new(&anchored).map_err(|e| AggregateError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        if regex.captures_len() != 2 {
            return Err(AggregateError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: "expected exactly one capture group for the node index".to_string(),
            });
        }
        Ok(Self { regex, mode })
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    pub fn is_match(&self, label: &str) -> bool {
        self.regex.is_match(label)
    }

    /// Node index captured from `label`, or `None` when the label does not match.
    ///
    /// The index is not range-checked here; it may exceed `u32`.
    pub fn node_index(&self, label: &str) -> Option<u64> {
        let caps = self.regex.captures(label)?;
        caps.get(1)?.as_str().parse().ok()
    }
}

/// The three per-node subsystems the aggregators look at.
#[derive(Debug, Clone)]
pub struct RecordMatchers {
    pub energy_consumer: LabelMatcher,
    pub queue: LabelMatcher,
    pub mac: LabelMatcher,
}

impl RecordMatchers {
    pub fn from_patterns(patterns: &PatternDef) -> AggregateResult<Self> {
        Ok(Self {
            energy_consumer: LabelMatcher::new(&patterns.energy_consumer, patterns.match_mode)?,
            queue: LabelMatcher::new(&patterns.queue, patterns.match_mode)?,
            mac: LabelMatcher::new(&patterns.mac, patterns.match_mode)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults(mode: MatchMode) -> RecordMatchers {
        let patterns = PatternDef {
            match_mode: mode,
            ..PatternDef::default()
        };
        RecordMatchers::from_patterns(&patterns).unwrap()
    }

    #[test]
    fn extracts_node_index() {
        let m = defaults(MatchMode::Prefix);
        assert_eq!(
            m.energy_consumer
                .node_index("LoRaNetworkTest.loRaNodes[7].LoRaNic.radio.energyConsumer"),
            Some(7)
        );
        assert_eq!(
            m.queue.node_index("LoRaNetworkTest.loRaNodes[12].LoRaNic.queue"),
            Some(12)
        );
        assert_eq!(
            m.energy_consumer
                .node_index("LoRaNetworkTest.loRaNodes[12].LoRaNic.queue"),
            None
        );
    }

    #[test]
    fn gateway_label_is_ignored() {
        let m = defaults(MatchMode::Prefix);
        for matcher in [&m.energy_consumer, &m.queue, &m.mac] {
            assert_eq!(matcher.node_index("LoRaNetworkTest.gateway.radio"), None);
        }
    }

    #[test]
    fn prefix_mode_accepts_trailing_segments() {
        let label = "LoRaNetworkTest.loRaNodes[3].LoRaNic.radio.energyConsumer.sub";
        assert_eq!(defaults(MatchMode::Prefix).energy_consumer.node_index(label), Some(3));
        assert_eq!(defaults(MatchMode::Exact).energy_consumer.node_index(label), None);
    }

    #[test]
    fn match_is_anchored_at_start() {
        let label = "Outer.LoRaNetworkTest.loRaNodes[3].LoRaNic.radio.energyConsumer";
        assert!(!defaults(MatchMode::Prefix).energy_consumer.is_match(label));
    }

    #[test]
    fn rejects_patterns_without_single_capture() {
        assert!(LabelMatcher::new(r"loRaNodes\[\d+\]", MatchMode::Prefix).is_err());
        assert!(LabelMatcher::new(r"(a)(\d+)", MatchMode::Prefix).is_err());
        assert!(LabelMatcher::new(r"(\d+", MatchMode::Prefix).is_err());
    }

    #[test]
    fn oversized_index_is_still_reported() {
        let m = defaults(MatchMode::Prefix);
        let label = "LoRaNetworkTest.loRaNodes[99999999999].LoRaNic.queue";
        assert_eq!(m.queue.node_index(label), Some(99_999_999_999));
    }
}
