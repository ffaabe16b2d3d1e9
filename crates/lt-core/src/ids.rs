use core::fmt;
use core::num::NonZeroU32;

use crate::{CoreError, CoreResult};

/// 0-based index of a LoRa node inside one run.
///
/// - `u32` keeps per-node tables small
/// - `NonZero` enables `Option<NodeIndex>` to be pointer-optimized
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(NonZeroU32);

impl NodeIndex {
    /// Create a NodeIndex from a 0-based index by storing index+1.
    ///
    /// Returns `None` for `u32::MAX`, which has no successor.
    pub fn from_index(index: u32) -> Option<Self> {
        index.checked_add(1).and_then(NonZeroU32::new).map(Self)
    }

    /// Recover the 0-based index.
    pub fn index(self) -> u32 {
        self.0.get() - 1
    }

    pub fn as_usize(self) -> usize {
        self.index() as usize
    }
}

impl fmt::Debug for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeIndex({})", self.index())
    }
}

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

/// Number of LoRa nodes in a run. Always positive; it is also the run key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeCount(NonZeroU32);

impl NodeCount {
    pub fn new(count: u32) -> CoreResult<Self> {
        NonZeroU32::new(count)
            .map(Self)
            .ok_or_else(|| CoreError::InvalidNodeCount {
                value: count.to_string(),
            })
    }

    /// Parse the textual form the simulator writes into `itervars`.
    pub fn parse(text: &str) -> CoreResult<Self> {
        let trimmed = text.trim();
        let count: u32 = trimmed.parse().map_err(|_| CoreError::InvalidNodeCount {
            value: text.to_string(),
        })?;
        Self::new(count)
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }

    pub fn as_usize(self) -> usize {
        self.0.get() as usize
    }

    /// Checked conversion of a raw index extracted from a module path.
    pub fn index(self, raw: u32) -> CoreResult<NodeIndex> {
        if raw >= self.get() {
            return Err(CoreError::IndexOob {
                index: raw,
                count: self.get(),
            });
        }
        // raw < count <= u32::MAX, so raw + 1 cannot overflow
        NodeIndex::from_index(raw).ok_or(CoreError::IndexOob {
            index: raw,
            count: self.get(),
        })
    }
}

impl fmt::Debug for NodeCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeCount({})", self.get())
    }
}

impl fmt::Display for NodeCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}
