//! Running counters for a resolver.

use serde::{Deserialize, Serialize};

use crate::resolver::{Decision, Resolution};

/// Counters accumulated over one stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverStats {
    /// Records seen, including preserved ones.
    pub records: u64,
    /// Records that minted a new owner id.
    pub minted: u64,
    /// Records that matched an owner minted by an earlier record.
    pub matched: u64,
    /// Email keys moved from one existing owner to a different phone owner.
    pub reassigned: u64,
    /// Records left untouched because they already carried an owner.
    pub preserved: u64,
}

impl ResolverStats {
    pub(crate) fn observe(&mut self, resolution: &Resolution) {
        self.records += 1;
        if resolution.decision == Decision::Preserved {
            self.preserved += 1;
        } else if resolution.minted {
            self.minted += 1;
        } else {
            self.matched += 1;
        }
        if resolution.reassigned {
            self.reassigned += 1;
        }
    }
}
