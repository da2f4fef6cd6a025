//! crates/logging/src/levels.rs
//! Debug flag enum and per-flag level storage.

/// Diagnostic categories of the digest pipeline.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DebugFlag {
    /// Tier and fold-kernel selection.
    Tier,
    /// Batch dispatch.
    Batch,
    /// Prefetch and aligned staging.
    Staging,
    /// Worker-pool lifecycle and partition plans.
    Pool,
}

impl DebugFlag {
    /// Every flag, in declaration order.
    pub const ALL: [Self; 4] = [Self::Tier, Self::Batch, Self::Staging, Self::Pool];

    /// Token used on the command line and in tracing targets.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Tier => "tier",
            Self::Batch => "batch",
            Self::Staging => "staging",
            Self::Pool => "pool",
        }
    }

    /// Looks a flag up by its token.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|flag| flag.name() == name)
    }

    /// Tracing target that events of this category are emitted under.
    #[must_use]
    pub const fn target(self) -> &'static str {
        match self {
            Self::Tier => "foldsm3::tier",
            Self::Batch => "foldsm3::batch",
            Self::Staging => "foldsm3::staging",
            Self::Pool => "foldsm3::pool",
        }
    }
}

/// Debug verbosity level for each flag.
#[derive(Clone, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DebugLevels {
    /// Tier selection level.
    pub tier: u8,
    /// Batch dispatch level.
    pub batch: u8,
    /// Staging layer level.
    pub staging: u8,
    /// Worker-pool level.
    pub pool: u8,
}

impl DebugLevels {
    /// Get the level for a specific flag.
    pub const fn get(&self, flag: DebugFlag) -> u8 {
        match flag {
            DebugFlag::Tier => self.tier,
            DebugFlag::Batch => self.batch,
            DebugFlag::Staging => self.staging,
            DebugFlag::Pool => self.pool,
        }
    }

    /// Set the level for a specific flag.
    pub const fn set(&mut self, flag: DebugFlag, level: u8) {
        match flag {
            DebugFlag::Tier => self.tier = level,
            DebugFlag::Batch => self.batch = level,
            DebugFlag::Staging => self.staging = level,
            DebugFlag::Pool => self.pool = level,
        }
    }

    /// Set all flags to the specified level.
    pub const fn set_all(&mut self, level: u8) {
        self.tier = level;
        self.batch = level;
        self.staging = level;
        self.pool = level;
    }
}
