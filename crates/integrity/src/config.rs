//! Pipeline configuration.
//!
//! [`PipelineConfig`] bundles the knobs a caller usually wants to set once:
//! tier, output width, worker count and memory options. Values can be set
//! in code or read from the environment:
//!
//! | variable           | accepted values                                  |
//! |--------------------|--------------------------------------------------|
//! | `FOLDSM3_TIER`     | `auto`, `reference`, `unrolled`, `vectorized`    |
//! | `FOLDSM3_THREADS`  | worker count; `0` hashes on the calling thread   |
//! | `FOLDSM3_PREFETCH` | prefetch distance in blocks; `0` disables it     |

use std::fmt;
use std::str::FromStr;

use crate::block::DigestWidth;
use crate::error::IntegrityError;
use crate::staging::{MAX_PREFETCH_DISTANCE, MemoryOptions, StagingReport, hash_batch_raw_staged};
use crate::tier::{self, Tier};

/// Environment variable selecting the tier.
pub const TIER_ENV: &str = "FOLDSM3_TIER";
/// Environment variable selecting the worker count.
pub const THREADS_ENV: &str = "FOLDSM3_THREADS";
/// Environment variable selecting the prefetch distance.
pub const PREFETCH_ENV: &str = "FOLDSM3_PREFETCH";

/// Upper bound for configured worker counts.
pub const MAX_THREADS: usize = 256;

/// Tier choice that may be deferred to CPU detection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TierSelection {
    /// Use [`tier::global`].
    #[default]
    Auto,
    /// Always use this tier.
    Fixed(Tier),
}

impl TierSelection {
    /// Resolves the selection to a concrete tier.
    #[must_use]
    pub fn resolve(self) -> Tier {
        match self {
            Self::Auto => tier::global(),
            Self::Fixed(tier) => tier,
        }
    }
}

impl fmt::Display for TierSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => f.write_str("auto"),
            Self::Fixed(tier) => fmt::Display::fmt(tier, f),
        }
    }
}

impl FromStr for TierSelection {
    type Err = IntegrityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("auto") {
            Ok(Self::Auto)
        } else {
            s.parse().map(Self::Fixed)
        }
    }
}

/// Work summary returned by [`PipelineConfig::run`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunSummary {
    /// Tier the blocks were hashed with.
    pub tier: Tier,
    /// Blocks hashed.
    pub blocks: usize,
    /// Worker threads used; `0` for the calling thread.
    pub workers: usize,
    /// Parallel dispatch fell back to the calling thread.
    pub degraded: bool,
    /// Staging activity, when the sequential staged path ran.
    pub staging: Option<StagingReport>,
}

/// Complete pipeline configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PipelineConfig {
    /// Tier selection.
    pub tier: TierSelection,
    /// Output width of raw dispatch.
    pub width: DigestWidth,
    /// Worker threads; `0` and `1` both hash on the calling thread with
    /// the staging layer.
    pub threads: usize,
    /// Memory-access layer options.
    pub memory: MemoryOptions,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            tier: TierSelection::Auto,
            width: DigestWidth::Bits256,
            threads: 0,
            memory: MemoryOptions::default(),
        }
    }
}

impl PipelineConfig {
    /// Sets a fixed tier.
    pub const fn with_tier(mut self, tier: Tier) -> Self {
        self.tier = TierSelection::Fixed(tier);
        self
    }

    /// Sets the output width.
    pub const fn with_width(mut self, width: DigestWidth) -> Self {
        self.width = width;
        self
    }

    /// Sets the worker count, capped at [`MAX_THREADS`].
    pub const fn with_threads(mut self, threads: usize) -> Self {
        self.threads = if threads > MAX_THREADS {
            MAX_THREADS
        } else {
            threads
        };
        self
    }

    /// Sets the memory options.
    pub const fn with_memory(mut self, memory: MemoryOptions) -> Self {
        self.memory = memory;
        self
    }

    /// Tier this configuration resolves to.
    #[must_use]
    pub fn tier(&self) -> Tier {
        self.tier.resolve()
    }

    /// Defaults overridden by `FOLDSM3_*` environment variables.
    ///
    /// Unset variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns the parse error of the first malformed variable.
    pub fn from_env() -> Result<Self, IntegrityError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`PipelineConfig::from_env`] with a caller-provided lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, IntegrityError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(TIER_ENV) {
            config.tier = value.parse()?;
        }
        if let Some(value) = lookup(THREADS_ENV) {
            config.threads = parse_threads(&value)?;
        }
        if let Some(value) = lookup(PREFETCH_ENV) {
            config.memory.prefetch_distance = parse_prefetch(&value)?;
        }

        Ok(config)
    }

    /// Hashes a flat buffer of blocks into `out` according to this
    /// configuration.
    ///
    /// With fewer than two threads the staged sequential path runs;
    /// otherwise the blocks go to the shared worker pool for `threads`.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrityError::BufferLength`] or
    /// [`IntegrityError::OutputLength`] when either buffer has the
    /// wrong length.
    pub fn run(&self, blocks: &[u8], out: &mut [u8]) -> Result<RunSummary, IntegrityError> {
        let tier = self.tier();

        #[cfg(feature = "parallel")]
        if self.threads > 1 {
            let summary = crate::parallel::hash_parallel(tier, blocks, out, self.threads, self.width)?;
            return Ok(RunSummary {
                tier,
                blocks: summary.blocks,
                workers: summary.workers,
                degraded: summary.degraded,
                staging: None,
            });
        }

        let report = hash_batch_raw_staged(tier, blocks, out, self.width, self.memory)?;
        Ok(RunSummary {
            tier,
            blocks: report.blocks,
            workers: 0,
            degraded: false,
            staging: Some(report),
        })
    }
}

fn parse_threads(value: &str) -> Result<usize, IntegrityError> {
    value
        .trim()
        .parse::<usize>()
        .ok()
        .filter(|&threads| threads <= MAX_THREADS)
        .ok_or_else(|| IntegrityError::InvalidThreadCount(value.to_owned()))
}

fn parse_prefetch(value: &str) -> Result<usize, IntegrityError> {
    value
        .trim()
        .parse::<usize>()
        .ok()
        .filter(|&distance| distance <= MAX_PREFETCH_DISTANCE)
        .ok_or_else(|| IntegrityError::InvalidPrefetchDistance(value.to_owned()))
}
