//! crates/logging/src/config.rs
//! Verbosity configuration for the debug flags.

use super::levels::{DebugFlag, DebugLevels};

/// Verbosity configuration consulted by [`crate::FoldLayer`] and
/// [`crate::debug_log!`].
#[derive(Clone, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VerbosityConfig {
    /// Debug flag levels.
    pub debug: DebugLevels,
}

impl VerbosityConfig {
    /// Create a configuration from a `-v` count.
    ///
    /// Level 0 records nothing. Level 1 records tier selection and pool
    /// warnings, level 2 adds pool lifecycle and partition plans, and level 3
    /// or higher records everything including per-batch tracing.
    pub fn from_verbose_level(level: u8) -> Self {
        let mut config = Self::default();

        match level {
            0 => {}
            1 => {
                config.debug.tier = 1;
                config.debug.pool = 1;
            }
            2 => {
                config.debug.tier = 2;
                config.debug.pool = 2;
                config.debug.batch = 1;
                config.debug.staging = 1;
            }
            _ => config.debug.set_all(3),
        }

        config
    }

    /// Apply a single debug flag token (e.g., "pool2", "tier", "all0").
    pub fn apply_debug_flag(&mut self, token: &str) -> Result<(), String> {
        let (name, level) = parse_flag_token(token)?;

        if name.eq_ignore_ascii_case("all") {
            self.debug.set_all(level);
            return Ok(());
        }
        if name.eq_ignore_ascii_case("none") {
            self.debug.set_all(0);
            return Ok(());
        }

        let flag = DebugFlag::from_name(name).ok_or_else(|| format!("unknown debug flag: {name}"))?;
        self.debug.set(flag, level);
        Ok(())
    }

    /// Apply a comma-separated list of debug tokens.
    pub fn apply_debug_list(&mut self, list: &str) -> Result<(), String> {
        list.split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .try_for_each(|token| self.apply_debug_flag(token))
    }
}

/// Parse a flag token like "pool2" into ("pool", 2) or "tier" into ("tier", 1).
fn parse_flag_token(token: &str) -> Result<(&str, u8), String> {
    if token.is_empty() {
        return Err("empty flag token".to_string());
    }

    match token.find(|c: char| c.is_ascii_digit()) {
        Some(0) => Err(format!("missing flag name in: {token}")),
        Some(pos) => {
            let level = token[pos..]
                .parse::<u8>()
                .map_err(|_| format!("invalid level in flag: {token}"))?;
            Ok((&token[..pos], level))
        }
        None => Ok((token, 1)),
    }
}
