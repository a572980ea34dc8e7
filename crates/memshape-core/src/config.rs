//! Run configuration.
//!
//! Two environment variables shape every run:
//! - `MEMSHAPE_PROFILE`: `full` (default) uses the documented dataset sizes;
//!   `quick` divides them by 100 (never below 100) for smoke runs.
//! - `MEMSHAPE_SEED`: payload seed, decimal or `0x`-prefixed hex.
//!
//! Both are read on first use and cached for the life of the process.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU8, Ordering};

use crate::error::MemshapeError;
use crate::rng::DEFAULT_SEED;

pub const PROFILE_ENV: &str = "MEMSHAPE_PROFILE";
pub const SEED_ENV: &str = "MEMSHAPE_SEED";

const QUICK_DIVISOR: usize = 100;
const QUICK_FLOOR: usize = 100;

/// Dataset size profile.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScaleProfile {
    #[default]
    Full,
    Quick,
}

impl ScaleProfile {
    /// Parse from string (case-insensitive), falling back to `Full`.
    #[must_use]
    pub fn from_str_loose(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "quick" | "smoke" | "ci" | "small" => Self::Quick,
            _ => Self::Full,
        }
    }

    /// Strict parse for CLI input.
    pub fn parse(s: &str) -> Result<Self, MemshapeError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" => Ok(Self::Full),
            "quick" => Ok(Self::Quick),
            _ => Err(MemshapeError::InvalidProfile(s.to_string())),
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Quick => "quick",
        }
    }

    /// Resolve a documented size under this profile.
    #[must_use]
    pub fn scale(self, n: usize) -> usize {
        match self {
            Self::Full => n,
            Self::Quick => (n / QUICK_DIVISOR).max(QUICK_FLOOR).min(n),
        }
    }
}

// 0=unresolved, 1=Full, 2=Quick.
static CACHED_PROFILE: AtomicU8 = AtomicU8::new(0);
static CACHED_SEED: OnceLock<u64> = OnceLock::new();

/// Configured profile (reads the environment on first call).
#[must_use]
pub fn scale_profile() -> ScaleProfile {
    match CACHED_PROFILE.load(Ordering::Relaxed) {
        1 => ScaleProfile::Full,
        2 => ScaleProfile::Quick,
        _ => {
            let profile = std::env::var(PROFILE_ENV)
                .map(|v| ScaleProfile::from_str_loose(&v))
                .unwrap_or_default();
            let tag = match profile {
                ScaleProfile::Full => 1,
                ScaleProfile::Quick => 2,
            };
            CACHED_PROFILE.store(tag, Ordering::Relaxed);
            profile
        }
    }
}

/// Configured payload seed; an unparsable value falls back to the default.
#[must_use]
pub fn payload_seed() -> u64 {
    *CACHED_SEED.get_or_init(|| {
        std::env::var(SEED_ENV)
            .ok()
            .and_then(|v| parse_seed(&v).ok())
            .unwrap_or(DEFAULT_SEED)
    })
}

/// Parse a seed written as decimal or `0x` hex; `_` separators are allowed.
pub fn parse_seed(raw: &str) -> Result<u64, MemshapeError> {
    let cleaned: String = raw.trim().chars().filter(|&c| c != '_').collect();
    let parsed = if let Some(hex) = cleaned
        .strip_prefix("0x")
        .or_else(|| cleaned.strip_prefix("0X"))
    {
        u64::from_str_radix(hex, 16)
    } else {
        cleaned.parse::<u64>()
    };
    parsed.map_err(|_| MemshapeError::InvalidSeed(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_profiles_loosely() {
        assert_eq!(ScaleProfile::from_str_loose("full"), ScaleProfile::Full);
        assert_eq!(ScaleProfile::from_str_loose("QUICK"), ScaleProfile::Quick);
        assert_eq!(ScaleProfile::from_str_loose("ci"), ScaleProfile::Quick);
        assert_eq!(ScaleProfile::from_str_loose("bogus"), ScaleProfile::Full);
    }

    #[test]
    fn strict_parse_rejects_unknown() {
        assert_eq!(ScaleProfile::parse("quick").unwrap(), ScaleProfile::Quick);
        assert!(matches!(
            ScaleProfile::parse("huge"),
            Err(MemshapeError::InvalidProfile(_))
        ));
    }

    #[test]
    fn quick_scale_divides_with_floor() {
        assert_eq!(ScaleProfile::Quick.scale(10_000_000), 100_000);
        assert_eq!(ScaleProfile::Quick.scale(10_000), 100);
        assert_eq!(ScaleProfile::Quick.scale(100), 100);
        assert_eq!(ScaleProfile::Quick.scale(40), 40);
        assert_eq!(ScaleProfile::Full.scale(1_000_000), 1_000_000);
    }

    #[test]
    fn seeds_parse_decimal_and_hex() {
        assert_eq!(parse_seed("42").unwrap(), 42);
        assert_eq!(parse_seed("0xDEAD_BEEF").unwrap(), 0xDEAD_BEEF);
        assert_eq!(parse_seed(" 0X10 ").unwrap(), 16);
        assert!(parse_seed("-1").is_err());
        assert!(parse_seed("0xZZ").is_err());
    }

    #[test]
    fn default_profile_is_full() {
        assert_eq!(ScaleProfile::default(), ScaleProfile::Full);
    }
}
