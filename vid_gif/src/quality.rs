//! Quality presets
//!
//! Three fixed profiles. Resolution is lenient: anything that is not one of
//! the preset names yields `medium`.

use serde::Serialize;
use std::fmt;

/// Encoding parameters for one conversion. Never mutated after construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QualityProfile {
    /// Output frames per second
    pub frame_rate: u32,
    /// Linear resize factor in (0, 1], applied to both dimensions
    pub scale: f64,
    /// Colors in the generated palette (2..=256)
    pub palette_size: u16,
    /// Let the encoder optimize for size (frame-difference palette + rectangle updates)
    pub optimize: bool,
}

impl QualityProfile {
    pub const HIGH: QualityProfile = QualityProfile {
        frame_rate: 15,
        scale: 1.0,
        palette_size: 256,
        optimize: true,
    };

    pub const MEDIUM: QualityProfile = QualityProfile {
        frame_rate: 10,
        scale: 0.75,
        palette_size: 128,
        optimize: true,
    };

    pub const LOW: QualityProfile = QualityProfile {
        frame_rate: 8,
        scale: 0.5,
        palette_size: 64,
        optimize: true,
    };

    /// True when frames must be resized before encoding.
    pub fn needs_resize(&self) -> bool {
        (self.scale - 1.0).abs() > f64::EPSILON
    }
}

impl Default for QualityProfile {
    fn default() -> Self {
        Self::MEDIUM
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Quality {
    High,
    #[default]
    Medium,
    Low,
}

impl Quality {
    pub const ALL: [Quality; 3] = [Quality::High, Quality::Medium, Quality::Low];

    /// Exact (case-insensitive, trimmed) match against the preset names.
    pub fn parse(identifier: &str) -> Option<Quality> {
        match identifier.trim().to_ascii_lowercase().as_str() {
            "high" => Some(Quality::High),
            "medium" => Some(Quality::Medium),
            "low" => Some(Quality::Low),
            _ => None,
        }
    }

    /// Like [`Quality::parse`] but unknown identifiers become `Medium`.
    pub fn parse_lenient(identifier: &str) -> Quality {
        Self::parse(identifier).unwrap_or_default()
    }

    pub fn profile(self) -> QualityProfile {
        match self {
            Quality::High => QualityProfile::HIGH,
            Quality::Medium => QualityProfile::MEDIUM,
            Quality::Low => QualityProfile::LOW,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Quality::High => "high",
            Quality::Medium => "medium",
            Quality::Low => "low",
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Profile for `identifier`; unknown or malformed identifiers get the medium profile.
pub fn resolve(identifier: &str) -> QualityProfile {
    Quality::parse_lenient(identifier).profile()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_canonical_profiles() {
        assert_eq!(
            resolve("high"),
            QualityProfile {
                frame_rate: 15,
                scale: 1.0,
                palette_size: 256,
                optimize: true
            }
        );
        assert_eq!(
            resolve("medium"),
            QualityProfile {
                frame_rate: 10,
                scale: 0.75,
                palette_size: 128,
                optimize: true
            }
        );
        assert_eq!(
            resolve("low"),
            QualityProfile {
                frame_rate: 8,
                scale: 0.5,
                palette_size: 64,
                optimize: true
            }
        );
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(resolve("HIGH"), resolve("high"));
        assert_eq!(resolve("Low"), QualityProfile::LOW);
        assert_eq!(resolve("  medium\n"), QualityProfile::MEDIUM);
    }

    #[test]
    fn test_fallback_to_medium() {
        for id in ["", "ultra", "hi", "lowest", "médium", "1"] {
            assert_eq!(resolve(id), QualityProfile::MEDIUM, "identifier {:?}", id);
        }
        assert_eq!(QualityProfile::default(), QualityProfile::MEDIUM);
    }

    #[test]
    fn test_needs_resize() {
        assert!(!QualityProfile::HIGH.needs_resize());
        assert!(QualityProfile::MEDIUM.needs_resize());
        assert!(QualityProfile::LOW.needs_resize());
    }

    #[test]
    fn test_profiles_within_bounds() {
        for q in Quality::ALL {
            let p = q.profile();
            assert!(p.frame_rate > 0);
            assert!(p.scale > 0.0 && p.scale <= 1.0);
            assert!(p.palette_size >= 2 && p.palette_size <= 256);
            assert_eq!(Quality::parse(q.as_str()), Some(q));
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn unknown_identifiers_resolve_to_medium(id in "\\PC*") {
            let known = matches!(
                id.trim().to_ascii_lowercase().as_str(),
                "high" | "medium" | "low"
            );
            prop_assume!(!known);
            prop_assert_eq!(resolve(&id), QualityProfile::MEDIUM);
        }

        #[test]
        fn resolution_ignores_ascii_case(mask in proptest::collection::vec(any::<bool>(), 6)) {
            for q in Quality::ALL {
                let mixed: String = q
                    .as_str()
                    .chars()
                    .zip(mask.iter().cycle())
                    .map(|(c, upper)| if *upper { c.to_ascii_uppercase() } else { c })
                    .collect();
                prop_assert_eq!(resolve(&mixed), q.profile());
            }
        }
    }
}
