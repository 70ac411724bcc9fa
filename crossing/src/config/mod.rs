/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Intersection configuration loading.
//!
//! The expected YAML structure is:
//! ```yaml
//! sequence: red_red_yellow_green_yellow
//! yellow_time_secs: 1
//! fixtures:
//!   - name: north
//!     pins: { red: 0, yellow: 1, green: 2 }
//!     green_time_secs: 1
//!   - pins: { red: 10, yellow: 11, green: 12 }
//! ```
//!
//! Fixtures get green in file order.  Durations are whole, non-negative
//! seconds; anything else fails to deserialize.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::{debug, info};

use crate::fixture::PinAssignment;
use crate::intersection::{IntersectionBuilder, DEFAULT_GREEN_TIME_SECS, DEFAULT_YELLOW_TIME_SECS};
use crate::pattern::PhaseSequence;

// ── Private YAML deserialization types ────────────────────────────────────────

/// Top-level wrapper that maps directly onto the YAML file layout.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct IntersectionConfigFile {
    #[serde(default)]
    sequence: PhaseSequence,
    #[serde(default = "default_yellow_time_secs")]
    yellow_time_secs: u64,
    #[serde(default)]
    fixtures: Vec<FixtureEntry>,
}

/// Per-fixture fields as they appear in the YAML file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FixtureEntry {
    name: Option<String>,
    pins: PinAssignment,
    #[serde(default = "default_green_time_secs")]
    green_time_secs: u64,
}

fn default_yellow_time_secs() -> u64 {
    DEFAULT_YELLOW_TIME_SECS
}

fn default_green_time_secs() -> u64 {
    DEFAULT_GREEN_TIME_SECS
}

// ── Public data structures ────────────────────────────────────────────────────

/// One fixture's wiring and green time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureConfig {
    pub name: String,
    pub pins: PinAssignment,
    pub green_time_secs: u64,
}

/// Everything needed to build an intersection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntersectionConfig {
    pub sequence: PhaseSequence,
    pub yellow_time_secs: u64,
    pub fixtures: Vec<FixtureConfig>,
}

impl IntersectionConfig {
    /// Parse `path`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, if the YAML is
    /// structurally invalid, or if it lists no fixtures.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        info!("Loading intersection configuration from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot open configuration file: {}", path.display()))?;

        let file: IntersectionConfigFile = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML file: {}", path.display()))?;

        if file.fixtures.is_empty() {
            bail!("No fixtures defined in {}", path.display());
        }

        let fixtures: Vec<FixtureConfig> = file
            .fixtures
            .into_iter()
            .enumerate()
            .map(|(i, entry)| FixtureConfig {
                name: entry.name.unwrap_or_else(|| format!("fixture{i}")),
                pins: entry.pins,
                green_time_secs: entry.green_time_secs,
            })
            .collect();

        for f in &fixtures {
            debug!(
                "  Fixture: {} | pins r/y/g: {}/{}/{} | green: {}s",
                f.name, f.pins.red, f.pins.yellow, f.pins.green, f.green_time_secs,
            );
        }

        let config = Self {
            sequence: file.sequence,
            yellow_time_secs: file.yellow_time_secs,
            fixtures,
        };
        info!(
            sequence = ?config.sequence,
            yellow_secs = config.yellow_time_secs,
            fixtures = config.fixtures.len(),
            "Loaded intersection configuration"
        );
        Ok(config)
    }

    /// Built-in four-way demo wiring, used when no file is supplied.
    pub fn default_config() -> Self {
        let fixture = |name: &str, red, yellow, green, secs| FixtureConfig {
            name: name.to_string(),
            pins: PinAssignment::new(red, yellow, green),
            green_time_secs: secs,
        };
        Self {
            sequence: PhaseSequence::RedRedYellowGreenYellow,
            yellow_time_secs: 1,
            fixtures: vec![
                fixture("fixture0", 0, 1, 2, 1),
                fixture("fixture1", 10, 11, 12, 2),
                fixture("fixture2", 18, 17, 16, 3),
                fixture("fixture3", 28, 27, 26, 4),
            ],
        }
    }

    /// An [`IntersectionBuilder`] with every fixture added in order.
    pub fn builder(&self) -> IntersectionBuilder {
        let mut builder = IntersectionBuilder::new(self.sequence, self.yellow_time_secs);
        for f in &self.fixtures {
            builder.add_fixture(f.pins, f.green_time_secs);
        }
        builder
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::TracingPins;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Helper: write a YAML string to a temp file and return it.
    fn yaml_tempfile(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    // ── default_config ────────────────────────────────────────────────────────

    #[test]
    fn default_config_is_the_four_way_demo() {
        let cfg = IntersectionConfig::default_config();
        assert_eq!(cfg.sequence, PhaseSequence::RedRedYellowGreenYellow);
        assert_eq!(cfg.yellow_time_secs, 1);
        assert_eq!(cfg.fixtures.len(), 4);
        assert_eq!(cfg.fixtures[2].pins, PinAssignment::new(18, 17, 16));
        let greens: Vec<u64> = cfg.fixtures.iter().map(|f| f.green_time_secs).collect();
        assert_eq!(greens, vec![1, 2, 3, 4]);
    }

    #[test]
    fn default_config_builds() {
        let intersection = IntersectionConfig::default_config()
            .builder()
            .build(&mut TracingPins::new())
            .unwrap();
        // 4 × 1 + (1 + 2 + 3 + 4)
        assert_eq!(intersection.period(), 14);
        assert_eq!(intersection.plan().len(), 4 * 8);
    }

    // ── load_from_file ────────────────────────────────────────────────────────

    #[test]
    fn load_full_yaml() {
        let yaml = r#"
sequence: red_red_yellow_green_yellow
yellow_time_secs: 2
fixtures:
  - name: north
    pins: { red: 0, yellow: 1, green: 2 }
    green_time_secs: 10
  - name: east
    pins:
      red: 10
      yellow: 11
      green: 12
    green_time_secs: 20
"#;
        let f = yaml_tempfile(yaml);
        let cfg = IntersectionConfig::load_from_file(f.path()).unwrap();

        assert_eq!(cfg.sequence, PhaseSequence::RedRedYellowGreenYellow);
        assert_eq!(cfg.yellow_time_secs, 2);
        assert_eq!(
            cfg.fixtures,
            vec![
                FixtureConfig {
                    name: "north".into(),
                    pins: PinAssignment::new(0, 1, 2),
                    green_time_secs: 10,
                },
                FixtureConfig {
                    name: "east".into(),
                    pins: PinAssignment::new(10, 11, 12),
                    green_time_secs: 20,
                },
            ]
        );
    }

    #[test]
    fn optional_fields_use_defaults_when_absent() {
        let yaml = r#"
fixtures:
  - pins: { red: 0, yellow: 1, green: 2 }
  - pins: { red: 3, yellow: 4, green: 5 }
"#;
        let f = yaml_tempfile(yaml);
        let cfg = IntersectionConfig::load_from_file(f.path()).unwrap();

        assert_eq!(cfg.sequence, PhaseSequence::RedGreenYellow);
        assert_eq!(cfg.yellow_time_secs, 3);
        assert_eq!(cfg.fixtures[0].name, "fixture0");
        assert_eq!(cfg.fixtures[1].name, "fixture1");
        assert_eq!(cfg.fixtures[1].green_time_secs, 42);

        let intersection = cfg.builder().build(&mut TracingPins::new()).unwrap();
        assert_eq!(intersection.period(), 90);
    }

    #[test]
    fn empty_fixture_list_returns_error() {
        let f = yaml_tempfile("fixtures: []\n");
        let err = IntersectionConfig::load_from_file(f.path()).unwrap_err();
        assert!(err.to_string().contains("No fixtures"));
    }

    #[test]
    fn negative_duration_returns_error() {
        let yaml = r#"
yellow_time_secs: -3
fixtures:
  - pins: { red: 0, yellow: 1, green: 2 }
"#;
        let f = yaml_tempfile(yaml);
        assert!(IntersectionConfig::load_from_file(f.path()).is_err());
    }

    #[test]
    fn fractional_duration_returns_error() {
        let yaml = r#"
fixtures:
  - pins: { red: 0, yellow: 1, green: 2 }
    green_time_secs: 1.5
"#;
        let f = yaml_tempfile(yaml);
        assert!(IntersectionConfig::load_from_file(f.path()).is_err());
    }

    #[test]
    fn unknown_sequence_returns_error() {
        let yaml = r#"
sequence: blinking
fixtures:
  - pins: { red: 0, yellow: 1, green: 2 }
"#;
        let f = yaml_tempfile(yaml);
        assert!(IntersectionConfig::load_from_file(f.path()).is_err());
    }

    #[test]
    fn missing_pin_returns_error() {
        let yaml = r#"
fixtures:
  - pins: { red: 0, green: 2 }
"#;
        let f = yaml_tempfile(yaml);
        assert!(IntersectionConfig::load_from_file(f.path()).is_err());
    }

    #[test]
    fn missing_file_returns_error() {
        let result = IntersectionConfig::load_from_file(Path::new("/nonexistent/path/crossing.yaml"));
        let err = result.unwrap_err();
        assert!(format!("{err:#}").contains("Cannot open configuration file"));
    }

    #[test]
    fn malformed_yaml_returns_error() {
        let f = yaml_tempfile("this is: not: valid: yaml: content:::");
        assert!(IntersectionConfig::load_from_file(f.path()).is_err());
    }

    // ── builder ───────────────────────────────────────────────────────────────

    #[test]
    fn builder_keeps_fixture_order() {
        let cfg = IntersectionConfig {
            sequence: PhaseSequence::RedGreenYellow,
            yellow_time_secs: 2,
            fixtures: vec![
                FixtureConfig {
                    name: "a".into(),
                    pins: PinAssignment::new(1, 2, 3),
                    green_time_secs: 5,
                },
                FixtureConfig {
                    name: "b".into(),
                    pins: PinAssignment::new(4, 5, 6),
                    green_time_secs: 7,
                },
            ],
        };
        let builder = cfg.builder();
        assert_eq!(builder.fixture_count(), 2);

        let intersection = builder.build(&mut TracingPins::new()).unwrap();
        assert_eq!(intersection.period(), 16);
        assert_eq!(intersection.fixtures()[1].green_time_secs(), 7);
        assert_eq!(intersection.fixtures()[1].pins().green, 6);
    }
}
