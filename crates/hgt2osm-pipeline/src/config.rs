//! Run configuration.
//!
//! The binary loads this from YAML; library callers build it directly.
//! The pipeline consumes values only; where it is loaded from is the
//! caller's concern.

use std::path::Path;

use serde::Deserialize;

use hgt2osm_contour::{LevelConfig, LevelMode};
use hgt2osm_osm::ElevationUnit;

use crate::Result;

/// Configuration surface of one contour run.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct PipelineConfig {
    /// Height difference between contiguous levels, in meters. Ignored
    /// when `levels` is set.
    pub step: i32,
    /// Explicit strictly increasing level list, in meters. Overrides
    /// `step`.
    pub levels: Option<Vec<i32>>,
    /// Lower clamp for step-derived levels, in meters.
    pub min_cont: Option<i32>,
    /// Upper clamp for step-derived levels, in meters.
    pub max_cont: Option<i32>,
    /// Mark every Nth level as major; `None` disables major levels.
    pub major_multiple: Option<u32>,
    /// Drop the 0 m level.
    pub no_zero: bool,
    /// Simplification tolerance in degrees. Defaults to a hundredth of the
    /// finest grid's sample spacing.
    pub simplify_tolerance: Option<f64>,
    /// Seam-merge coordinate tolerance in degrees. Defaults to half the
    /// finest grid's sample spacing.
    pub merge_tolerance: Option<f64>,
    /// Minimum enclosed area for closed rings, in square degrees; smaller
    /// rings are dropped.
    pub min_area: f64,
    /// Maximum node count per written way; longer features are split into
    /// consecutive ways sharing a node at each cut. `0` disables splitting.
    pub max_nodes_per_way: usize,
    /// Unit system for the `ele` tag.
    pub unit: ElevationUnit,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            step: 20,
            levels: None,
            min_cont: None,
            max_cont: None,
            major_multiple: None,
            no_zero: false,
            simplify_tolerance: None,
            merge_tolerance: None,
            min_area: 0.0,
            max_nodes_per_way: 0,
            unit: ElevationUnit::Meter,
        }
    }
}

impl PipelineConfig {
    /// Load the configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&text)?)
    }

    /// Level selection settings derived from this configuration.
    pub fn level_config(&self) -> LevelConfig {
        let mode = if let Some(levels) = &self.levels {
            LevelMode::List {
                levels: levels.clone(),
            }
        } else if self.min_cont.is_some() || self.max_cont.is_some() {
            LevelMode::ClampedStep {
                step: self.step,
                min: self.min_cont.unwrap_or(i32::MIN),
                max: self.max_cont.unwrap_or(i32::MAX),
            }
        } else {
            LevelMode::Step { step: self.step }
        };
        LevelConfig {
            mode,
            major_multiple: self.major_multiple,
            no_zero: self.no_zero,
        }
    }
}
