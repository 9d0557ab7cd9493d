//! Contour level selection.
//!
//! Given a grid's elevation range, computes the ordered set of levels to
//! contour. Three modes are supported: a fixed step, an explicit sorted
//! list, and a fixed step clamped to an explicit elevation window.

use crate::{ContourError, ElevationLevel, Result};

/// How contour levels are derived from a grid's elevation range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LevelMode {
    /// Every multiple of `step` within the grid's elevation range.
    Step {
        /// Height difference between contiguous levels, in meters.
        step: i32,
    },
    /// An explicit, strictly increasing list of elevations; levels outside
    /// the grid's range are skipped per tile.
    List {
        /// Elevations in meters.
        levels: Vec<i32>,
    },
    /// Like [`LevelMode::Step`], additionally clamped to `[min, max]`.
    ClampedStep {
        /// Height difference between contiguous levels, in meters.
        step: i32,
        /// Lower clamp, in meters.
        min: i32,
        /// Upper clamp, in meters.
        max: i32,
    },
}

/// Level selection configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelConfig {
    /// Mode of level derivation.
    pub mode: LevelMode,
    /// Mark every Nth level as major; `None` disables major levels.
    pub major_multiple: Option<u32>,
    /// Drop the 0 m level (useful where sea level produces coastline noise).
    pub no_zero: bool,
}

impl Default for LevelConfig {
    fn default() -> Self {
        LevelConfig {
            mode: LevelMode::Step { step: 20 },
            major_multiple: None,
            no_zero: false,
        }
    }
}

impl LevelConfig {
    /// Validate the configuration before any tile is processed.
    ///
    /// A bad configuration is fatal for the whole run, so this runs once up
    /// front rather than per tile.
    pub fn validate(&self) -> Result<()> {
        match &self.mode {
            LevelMode::Step { step } | LevelMode::ClampedStep { step, .. } if *step <= 0 => {
                return Err(ContourError::InvalidLevelConfig(format!(
                    "step must be positive, got {step}"
                )));
            }
            LevelMode::ClampedStep { min, max, .. } if min > max => {
                return Err(ContourError::InvalidLevelConfig(format!(
                    "clamp range is empty: {min} > {max}"
                )));
            }
            LevelMode::List { levels } => {
                if levels.is_empty() {
                    return Err(ContourError::InvalidLevelConfig(
                        "explicit level list is empty".to_string(),
                    ));
                }
                for pair in levels.windows(2) {
                    if pair[0] >= pair[1] {
                        return Err(ContourError::InvalidLevelConfig(format!(
                            "explicit level list must be strictly increasing, \
                             got {} before {}",
                            pair[0], pair[1]
                        )));
                    }
                }
            }
            _ => {}
        }
        if self.major_multiple == Some(0) {
            return Err(ContourError::InvalidLevelConfig(
                "major multiple must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Compute the ordered levels for a grid with elevation range
    /// `[min_ele, max_ele]`.
    ///
    /// Step modes include a level equal to the range boundary only when the
    /// step lattice lands on it exactly. In step modes the major flag is set
    /// on elevations divisible by `step * major_multiple`, so the flag is
    /// consistent for the same elevation across tiles with different ranges;
    /// in list mode it is set on every Nth entry of the configured list.
    pub fn select(&self, min_ele: i32, max_ele: i32) -> Result<Vec<ElevationLevel>> {
        self.validate()?;
        let levels: Vec<ElevationLevel> = match &self.mode {
            LevelMode::Step { step } => lattice(*step, min_ele, max_ele, self.major_multiple),
            LevelMode::ClampedStep { step, min, max } => lattice(
                *step,
                min_ele.max(*min),
                max_ele.min(*max),
                self.major_multiple,
            ),
            LevelMode::List { levels } => levels
                .iter()
                .enumerate()
                .filter(|(_, &ele)| ele >= min_ele && ele <= max_ele)
                .map(|(i, &ele)| ElevationLevel {
                    elevation: ele,
                    major: self
                        .major_multiple
                        .map(|m| (i as u32 + 1) % m == 0)
                        .unwrap_or(false),
                })
                .collect(),
        };
        Ok(if self.no_zero {
            levels.into_iter().filter(|l| l.elevation != 0).collect()
        } else {
            levels
        })
    }
}

/// Multiples of `step` in `[min, max]`, in ascending order.
fn lattice(step: i32, min: i32, max: i32, major_multiple: Option<u32>) -> Vec<ElevationLevel> {
    // First multiple of step at or above min; div_euclid rounds toward
    // negative infinity, which keeps this correct below sea level.
    let mut ele = min.div_euclid(step) * step;
    if ele < min {
        ele += step;
    }
    let mut levels = Vec::new();
    while ele <= max {
        let major = major_multiple
            .map(|m| ele % (step * m as i32) == 0)
            .unwrap_or(false);
        levels.push(ElevationLevel { elevation: ele, major });
        ele += step;
    }
    levels
}
