//! Placement tunables parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::{Deserialize, Serialize};

use crate::consts::{
    COLLISION_MARGIN, COLLISION_MARGIN_ABOVE, PASTE_OFFSET, PRODUCT_X_TOLERANCE, PRODUCT_Y_TOLERANCE,
    SHELF_TOP_OFFSET, SHELF_Y_TOLERANCE, STACK_GAP,
};
use crate::geometry::OverlapMargins;

pub const ENV_SHELF_Y_TOLERANCE: &str = "PLANOGRAM_SHELF_Y_TOLERANCE";
pub const ENV_PRODUCT_Y_TOLERANCE: &str = "PLANOGRAM_PRODUCT_Y_TOLERANCE";
pub const ENV_PRODUCT_X_TOLERANCE: &str = "PLANOGRAM_PRODUCT_X_TOLERANCE";
pub const ENV_STACK_GAP: &str = "PLANOGRAM_STACK_GAP";
pub const ENV_SHELF_TOP_OFFSET: &str = "PLANOGRAM_SHELF_TOP_OFFSET";
pub const ENV_COLLISION_MARGIN: &str = "PLANOGRAM_COLLISION_MARGIN";
pub const ENV_COLLISION_MARGIN_ABOVE: &str = "PLANOGRAM_COLLISION_MARGIN_ABOVE";
pub const ENV_PASTE_OFFSET: &str = "PLANOGRAM_PASTE_OFFSET";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?} is not a finite number")]
    InvalidNumber { var: &'static str, value: String },
    #[error("invalid value for {var}: {value} must not be negative")]
    Negative { var: &'static str, value: String },
}

/// Every distance the resolvers use, in canvas units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlacementConfig {
    pub shelf_y_tolerance: f64,
    pub product_y_tolerance: f64,
    pub product_x_tolerance: f64,
    pub stack_gap: f64,
    pub shelf_top_offset: f64,
    pub collision: OverlapMargins,
    pub paste_offset: f64,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            shelf_y_tolerance: SHELF_Y_TOLERANCE,
            product_y_tolerance: PRODUCT_Y_TOLERANCE,
            product_x_tolerance: PRODUCT_X_TOLERANCE,
            stack_gap: STACK_GAP,
            shelf_top_offset: SHELF_TOP_OFFSET,
            collision: OverlapMargins::new(COLLISION_MARGIN, COLLISION_MARGIN, COLLISION_MARGIN_ABOVE),
            paste_offset: PASTE_OFFSET,
        }
    }
}

impl PlacementConfig {
    /// Build config from the process environment.
    ///
    /// All variables are optional; absent ones keep their defaults.
    /// `PLANOGRAM_COLLISION_MARGIN` sets both the horizontal and downward
    /// margins and, unless `PLANOGRAM_COLLISION_MARGIN_ABOVE` is also set,
    /// moves the upward margin to stay 5 units larger.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a present variable is not a finite,
    /// non-negative number.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| match std::env::var(key) {
            Ok(value) => Some(value),
            Err(_) => None,
        })
    }

    /// Same as [`Self::from_env`] but reads variables through `lookup`.
    ///
    /// # Errors
    ///
    /// See [`Self::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let margin = parse_distance(&lookup, ENV_COLLISION_MARGIN, defaults.collision.horizontal)?;
        let above_default = margin + (COLLISION_MARGIN_ABOVE - COLLISION_MARGIN);

        Ok(Self {
            shelf_y_tolerance: parse_distance(&lookup, ENV_SHELF_Y_TOLERANCE, defaults.shelf_y_tolerance)?,
            product_y_tolerance: parse_distance(&lookup, ENV_PRODUCT_Y_TOLERANCE, defaults.product_y_tolerance)?,
            product_x_tolerance: parse_distance(&lookup, ENV_PRODUCT_X_TOLERANCE, defaults.product_x_tolerance)?,
            stack_gap: parse_distance(&lookup, ENV_STACK_GAP, defaults.stack_gap)?,
            shelf_top_offset: parse_distance(&lookup, ENV_SHELF_TOP_OFFSET, defaults.shelf_top_offset)?,
            collision: OverlapMargins::new(
                margin,
                margin,
                parse_distance(&lookup, ENV_COLLISION_MARGIN_ABOVE, above_default)?,
            ),
            paste_offset: parse_distance(&lookup, ENV_PASTE_OFFSET, defaults.paste_offset)?,
        })
    }
}

fn parse_distance<F>(lookup: &F, var: &'static str, default: f64) -> Result<f64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(var) else {
        return Ok(default);
    };
    let trimmed = raw.trim();
    let value = match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => return Err(ConfigError::InvalidNumber { var, value: raw }),
    };
    if value < 0.0 {
        return Err(ConfigError::Negative { var, value: trimmed.to_owned() });
    }
    Ok(value)
}
