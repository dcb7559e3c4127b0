//! Per-target options, resolved once at bind time.

use serde::Deserialize;
use serde_json::Value;

use crate::ZoomError;

pub const DEFAULT_ATTACH_TO: &str = "body";

/// Attribute holding per-element JSON overrides.
pub const OPTIONS_ATTRIBUTE: &str = "data-zoom-options";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ZoomConfig {
    /// Where ancillary nodes are anchored. Overlays are always placed as the
    /// target's next sibling regardless of this value.
    pub attach_to: String,
    /// Disables scroll-triggered zoom-out entirely.
    pub ignore_scroll: bool,
    /// Caps the zoom at one natural image pixel per CSS pixel.
    pub use_actual_max: bool,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            attach_to: DEFAULT_ATTACH_TO.to_string(),
            ignore_scroll: false,
            use_actual_max: false,
        }
    }
}

impl ZoomConfig {
    pub fn from_json(raw: &str) -> Result<Self, ZoomError> {
        let config: ZoomConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Layer a JSON object of overrides on top of `self`. Keys absent from
    /// `raw` keep their current value.
    pub fn merged_with(&self, raw: &str) -> Result<Self, ZoomError> {
        let overrides: Value = serde_json::from_str(raw)?;
        let Value::Object(overrides) = overrides else {
            return Err(ZoomError::InvalidConfig(
                "options must be a JSON object".to_string(),
            ));
        };

        let mut merged = serde_json::json!({
            "attachTo": self.attach_to,
            "ignoreScroll": self.ignore_scroll,
            "useActualMax": self.use_actual_max,
        });
        if let Value::Object(base) = &mut merged {
            for (key, value) in overrides {
                base.insert(key, value);
            }
        }

        let config: ZoomConfig = serde_json::from_value(merged)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ZoomError> {
        if self.attach_to.trim().is_empty() {
            return Err(ZoomError::InvalidConfig(
                "attachTo must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn scroll_closes(&self) -> bool {
        !self.ignore_scroll
    }
}
