//! Run configuration, loadable from TOML.
//!
//! Every field has a default, so a config file only names what it changes:
//!
//! ```toml
//! admin_pages = "first"
//! background = "sequential"
//!
//! [extract]
//! quantity_column = "on_hand"
//!
//! [geometry]
//! rows_per_page = 18
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::extract::ExtractSettings;
use crate::layout::{AdminPages, LayoutGeometry};
use crate::render::BackgroundPolicy;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateConfig {
    pub geometry: LayoutGeometry,
    pub extract: ExtractSettings,
    pub background: BackgroundPolicy,
    pub admin_pages: AdminPages,
    /// Scan the template for admin labels; built-in positions fill gaps.
    pub detect_admin_positions: bool,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            geometry: LayoutGeometry::dd1750_letter(),
            extract: ExtractSettings::default(),
            background: BackgroundPolicy::ReuseFirst,
            admin_pages: AdminPages::Every,
            detect_admin_positions: true,
        }
    }
}

impl GenerateConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::QuantityColumn;

    #[test]
    fn partial_file_overrides_only_named_fields() {
        let cfg = GenerateConfig::from_toml_str(
            r#"
            admin_pages = "first"
            background = "sequential"

            [extract]
            quantity_column = "on_hand"
            target_marker = "C"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.admin_pages, AdminPages::First);
        assert_eq!(cfg.background, BackgroundPolicy::Sequential);
        assert_eq!(cfg.extract.quantity_column, QuantityColumn::OnHand);
        assert_eq!(cfg.extract.target_marker, "C");
        assert_eq!(cfg.extract.max_description_len, 100);
        assert_eq!(cfg.geometry, LayoutGeometry::dd1750_letter());
        assert!(cfg.detect_admin_positions);
    }

    #[test]
    fn bad_value_is_a_config_error() {
        let err = GenerateConfig::from_toml_str("background = \"sideways\"").unwrap_err();
        assert!(matches!(err, crate::error::FormError::Config(_)));
    }
}
