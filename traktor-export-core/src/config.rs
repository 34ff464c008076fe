//! Export configuration

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// Product header written as `<PRODUCT>` into the rekordbox document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub company: String,
    pub name: String,
    pub version: String,
}

impl Default for Product {
    fn default() -> Self {
        Self {
            company: "traktor-export".into(),
            name: "traktor-rekordbox-export".into(),
            version: env!("CARGO_PKG_VERSION").into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub product: Product,
    /// Prepended to paths without a drive letter (`/Volumes/<volume>/...`)
    pub mount_prefix: String,
    /// Name of the emitted root folder, whatever the source root is called
    pub root_name: String,
    /// Playlists dropped from both exporters
    pub excluded_playlists: Vec<String>,
    /// Cue names Traktor generates on its own; blanked on export
    pub placeholder_cue_names: Vec<String>,
    /// `DateAdded` for tracks without an import date
    pub export_date: NaiveDate,
    /// Fail the run on a track without location instead of skipping it
    pub strict: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            product: Product::default(),
            mount_prefix: "Volumes".into(),
            root_name: "ROOT".into(),
            excluded_playlists: vec!["_LOOPS".into(), "_RECORDINGS".into()],
            placeholder_cue_names: vec!["AutoGrid".into(), "Beat Marker".into(), "n.n.".into()],
            export_date: Local::now().date_naive(),
            strict: false,
        }
    }
}

impl ExportConfig {
    pub fn is_excluded_playlist(&self, name: &str) -> bool {
        self.excluded_playlists.iter().any(|n| n == name)
    }

    pub fn is_placeholder_cue_name(&self, name: &str) -> bool {
        self.placeholder_cue_names.iter().any(|n| n == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_exclusions() {
        let config = ExportConfig::default();
        assert!(config.is_excluded_playlist("_LOOPS"));
        assert!(config.is_excluded_playlist("_RECORDINGS"));
        assert!(!config.is_excluded_playlist("_loops"));
        assert!(!config.is_excluded_playlist("Techno"));
    }

    #[test]
    fn test_placeholder_names() {
        let config = ExportConfig::default();
        assert!(config.is_placeholder_cue_name("AutoGrid"));
        assert!(config.is_placeholder_cue_name("Beat Marker"));
        assert!(config.is_placeholder_cue_name("n.n."));
        assert!(!config.is_placeholder_cue_name("Drop"));
    }
}
