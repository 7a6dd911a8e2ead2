use log::{LevelFilter, debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::Result;
use crate::spread::{LayoutConfig, TwoPageConfig};

pub const CURRENT_VERSION: u32 = 2;
const SETTINGS_FILENAME: &str = "config.yaml";
const APP_NAME: &str = "spreadview";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TwoPageSettings {
    #[serde(default)]
    pub cover_internal_padding: i64,

    #[serde(default)]
    pub cover_external_padding: i64,

    #[serde(default = "default_spine_width")]
    pub spine_width: i64,

    #[serde(default = "default_prefetch_radius")]
    pub prefetch_radius: usize,

    #[serde(default = "default_prune_margin")]
    pub prune_margin: isize,

    #[serde(default = "default_leaf_edge_per_page")]
    pub leaf_edge_per_page: f64,

    #[serde(default = "default_max_leaf_edge_ratio")]
    pub max_leaf_edge_ratio: f64,

    #[serde(default = "default_reduction_factors")]
    pub reduction_factors: Vec<f64>,
}

fn default_spine_width() -> i64 {
    64
}

fn default_prefetch_radius() -> usize {
    2
}

fn default_prune_margin() -> isize {
    4
}

fn default_leaf_edge_per_page() -> f64 {
    0.1
}

fn default_max_leaf_edge_ratio() -> f64 {
    0.1
}

fn default_reduction_factors() -> Vec<f64> {
    vec![0.5, 1.0, 2.0, 3.0, 4.0, 6.0]
}

impl Default for TwoPageSettings {
    fn default() -> Self {
        Self {
            cover_internal_padding: 0,
            cover_external_padding: 0,
            spine_width: default_spine_width(),
            prefetch_radius: default_prefetch_radius(),
            prune_margin: default_prune_margin(),
            leaf_edge_per_page: default_leaf_edge_per_page(),
            max_leaf_edge_ratio: default_max_leaf_edge_ratio(),
            reduction_factors: default_reduction_factors(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub two_page: TwoPageSettings,
}

fn default_version() -> u32 {
    CURRENT_VERSION
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            log_level: default_log_level(),
            two_page: TwoPageSettings::default(),
        }
    }
}

impl Settings {
    /// Log level to initialise the logger with; unknown names mean `info`
    pub fn level_filter(&self) -> LevelFilter {
        LevelFilter::from_str(&self.log_level).unwrap_or_else(|_| {
            warn!("Unknown log level {:?}, using info", self.log_level);
            LevelFilter::Info
        })
    }

    pub fn to_config(&self) -> TwoPageConfig {
        let two_page = &self.two_page;
        TwoPageConfig {
            layout: LayoutConfig {
                cover_internal_padding: two_page.cover_internal_padding,
                cover_external_padding: two_page.cover_external_padding,
                spine_width: two_page.spine_width,
                leaf_edge_per_page: two_page.leaf_edge_per_page,
                max_leaf_edge_ratio: two_page.max_leaf_edge_ratio,
            },
            prefetch_radius: two_page.prefetch_radius,
            prune_margin: two_page.prune_margin,
            reduction_factors: two_page.reduction_factors.clone(),
        }
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let mut settings: Settings = serde_yaml::from_str(content)?;
        if settings.version < CURRENT_VERSION {
            migrate_settings(&mut settings);
        }
        Ok(settings)
    }

    /// Read settings from `path`, writing defaults there when it does not
    /// exist yet. A file that cannot be read or parsed yields defaults.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            info!("Settings file not found, creating with defaults at {path:?}");
            let settings = Settings::default();
            if let Err(e) = settings.save(path) {
                error!("Failed to save settings to {path:?}: {e}");
            }
            return settings;
        }

        match Self::load(path) {
            Ok(settings) => settings,
            Err(e) => {
                error!("Failed to load settings file {path:?}: {e}");
                Settings::default()
            }
        }
    }

    /// Read settings from `path`; migrated files are written back
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let stored_version = serde_yaml::from_str::<Settings>(&content)?.version;
        let settings = Self::from_yaml(&content)?;
        debug!("Loaded settings from {path:?}");

        if stored_version < CURRENT_VERSION {
            settings.save(path)?;
        }
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, generate_settings_yaml(self))?;
        debug!("Saved settings to {path:?}");
        Ok(())
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|config| config.join(APP_NAME).join(SETTINGS_FILENAME))
}

fn migrate_settings(settings: &mut Settings) {
    info!(
        "Migrating settings from v{} to v{}",
        settings.version, CURRENT_VERSION
    );

    // v1 wrote 0 when the leaf edge bound was unset
    if settings.version < 2 && settings.two_page.max_leaf_edge_ratio <= 0.0 {
        settings.two_page.max_leaf_edge_ratio = default_max_leaf_edge_ratio();
    }

    settings.version = CURRENT_VERSION;
}

fn generate_settings_yaml(settings: &Settings) -> String {
    let two_page = &settings.two_page;
    let factors = two_page
        .reduction_factors
        .iter()
        .map(|f| format!("{f:?}"))
        .collect::<Vec<_>>()
        .join(", ");

    let mut content = String::new();
    content.push_str(&format!("version: {}\n", settings.version));
    content.push_str("# One of: off, error, warn, info, debug, trace\n");
    content.push_str(&format!("log_level: \"{}\"\n", settings.log_level));
    content.push('\n');
    content.push_str(TWO_PAGE_HEADER);
    content.push_str("two_page:\n");
    content.push_str(&format!(
        "  cover_internal_padding: {}\n",
        two_page.cover_internal_padding
    ));
    content.push_str(&format!(
        "  cover_external_padding: {}\n",
        two_page.cover_external_padding
    ));
    content.push_str(&format!("  spine_width: {}\n", two_page.spine_width));
    content.push_str(&format!("  prefetch_radius: {}\n", two_page.prefetch_radius));
    content.push_str(&format!("  prune_margin: {}\n", two_page.prune_margin));
    content.push_str(&format!(
        "  leaf_edge_per_page: {:?}\n",
        two_page.leaf_edge_per_page
    ));
    content.push_str(&format!(
        "  max_leaf_edge_ratio: {:?}\n",
        two_page.max_leaf_edge_ratio
    ));
    content.push_str(&format!("  reduction_factors: [{factors}]\n"));
    content
}

const TWO_PAGE_HEADER: &str = r#"# ============================================================================
# Two-page spread
# ============================================================================
# cover_*_padding     Space around the pages inside/outside the book cover (px)
# spine_width         Width of the spine drawn under the gutter (px)
# prefetch_radius     Viewable pages loaded ahead on each side of the spread
# prune_margin        Page images further than this from the spread are freed
# leaf_edge_per_page  Thickness of the stacked leaf edges per page (px)
# max_leaf_edge_ratio Upper bound of both leaf edges as a share of the width
# reduction_factors   Zoom steps; larger means a smaller, coarser raster
"#;
