//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Deepest level of the implicit quadtree that may carry content.
pub const MAX_LEVEL: u32 = 16;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Implicit tiling settings for the published collection.
    pub tileset: TilesetConfig,
    /// Mesh output settings.
    pub mesh: MeshConfig,
    /// Worker pool settings for parallel meshing.
    pub pipeline: PipelineConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Inclusive range of quadtree levels.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LevelRange {
    /// First level with content.
    pub min: u32,
    /// Last level with content.
    pub max: u32,
}

impl Default for LevelRange {
    fn default() -> Self {
        Self { min: 0, max: 0 }
    }
}

impl LevelRange {
    /// Number of levels in the range (zero if `min > max`).
    #[must_use]
    pub fn len(&self) -> usize {
        if self.min > self.max {
            0
        } else {
            (self.max - self.min + 1) as usize
        }
    }

    /// True if the range holds no level.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True if `level` lies inside the range.
    #[must_use]
    pub fn contains(&self, level: u32) -> bool {
        level >= self.min && level <= self.max
    }
}

/// Implicit tiling configuration for one collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TilesetConfig {
    /// Feature type to query. Defaults to the collection id.
    pub feature_type: Option<String>,
    /// Geometry property used by the spatial filters.
    pub primary_geometry: Option<String>,
    /// Levels that carry content.
    pub content_levels: LevelRange,
    /// Number of levels in each subtree.
    pub subtree_levels: u32,
    /// Geometric error of the root tile, in meters.
    pub geometric_error_root: f64,
    /// Translate each feature vertically so that its base rests on the ellipsoid.
    pub clamp_to_ellipsoid: bool,
    /// One CQL2 text filter per content level, selecting the features shown on that level.
    pub content_filters: Vec<String>,
    /// One CQL2 text filter per content level, selecting the features shown on that
    /// level or below. Derived from `content_filters` when empty.
    pub tile_filters: Vec<String>,
}

impl Default for TilesetConfig {
    fn default() -> Self {
        Self {
            feature_type: None,
            primary_geometry: Some("geometry".to_string()),
            content_levels: LevelRange::default(),
            subtree_levels: 3,
            geometric_error_root: 0.0,
            clamp_to_ellipsoid: false,
            content_filters: Vec::new(),
            tile_filters: Vec::new(),
        }
    }
}

impl TilesetConfig {
    /// Check the tiling parameters for consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let levels = self.content_levels;
        if levels.max > MAX_LEVEL {
            return Err(ConfigError::Invalid(format!(
                "maximum content level {} exceeds {MAX_LEVEL}",
                levels.max
            )));
        }
        if levels.min > levels.max {
            return Err(ConfigError::Invalid(format!(
                "minimum content level {} is greater than maximum level {}",
                levels.min, levels.max
            )));
        }
        if self.subtree_levels == 0 {
            return Err(ConfigError::Invalid(
                "subtree_levels must be at least 1".to_string(),
            ));
        }
        let expected = levels.len();
        if !self.content_filters.is_empty() && self.content_filters.len() != expected {
            return Err(ConfigError::Invalid(format!(
                "{} content filters given for {expected} content levels",
                self.content_filters.len()
            )));
        }
        if !self.tile_filters.is_empty() && self.tile_filters.len() != expected {
            return Err(ConfigError::Invalid(format!(
                "{} tile filters given for {expected} content levels",
                self.tile_filters.len()
            )));
        }
        Ok(())
    }

    /// Tile filters to use: the explicit ones, or the disjunction of the content
    /// filters of each level and all levels below it.
    #[must_use]
    pub fn effective_tile_filters(&self) -> Vec<String> {
        if !self.tile_filters.is_empty() {
            return self.tile_filters.clone();
        }
        derive_tile_filters(&self.content_filters)
    }

    /// Content filter for an absolute level, if content filters are configured.
    #[must_use]
    pub fn content_filter(&self, level: u32) -> Option<&str> {
        if !self.content_levels.contains(level) {
            return None;
        }
        self.content_filters
            .get((level - self.content_levels.min) as usize)
            .map(String::as_str)
    }
}

fn derive_tile_filters(content_filters: &[String]) -> Vec<String> {
    (0..content_filters.len())
        .map(|i| format!("({})", content_filters[i..].join(") OR (")))
        .collect()
}

/// Mesh output configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MeshConfig {
    /// Emit one normal per vertex.
    pub with_normals: bool,
    /// Emit outline edge indices for every ring.
    pub with_outline: bool,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            with_normals: true,
            with_outline: false,
        }
    }
}

/// Worker pool configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    /// Number of meshing threads (0 = one per available core).
    pub workers: usize,
    /// Maximum number of tile meshing tasks in flight.
    pub budget: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workers: 0,
            budget: 64,
        }
    }
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Platform config directory for tessella, if one can be determined.
#[must_use]
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("tessella"))
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join("config.ron");
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn five_level_config() -> TilesetConfig {
        TilesetConfig {
            content_levels: LevelRange { min: 5, max: 9 },
            content_filters: vec![
                "diameter3d(\"bbox\")>200".to_string(),
                "diameter3d(\"bbox\")<=200 and diameter3d(\"bbox\")>100".to_string(),
                "diameter3d(\"bbox\")<=100 and diameter3d(\"bbox\")>40".to_string(),
                "diameter3d(\"bbox\")<=40 and diameter3d(\"bbox\")>18".to_string(),
                "diameter3d(\"bbox\")<=18".to_string(),
            ],
            ..TilesetConfig::default()
        }
    }

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(3))
                .unwrap();
        assert!(!ron_str.is_empty());
        assert!(ron_str.contains("subtree_levels: 3"));
        assert!(ron_str.contains("with_normals: true"));
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config {
            tileset: five_level_config(),
            ..Config::default()
        };
        let ron_str = ron::to_string(&config).unwrap();
        let deserialized: Config = ron::from_str(&ron_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_missing_field_uses_default() {
        let ron_str = "(tileset: (subtree_levels: 2), debug: ())";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.tileset.subtree_levels, 2);
        assert_eq!(config.mesh, MeshConfig::default());
        assert_eq!(config.pipeline, PipelineConfig::default());
    }

    #[test]
    fn test_extra_field_ignored() {
        let result: Result<Config, _> = ron::from_str("(future_setting: true)");
        assert!(result.is_ok());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.tileset = five_level_config();
        config.mesh.with_outline = true;

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(dir.path().join("config.ron").exists());
    }

    #[test]
    fn test_reload_detects_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        let mut modified = config.clone();
        modified.tileset.subtree_levels = 4;
        modified.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert_eq!(result.unwrap().tileset.subtree_levels, 4);
    }

    #[test]
    fn test_reload_no_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();
        assert!(config.reload(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_invalid_ron_produces_error() {
        let result: Result<Config, _> = ron::from_str("{{not valid}}");
        assert!(result.is_err());
    }

    #[test]
    fn test_default_tileset_is_valid() {
        assert!(TilesetConfig::default().validate().is_ok());
        assert!(five_level_config().validate().is_ok());
    }

    #[test]
    fn test_level_above_max_rejected() {
        let config = TilesetConfig {
            content_levels: LevelRange { min: 0, max: 17 },
            ..TilesetConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("exceeds 16"));
    }

    #[test]
    fn test_inverted_levels_rejected() {
        let config = TilesetConfig {
            content_levels: LevelRange { min: 4, max: 2 },
            ..TilesetConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_zero_subtree_levels_rejected() {
        let config = TilesetConfig {
            subtree_levels: 0,
            ..TilesetConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_filter_count_mismatch_rejected() {
        let mut config = five_level_config();
        config.content_filters.pop();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("4 content filters"));

        let mut config = five_level_config();
        config.tile_filters = vec!["true".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_derived_tile_filters() {
        let config = TilesetConfig {
            content_levels: LevelRange { min: 2, max: 4 },
            content_filters: vec!["a".to_string(), "b".to_string(), "c".to_string()],
            ..TilesetConfig::default()
        };
        assert_eq!(
            config.effective_tile_filters(),
            vec!["(a) OR (b) OR (c)", "(b) OR (c)", "(c)"]
        );
    }

    #[test]
    fn test_explicit_tile_filters_win() {
        let mut config = five_level_config();
        config.tile_filters = vec!["true".to_string(); 5];
        assert_eq!(config.effective_tile_filters(), vec!["true"; 5]);
    }

    #[test]
    fn test_content_filter_by_level() {
        let config = five_level_config();
        assert_eq!(config.content_filter(5), Some("diameter3d(\"bbox\")>200"));
        assert_eq!(config.content_filter(9), Some("diameter3d(\"bbox\")<=18"));
        assert_eq!(config.content_filter(4), None);
        assert_eq!(config.content_filter(10), None);
        assert_eq!(TilesetConfig::default().content_filter(0), None);
    }

    #[test]
    fn test_level_range_len() {
        assert_eq!(LevelRange { min: 5, max: 9 }.len(), 5);
        assert_eq!(LevelRange { min: 3, max: 3 }.len(), 1);
        assert!(LevelRange { min: 4, max: 3 }.is_empty());
    }
}
