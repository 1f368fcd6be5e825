//! A collection published as an implicit quadtree tileset.

use std::sync::Arc;

use geo::Polygon;
use tessella_config::{MAX_LEVEL, TilesetConfig};

use crate::address::{TileAddress, TileKind};
use crate::bounds::BoundingBox;
use crate::error::TilingError;
use crate::exclusion::exclusion_polygon;
use crate::query::{FeatureQuery, Filter, spatial_filter};

/// Tiling of one collection: root extent plus validated configuration.
///
/// All tile-level questions (box, exclusion region, content query) are
/// answered from this value; it holds no per-tile state.
#[derive(Clone, Debug)]
pub struct Tileset {
    collection_id: Arc<str>,
    root: BoundingBox,
    config: TilesetConfig,
    tile_filters: Vec<String>,
}

impl Tileset {
    /// Set up a tileset. Fails if the collection has no extent or the
    /// configuration is inconsistent.
    pub fn new(
        collection_id: impl Into<Arc<str>>,
        extent: Option<BoundingBox>,
        config: TilesetConfig,
    ) -> Result<Self, TilingError> {
        let collection_id = collection_id.into();
        let root = extent.ok_or_else(|| TilingError::MissingExtent(collection_id.to_string()))?;
        config.validate()?;
        let tile_filters = config.effective_tile_filters();
        log::debug!(
            "tileset {collection_id}: content levels {}..={}, subtrees of {} levels",
            config.content_levels.min,
            config.content_levels.max,
            config.subtree_levels
        );
        Ok(Self {
            collection_id,
            root,
            config,
            tile_filters,
        })
    }

    /// Collection being tiled.
    #[must_use]
    pub fn collection_id(&self) -> &str {
        &self.collection_id
    }

    /// Root extent.
    #[must_use]
    pub fn root_extent(&self) -> &BoundingBox {
        &self.root
    }

    /// Tiling configuration.
    #[must_use]
    pub fn config(&self) -> &TilesetConfig {
        &self.config
    }

    /// Feature type queried for content.
    #[must_use]
    pub fn feature_type(&self) -> &str {
        self.config
            .feature_type
            .as_deref()
            .unwrap_or(&self.collection_id)
    }

    /// Address of a tile of this collection.
    pub fn address(
        &self,
        kind: TileKind,
        level: u32,
        x: u32,
        y: u32,
    ) -> Result<TileAddress, TilingError> {
        TileAddress::new(Arc::clone(&self.collection_id), kind, level, x, y)
    }

    /// Bounding box of a tile.
    #[must_use]
    pub fn bbox(&self, address: &TileAddress) -> BoundingBox {
        self.root.tile(address)
    }

    /// Region whose features belong to neighbouring tiles.
    #[must_use]
    pub fn exclusion(&self, address: &TileAddress) -> Option<Polygon<f64>> {
        exclusion_polygon(&self.root, address)
    }

    /// True if tiles at `level` carry content.
    #[must_use]
    pub fn has_content(&self, level: u32) -> bool {
        self.config.content_levels.contains(level)
    }

    /// Query for the features of a content tile.
    ///
    /// The spatial selection is combined with the level's content filter,
    /// when one is configured.
    #[must_use]
    pub fn content_query(&self, address: &TileAddress) -> FeatureQuery {
        let mut filter = spatial_filter(
            self.config.primary_geometry.as_deref(),
            self.bbox(address).to_rect(),
            self.exclusion(address),
        );
        if let Some(content) = self.config.content_filter(address.level()) {
            filter = filter.and(Filter::Text(content.to_string()));
        }
        log::trace!("{address}: {filter}");
        FeatureQuery::new(self.feature_type(), filter)
    }

    /// Filter selecting features present in a tile at `level` or any deeper
    /// content level, used for tile availability.
    #[must_use]
    pub fn tile_filter(&self, level: u32) -> Option<&str> {
        if !self.has_content(level) {
            return None;
        }
        self.tile_filters
            .get((level - self.config.content_levels.min) as usize)
            .map(String::as_str)
    }

    /// Geometric error of tiles at `level`.
    #[must_use]
    pub fn geometric_error(&self, level: u32) -> f64 {
        self.config.geometric_error_root / f64::from(1u32 << level.min(MAX_LEVEL))
    }

    /// True if `address` is the root of a subtree.
    #[must_use]
    pub fn is_subtree_root(&self, address: &TileAddress) -> bool {
        address.level() % self.config.subtree_levels == 0
    }

    /// Levels at which subtrees start, up to the deepest content level.
    #[must_use]
    pub fn subtree_root_levels(&self) -> Vec<u32> {
        (0..=self.config.content_levels.max)
            .step_by(self.config.subtree_levels as usize)
            .collect()
    }

    /// All subtree roots of the tileset, level by level in Morton order.
    pub fn subtree_roots(&self) -> impl Iterator<Item = TileAddress> + '_ {
        let root = TileAddress::root(Arc::clone(&self.collection_id), TileKind::Subtree);
        self.subtree_root_levels()
            .into_iter()
            .flat_map(move |level| {
                (0..crate::morton::size(level)).map({
                    let root = root.clone();
                    move |i| {
                        let (x, y) = crate::morton::decode(i);
                        root.descendant(level, x, y)
                    }
                })
            })
    }

    /// Roots of the subtrees directly below `subtree`.
    pub fn child_subtrees(&self, subtree: &TileAddress) -> Result<Vec<TileAddress>, TilingError> {
        let below = subtree.level().saturating_add(self.config.subtree_levels);
        if below > self.config.content_levels.max {
            return Ok(Vec::new());
        }
        Ok(subtree
            .with_kind(TileKind::Subtree)
            .children(self.config.subtree_levels)?)
    }
}
