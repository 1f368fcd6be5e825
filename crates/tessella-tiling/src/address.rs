//! Tile identifiers in an implicit quadtree.

use std::fmt;
use std::sync::Arc;

use tessella_config::MAX_LEVEL;

use crate::error::TilingError;
use crate::morton;
use crate::subtree;

/// What a tile resource holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TileKind {
    /// Binary glTF content.
    Content,
    /// Availability information of a subtree.
    Subtree,
}

impl TileKind {
    /// File extension of resources of this kind.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            TileKind::Content => "glb",
            TileKind::Subtree => "subtree",
        }
    }
}

impl fmt::Display for TileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TileKind::Content => "CONTENT",
            TileKind::Subtree => "SUBTREE",
        })
    }
}

/// Uniquely identifies a tile of a collection.
///
/// At `level` the root extent is divided into a `2^level x 2^level` grid;
/// `x` grows eastwards and `y` northwards.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileAddress {
    level: u32,
    x: u32,
    y: u32,
    collection_id: Arc<str>,
    kind: TileKind,
}

impl TileAddress {
    /// Construct an address, validating the level and the grid coordinates.
    pub fn new(
        collection_id: impl Into<Arc<str>>,
        kind: TileKind,
        level: u32,
        x: u32,
        y: u32,
    ) -> Result<Self, TilingError> {
        let size = grid_size(level)?;
        if x >= size || y >= size {
            return Err(TilingError::CoordinateOutOfRange { level, x, y, size });
        }
        Ok(Self {
            level,
            x,
            y,
            collection_id: collection_id.into(),
            kind,
        })
    }

    /// The root tile of a collection.
    #[must_use]
    pub fn root(collection_id: impl Into<Arc<str>>, kind: TileKind) -> Self {
        Self {
            level: 0,
            x: 0,
            y: 0,
            collection_id: collection_id.into(),
            kind,
        }
    }

    /// Quadtree level.
    #[must_use]
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Column.
    #[must_use]
    pub fn x(&self) -> u32 {
        self.x
    }

    /// Row.
    #[must_use]
    pub fn y(&self) -> u32 {
        self.y
    }

    /// Owning collection.
    #[must_use]
    pub fn collection_id(&self) -> &str {
        &self.collection_id
    }

    /// Resource kind.
    #[must_use]
    pub fn kind(&self) -> TileKind {
        self.kind
    }

    /// Number of tiles along one axis at this address's level.
    #[must_use]
    pub fn factor(&self) -> u32 {
        1 << self.level
    }

    /// The same tile as another kind of resource.
    #[must_use]
    pub fn with_kind(&self, kind: TileKind) -> Self {
        Self {
            kind,
            ..self.clone()
        }
    }

    /// Morton index of the tile within its level.
    #[must_use]
    pub fn index(&self) -> u64 {
        morton::encode(self.x, self.y)
    }

    /// Resource name relative to the tileset, e.g. `3_5_2.glb`.
    #[must_use]
    pub fn relative_path(&self) -> String {
        format!(
            "{}_{}_{}.{}",
            self.level,
            self.x,
            self.y,
            self.kind.extension()
        )
    }

    /// `level/x/y`.
    #[must_use]
    pub fn short(&self) -> String {
        format!("{}/{}/{}", self.level, self.x, self.y)
    }

    /// The enclosing tile one level up. `None` at the root.
    #[must_use]
    pub fn parent(&self) -> Option<TileAddress> {
        if self.level == 0 {
            return None;
        }
        Some(Self {
            level: self.level - 1,
            x: self.x / 2,
            y: self.y / 2,
            ..self.clone()
        })
    }

    /// All descendants `relative_level` levels below, in Morton order.
    pub fn children(&self, relative_level: u32) -> Result<Vec<TileAddress>, TilingError> {
        subtree::expand(self, relative_level)
    }

    /// Build a descendant without re-validating; callers guarantee the bounds.
    pub(crate) fn descendant(&self, relative_level: u32, dx: u32, dy: u32) -> Self {
        Self {
            level: self.level + relative_level,
            x: (self.x << relative_level) + dx,
            y: (self.y << relative_level) + dy,
            ..self.clone()
        }
    }
}

impl fmt::Display for TileAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}/{}/{}",
            self.collection_id, self.kind, self.level, self.x, self.y
        )
    }
}

/// Number of tiles along one axis at `level`.
pub fn grid_size(level: u32) -> Result<u32, TilingError> {
    if level > MAX_LEVEL {
        return Err(TilingError::LevelOutOfRange {
            level,
            max: MAX_LEVEL,
        });
    }
    Ok(1 << level)
}
