//! Enumeration of the descendants of a subtree root.

use tessella_config::MAX_LEVEL;

use crate::address::{TileAddress, grid_size};
use crate::error::TilingError;
use crate::morton;

/// All tiles `relative_level` levels below `root`, in Morton order.
///
/// Descendant `i` is at local offset `morton::decode(i)` from the root's
/// top-left child, i.e. `(x * 2^r + dx, y * 2^r + dy)`.
pub fn expand(root: &TileAddress, relative_level: u32) -> Result<Vec<TileAddress>, TilingError> {
    Ok(descendants(root, relative_level)?.collect())
}

/// Lazy form of [`expand`].
pub fn descendants(
    root: &TileAddress,
    relative_level: u32,
) -> Result<impl Iterator<Item = TileAddress> + '_, TilingError> {
    let level = root
        .level()
        .checked_add(relative_level)
        .ok_or(TilingError::LevelOutOfRange {
            level: u32::MAX,
            max: MAX_LEVEL,
        })?;
    grid_size(level)?;
    Ok((0..morton::size(relative_level)).map(move |i| {
        let (dx, dy) = morton::decode(i);
        root.descendant(relative_level, dx, dy)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::TileKind;
    use std::collections::HashSet;

    #[test]
    fn test_descendants_cover_block_once() {
        let root = TileAddress::new("c", TileKind::Subtree, 1, 1, 0).unwrap();
        for r in 0..=4 {
            let side = 1u32 << r;
            let tiles = expand(&root, r).unwrap();
            assert_eq!(tiles.len() as u64, morton::size(r));
            let offsets: HashSet<(u32, u32)> = tiles
                .iter()
                .map(|t| (t.x() - root.x() * side, t.y() - root.y() * side))
                .collect();
            assert_eq!(offsets.len(), tiles.len());
            assert!(offsets.iter().all(|&(dx, dy)| dx < side && dy < side));
            assert!(tiles.iter().all(|t| t.level() == 1 + r));
        }
    }

    #[test]
    fn test_morton_order() {
        let root = TileAddress::new("c", TileKind::Subtree, 0, 0, 0).unwrap();
        let coords: Vec<(u32, u32)> = expand(&root, 1)
            .unwrap()
            .iter()
            .map(|t| (t.x(), t.y()))
            .collect();
        assert_eq!(coords, vec![(0, 0), (1, 0), (0, 1), (1, 1)]);
    }

    #[test]
    fn test_relative_level_zero_is_root() {
        let root = TileAddress::new("c", TileKind::Content, 3, 2, 5).unwrap();
        assert_eq!(expand(&root, 0).unwrap(), vec![root]);
    }

    #[test]
    fn test_too_deep_rejected() {
        let root = TileAddress::new("c", TileKind::Subtree, 15, 0, 0).unwrap();
        assert!(matches!(
            expand(&root, 2),
            Err(TilingError::LevelOutOfRange { level: 17, .. })
        ));
    }

    #[test]
    fn test_relative_level_overflow_rejected() {
        let root = TileAddress::new("c", TileKind::Subtree, 1, 0, 0).unwrap();
        assert!(matches!(
            expand(&root, u32::MAX),
            Err(TilingError::LevelOutOfRange { .. })
        ));
        assert!(root.children(u32::MAX).is_err());
    }
}
