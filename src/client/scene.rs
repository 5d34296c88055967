//! Default placement of bookmark nodes in the 3D scene.
//!
//! Bookmarks with a stored position keep it. The rest are grouped by
//! category; each category owns an angular sector of a ring around the
//! origin and its members spiral outward from the sector centre.

use std::collections::BTreeMap;
use std::f64::consts::{PI, TAU};

use crate::types::bookmark::{Bookmark, Position, COORD_LIMIT};

/// Golden angle in radians, spreads successive members evenly.
const GOLDEN_ANGLE: f64 = PI * (3.0 - 2.236_067_977_499_79);

/// Tunables for [`arrange`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneParams {
    /// Distance of the first member of each category from the origin.
    pub ring_radius: f64,
    /// Radial growth per member, scaled by the square root of its index.
    pub spiral_step: f64,
    /// Vertical offset between the three height layers.
    pub layer_height: f64,
}

impl Default for SceneParams {
    fn default() -> Self {
        Self {
            ring_radius: 12.0,
            spiral_step: 2.5,
            layer_height: 1.5,
        }
    }
}

/// Where a node is drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct NodePlacement {
    pub id: String,
    pub position: Position,
    pub scale: f64,
    pub pinned: bool,
    /// True when the position came from the saved layout.
    pub saved: bool,
}

/// Computes a placement for every bookmark, in input order.
///
/// Deterministic: the same list always yields the same placements.
pub fn arrange(bookmarks: &[Bookmark], params: &SceneParams) -> Vec<NodePlacement> {
    // Sector per category, ordered case-insensitively
    let mut groups: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (index, bookmark) in bookmarks.iter().enumerate() {
        if bookmark.position.is_none() {
            groups
                .entry(bookmark.category.to_lowercase())
                .or_default()
                .push(index);
        }
    }

    let sector_width = if groups.is_empty() {
        TAU
    } else {
        TAU / groups.len() as f64
    };

    let mut computed: BTreeMap<usize, Position> = BTreeMap::new();
    for (sector, members) in groups.values().enumerate() {
        let centre = (sector as f64 + 0.5) * sector_width;
        for (k, &index) in members.iter().enumerate() {
            let k = k as f64;
            let offset = ((k * GOLDEN_ANGLE) % sector_width) - sector_width / 2.0;
            let angle = centre + offset * 0.9;
            let radius = params.ring_radius + params.spiral_step * k.sqrt();
            let layer = (k as usize % 3) as f64 - 1.0;
            let clamp = |v: f64| v.clamp(-COORD_LIMIT, COORD_LIMIT);
            computed.insert(
                index,
                Position::new(
                    clamp(radius * angle.cos()),
                    clamp(layer * params.layer_height),
                    clamp(radius * angle.sin()),
                ),
            );
        }
    }

    bookmarks
        .iter()
        .enumerate()
        .map(|(index, bookmark)| {
            let (position, saved) = match bookmark.position {
                Some(p) => (p, true),
                None => (
                    computed
                        .get(&index)
                        .copied()
                        .unwrap_or(Position::new(0.0, 0.0, 0.0)),
                    false,
                ),
            };
            NodePlacement {
                id: bookmark.id.clone(),
                position,
                scale: bookmark.scale,
                pinned: bookmark.pinned,
                saved,
            }
        })
        .collect()
}
