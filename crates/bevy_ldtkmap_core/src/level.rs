//! Levels: background, layers, custom fields and lazily resolved neighbours.

use std::sync::{Arc, OnceLock};

use bevy::log::{debug, warn};
use bevy::math::{IVec2, Rect, UVec2, Vec2};
use bevy_ldtkmap_assets::format::{RawLevel, RawNeighbour, tuple_component};

use crate::definitions::{Definitions, saturating_i32, saturating_u32};
use crate::entity::ivec2_from_raw;
use crate::error::{LdtkError, ReferenceKind};
use crate::field::{Field, FieldMap};
use crate::layer::Layer;
use crate::world::World;

/// Side of a level another level touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    South,
    West,
    East,
}

impl Direction {
    /// Parse the format's one-letter direction tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "n" => Some(Direction::North),
            "s" => Some(Direction::South),
            "w" => Some(Direction::West),
            "e" => Some(Direction::East),
            _ => None,
        }
    }
}

/// A neighbouring level, referenced by uid.
///
/// Holds no pointer to the level itself, so it stays valid when the neighbour
/// is unloaded and loaded again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Neighbour {
    pub direction: Direction,
    pub level_uid: i64,
}

impl Neighbour {
    /// The neighbouring level, if `world` has it loaded.
    pub fn level(&self, world: &World) -> Option<Arc<Level>> {
        world.find_level_by_uid(self.level_uid)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundImage {
    /// Image path relative to the project file
    pub rel_path: String,
    pub pivot: Vec2,
    /// Where the image's top-left corner lands in the level
    pub top_left_px: IVec2,
    pub scale: Vec2,
    /// Visible part of the source image
    pub crop_rect: Rect,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Background {
    /// Hex color, e.g. `#40465B`
    pub color: String,
    pub image: Option<BackgroundImage>,
}

impl Background {
    fn from_raw(raw: &RawLevel) -> Self {
        let color = raw
            .resolved_bg_color
            .clone()
            .or_else(|| raw.bg_color.clone())
            .unwrap_or_default();

        let image = raw.bg_rel_path.as_ref().map(|rel_path| {
            let pos = raw.bg_pos.clone().unwrap_or_default();
            let crop = |index| tuple_component(&pos.crop_rect, index);
            let crop_min = Vec2::new(crop(0), crop(1));

            BackgroundImage {
                rel_path: rel_path.clone(),
                pivot: Vec2::new(raw.bg_pivot_x, raw.bg_pivot_y),
                top_left_px: ivec2_from_raw(&pos.top_left_px),
                scale: Vec2::new(
                    tuple_component(&pos.scale, 0),
                    tuple_component(&pos.scale, 1),
                ),
                crop_rect: Rect::from_corners(crop_min, crop_min + Vec2::new(crop(2), crop(3))),
            }
        });

        Self { color, image }
    }
}

/// A fully built level.
///
/// Layers are ordered as in the file, index 0 being the topmost.
#[derive(Debug)]
pub struct Level {
    pub identifier: String,
    pub uid: i64,
    pub px_size: UVec2,
    pub world_pos: IVec2,
    pub background: Background,
    pub layers: Vec<Layer>,
    pub fields: FieldMap,
    raw_neighbours: Vec<RawNeighbour>,
    neighbours: OnceLock<Vec<Neighbour>>,
}

impl Level {
    /// Build a level from a record that carries its layer instances.
    pub fn from_raw(raw: &RawLevel, defs: &Definitions) -> Result<Self, LdtkError> {
        let layer_instances = raw
            .layer_instances
            .as_ref()
            .ok_or_else(|| LdtkError::MissingLayerData(raw.identifier.clone()))?;

        let layers = layer_instances
            .iter()
            .map(|layer| Layer::from_raw(layer, defs))
            .collect::<Result<Vec<_>, _>>()?;
        let fields = FieldMap::from_raw(&raw.field_instances, &raw.identifier, defs)?;

        debug!(
            "Built level '{}' with {} layer(s)",
            raw.identifier,
            layers.len()
        );

        Ok(Self {
            identifier: raw.identifier.clone(),
            uid: raw.uid,
            px_size: UVec2::new(saturating_u32(raw.px_wid), saturating_u32(raw.px_hei)),
            world_pos: IVec2::new(saturating_i32(raw.world_x), saturating_i32(raw.world_y)),
            background: Background::from_raw(raw),
            layers,
            fields,
            raw_neighbours: raw.neighbours.clone(),
            neighbours: OnceLock::new(),
        })
    }

    /// Neighbouring levels, checked against `world` on every call.
    ///
    /// Direction tags are parsed once and the list is memoized, so repeated
    /// calls return the same slice.
    ///
    /// # Errors
    /// [`LdtkError::DanglingReference`] if a neighbour uid names no loaded level.
    /// A later call can succeed once that level is loaded.
    pub fn neighbours(&self, world: &World) -> Result<&[Neighbour], LdtkError> {
        let neighbours = self.neighbours.get_or_init(|| self.parse_neighbours());

        if let Some(missing) = neighbours
            .iter()
            .find(|neighbour| world.find_level_by_uid(neighbour.level_uid).is_none())
        {
            return Err(LdtkError::DanglingReference {
                kind: ReferenceKind::Level,
                id: missing.level_uid.to_string(),
                referrer: self.identifier.clone(),
            });
        }

        Ok(neighbours)
    }

    fn parse_neighbours(&self) -> Vec<Neighbour> {
        self.raw_neighbours
            .iter()
            .filter_map(|raw| {
                let Some(direction) = Direction::from_tag(&raw.dir) else {
                    warn!(
                        "Skipping neighbour {} of level '{}' with unknown direction '{}'",
                        raw.level_uid, self.identifier, raw.dir
                    );
                    return None;
                };
                Some(Neighbour {
                    direction,
                    level_uid: raw.level_uid,
                })
            })
            .collect()
    }

    pub fn layer(&self, identifier: &str) -> Option<&Layer> {
        self.layers.iter().find(|layer| layer.identifier == identifier)
    }

    pub fn field(&self, identifier: &str) -> Option<&Field> {
        self.fields.get(identifier)
    }
}

impl PartialEq for Level {
    // Neighbour cache is derived state and left out
    fn eq(&self, other: &Self) -> bool {
        self.identifier == other.identifier
            && self.uid == other.uid
            && self.px_size == other.px_size
            && self.world_pos == other.world_pos
            && self.background == other.background
            && self.layers == other.layers
            && self.fields == other.fields
            && self
                .raw_neighbours
                .iter()
                .map(|n| (n.level_uid, &n.dir))
                .eq(other.raw_neighbours.iter().map(|n| (n.level_uid, &n.dir)))
    }
}
