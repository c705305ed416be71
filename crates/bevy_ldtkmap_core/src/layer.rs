//! Layer instances and their kind-specific payloads.

use std::collections::HashMap;
use std::sync::Arc;

use bevy::log::warn;
use bevy::math::{IVec2, UVec2};
use bevy_ldtkmap_assets::format::{RawLayerInstance, RawTileInstance};

use crate::definitions::{Definitions, Tileset, saturating_i32, saturating_u32};
use crate::entity::{Entity, ivec2_from_raw};
use crate::error::LdtkError;

/// Layer kind, parsed from the instance's `__type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    AutoTile,
    Entities,
    IntGrid,
    Tiles,
}

impl LayerKind {
    /// Parse a raw `__type`. Returns `None` for anything unknown.
    pub fn from_type_name(name: &str) -> Option<Self> {
        match name {
            "AutoLayer" => Some(LayerKind::AutoTile),
            "Entities" => Some(LayerKind::Entities),
            "IntGrid" => Some(LayerKind::IntGrid),
            "Tiles" => Some(LayerKind::Tiles),
            _ => None,
        }
    }
}

/// A tile placed on a tile or auto-tile layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    /// Bit 0 flips horizontally, bit 1 vertically
    pub flip_bits: u8,
    /// Position in layer space, in pixels
    pub px: IVec2,
    /// Top-left of the source rectangle in the tileset image
    pub src: IVec2,
    pub tile_id: i64,
}

impl Tile {
    pub fn from_raw(raw: &RawTileInstance) -> Self {
        Self {
            flip_bits: raw.f,
            px: ivec2_from_raw(&raw.px),
            src: ivec2_from_raw(&raw.src),
            tile_id: raw.t,
        }
    }

    pub fn flip_x(&self) -> bool {
        self.flip_bits & 0b01 != 0
    }

    pub fn flip_y(&self) -> bool {
        self.flip_bits & 0b10 != 0
    }
}

/// Legend entry for one IntGrid value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntGridValue {
    pub color: String,
    pub identifier: Option<String>,
}

/// Dense IntGrid payload, indexed `[x][y]`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IntGrid {
    pub width: u32,
    pub height: u32,
    /// `values[x][y]`, 0 where nothing is painted
    pub values: Vec<Vec<i32>>,
    pub legend: HashMap<i32, IntGridValue>,
}

impl IntGrid {
    /// Value at a cell, or `None` outside the grid.
    pub fn get(&self, x: u32, y: u32) -> Option<i32> {
        self.values
            .get(x as usize)
            .and_then(|column| column.get(y as usize))
            .copied()
    }

    pub fn legend_entry(&self, value: i32) -> Option<&IntGridValue> {
        self.legend.get(&value)
    }

    fn from_raw(raw: &RawLayerInstance, defs: &Definitions) -> Self {
        let width = saturating_u32(raw.c_wid);
        let height = saturating_u32(raw.c_hei);
        let mut values = vec![vec![0; height as usize]; width as usize];

        let mut set = |coord_id: i64, value: i64| {
            let Some((x, y)) = cell_of(coord_id, width, height) else {
                warn!(
                    "Skipping IntGrid cell {} outside {}x{} layer '{}'",
                    coord_id, width, height, raw.identifier
                );
                return;
            };
            values[x][y] = saturating_i32(value);
        };

        if let Some(cells) = &raw.int_grid {
            for cell in cells {
                set(cell.coord_id, cell.v);
            }
        } else if let Some(csv) = &raw.int_grid_csv {
            for (coord_id, &value) in csv.iter().enumerate() {
                if value != 0 {
                    set(coord_id as i64, value);
                }
            }
        }

        let legend = defs
            .layer_definition(raw.layer_def_uid)
            .map(|def| {
                def.int_grid_values
                    .iter()
                    .enumerate()
                    .map(|(index, value)| {
                        (
                            index as i32,
                            IntGridValue {
                                color: value.color.clone(),
                                identifier: value.identifier.clone(),
                            },
                        )
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            width,
            height,
            values,
            legend,
        }
    }
}

fn cell_of(coord_id: i64, width: u32, height: u32) -> Option<(usize, usize)> {
    if width == 0 || coord_id < 0 {
        return None;
    }
    let x = coord_id % i64::from(width);
    let y = coord_id / i64::from(width);
    (y < i64::from(height)).then_some((x as usize, y as usize))
}

/// Kind-specific layer contents. Exactly one is populated per layer.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerData {
    AutoTile(Vec<Tile>),
    Entities(Vec<Entity>),
    IntGrid(IntGrid),
    Tiles(Vec<Tile>),
}

impl LayerData {
    pub fn kind(&self) -> LayerKind {
        match self {
            LayerData::AutoTile(_) => LayerKind::AutoTile,
            LayerData::Entities(_) => LayerKind::Entities,
            LayerData::IntGrid(_) => LayerKind::IntGrid,
            LayerData::Tiles(_) => LayerKind::Tiles,
        }
    }
}

/// A layer instance inside a level.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub identifier: String,
    /// Uid of the layer definition
    pub def_uid: i64,
    /// Size in cells
    pub grid_size: UVec2,
    /// Size of one cell in pixels
    pub cell_size: u32,
    pub opacity: f32,
    pub px_total_offset: IVec2,
    pub tileset: Option<Arc<Tileset>>,
    pub visible: bool,
    pub data: LayerData,
}

impl Layer {
    pub fn from_raw(raw: &RawLayerInstance, defs: &Definitions) -> Result<Self, LdtkError> {
        let kind = LayerKind::from_type_name(&raw.layer_type).ok_or_else(|| {
            LdtkError::UnknownLayerKind {
                layer: raw.identifier.clone(),
                kind: raw.layer_type.clone(),
            }
        })?;

        let px_total_offset = IVec2::new(
            saturating_i32(raw.px_total_offset_x),
            saturating_i32(raw.px_total_offset_y),
        );

        let data = match kind {
            LayerKind::AutoTile => {
                LayerData::AutoTile(raw.auto_layer_tiles.iter().map(Tile::from_raw).collect())
            }
            LayerKind::Tiles => {
                LayerData::Tiles(raw.grid_tiles.iter().map(Tile::from_raw).collect())
            }
            LayerKind::IntGrid => LayerData::IntGrid(IntGrid::from_raw(raw, defs)),
            LayerKind::Entities => LayerData::Entities(
                raw.entity_instances
                    .iter()
                    .map(|entity| Entity::from_raw(entity, defs, px_total_offset))
                    .collect::<Result<_, _>>()?,
            ),
        };

        Ok(Self {
            identifier: raw.identifier.clone(),
            def_uid: raw.layer_def_uid,
            grid_size: UVec2::new(saturating_u32(raw.c_wid), saturating_u32(raw.c_hei)),
            cell_size: saturating_u32(raw.grid_size),
            opacity: raw.opacity,
            px_total_offset,
            tileset: raw
                .tileset_def_uid
                .and_then(|uid| defs.tilesets.get(uid).cloned()),
            visible: raw.visible,
            data,
        })
    }

    pub fn kind(&self) -> LayerKind {
        self.data.kind()
    }

    /// Tiles of a tile or auto-tile layer.
    pub fn tiles(&self) -> Option<&[Tile]> {
        match &self.data {
            LayerData::AutoTile(tiles) | LayerData::Tiles(tiles) => Some(tiles),
            _ => None,
        }
    }

    pub fn entities(&self) -> Option<&[Entity]> {
        match &self.data {
            LayerData::Entities(entities) => Some(entities),
            _ => None,
        }
    }

    pub fn int_grid(&self) -> Option<&IntGrid> {
        match &self.data {
            LayerData::IntGrid(grid) => Some(grid),
            _ => None,
        }
    }
}
