//! Project-wide definition tables: tilesets, enums and the raw entity/layer
//! definitions that instances are resolved against.

use std::collections::HashMap;
use std::sync::Arc;

use bevy::math::{IVec2, UVec2};
use bevy_ldtkmap_assets::format::{
    RawDefinitions, RawEntityDefinition, RawEnumDefinition, RawLayerDefinition,
    RawTilesetDefinition, tuple_component,
};

/// Clamp a file integer into `u32`. Negative values become 0.
pub(crate) fn saturating_u32(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}

/// Clamp a file integer into `i32`.
pub(crate) fn saturating_i32(value: i64) -> i32 {
    i32::try_from(value).unwrap_or(if value < 0 { i32::MIN } else { i32::MAX })
}

/// A rectangle in a tileset image, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TileRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl TileRect {
    /// Build from the format's `[x, y, width, height]` encoding.
    pub fn from_raw(values: &[i64]) -> Self {
        Self {
            x: saturating_i32(tuple_component(values, 0)),
            y: saturating_i32(tuple_component(values, 1)),
            width: saturating_i32(tuple_component(values, 2)),
            height: saturating_i32(tuple_component(values, 3)),
        }
    }

    /// Top-left corner.
    pub fn min(&self) -> IVec2 {
        IVec2::new(self.x, self.y)
    }

    pub fn size(&self) -> IVec2 {
        IVec2::new(self.width, self.height)
    }
}

/// Tileset metadata. Immutable leaf shared by every layer, entity and enum that
/// references it.
#[derive(Debug, Clone, PartialEq)]
pub struct Tileset {
    pub identifier: String,
    pub uid: i64,
    /// Image size in pixels
    pub px_size: UVec2,
    /// Size of one tile cell in pixels
    pub tile_grid_size: u32,
    /// Pixels between tiles
    pub spacing: u32,
    /// Pixels around the image border
    pub padding: u32,
    /// Image path relative to the project file
    pub rel_path: Option<String>,
}

impl Tileset {
    pub fn from_raw(raw: &RawTilesetDefinition) -> Self {
        Self {
            identifier: raw.identifier.clone(),
            uid: raw.uid,
            px_size: UVec2::new(saturating_u32(raw.px_wid), saturating_u32(raw.px_hei)),
            tile_grid_size: saturating_u32(raw.tile_grid_size),
            spacing: saturating_u32(raw.spacing),
            padding: saturating_u32(raw.padding),
            rel_path: raw.rel_path.clone(),
        }
    }

    /// Grid dimensions in cells (columns, rows).
    pub fn grid_size(&self) -> UVec2 {
        if self.tile_grid_size == 0 {
            return UVec2::ZERO;
        }
        let stride = self.tile_grid_size.saturating_add(self.spacing);
        let usable = self
            .px_size
            .saturating_sub(UVec2::splat(self.padding.saturating_mul(2)));
        usable.saturating_add(UVec2::splat(self.spacing)) / stride
    }

    /// Pixel position of `tile_id`'s top-left corner in the tileset image.
    ///
    /// Returns `None` if the tileset has no cell size or the id is past the grid.
    pub fn tile_src(&self, tile_id: u32) -> Option<UVec2> {
        let grid = self.grid_size();
        if grid.x == 0 || u64::from(tile_id) >= u64::from(grid.x) * u64::from(grid.y) {
            return None;
        }
        let cell = UVec2::new(tile_id % grid.x, tile_id / grid.x);
        let stride = self.tile_grid_size.saturating_add(self.spacing);
        Some(
            cell.saturating_mul(UVec2::splat(stride))
                .saturating_add(UVec2::splat(self.padding)),
        )
    }
}

/// One value of an [`Enum`].
#[derive(Debug, Clone, PartialEq)]
pub struct EnumValue {
    pub id: String,
    pub tile_id: Option<i64>,
    /// Icon location in the enum's icon tileset
    pub tile_src_rect: Option<TileRect>,
    pub color: Option<i64>,
}

/// A project enum, optionally illustrated with tiles from an icon tileset.
#[derive(Debug, Clone, PartialEq)]
pub struct Enum {
    pub identifier: String,
    pub uid: i64,
    pub values: Vec<EnumValue>,
    /// Resolved icon tileset, if the enum has one and it exists
    pub icon_tileset: Option<Arc<Tileset>>,
    /// Source file for enums imported from outside the project
    pub external_rel_path: Option<String>,
}

impl Enum {
    pub fn from_raw(raw: &RawEnumDefinition, tilesets: &TilesetTable) -> Self {
        let values = raw
            .values
            .iter()
            .map(|value| EnumValue {
                id: value.id.clone(),
                tile_id: value.tile_id,
                tile_src_rect: value.tile_src_rect.as_deref().map(TileRect::from_raw),
                color: value.color,
            })
            .collect();

        Self {
            identifier: raw.identifier.clone(),
            uid: raw.uid,
            values,
            icon_tileset: raw.icon_tileset_uid.and_then(|uid| tilesets.get(uid).cloned()),
            external_rel_path: raw.external_rel_path.clone(),
        }
    }

    /// Look up a value by id.
    pub fn value(&self, id: &str) -> Option<&EnumValue> {
        self.values.iter().find(|value| value.id == id)
    }

    pub fn has_value(&self, id: &str) -> bool {
        self.value(id).is_some()
    }
}

/// Tilesets in declaration order, indexed by uid.
#[derive(Debug, Clone, Default)]
pub struct TilesetTable {
    entries: Vec<Arc<Tileset>>,
    by_uid: HashMap<i64, usize>,
}

impl TilesetTable {
    fn insert(&mut self, tileset: Tileset) {
        let tileset = Arc::new(tileset);
        if let Some(&index) = self.by_uid.get(&tileset.uid) {
            self.entries[index] = tileset;
        } else {
            self.by_uid.insert(tileset.uid, self.entries.len());
            self.entries.push(tileset);
        }
    }

    pub fn get(&self, uid: i64) -> Option<&Arc<Tileset>> {
        self.by_uid.get(&uid).map(|&index| &self.entries[index])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Tileset>> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Enums in declaration order (local enums first, then external), indexed by identifier.
#[derive(Debug, Clone, Default)]
pub struct EnumTable {
    entries: Vec<Arc<Enum>>,
    by_name: HashMap<String, usize>,
}

impl EnumTable {
    fn insert(&mut self, enum_def: Enum) {
        let enum_def = Arc::new(enum_def);
        if let Some(&index) = self.by_name.get(&enum_def.identifier) {
            self.entries[index] = enum_def;
        } else {
            self.by_name
                .insert(enum_def.identifier.clone(), self.entries.len());
            self.entries.push(enum_def);
        }
    }

    pub fn get(&self, identifier: &str) -> Option<&Arc<Enum>> {
        self.by_name
            .get(identifier)
            .map(|&index| &self.entries[index])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Enum>> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Everything instances are resolved against while a level is being built.
///
/// Owned by the [`World`](crate::world::World) and shared with in-flight level
/// loads.
#[derive(Debug, Clone, Default)]
pub struct Definitions {
    pub tilesets: TilesetTable,
    pub enums: EnumTable,
    pub entities: Vec<RawEntityDefinition>,
    pub layers: Vec<RawLayerDefinition>,
}

impl Definitions {
    /// Build the tables from a raw `defs` section. A missing section gives empty tables.
    pub fn from_raw(raw: Option<&RawDefinitions>) -> Self {
        let Some(raw) = raw else {
            return Self::default();
        };

        let mut tilesets = TilesetTable::default();
        for tileset in &raw.tilesets {
            tilesets.insert(Tileset::from_raw(tileset));
        }

        // Enums resolve their icon tileset, so tilesets go first
        let mut enums = EnumTable::default();
        for enum_def in raw.enums.iter().chain(&raw.external_enums) {
            enums.insert(Enum::from_raw(enum_def, &tilesets));
        }

        Self {
            tilesets,
            enums,
            entities: raw.entities.clone(),
            layers: raw.layers.clone(),
        }
    }

    pub fn entity_definition(&self, uid: i64) -> Option<&RawEntityDefinition> {
        self.entities.iter().find(|def| def.uid == uid)
    }

    pub fn layer_definition(&self, uid: i64) -> Option<&RawLayerDefinition> {
        self.layers.iter().find(|def| def.uid == uid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw_defs() -> RawDefinitions {
        serde_json::from_value(json!({
            "tilesets": [
                { "identifier": "Tiles", "uid": 1, "pxWid": 64, "pxHei": 32, "tileGridSize": 16 },
                { "identifier": "Icons", "uid": 2, "pxWid": 36, "pxHei": 36, "tileGridSize": 16, "spacing": 2, "padding": 1 }
            ],
            "enums": [{
                "identifier": "Color",
                "uid": 10,
                "iconTilesetUid": 2,
                "values": [
                    { "id": "RED", "tileId": 0, "__tileSrcRect": [1, 1, 16, 16] },
                    { "id": "BLUE" }
                ]
            }],
            "externalEnums": [{ "identifier": "Item", "uid": 11, "externalRelPath": "items.cdb" }]
        }))
        .unwrap()
    }

    #[test]
    fn test_missing_defs_yield_empty_tables() {
        let defs = Definitions::from_raw(None);
        assert!(defs.tilesets.is_empty());
        assert!(defs.enums.is_empty());
    }

    #[test]
    fn test_enum_icon_tileset_resolved() {
        let defs = Definitions::from_raw(Some(&raw_defs()));
        let color = defs.enums.get("Color").unwrap();

        assert_eq!(color.values.len(), 2);
        assert_eq!(color.icon_tileset.as_ref().unwrap().identifier, "Icons");
        assert_eq!(
            color.value("RED").unwrap().tile_src_rect,
            Some(TileRect { x: 1, y: 1, width: 16, height: 16 })
        );
        assert!(color.value("BLUE").unwrap().tile_src_rect.is_none());
    }

    #[test]
    fn test_external_enums_follow_local_enums() {
        let defs = Definitions::from_raw(Some(&raw_defs()));
        let names: Vec<_> = defs.enums.iter().map(|e| e.identifier.as_str()).collect();
        assert_eq!(names, vec!["Color", "Item"]);
        assert_eq!(
            defs.enums.get("Item").unwrap().external_rel_path.as_deref(),
            Some("items.cdb")
        );
    }

    #[test]
    fn test_tileset_grid_and_tile_src() {
        let defs = Definitions::from_raw(Some(&raw_defs()));

        let tiles = defs.tilesets.get(1).unwrap();
        assert_eq!(tiles.grid_size(), UVec2::new(4, 2));
        assert_eq!(tiles.tile_src(5), Some(UVec2::new(16, 16)));
        assert_eq!(tiles.tile_src(8), None);

        let icons = defs.tilesets.get(2).unwrap();
        assert_eq!(icons.grid_size(), UVec2::new(2, 2));
        assert_eq!(icons.tile_src(3), Some(UVec2::new(19, 19)));
    }

    #[test]
    fn test_oversized_values_saturate() {
        let raw: RawTilesetDefinition = serde_json::from_value(json!({
            "identifier": "Huge",
            "uid": 9,
            "pxWid": 1_i64 << 40,
            "pxHei": 64,
            "tileGridSize": u32::MAX,
            "spacing": u32::MAX,
            "padding": 1_i64 << 33
        }))
        .unwrap();
        let tileset = Tileset::from_raw(&raw);

        assert_eq!(tileset.px_size, UVec2::new(u32::MAX, 64));
        assert_eq!(tileset.padding, u32::MAX);
        assert_eq!(tileset.grid_size(), UVec2::new(1, 1));
        assert_eq!(tileset.tile_src(0), Some(UVec2::splat(u32::MAX)));
        assert_eq!(tileset.tile_src(1), None);

        assert_eq!(saturating_u32(-5), 0);
        assert_eq!(saturating_i32(i64::MAX), i32::MAX);
        assert_eq!(saturating_i32(i64::MIN), i32::MIN);
        assert_eq!(
            TileRect::from_raw(&[1 << 40, -(1 << 40), 16, 16]).min(),
            IVec2::new(i32::MAX, i32::MIN)
        );
    }
}
