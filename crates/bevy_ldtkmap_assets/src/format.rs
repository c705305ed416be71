//! Raw LDtk project records.
//!
//! These types mirror the JSON written by the LDtk editor and carry no behavior.
//! They are deserialized as-is: unknown keys are ignored, optional keys fall back
//! to their defaults, and nothing is validated beyond what serde needs to build
//! the structs. The typed graph in `bevy_ldtkmap_core` is built on top of them.

use serde::Deserialize;

/// Root of an `.ldtk` project file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProject {
    /// Format version that wrote the file (e.g. `"0.9.3"`).
    #[serde(default)]
    pub json_version: String,

    /// Project background color (hex string).
    #[serde(default)]
    pub bg_color: String,

    /// World layout name (`Free`, `GridVania`, `LinearHorizontal`, `LinearVertical`).
    #[serde(default)]
    pub world_layout: Option<String>,

    /// Width of the world grid in pixels (`GridVania` layouts only).
    #[serde(default)]
    pub world_grid_width: Option<i64>,

    /// Height of the world grid in pixels (`GridVania` layouts only).
    #[serde(default)]
    pub world_grid_height: Option<i64>,

    /// Default pivot X applied to new entity definitions.
    #[serde(default)]
    pub default_pivot_x: f32,

    /// Default pivot Y applied to new entity definitions.
    #[serde(default)]
    pub default_pivot_y: f32,

    /// Default grid size for new layers.
    #[serde(default)]
    pub default_grid_size: i64,

    /// When true, each level lives in its own `.ldtkl` file.
    #[serde(default)]
    pub external_levels: bool,

    /// Definitions section. Missing in some hand-written fixtures.
    #[serde(default)]
    pub defs: Option<RawDefinitions>,

    /// Levels in world order.
    #[serde(default)]
    pub levels: Vec<RawLevel>,
}

/// The `defs` section of a project.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDefinitions {
    #[serde(default)]
    pub layers: Vec<RawLayerDefinition>,
    #[serde(default)]
    pub entities: Vec<RawEntityDefinition>,
    #[serde(default)]
    pub tilesets: Vec<RawTilesetDefinition>,
    #[serde(default)]
    pub enums: Vec<RawEnumDefinition>,
    /// Enums imported from external files (same shape as `enums`).
    #[serde(default)]
    pub external_enums: Vec<RawEnumDefinition>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTilesetDefinition {
    pub identifier: String,
    pub uid: i64,
    #[serde(default)]
    pub px_wid: i64,
    #[serde(default)]
    pub px_hei: i64,
    #[serde(default)]
    pub tile_grid_size: i64,
    #[serde(default)]
    pub spacing: i64,
    #[serde(default)]
    pub padding: i64,
    /// Image path relative to the project file. Absent for embedded atlases.
    #[serde(default)]
    pub rel_path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEnumDefinition {
    pub identifier: String,
    pub uid: i64,
    #[serde(default)]
    pub values: Vec<RawEnumValueDefinition>,
    #[serde(default)]
    pub icon_tileset_uid: Option<i64>,
    #[serde(default)]
    pub external_rel_path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEnumValueDefinition {
    pub id: String,
    #[serde(default)]
    pub tile_id: Option<i64>,
    /// `[x, y, width, height]` in the icon tileset image.
    #[serde(default, rename = "__tileSrcRect")]
    pub tile_src_rect: Option<Vec<i64>>,
    #[serde(default)]
    pub color: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEntityDefinition {
    pub identifier: String,
    pub uid: i64,
    #[serde(default)]
    pub width: i64,
    #[serde(default)]
    pub height: i64,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub tileset_id: Option<i64>,
    #[serde(default)]
    pub tile_id: Option<i64>,
    #[serde(default)]
    pub pivot_x: f32,
    #[serde(default)]
    pub pivot_y: f32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLayerDefinition {
    pub identifier: String,
    pub uid: i64,
    #[serde(rename = "__type", default)]
    pub layer_type: String,
    #[serde(default)]
    pub grid_size: i64,
    #[serde(default)]
    pub int_grid_values: Vec<RawIntGridValueDefinition>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawIntGridValueDefinition {
    #[serde(default)]
    pub identifier: Option<String>,
    #[serde(default)]
    pub color: String,
}

/// A level record.
///
/// In the root file of an external-levels project this is a stub: it names the
/// `.ldtkl` file in `external_rel_path` and has no `layer_instances`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLevel {
    pub identifier: String,
    pub uid: i64,
    #[serde(default)]
    pub px_wid: i64,
    #[serde(default)]
    pub px_hei: i64,
    #[serde(default)]
    pub world_x: i64,
    #[serde(default)]
    pub world_y: i64,
    /// Resolved background color (level override or project default).
    #[serde(default, rename = "__bgColor")]
    pub resolved_bg_color: Option<String>,
    #[serde(default)]
    pub bg_color: Option<String>,
    #[serde(default)]
    pub bg_rel_path: Option<String>,
    #[serde(default)]
    pub bg_pivot_x: f32,
    #[serde(default)]
    pub bg_pivot_y: f32,
    #[serde(default, rename = "__bgPos")]
    pub bg_pos: Option<RawLevelBackgroundPosition>,
    #[serde(default)]
    pub external_rel_path: Option<String>,
    #[serde(default)]
    pub layer_instances: Option<Vec<RawLayerInstance>>,
    #[serde(default)]
    pub field_instances: Vec<RawFieldInstance>,
    #[serde(default, rename = "__neighbours")]
    pub neighbours: Vec<RawNeighbour>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLevelBackgroundPosition {
    /// `[x, y]`
    #[serde(default)]
    pub top_left_px: Vec<i64>,
    /// `[scale_x, scale_y]`
    #[serde(default)]
    pub scale: Vec<f32>,
    /// `[x, y, width, height]`
    #[serde(default)]
    pub crop_rect: Vec<f32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNeighbour {
    pub level_uid: i64,
    /// `n`, `s`, `w` or `e`.
    pub dir: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLayerInstance {
    #[serde(rename = "__identifier")]
    pub identifier: String,
    /// `AutoLayer`, `Entities`, `IntGrid` or `Tiles`.
    #[serde(rename = "__type")]
    pub layer_type: String,
    #[serde(rename = "__cWid", default)]
    pub c_wid: i64,
    #[serde(rename = "__cHei", default)]
    pub c_hei: i64,
    #[serde(rename = "__gridSize", default)]
    pub grid_size: i64,
    #[serde(rename = "__opacity", default = "default_opacity")]
    pub opacity: f32,
    #[serde(rename = "__pxTotalOffsetX", default)]
    pub px_total_offset_x: i64,
    #[serde(rename = "__pxTotalOffsetY", default)]
    pub px_total_offset_y: i64,
    #[serde(rename = "__tilesetDefUid", default)]
    pub tileset_def_uid: Option<i64>,
    #[serde(rename = "__tilesetRelPath", default)]
    pub tileset_rel_path: Option<String>,
    #[serde(default)]
    pub layer_def_uid: i64,
    #[serde(default)]
    pub level_id: i64,
    #[serde(default = "default_visible")]
    pub visible: bool,
    /// Sparse IntGrid values.
    #[serde(default)]
    pub int_grid: Option<Vec<RawIntGridValueInstance>>,
    /// Dense row-major IntGrid values written by newer editors.
    #[serde(default)]
    pub int_grid_csv: Option<Vec<i64>>,
    #[serde(default)]
    pub auto_layer_tiles: Vec<RawTileInstance>,
    #[serde(default)]
    pub grid_tiles: Vec<RawTileInstance>,
    #[serde(default)]
    pub entity_instances: Vec<RawEntityInstance>,
}

fn default_opacity() -> f32 {
    1.0
}

fn default_visible() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawIntGridValueInstance {
    /// `y * width + x`
    pub coord_id: i64,
    pub v: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTileInstance {
    /// `[x, y]` in layer space.
    pub px: Vec<i64>,
    /// `[x, y]` in the tileset image.
    pub src: Vec<i64>,
    /// Flip bits: bit 0 = X, bit 1 = Y.
    #[serde(default)]
    pub f: u8,
    #[serde(default)]
    pub t: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEntityInstance {
    #[serde(rename = "__identifier")]
    pub identifier: String,
    /// `[x, y]` in grid cells.
    #[serde(rename = "__grid", default)]
    pub grid: Vec<i64>,
    /// `[x, y]` in 0..1.
    #[serde(rename = "__pivot", default)]
    pub pivot: Vec<f32>,
    #[serde(rename = "__tile", default)]
    pub tile: Option<RawEntityTile>,
    pub def_uid: i64,
    /// `[x, y]` relative to the layer.
    #[serde(default)]
    pub px: Vec<i64>,
    #[serde(default)]
    pub field_instances: Vec<RawFieldInstance>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEntityTile {
    pub tileset_uid: i64,
    /// `[x, y, width, height]`
    #[serde(default)]
    pub src_rect: Vec<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFieldInstance {
    #[serde(rename = "__identifier")]
    pub identifier: String,
    /// Type string, e.g. `Int`, `Array<Point>` or `LocalEnum.Color`.
    #[serde(rename = "__type")]
    pub field_type: String,
    #[serde(rename = "__value", default)]
    pub value: serde_json::Value,
    #[serde(default)]
    pub def_uid: Option<i64>,
}

/// Read element `index` of a raw numeric tuple, defaulting to zero.
///
/// The format encodes points and rectangles as short arrays; a short array is
/// treated as zero-padded.
pub fn tuple_component<T: Copy + Default>(values: &[T], index: usize) -> T {
    values.get(index).copied().unwrap_or_default()
}
