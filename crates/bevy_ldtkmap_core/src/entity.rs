//! Entity instances placed on an entities layer.

use std::sync::Arc;

use bevy::math::{IVec2, Vec2};
use bevy_ldtkmap_assets::format::{RawEntityInstance, tuple_component};

use crate::definitions::{Definitions, TileRect, Tileset, saturating_i32};
use crate::error::LdtkError;
use crate::field::{Field, FieldMap};

/// Tile used to display an entity in the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityTile {
    pub tileset_uid: i64,
    pub src_rect: TileRect,
}

/// A placed entity with its normalized custom fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub identifier: String,
    /// Uid of the entity definition
    pub def_uid: i64,
    /// Position in grid cells
    pub grid: IVec2,
    /// Pivot in 0..1 on both axes
    pub pivot: Vec2,
    /// Display tile, if the instance has one
    pub tile: Option<EntityTile>,
    /// Tileset configured on the entity definition
    pub tileset: Option<Arc<Tileset>>,
    pub fields: FieldMap,
    px: IVec2,
    px_offset: IVec2,
}

impl Entity {
    /// Build an entity from its raw record.
    ///
    /// # Arguments
    /// * `raw` - The raw entity instance
    /// * `defs` - Definitions for tileset and enum lookups
    /// * `px_offset` - Total pixel offset of the owning layer
    pub fn from_raw(
        raw: &RawEntityInstance,
        defs: &Definitions,
        px_offset: IVec2,
    ) -> Result<Self, LdtkError> {
        let fields = FieldMap::from_raw(&raw.field_instances, &raw.identifier, defs)?;

        // Definition or tileset missing just means no tileset
        let tileset = defs
            .entity_definition(raw.def_uid)
            .and_then(|def| def.tileset_id)
            .and_then(|uid| defs.tilesets.get(uid).cloned());

        let tile = raw.tile.as_ref().map(|tile| EntityTile {
            tileset_uid: tile.tileset_uid,
            src_rect: TileRect::from_raw(&tile.src_rect),
        });

        Ok(Self {
            identifier: raw.identifier.clone(),
            def_uid: raw.def_uid,
            grid: ivec2_from_raw(&raw.grid),
            pivot: Vec2::new(tuple_component(&raw.pivot, 0), tuple_component(&raw.pivot, 1)),
            tile,
            tileset,
            fields,
            px: ivec2_from_raw(&raw.px),
            px_offset,
        })
    }

    /// Pixel position including the owning layer's offset.
    pub fn pos(&self) -> IVec2 {
        self.px + self.px_offset
    }

    /// Pixel position relative to the layer, as stored in the file.
    pub fn relative_pos(&self) -> IVec2 {
        self.px
    }

    pub fn field(&self, identifier: &str) -> Option<&Field> {
        self.fields.get(identifier)
    }
}

pub(crate) fn ivec2_from_raw(values: &[i64]) -> IVec2 {
    IVec2::new(
        saturating_i32(tuple_component(values, 0)),
        saturating_i32(tuple_component(values, 1)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldKind;
    use bevy_ldtkmap_assets::format::RawDefinitions;
    use serde_json::json;

    fn defs() -> Definitions {
        let raw: RawDefinitions = serde_json::from_value(json!({
            "tilesets": [{ "identifier": "Chars", "uid": 3, "pxWid": 32, "pxHei": 32, "tileGridSize": 16 }],
            "enums": [{ "identifier": "Team", "uid": 9, "values": [{ "id": "Red" }] }],
            "entities": [
                { "identifier": "Hero", "uid": 20, "tilesetId": 3, "tileId": 1 },
                { "identifier": "Marker", "uid": 21 },
                { "identifier": "Ghost", "uid": 22, "tilesetId": 99 }
            ]
        }))
        .unwrap();
        Definitions::from_raw(Some(&raw))
    }

    fn raw_entity(def_uid: i64) -> RawEntityInstance {
        serde_json::from_value(json!({
            "__identifier": "Hero",
            "__grid": [2, 3],
            "__pivot": [0.5, 1.0],
            "__tile": { "tilesetUid": 3, "srcRect": [16, 0, 16, 16] },
            "defUid": def_uid,
            "px": [40, 64],
            "fieldInstances": [
                { "__identifier": "hp", "__type": "Int", "__value": 10, "defUid": 100 },
                { "__identifier": "team", "__type": "LocalEnum.Team", "__value": "Red", "defUid": 101 }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_positions_apply_layer_offset() {
        let entity = Entity::from_raw(&raw_entity(20), &defs(), IVec2::new(8, -4)).unwrap();

        assert_eq!(entity.relative_pos(), IVec2::new(40, 64));
        assert_eq!(entity.pos(), IVec2::new(48, 60));
        assert_eq!(entity.grid, IVec2::new(2, 3));
        assert_eq!(entity.pivot, Vec2::new(0.5, 1.0));
    }

    #[test]
    fn test_tileset_resolved_from_definition() {
        let entity = Entity::from_raw(&raw_entity(20), &defs(), IVec2::ZERO).unwrap();
        assert_eq!(entity.tileset.as_ref().unwrap().identifier, "Chars");
        assert_eq!(
            entity.tile,
            Some(EntityTile {
                tileset_uid: 3,
                src_rect: TileRect { x: 16, y: 0, width: 16, height: 16 },
            })
        );
    }

    #[test]
    fn test_missing_tileset_is_not_an_error() {
        let defs = defs();
        assert!(Entity::from_raw(&raw_entity(21), &defs, IVec2::ZERO).unwrap().tileset.is_none());
        assert!(Entity::from_raw(&raw_entity(22), &defs, IVec2::ZERO).unwrap().tileset.is_none());
        assert!(Entity::from_raw(&raw_entity(404), &defs, IVec2::ZERO).unwrap().tileset.is_none());
    }

    #[test]
    fn test_fields_in_declaration_order() {
        let entity = Entity::from_raw(&raw_entity(20), &defs(), IVec2::ZERO).unwrap();

        let names: Vec<_> = entity.fields.iter().map(|f| f.identifier.as_str()).collect();
        assert_eq!(names, vec!["hp", "team"]);
        assert_eq!(entity.field("hp").unwrap().value.as_int(), Some(10));
        assert_eq!(entity.field("team").unwrap().kind(), FieldKind::Enum);
    }

    #[test]
    fn test_bad_field_aborts_entity() {
        let mut raw = raw_entity(20);
        raw.field_instances[0].field_type = "Array<Int".to_string();

        let err = Entity::from_raw(&raw, &defs(), IVec2::ZERO).unwrap_err();
        assert!(matches!(
            err,
            LdtkError::MalformedFieldType { ref owner, .. } if owner == "Hero"
        ));
    }
}
