//! Loads an LDtk project without rendering and logs what it contains.
//!
//! This example shows:
//! 1. Building a `World` from an in-memory project with an external level
//! 2. Loading the external level on demand through a `TextFetcher`
//! 3. Reading layers, entities, enum fields and neighbours
//!
//! Run with `cargo run -p bevy_ldtkmap_core --example inspect_project`.

use std::sync::Arc;

use bevy::log::{error, info};
use bevy::prelude::*;
use bevy_ldtkmap_assets::fetch::MemoryTextFetcher;
use bevy_ldtkmap_core::prelude::*;
use futures::executor::block_on;

const PROJECT: &str = r#"{
    "jsonVersion": "1.5.3",
    "externalLevels": true,
    "defs": {
        "enums": [{ "identifier": "Loot", "uid": 1, "values": [{ "id": "Coin" }, { "id": "Key" }] }]
    },
    "levels": [
        { "identifier": "Entrance", "uid": 10, "externalRelPath": "world/Entrance.ldtkl" },
        { "identifier": "Vault", "uid": 11, "externalRelPath": "world/Vault.ldtkl" }
    ]
}"#;

const ENTRANCE: &str = r#"{
    "identifier": "Entrance", "uid": 10, "pxWid": 256, "pxHei": 256,
    "__neighbours": [{ "levelUid": 11, "dir": "e" }],
    "layerInstances": [{
        "__identifier": "Things", "__type": "Entities",
        "entityInstances": [{
            "__identifier": "Chest", "defUid": 2, "px": [32, 48],
            "fieldInstances": [{ "__identifier": "loot", "__type": "LocalEnum.Loot", "__value": "Key" }]
        }]
    }]
}"#;

const VAULT: &str = r#"{ "identifier": "Vault", "uid": 11, "worldX": 256, "layerInstances": [] }"#;

fn main() {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(bevy::log::LogPlugin::default());
    app.finish();
    app.cleanup();

    if let Err(e) = block_on(inspect()) {
        error!("{}", e);
    }
}

async fn inspect() -> Result<(), LdtkError> {
    let fetcher = MemoryTextFetcher::default()
        .with_file("maps/world.ldtk", PROJECT)
        .with_file("maps/world/Entrance.ldtkl", ENTRANCE)
        .with_file("maps/world/Vault.ldtkl", VAULT);

    let world = LdtkmapWorld::load(Arc::new(fetcher), "maps/world.ldtk").await?;
    info!("Project has levels {:?}", world.level_identifiers());

    world.load_levels().await?;

    for level in world.levels() {
        info!("Level '{}' at {:?}", level.identifier, level.world_pos);

        for entity in level.layers.iter().filter_map(Layer::entities).flatten() {
            info!("  {} at {:?}", entity.identifier, entity.pos());
            for field in entity.fields.iter() {
                info!("    {} = {:?} ({})", field.identifier, field.value.as_str(), field.kind());
            }
        }

        for neighbour in level.neighbours(&world)? {
            if let Some(other) = neighbour.level(&world) {
                info!("  {:?} of '{}'", neighbour.direction, other.identifier);
            }
        }
    }

    Ok(())
}
