//! # `bevy_ldtkmap_core`
//!
//! Typed access to LDtk projects. Turns the raw records of
//! `bevy_ldtkmap_assets` into a [`World`](world::World) of levels, layers,
//! entities and fields with every cross-reference resolved.
//!
//! **This crate does NOT spawn entities or render anything** - it only builds
//! the data graph. Games read it from systems through the [`LdtkWorld`]
//! component, or use [`World`](world::World) directly without an `App`.
//!
//! ## Architecture
//!
//! Layer 2 (this crate) sits on top of:
//! - **Layer 1** (`bevy_ldtkmap_assets`): raw format, file fetching, asset registration
//!
//! Inside the graph:
//! - [`World`](world::World) owns the definition tables and the levels
//! - [`Level`](level::Level) owns its layers; neighbours are resolved lazily
//! - [`Layer`](layer::Layer) holds exactly one payload: tiles, entities or an IntGrid
//! - [`Entity`](entity::Entity) and [`Level`](level::Level) carry normalized [`Field`](field::Field)s
//! - tilesets and enums are shared leaves behind `Arc`
//!
//! ## Example Usage
//!
//! Without Bevy's app:
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use bevy_ldtkmap_assets::fetch::FileTextFetcher;
//! use bevy_ldtkmap_core::world::World;
//!
//! # async fn run() -> Result<(), bevy_ldtkmap_core::error::LdtkError> {
//! let fetcher = Arc::new(FileTextFetcher::new("assets"));
//! let world = World::load(fetcher, "maps/world.ldtk").await?;
//! world.load_levels().await?;
//!
//! for level in world.levels() {
//!     println!("{} at {:?}", level.identifier, level.world_pos);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! As a plugin:
//!
//! ```rust,no_run
//! use bevy::prelude::*;
//! use bevy_ldtkmap_assets::LdtkmapAssetsPlugin;
//! use bevy_ldtkmap_core::prelude::*;
//!
//! fn main() {
//!     App::new()
//!         .add_plugins(DefaultPlugins)
//!         .add_plugins(LdtkmapAssetsPlugin)
//!         .add_plugins(LdtkmapCorePlugin::default())
//!         .add_systems(Startup, spawn_project)
//!         .run();
//! }
//!
//! fn spawn_project(mut commands: Commands, asset_server: Res<AssetServer>) {
//!     commands.spawn(LdtkProject {
//!         handle: asset_server.load("maps/world.ldtk"),
//!     });
//! }
//! ```

pub mod components;
pub mod definitions;
pub mod entity;
pub mod error;
pub mod field;
pub mod layer;
pub mod level;
pub mod plugin;
pub mod world;

pub mod prelude {
    //! Common imports for `bevy_ldtkmap_core` users.

    pub use crate::components::{LdtkProject, LdtkWorld, LdtkWorldError};
    pub use crate::definitions::{Enum, EnumValue, TileRect, Tileset};
    pub use crate::entity::{Entity as LdtkEntity, EntityTile};
    pub use crate::error::{LdtkError, ReferenceKind};
    pub use crate::field::{Field, FieldKind, FieldMap, FieldValue};
    pub use crate::layer::{IntGrid, IntGridValue, Layer, LayerData, LayerKind, Tile};
    pub use crate::level::{Background, BackgroundImage, Direction, Level, Neighbour};
    pub use crate::plugin::{LdtkmapCoreConfig, LdtkmapCorePlugin};
    pub use crate::world::{World as LdtkmapWorld, WorldLayout, WorldSettings};
}

// Re-export plugin types at crate root for convenience
pub use components::{LdtkProject, LdtkWorld};
pub use plugin::{LdtkmapCoreConfig, LdtkmapCorePlugin};
