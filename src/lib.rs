//! # bevy_ldtkmap
//!
//! LDtk project loader and typed access layer for Bevy.
//!
//! This is a meta-crate combining the `bevy_ldtkmap_*` sub-crates behind a
//! single plugin.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bevy::prelude::*;
//! use bevy_ldtkmap::prelude::*;
//!
//! fn main() {
//!     App::new()
//!         .add_plugins(DefaultPlugins)
//!         .add_plugins(BevyLdtkmapPlugin::default())
//!         .add_systems(Startup, spawn_project)
//!         .add_systems(Update, list_levels)
//!         .run();
//! }
//!
//! fn spawn_project(mut commands: Commands, asset_server: Res<AssetServer>) {
//!     commands.spawn(LdtkProject {
//!         handle: asset_server.load("world.ldtk"),
//!     });
//! }
//!
//! fn list_levels(worlds: Query<&LdtkWorld, Added<LdtkWorld>>) {
//!     for world in &worlds {
//!         for identifier in world.level_identifiers() {
//!             info!("Level {}", identifier);
//!         }
//!     }
//! }
//! ```
//!
//! ## Architecture
//!
//! - **Layer 1** ([`assets`]): raw LDtk records, text fetching, `.ldtk`/`.ldtkl` assets
//! - **Layer 2** ([`core`]): the typed world with resolved references and
//!   normalized fields
//!
//! Rendering and physics are left to the game; both read the typed world.
//!
//! ## Using Individual Crates
//!
//! ```rust,no_run
//! use bevy::prelude::*;
//! use bevy_ldtkmap_assets::LdtkmapAssetsPlugin;
//! use bevy_ldtkmap_core::prelude::*;
//!
//! App::new()
//!     .add_plugins(DefaultPlugins)
//!     .add_plugins(LdtkmapAssetsPlugin)
//!     .add_plugins(LdtkmapCorePlugin::default())
//!     .run();
//! ```

pub mod plugin;

// Re-export sub-crates for advanced usage
pub use bevy_ldtkmap_assets as assets;
pub use bevy_ldtkmap_core as core;

/// Unified prelude for bevy_ldtkmap
///
/// # Example
///
/// ```rust,no_run
/// use bevy::prelude::*;
/// use bevy_ldtkmap::prelude::*;
///
/// fn my_system(worlds: Query<&LdtkWorld>) {
///     for world in &worlds {
///         let _tilesets = world.tilesets().count();
///     }
/// }
/// ```
pub mod prelude {
    pub use crate::assets::prelude::*;
    pub use crate::core::prelude::*;

    pub use crate::plugin::BevyLdtkmapPlugin;
}
