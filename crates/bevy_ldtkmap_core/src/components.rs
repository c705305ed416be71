//! Components linking ECS entities to LDtk projects.

use std::ops::Deref;
use std::sync::Arc;

use bevy::prelude::*;
use bevy_ldtkmap_assets::prelude::LdtkProjectAsset;

use crate::error::LdtkError;
use crate::world::World as LdtkmapWorld;

/// Root component for an LDtk project.
///
/// Spawn an entity with this component; once the asset is loaded,
/// [`LdtkmapCorePlugin`](crate::LdtkmapCorePlugin) adds an [`LdtkWorld`] to it.
///
/// # Example
///
/// ```rust,no_run
/// # use bevy::prelude::*;
/// # use bevy_ldtkmap_core::prelude::LdtkProject;
/// fn spawn_project(mut commands: Commands, asset_server: Res<AssetServer>) {
///     commands.spawn(LdtkProject {
///         handle: asset_server.load("maps/world.ldtk"),
///     });
/// }
/// ```
#[derive(Component, Reflect)]
#[reflect(Component)]
pub struct LdtkProject {
    /// Handle to the loaded `LdtkProjectAsset`.
    pub handle: Handle<LdtkProjectAsset>,
}

/// The typed world built from an [`LdtkProject`].
///
/// Cloning is cheap; the world is shared. External levels are loaded through
/// it on demand:
///
/// ```rust,no_run
/// # use bevy::prelude::*;
/// # use bevy_ldtkmap_core::prelude::LdtkWorld;
/// fn report(worlds: Query<&LdtkWorld, Added<LdtkWorld>>) {
///     for world in &worlds {
///         for level in world.levels() {
///             info!("{} has {} layer(s)", level.identifier, level.layers.len());
///         }
///     }
/// }
/// ```
#[derive(Component, Clone, Debug)]
pub struct LdtkWorld(pub Arc<LdtkmapWorld>);

impl Deref for LdtkWorld {
    type Target = LdtkmapWorld;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Added instead of [`LdtkWorld`] when the project could not be built.
///
/// Remove it to retry, e.g. after the asset was hot-reloaded.
#[derive(Component, Clone, Debug)]
pub struct LdtkWorldError(pub LdtkError);
