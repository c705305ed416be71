//! Plugin for `bevy_ldtkmap_core`.

use std::path::PathBuf;
use std::sync::Arc;

use bevy::prelude::*;
use bevy_ldtkmap_assets::fetch::FileTextFetcher;
use bevy_ldtkmap_assets::prelude::LdtkProjectAsset;

use crate::components::{LdtkProject, LdtkWorld, LdtkWorldError};
use crate::world::World as LdtkmapWorld;

/// Configuration for `LdtkmapCorePlugin`.
///
/// # Example
///
/// ```rust,no_run
/// use bevy::prelude::*;
/// use bevy_ldtkmap_core::{LdtkmapCoreConfig, LdtkmapCorePlugin};
///
/// App::new()
///     .add_plugins(LdtkmapCorePlugin::new(LdtkmapCoreConfig {
///         asset_root: "game/assets".into(),
///     }));
/// ```
#[derive(Resource, Debug, Clone)]
pub struct LdtkmapCoreConfig {
    /// Directory external level files are read from.
    ///
    /// Should match the `AssetPlugin` file path, so that paths relative to a
    /// loaded `.ldtk` asset resolve to the same files.
    pub asset_root: PathBuf,
}

impl Default for LdtkmapCoreConfig {
    fn default() -> Self {
        Self {
            asset_root: PathBuf::from("assets"),
        }
    }
}

/// Plugin building an [`LdtkWorld`] for every [`LdtkProject`] whose asset has loaded.
///
/// Add this plugin after `LdtkmapAssetsPlugin`.
///
/// # Example
///
/// ```rust,no_run
/// use bevy::prelude::*;
/// use bevy_ldtkmap_assets::LdtkmapAssetsPlugin;
/// use bevy_ldtkmap_core::LdtkmapCorePlugin;
///
/// fn app() {
///     App::new()
///         .add_plugins(DefaultPlugins)
///         .add_plugins(LdtkmapAssetsPlugin)
///         .add_plugins(LdtkmapCorePlugin::default())
///         .run();
/// }
/// ```
#[derive(Default)]
pub struct LdtkmapCorePlugin {
    config: LdtkmapCoreConfig,
}

impl LdtkmapCorePlugin {
    /// Create a new plugin with custom configuration.
    pub fn new(config: LdtkmapCoreConfig) -> Self {
        Self { config }
    }
}

impl Plugin for LdtkmapCorePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(self.config.clone());

        // Runs before user systems so a world is available the frame its asset is
        app.add_systems(PreUpdate, build_loaded_worlds);
    }
}

/// Builds the typed world for project entities whose asset is available.
///
/// Failures are logged and recorded as [`LdtkWorldError`] so they are not
/// retried every frame.
pub fn build_loaded_worlds(
    asset_server: Res<AssetServer>,
    project_assets: Res<Assets<LdtkProjectAsset>>,
    config: Res<LdtkmapCoreConfig>,
    mut commands: Commands,
    query: Query<(Entity, &LdtkProject), (Without<LdtkWorld>, Without<LdtkWorldError>)>,
) {
    for (entity, project) in query.iter() {
        let Some(asset) = project_assets.get(&project.handle) else {
            continue;
        };

        // External level paths are relative to the project file
        let root_path = asset_server
            .get_path(&project.handle)
            .and_then(|path| path.path().to_str().map(|p| p.replace('\\', "/")))
            .unwrap_or_default();

        match LdtkmapWorld::from_raw(asset.project.clone()) {
            Ok(world) => {
                let fetcher = Arc::new(FileTextFetcher::new(&config.asset_root));
                let world = world.with_level_source(fetcher, root_path.as_str());
                info!(
                    "Built LDtk world '{}' with {} level(s)",
                    root_path,
                    world.level_identifiers().len()
                );
                commands.entity(entity).insert(LdtkWorld(Arc::new(world)));
            }
            Err(e) => {
                error!("Failed to build LDtk world '{}': {}", root_path, e);
                commands.entity(entity).insert(LdtkWorldError(e));
            }
        }
    }
}
