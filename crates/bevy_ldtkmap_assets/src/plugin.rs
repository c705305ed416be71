use bevy::prelude::*;
use bevy_common_assets::json::JsonAssetPlugin;

use crate::assets::project::LdtkProjectAsset;

/// Plugin that registers the LDtk project asset and its loader
///
/// This plugin enables loading LDtk project files (.ldtk) as Bevy assets.
/// External `.ldtkl` levels are not assets; the typed world fetches them
/// on demand through its `TextFetcher`.
///
/// # Example
/// ```no_run
/// use bevy::prelude::*;
/// use bevy_ldtkmap_assets::LdtkmapAssetsPlugin;
///
/// App::new()
///     .add_plugins(DefaultPlugins)
///     .add_plugins(LdtkmapAssetsPlugin)
///     .run();
/// ```
///
/// # What this plugin does
///
/// - Registers the `LdtkProjectAsset` asset type
/// - Registers a JSON loader for `.ldtk` files
///
/// # What this plugin does NOT do
///
/// - Reference resolution and field normalization (that's Layer 2 - `bevy_ldtkmap_core`)
/// - Rendering or auto-tiling
///
/// This is a **Layer 1** plugin: pure asset loading with no ECS concerns.
pub struct LdtkmapAssetsPlugin;

impl Plugin for LdtkmapAssetsPlugin {
    fn build(&self, app: &mut App) {
        // JsonAssetPlugin registers the asset type and a serde_json loader
        app.add_plugins(JsonAssetPlugin::<LdtkProjectAsset>::new(&["ldtk"]));
    }
}
