//! Unified plugin for bevy_ldtkmap.

use bevy::prelude::*;

use bevy_ldtkmap_assets::LdtkmapAssetsPlugin;
use bevy_ldtkmap_core::{LdtkmapCoreConfig, LdtkmapCorePlugin};

/// Unified plugin that adds all bevy_ldtkmap functionality.
///
/// This plugin includes:
/// - Asset loading ([`LdtkmapAssetsPlugin`])
/// - Typed world building ([`LdtkmapCorePlugin`])
///
/// # Example
///
/// ```rust,no_run
/// use bevy::prelude::*;
/// use bevy_ldtkmap::prelude::*;
///
/// App::new()
///     .add_plugins(DefaultPlugins)
///     .add_plugins(BevyLdtkmapPlugin::default())
///     .run();
/// ```
///
/// # With Custom Configuration
///
/// ```rust,no_run
/// use bevy::prelude::*;
/// use bevy_ldtkmap::prelude::*;
///
/// App::new()
///     .add_plugins(DefaultPlugins)
///     .add_plugins(
///         BevyLdtkmapPlugin::default()
///             .with_core(LdtkmapCoreConfig {
///                 asset_root: "game/assets".into(),
///             })
///     )
///     .run();
/// ```
#[derive(Default)]
pub struct BevyLdtkmapPlugin {
    /// Core configuration
    pub core: LdtkmapCoreConfig,
}

impl BevyLdtkmapPlugin {
    /// Create with custom core configuration
    pub fn with_core(mut self, config: LdtkmapCoreConfig) -> Self {
        self.core = config;
        self
    }
}

impl Plugin for BevyLdtkmapPlugin {
    fn build(&self, app: &mut App) {
        // Layer 1: Assets
        app.add_plugins(LdtkmapAssetsPlugin);

        // Layer 2: Core
        app.add_plugins(LdtkmapCorePlugin::new(self.core.clone()));

        info!("BevyLdtkmapPlugin initialized");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy_ldtkmap_assets::prelude::LdtkProjectAsset;

    #[test]
    fn test_registers_assets_and_config() {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, AssetPlugin::default()));
        app.add_plugins(BevyLdtkmapPlugin::default().with_core(LdtkmapCoreConfig {
            asset_root: "levels".into(),
        }));

        assert!(app.world().contains_resource::<Assets<LdtkProjectAsset>>());
        assert_eq!(
            app.world().resource::<LdtkmapCoreConfig>().asset_root,
            std::path::PathBuf::from("levels")
        );
    }
}
