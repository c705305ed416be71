use bevy::prelude::*;
use serde::Deserialize;

use crate::format::RawProject;

/// Bevy asset wrapper for LDtk projects (.ldtk files)
///
/// Loaded through `bevy_common_assets::json::JsonAssetPlugin`. The record is
/// preserved exactly as written; building the typed graph (resolving tilesets,
/// enums and neighbours) is left to `bevy_ldtkmap_core`.
#[derive(TypePath, Asset, Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct LdtkProjectAsset {
    /// The raw project data (PRESERVE AS-IS)
    pub project: RawProject,
}

impl LdtkProjectAsset {
    /// True when the project stores each level in its own `.ldtkl` file.
    #[inline]
    pub fn has_external_levels(&self) -> bool {
        self.project.external_levels
    }

    /// Relative paths of all external level files, in world order.
    pub fn external_level_paths(&self) -> impl Iterator<Item = &str> {
        self.project
            .levels
            .iter()
            .filter_map(|level| level.external_rel_path.as_deref())
    }
}
