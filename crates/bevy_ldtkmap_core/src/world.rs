//! The root of the typed graph: definitions, project settings and levels.
//!
//! A [`World`] is built from a parsed project. Embedded projects have every
//! level built up front. Projects saved with external levels start with only
//! the level stubs, and levels are fetched on demand through the world's
//! [`TextFetcher`].

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use bevy::log::{debug, warn};
use bevy::math::{UVec2, Vec2};
use bevy_ldtkmap_assets::fetch::TextFetcher;
use bevy_ldtkmap_assets::format::{RawLevel, RawProject};
use bevy_ldtkmap_assets::path::resolve_relative_path;
use futures::future::{self, BoxFuture, FutureExt, Shared, join_all};

use crate::definitions::{Definitions, Enum, Tileset, saturating_u32};
use crate::error::LdtkError;
use crate::level::Level;

type LevelLoad = Shared<BoxFuture<'static, Result<Arc<Level>, LdtkError>>>;

/// How levels are arranged in the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorldLayout {
    /// Levels placed freely
    Free,
    /// Levels snapped to the world grid
    GridVania,
    LinearHorizontal,
    LinearVertical,
}

impl WorldLayout {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Free" => Some(WorldLayout::Free),
            "GridVania" => Some(WorldLayout::GridVania),
            "LinearHorizontal" => Some(WorldLayout::LinearHorizontal),
            "LinearVertical" => Some(WorldLayout::LinearVertical),
            _ => None,
        }
    }
}

/// Project-wide settings copied from the root file.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldSettings {
    /// Default level background color
    pub bg_color: String,
    pub layout: Option<WorldLayout>,
    /// Levels are stored in their own `.ldtkl` files
    pub external_levels: bool,
    pub json_version: String,
    pub default_pivot: Vec2,
    pub default_grid_size: u32,
    /// Cell size of the GridVania world grid
    pub world_grid_size: Option<UVec2>,
}

impl WorldSettings {
    fn from_raw(raw: &RawProject) -> Self {
        let world_grid_size = match (raw.world_grid_width, raw.world_grid_height) {
            (Some(width), Some(height)) => {
                Some(UVec2::new(saturating_u32(width), saturating_u32(height)))
            }
            _ => None,
        };

        Self {
            bg_color: raw.bg_color.clone(),
            layout: raw.world_layout.as_deref().and_then(WorldLayout::from_name),
            external_levels: raw.external_levels,
            json_version: raw.json_version.clone(),
            default_pivot: Vec2::new(raw.default_pivot_x, raw.default_pivot_y),
            default_grid_size: saturating_u32(raw.default_grid_size),
            world_grid_size,
        }
    }
}

/// Where stub levels are fetched from: a fetcher and the path of the root
/// file, which external paths are relative to.
#[derive(Clone)]
struct LevelSource {
    fetcher: Arc<dyn TextFetcher>,
    root_path: String,
}

/// A loaded project.
///
/// All methods take `&self`; levels can be loaded and unloaded while the
/// world is shared behind an `Arc`.
pub struct World {
    pub definitions: Arc<Definitions>,
    pub settings: WorldSettings,
    /// Every level record from the root file, in source order
    stubs: Vec<RawLevel>,
    /// Identifier to stub index. Duplicates resolve to the last record.
    stub_index: HashMap<String, usize>,
    /// Loaded levels, one slot per stub
    levels: RwLock<Vec<Option<Arc<Level>>>>,
    in_flight: Mutex<HashMap<String, LevelLoad>>,
    source: Option<LevelSource>,
}

impl World {
    /// Build a world from a parsed project.
    ///
    /// Embedded levels are all built here; any construction error aborts.
    /// With external levels only the stubs are kept.
    pub fn from_raw(raw: RawProject) -> Result<Self, LdtkError> {
        let definitions = Arc::new(Definitions::from_raw(raw.defs.as_ref()));
        let settings = WorldSettings::from_raw(&raw);
        let stubs = raw.levels;

        let mut stub_index = HashMap::with_capacity(stubs.len());
        let mut slots: Vec<Option<Arc<Level>>> = vec![None; stubs.len()];

        for (index, stub) in stubs.iter().enumerate() {
            let previous = stub_index.insert(stub.identifier.clone(), index);

            if settings.external_levels {
                continue;
            }
            if let Some(previous) = previous {
                slots[previous] = None;
            }
            slots[index] = Some(Arc::new(Level::from_raw(stub, &definitions)?));
        }

        Ok(Self {
            definitions,
            settings,
            stubs,
            stub_index,
            levels: RwLock::new(slots),
            in_flight: Mutex::new(HashMap::new()),
            source: None,
        })
    }

    /// Attach the fetcher used by [`load_level`](Self::load_level).
    ///
    /// `root_path` is the project file's path as the fetcher knows it.
    pub fn with_level_source(
        mut self,
        fetcher: Arc<dyn TextFetcher>,
        root_path: impl Into<String>,
    ) -> Self {
        self.source = Some(LevelSource {
            fetcher,
            root_path: root_path.into(),
        });
        self
    }

    /// Fetch, parse and build a project, keeping `fetcher` as the level source.
    pub async fn load(fetcher: Arc<dyn TextFetcher>, path: &str) -> Result<Self, LdtkError> {
        let raw = Self::load_raw(fetcher.as_ref(), path).await?;
        Ok(Self::from_raw(raw)?.with_level_source(fetcher, path))
    }

    /// Fetch and parse a project file without building anything.
    pub async fn load_raw(fetcher: &dyn TextFetcher, path: &str) -> Result<RawProject, LdtkError> {
        fetch_json(fetcher, path).await
    }

    /// Level by identifier, if loaded.
    pub fn level(&self, identifier: &str) -> Option<Arc<Level>> {
        let index = *self.stub_index.get(identifier)?;
        self.read_levels()[index].clone()
    }

    /// Loaded levels in source order.
    pub fn levels(&self) -> Vec<Arc<Level>> {
        self.read_levels().iter().flatten().cloned().collect()
    }

    pub fn is_level_loaded(&self, identifier: &str) -> bool {
        self.level(identifier).is_some()
    }

    /// Identifiers of every level in the project, loaded or not, in source order.
    pub fn level_identifiers(&self) -> Vec<&str> {
        self.stubs
            .iter()
            .enumerate()
            .filter(|(index, stub)| self.stub_index.get(&stub.identifier) == Some(index))
            .map(|(_, stub)| stub.identifier.as_str())
            .collect()
    }

    pub fn tilesets(&self) -> impl Iterator<Item = &Arc<Tileset>> {
        self.definitions.tilesets.iter()
    }

    pub fn enums(&self) -> impl Iterator<Item = &Arc<Enum>> {
        self.definitions.enums.iter()
    }

    /// Enum by identifier.
    pub fn enum_def(&self, identifier: &str) -> Option<&Arc<Enum>> {
        self.definitions.enums.get(identifier)
    }

    /// First loaded level matching `predicate`, in source order.
    pub fn find_level(&self, predicate: impl Fn(&Level) -> bool) -> Option<Arc<Level>> {
        self.read_levels()
            .iter()
            .flatten()
            .find(|level| predicate(level))
            .cloned()
    }

    pub fn find_tileset(&self, predicate: impl Fn(&Tileset) -> bool) -> Option<Arc<Tileset>> {
        self.tilesets().find(|tileset| predicate(tileset)).cloned()
    }

    pub fn find_enum(&self, predicate: impl Fn(&Enum) -> bool) -> Option<Arc<Enum>> {
        self.enums().find(|enum_def| predicate(enum_def)).cloned()
    }

    pub fn find_level_by_uid(&self, uid: i64) -> Option<Arc<Level>> {
        self.find_level(|level| level.uid == uid)
    }

    pub fn find_tileset_by_uid(&self, uid: i64) -> Option<Arc<Tileset>> {
        self.find_tileset(|tileset| tileset.uid == uid)
    }

    pub fn find_enum_by_uid(&self, uid: i64) -> Option<Arc<Enum>> {
        self.find_enum(|enum_def| enum_def.uid == uid)
    }

    /// Load a level if it is not loaded yet and return it.
    ///
    /// External stubs are fetched through the level source; concurrent calls
    /// for the same level share one fetch. Stubs carrying their own layer data
    /// are rebuilt from the record.
    ///
    /// # Errors
    /// - [`LdtkError::LevelNotFound`] if no level has this identifier
    /// - [`LdtkError::NoLevelSource`] if the level is external and no fetcher is attached
    /// - fetch, parse and construction errors of the level file
    pub async fn load_level(&self, identifier: &str) -> Result<Arc<Level>, LdtkError> {
        if let Some(level) = self.level(identifier) {
            return Ok(level);
        }

        let index = *self
            .stub_index
            .get(identifier)
            .ok_or_else(|| LdtkError::LevelNotFound(identifier.to_string()))?;
        let stub = &self.stubs[index];

        let external_path = stub
            .external_rel_path
            .as_deref()
            .filter(|_| self.settings.external_levels);
        let Some(rel_path) = external_path else {
            let level = Arc::new(Level::from_raw(stub, &self.definitions)?);
            return Ok(self.insert_level(index, level));
        };

        let load = self.start_load(identifier, rel_path)?;
        let result = load.clone().await;

        if let Ok(level) = &result {
            self.insert_level(index, level.clone());
        }
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if in_flight
            .get(identifier)
            .is_some_and(|current| Shared::ptr_eq(current, &load))
        {
            in_flight.remove(identifier);
        }
        drop(in_flight);

        result.map(|level| self.level(identifier).unwrap_or(level))
    }

    /// Load every level that is not loaded yet, concurrently.
    ///
    /// Levels that load are kept even when others fail.
    ///
    /// # Errors
    /// [`LdtkError::LevelsFailed`] listing each failed level and its error.
    pub async fn load_levels(&self) -> Result<(), LdtkError> {
        let pending: Vec<&str> = self
            .level_identifiers()
            .into_iter()
            .filter(|identifier| !self.is_level_loaded(identifier))
            .collect();

        let results = join_all(pending.iter().map(|identifier| self.load_level(identifier))).await;

        let failures: Vec<(String, LdtkError)> = pending
            .iter()
            .zip(results)
            .filter_map(|(identifier, result)| {
                result.err().map(|error| {
                    warn!("Failed to load level '{}': {}", identifier, error);
                    (identifier.to_string(), error)
                })
            })
            .collect();

        if failures.is_empty() {
            Ok(())
        } else {
            Err(LdtkError::LevelsFailed(failures))
        }
    }

    /// Drop a loaded level. The stub stays, so it can be loaded again.
    pub fn unload_level(&self, identifier: &str) -> Option<Arc<Level>> {
        let index = *self.stub_index.get(identifier)?;
        let level = self.write_levels()[index].take();
        if level.is_some() {
            debug!("Unloaded level '{}'", identifier);
        }
        level
    }

    /// Join an in-flight load of `identifier`, or start one.
    fn start_load(&self, identifier: &str, rel_path: &str) -> Result<LevelLoad, LdtkError> {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(load) = in_flight.get(identifier) {
            return Ok(load.clone());
        }
        // A load may have finished between the caller's check and this lock
        if let Some(level) = self.level(identifier) {
            return Ok(future::ready(Ok(level)).boxed().shared());
        }

        let source = self
            .source
            .clone()
            .ok_or_else(|| LdtkError::NoLevelSource(identifier.to_string()))?;
        let path = resolve_relative_path(&source.root_path, rel_path)?;
        let definitions = Arc::clone(&self.definitions);

        let load = async move {
            let raw: RawLevel = fetch_json(source.fetcher.as_ref(), &path).await?;
            Ok(Arc::new(Level::from_raw(&raw, &definitions)?))
        }
        .boxed()
        .shared();

        in_flight.insert(identifier.to_string(), load.clone());
        Ok(load)
    }

    /// Put a level in its slot. If the slot was filled meanwhile, the existing
    /// level wins and is returned.
    fn insert_level(&self, index: usize, level: Arc<Level>) -> Arc<Level> {
        let mut levels = self.write_levels();
        levels[index].get_or_insert(level).clone()
    }

    fn read_levels(&self) -> std::sync::RwLockReadGuard<'_, Vec<Option<Arc<Level>>>> {
        self.levels.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_levels(&self) -> std::sync::RwLockWriteGuard<'_, Vec<Option<Arc<Level>>>> {
        self.levels.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("World")
            .field("settings", &self.settings)
            .field("tilesets", &self.definitions.tilesets.len())
            .field("enums", &self.definitions.enums.len())
            .field("levels", &self.level_identifiers())
            .field("has_level_source", &self.source.is_some())
            .finish_non_exhaustive()
    }
}

async fn fetch_json<T: serde::de::DeserializeOwned>(
    fetcher: &dyn TextFetcher,
    path: &str,
) -> Result<T, LdtkError> {
    debug!("Fetching '{}'", path);
    let text = fetcher
        .fetch_text(path)
        .await
        .map_err(|source| LdtkError::Fetch {
            path: path.to_string(),
            source,
        })?;
    serde_json::from_str(&text).map_err(|source| LdtkError::Parse {
        path: path.to_string(),
        source: Arc::new(source),
    })
}
