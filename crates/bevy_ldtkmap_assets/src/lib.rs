//! # `bevy_ldtkmap_assets`
//!
//! Layer 1 of `bevy_ldtkmap`: everything needed to get LDtk files off disk and
//! into memory, and nothing more.
//!
//! - [`format`]: raw serde records mirroring the LDtk JSON
//! - [`fetch`]: the [`TextFetcher`](fetch::TextFetcher) capability used to read
//!   project and external level files
//! - [`path`]: resolution of file references relative to the referencing file
//! - [`LdtkmapAssetsPlugin`]: `.ldtk` Bevy asset registration

pub mod assets;
pub mod fetch;
pub mod format;
pub mod path;
pub mod plugin;

pub mod prelude {
    //! Common imports for `bevy_ldtkmap_assets` users.

    pub use crate::assets::project::LdtkProjectAsset;
    pub use crate::fetch::{FetchError, FileTextFetcher, MemoryTextFetcher, TextFetcher};
    pub use crate::format::RawProject;
    pub use crate::plugin::LdtkmapAssetsPlugin;
}

pub use plugin::LdtkmapAssetsPlugin;
