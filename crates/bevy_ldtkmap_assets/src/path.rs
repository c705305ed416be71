//! Path helpers shared by everything that follows references between LDtk files.

use std::path::Path;

use normalize_path::NormalizePath;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum PathError {
    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

/// Resolve a path written inside an LDtk file against the file that contains it.
///
/// LDtk stores references such as `externalRelPath` relative to the project
/// file, e.g. `../shared/Level_0.ldtkl`. This function:
/// 1. Takes the parent directory of `base_file`
/// 2. Joins the relative path onto it
/// 3. Normalizes `.` and `..` components
/// 4. Normalizes path separators (Windows `\` → Unix `/`)
///
/// # Arguments
/// * `base_file` - Path of the file holding the reference (e.g. `maps/world.ldtk`)
/// * `relative_path` - The reference as written in that file
///
/// # Returns
/// * `Ok(String)` - The resolved, forward-slash path
/// * `Err(PathError)` - If the result is not valid UTF-8
pub fn resolve_relative_path(base_file: &str, relative_path: &str) -> Result<String, PathError> {
    let relative_path = relative_path.replace('\\', "/");
    let parent = Path::new(base_file).parent().unwrap_or_else(|| Path::new(""));

    // Path::join does not collapse `..`, normalize does
    let normalized = parent.join(relative_path).normalize();

    let resolved = normalized
        .to_str()
        .ok_or_else(|| PathError::InvalidPath(format!("Invalid UTF-8 in path: {:?}", normalized)))?
        .replace('\\', "/");

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_sibling_directory() {
        let resolved = resolve_relative_path("maps/world.ldtk", "world/Level_0.ldtkl").unwrap();
        assert_eq!(resolved, "maps/world/Level_0.ldtkl");
    }

    #[test]
    fn test_resolve_parent_directory() {
        let resolved = resolve_relative_path("maps/world.ldtk", "../shared/Level_0.ldtkl").unwrap();
        assert_eq!(resolved, "shared/Level_0.ldtkl");
    }

    #[test]
    fn test_resolve_from_root_file() {
        let resolved = resolve_relative_path("world.ldtk", "world\\Level_1.ldtkl").unwrap();
        assert_eq!(resolved, "world/Level_1.ldtkl");
    }
}
