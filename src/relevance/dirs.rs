//! Ancestor-directory searches bounded by the project root.

use std::path::{Path, PathBuf};

use crate::files::normalize;

use super::error::RelevanceError;

pub const PACKAGE_JSON: &str = "package.json";
pub const NODE_MODULES: &str = "node_modules";

/// Directories from `start` up to and including `root`, nearest first.
fn ancestors_within(start: &Path, root: &Path) -> Result<Vec<PathBuf>, RelevanceError> {
    let start = normalize(start);
    let root = normalize(root);

    if !start.starts_with(&root) {
        return Err(RelevanceError::InvalidRootPath {
            root: root.display().to_string(),
            path: start.display().to_string(),
        });
    }

    Ok(start
        .ancestors()
        .take_while(|dir| dir.starts_with(&root))
        .map(Path::to_path_buf)
        .collect())
}

/// The nearest directory at or above `file`'s directory holding a
/// `package.json`, without leaving `root`.
pub fn find_package_dir(file: &Path, root: &Path) -> Result<PathBuf, RelevanceError> {
    let start = if file.is_dir() {
        file
    } else {
        file.parent().unwrap_or(file)
    };

    ancestors_within(start, root)?
        .into_iter()
        .find(|dir| dir.join(PACKAGE_JSON).is_file())
        .ok_or_else(|| RelevanceError::NoPackageJsonFound(file.display().to_string()))
}

/// The installed copy of `package` nearest to `start`, without leaving `root`.
pub fn find_installed_package(
    start: &Path,
    root: &Path,
    package: &str,
) -> Result<PathBuf, RelevanceError> {
    ancestors_within(start, root)?
        .into_iter()
        .map(|dir| dir.join(NODE_MODULES).join(package))
        .find(|dir| dir.is_dir())
        .ok_or_else(|| RelevanceError::NoNodeModulesFound(start.display().to_string()))
}
