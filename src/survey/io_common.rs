use snafu::prelude::*;
use std::path::{Path, PathBuf};

use crate::survey::{BSurveyResult, MissingExecutableDirSnafu, MissingParentDirSnafu};

/// The directory holding the running executable.
pub fn executable_dir() -> BSurveyResult<PathBuf> {
    let exe = std::env::current_exe().context(MissingExecutableDirSnafu {})?;
    let dir = exe.parent().context(MissingParentDirSnafu {
        path: exe.display().to_string(),
    })?;
    Ok(dir.to_path_buf())
}

/// The directory holding the given file. A bare file name lives in the current directory.
pub fn parent_dir(path: &str) -> BSurveyResult<PathBuf> {
    let parent = Path::new(path)
        .parent()
        .context(MissingParentDirSnafu { path })?;
    Ok(parent.to_path_buf())
}

/// Absolute paths are kept, relative paths are taken from `base_dir`.
pub fn resolve_path(base_dir: &Path, path: &str) -> PathBuf {
    let p = Path::new(path);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}

/// Same as `resolve_path`, except that `stdout` is kept as is.
pub fn resolve_summary_target(base_dir: &Path, target: &str) -> String {
    if target == "stdout" {
        target.to_string()
    } else {
        resolve_path(base_dir, target).display().to_string()
    }
}
