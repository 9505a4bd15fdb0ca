//! Output destination resolution
//!
//! Pure path arithmetic: given where the input came from and what the caller asked
//! for, decide the exact file the optimized artifact is written to. Nothing here
//! touches the filesystem or reads process state; the working directory is passed in.

use std::path::{Component, Path, PathBuf, MAIN_SEPARATOR};

use crate::models::ORIGINAL_FORMAT;

/// Marker inserted between the stem and the extension of derived names.
pub const DERIVED_NAME_MARKER: &str = ".tinified";

/// Extension used when the suggested name has none.
pub const FALLBACK_EXTENSION: &str = ".png";

/// Everything the resolver needs to pick an output path.
#[derive(Debug, Clone, Copy)]
pub struct DestinationRequest<'a> {
    /// Input locator as given by the caller (local path or URL)
    pub input: &'a str,
    pub is_remote: bool,
    /// Name the input resolved to, e.g. `hero.png`
    pub suggested_name: &'a str,
    /// Caller-supplied destination; a trailing separator marks a directory
    pub explicit_destination: Option<&'a str>,
    /// Target format; `None` or `"original"` keeps the suggested name's extension
    pub format_override: Option<&'a str>,
    pub working_dir: &'a Path,
}

/// Resolve the output file path. Total and deterministic.
pub fn resolve_destination(req: &DestinationRequest<'_>) -> PathBuf {
    if let Some(dest) = req.explicit_destination.filter(|d| !d.is_empty()) {
        if !is_directory_path(dest) {
            return absolutize(Path::new(dest), req.working_dir);
        }
        let name = derived_name(req.suggested_name, req.format_override);
        return absolutize(Path::new(dest), req.working_dir).join(name);
    }

    let name = derived_name(req.suggested_name, req.format_override);

    if req.is_remote {
        return absolutize(Path::new(&name), req.working_dir);
    }

    let input = absolutize(Path::new(req.input), req.working_dir);
    let dir = input
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(MAIN_SEPARATOR.to_string()));
    dir.join(name)
}

/// `hero.png` -> `hero.tinified.png`; `hero.png` with `webp` -> `hero.tinified.webp`.
pub fn derived_name(suggested_name: &str, format_override: Option<&str>) -> String {
    let path = Path::new(suggested_name);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let original_ext = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()));

    let ext = match format_override {
        None | Some(ORIGINAL_FORMAT) | Some("") => {
            original_ext.unwrap_or_else(|| FALLBACK_EXTENSION.to_string())
        }
        Some(format) => format!(".{}", format),
    };

    format!("{}{}{}", stem, DERIVED_NAME_MARKER, ext)
}

/// A destination ending in a separator means "save into this folder".
pub fn is_directory_path(dest: &str) -> bool {
    dest.ends_with('/') || dest.ends_with(MAIN_SEPARATOR)
}

/// Join a relative path onto `base` and collapse `.`/`..` lexically.
fn absolutize(path: &Path, base: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    };

    let mut out = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() && !out.has_root() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}
