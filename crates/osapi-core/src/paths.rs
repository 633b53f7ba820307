//! Module id to path transforms
//!
//! A logical module id is a dot-separated name such as
//! `flecs.components.transform`. Two pure transforms map it onto the host:
//!
//! - library file: `libflecs_components_transform.so` (Linux),
//!   `.dylib` (macOS), `flecs_components_transform.dll` (Windows)
//! - resource dir: `<root>/flecs/components/transform`
//!
//! Ids with empty segments, path separators or whitespace are rejected.

use std::path::Path;

#[cfg(target_os = "windows")]
pub const DL_PREFIX: &str = "";
#[cfg(not(target_os = "windows"))]
pub const DL_PREFIX: &str = "lib";

#[cfg(target_os = "windows")]
pub const DL_SUFFIX: &str = ".dll";
#[cfg(target_os = "macos")]
pub const DL_SUFFIX: &str = ".dylib";
#[cfg(not(any(target_os = "windows", target_os = "macos")))]
pub const DL_SUFFIX: &str = ".so";

/// Split a module id into its segments, or `None` if malformed
pub fn module_segments(module_id: &str) -> Option<Vec<&str>> {
    if module_id.is_empty() {
        return None;
    }
    let segments: Vec<&str> = module_id.split('.').collect();
    let valid = segments.iter().all(|s| {
        !s.is_empty()
            && !s.chars().any(|c| c == '/' || c == '\\' || c.is_whitespace() || c == '\0')
    });
    valid.then_some(segments)
}

/// Platform shared library filename for a module id
pub fn module_dl_name(module_id: &str) -> Option<String> {
    let segments = module_segments(module_id)?;
    Some(format!("{}{}{}", DL_PREFIX, segments.join("_"), DL_SUFFIX))
}

/// Resource directory for a module id under `root`
pub fn module_etc_path(root: &str, module_id: &str) -> Option<String> {
    let segments = module_segments(module_id)?;
    let mut path = Path::new(root).to_path_buf();
    path.extend(segments);
    Some(path.to_string_lossy().into_owned())
}

/// Library filename placed in `dir` (empty `dir` leaves it to the loader's
/// search path)
pub fn module_dl_path(dir: &str, module_id: &str) -> Option<String> {
    let file = module_dl_name(module_id)?;
    if dir.is_empty() {
        return Some(file);
    }
    Some(Path::new(dir).join(file).to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segments() {
        assert_eq!(
            module_segments("flecs.components.transform"),
            Some(vec!["flecs", "components", "transform"])
        );
        assert_eq!(module_segments("single"), Some(vec!["single"]));
        assert_eq!(module_segments(""), None);
        assert_eq!(module_segments("a..b"), None);
        assert_eq!(module_segments(".a"), None);
        assert_eq!(module_segments("a/b"), None);
        assert_eq!(module_segments("a b"), None);
    }

    #[test]
    fn test_dl_name() {
        let name = module_dl_name("flecs.components.transform").unwrap();
        assert_eq!(
            name,
            format!("{}flecs_components_transform{}", DL_PREFIX, DL_SUFFIX)
        );
        assert!(module_dl_name("bad..id").is_none());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_dl_name_linux() {
        assert_eq!(module_dl_name("game.physics").unwrap(), "libgame_physics.so");
    }

    #[cfg(unix)]
    #[test]
    fn test_etc_path() {
        assert_eq!(
            module_etc_path("etc", "flecs.components.transform").unwrap(),
            "etc/flecs/components/transform"
        );
        assert_eq!(module_etc_path("/opt/app/etc", "ui").unwrap(), "/opt/app/etc/ui");
        assert!(module_etc_path("etc", "").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_dl_path() {
        assert_eq!(module_dl_path("", "a.b").unwrap(), module_dl_name("a.b").unwrap());
        assert_eq!(
            module_dl_path("/usr/lib/app", "a.b").unwrap(),
            format!("/usr/lib/app/{}", module_dl_name("a.b").unwrap())
        );
    }
}
