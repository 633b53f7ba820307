//! Module path roots shared by the default backends
//!
//! `module_to_dl` places library names under `lib_dir` (empty means the
//! loader's own search path). `module_to_etc` places resource directories
//! under `etc_root`. Both roots start at the compile-time defaults and are
//! replaced from `OsConfig` at install time.

use std::sync::RwLock;

use osapi_core::paths;

use crate::config::defaults;

static ETC_ROOT: RwLock<Option<String>> = RwLock::new(None);
static LIB_DIR: RwLock<Option<String>> = RwLock::new(None);

pub fn set_etc_root(root: &str) {
    *ETC_ROOT.write().unwrap_or_else(|e| e.into_inner()) = Some(root.to_owned());
}

pub fn set_lib_dir(dir: &str) {
    *LIB_DIR.write().unwrap_or_else(|e| e.into_inner()) = Some(dir.to_owned());
}

pub fn etc_root() -> String {
    let root = ETC_ROOT.read().unwrap_or_else(|e| e.into_inner());
    root.as_deref().unwrap_or(defaults::ETC_ROOT).to_owned()
}

pub fn lib_dir() -> String {
    let dir = LIB_DIR.read().unwrap_or_else(|e| e.into_inner());
    dir.as_deref().unwrap_or(defaults::LIB_DIR).to_owned()
}

/// `module_to_dl` slot body for the default backends
pub fn module_to_dl(module_id: &str) -> Option<String> {
    paths::module_dl_path(&lib_dir(), module_id)
}

/// `module_to_etc` slot body for the default backends
pub fn module_to_etc(module_id: &str) -> Option<String> {
    paths::module_etc_path(&etc_root(), module_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use osapi_core::mock;

    #[cfg(unix)]
    #[test]
    fn test_roots_apply() {
        let _guard = mock::exclusive();
        let (old_etc, old_lib) = (etc_root(), lib_dir());

        set_etc_root("/srv/assets");
        set_lib_dir("/srv/lib");
        assert_eq!(module_to_etc("game.ui").unwrap(), "/srv/assets/game/ui");
        assert_eq!(
            module_to_dl("game.ui").unwrap(),
            format!("/srv/lib/{}", paths::module_dl_name("game.ui").unwrap())
        );

        set_lib_dir("");
        assert_eq!(module_to_dl("game.ui"), paths::module_dl_name("game.ui"));

        set_etc_root(&old_etc);
        set_lib_dir(&old_lib);
    }

    #[test]
    fn test_invalid_module_id() {
        assert!(module_to_dl("a..b").is_none());
        assert!(module_to_etc("").is_none());
    }
}
