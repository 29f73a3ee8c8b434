// file: src/version.rs
// description: Build identification surfaced at startup and over HTTP

use serde::Serialize;

pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Commit id baked in by the build environment, if any.
pub fn git_commit() -> &'static str {
    option_env!("GIT_MIRROR_COMMIT").unwrap_or("unknown")
}

pub fn build_date() -> &'static str {
    option_env!("GIT_MIRROR_BUILD_DATE").unwrap_or("unknown")
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub git_commit: &'static str,
    pub build_date: &'static str,
}

pub fn info() -> VersionInfo {
    VersionInfo {
        name: NAME,
        version: VERSION,
        git_commit: git_commit(),
        build_date: build_date(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_info_is_populated() {
        let info = info();
        assert_eq!(info.name, "git_mirror");
        assert!(!info.version.is_empty());
    }
}
