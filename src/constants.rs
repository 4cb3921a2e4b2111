//! Global constants used throughout the srcpkg codebase.
//!
//! File names, default locations and the prompt vocabulary shared between the
//! resolver and the terminal front end live here so they are defined once.

/// Name of the build manifest inside every package repository.
pub const MANIFEST_FILE: &str = "PKGBUILD";

/// Array holding build-time dependencies.
pub const BUILD_DEPENDS_KEY: &str = "makedepends";

/// Array holding run-time dependencies.
pub const RUN_DEPENDS_KEY: &str = "depends";

/// Repository host used when no base URL is configured.
pub const DEFAULT_REPOSITORY_BASE_URL: &str = "https://gitea.artixlinux.org/packages";

/// Build directory (relative to the home directory) when none is configured.
pub const DEFAULT_BUILD_DIR: &str = "custompkg";

/// Mapping file (relative to the home directory) when none is configured.
pub const DEFAULT_MAPPING_FILE: &str = "repo_mappings.txt";

/// Editor used for manifest edits when neither `VISUAL`, `EDITOR` nor the config name one.
pub const DEFAULT_EDITOR: &str = "nano";

/// Answer to the repository repair prompt that abandons the current dependency.
pub const SKIP_SENTINEL: &str = "skip";

/// Environment variable overriding the global config file location.
pub const CONFIG_ENV_VAR: &str = "SRCPKG_CONFIG";

/// Well-known package → repository renames shown when a fetch fails.
pub const MAPPING_EXAMPLES: &[(&str, &str)] = &[
    ("libudev", "udev"),
    ("gcc-libs", "gcc"),
    ("opengl-driver", "lib32-mesa"),
];
