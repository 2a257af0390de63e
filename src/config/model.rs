// src/config/model.rs

use serde::Deserialize;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [source]
/// pattern = "src/less/*.less"
///
/// [output]
/// file = "index.css"
/// dir = "../gm_site/static/css"
///
/// [steps]
/// minify = false
/// live_reload = false
///
/// [watch]
/// debounce_ms = 200
/// ```
///
/// `[steps]` and `[watch]` are optional and have defaults matching the
/// reference configuration (both optional steps disabled).
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    /// Source file selection from `[source]`.
    pub source: SourceSection,

    /// Merged artifact destination from `[output]`.
    pub output: OutputSection,

    /// Toggleable pipeline steps from `[steps]`.
    #[serde(default)]
    pub steps: StepsSection,

    /// Watch-mode behaviour from `[watch]`.
    #[serde(default)]
    pub watch: WatchSection,
}

/// `[source]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceSection {
    /// Glob pattern selecting the source file set, relative to the directory
    /// containing the config file. Resolution order is lexical, and it is
    /// significant: concatenation preserves it.
    pub pattern: String,
}

/// `[output]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct OutputSection {
    /// Name of the merged stylesheet (e.g. `index.css`). The companion
    /// source map is written next to it with a `.map` suffix.
    pub file: String,

    /// Destination directory, relative to the config file's directory.
    /// Created if missing; each build fully overwrites the prior artifact.
    pub dir: String,

    /// Deprecated: never read by any pipeline step. Accepted so the
    /// reference configuration ports over unchanged; a warning is logged
    /// when present.
    #[serde(default)]
    pub path_file: Option<String>,

    /// Deprecated: never read by any pipeline step.
    #[serde(default)]
    pub path_file_css: Option<String>,
}

/// `[steps]` section: toggleable pipeline steps.
///
/// Both default to `false`, matching the reference configuration where
/// minification and live-reload exist but are disabled.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct StepsSection {
    /// Strip whitespace from the merged stylesheet.
    #[serde(default)]
    pub minify: bool,

    /// Invoke the reload hook after a successful write.
    #[serde(default)]
    pub live_reload: bool,
}

/// `[watch]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchSection {
    /// Batching window for filesystem events: changes landing within this
    /// many milliseconds of each other trigger a single rebuild.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_debounce_ms() -> u64 {
    200
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}
