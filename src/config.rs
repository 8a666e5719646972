use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use directories::BaseDirs;
use serde::de::Deserializer;
use serde::Deserialize;

use crate::remote::http::parse_base_url;

const CONFIG_FILE_NAME: &str = "config.toml";
const APP_NAME: &str = "hallfind";

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5001";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct Config {
    pub config_path: PathBuf,
    pub server: ServerConfig,
    pub export: ExportConfig,
    pub keys: Keys,
    pub ui: UiConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub base_url: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Directory the export file is written into.
    pub dir: PathBuf,
}

/// Expand ~ to home directory in paths
fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Some(home) = home::home_dir() {
            return home.join(stripped);
        }
    }
    path.to_path_buf()
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub colors: UiColors,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiColors {
    pub border: RgbColor,
    pub selection_bg: RgbColor,
    pub selection_fg: RgbColor,
    pub status_fg: RgbColor,
    pub status_bg: RgbColor,
    pub contacted: RgbColor,
    pub not_contacted: RgbColor,
    pub link: RgbColor,
}

const COLOR_NAMES: [&str; 8] = [
    "border",
    "selection_bg",
    "selection_fg",
    "status_fg",
    "status_bg",
    "contacted",
    "not_contacted",
    "link",
];

impl Default for UiColors {
    fn default() -> Self {
        Self {
            border: RgbColor::new(255, 165, 0),
            selection_bg: RgbColor::new(255, 165, 0),
            selection_fg: RgbColor::new(0, 0, 0),
            status_fg: RgbColor::new(255, 165, 0),
            status_bg: RgbColor::new(0, 0, 0),
            contacted: RgbColor::new(40, 167, 69),
            not_contacted: RgbColor::new(220, 53, 69),
            link: RgbColor::new(0, 123, 255),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

// =============================================================================
// Key bindings
// =============================================================================

/// Bindings per screen context. Each action accepts a single key name or a
/// list of them in the config file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Keys {
    /// Active whenever the query box does not have focus
    pub global: GlobalKeys,
    pub search_input: SearchInputKeys,
    pub results: ResultsKeys,
    /// Details view and error popups
    pub modal: ModalKeys,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GlobalKeys {
    #[serde(deserialize_with = "one_or_many")]
    pub quit: Vec<String>,
    #[serde(deserialize_with = "one_or_many")]
    pub search: Vec<String>,
    #[serde(deserialize_with = "one_or_many")]
    pub language: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchInputKeys {
    #[serde(deserialize_with = "one_or_many")]
    pub cancel: Vec<String>,
    #[serde(deserialize_with = "one_or_many")]
    pub confirm: Vec<String>,
    #[serde(deserialize_with = "one_or_many")]
    pub next: Vec<String>,
    #[serde(deserialize_with = "one_or_many")]
    pub prev: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ResultsKeys {
    #[serde(deserialize_with = "one_or_many")]
    pub next: Vec<String>,
    #[serde(deserialize_with = "one_or_many")]
    pub prev: Vec<String>,
    #[serde(deserialize_with = "one_or_many")]
    pub page_down: Vec<String>,
    #[serde(deserialize_with = "one_or_many")]
    pub page_up: Vec<String>,
    #[serde(deserialize_with = "one_or_many")]
    pub details: Vec<String>,
    #[serde(deserialize_with = "one_or_many")]
    pub mark: Vec<String>,
    #[serde(deserialize_with = "one_or_many")]
    pub reset: Vec<String>,
    #[serde(deserialize_with = "one_or_many")]
    pub export: Vec<String>,
    #[serde(deserialize_with = "one_or_many")]
    pub clear: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModalKeys {
    #[serde(deserialize_with = "one_or_many")]
    pub cancel: Vec<String>,
    #[serde(deserialize_with = "one_or_many")]
    pub confirm: Vec<String>,
}

fn keys(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

impl Default for GlobalKeys {
    fn default() -> Self {
        Self {
            quit: keys(&["q"]),
            search: keys(&["/"]),
            language: keys(&["L"]),
        }
    }
}

impl Default for SearchInputKeys {
    fn default() -> Self {
        Self {
            cancel: keys(&["Escape"]),
            confirm: keys(&["Enter"]),
            next: keys(&["Down", "Tab"]),
            prev: keys(&["Up", "Backtab"]),
        }
    }
}

impl Default for ResultsKeys {
    fn default() -> Self {
        Self {
            next: keys(&["j", "Down", "Tab"]),
            prev: keys(&["k", "Up", "Backtab"]),
            page_down: keys(&["PageDown"]),
            page_up: keys(&["PageUp"]),
            details: keys(&["Enter"]),
            mark: keys(&["m"]),
            reset: keys(&["r"]),
            export: keys(&["x"]),
            clear: keys(&["c"]),
        }
    }
}

impl Default for ModalKeys {
    fn default() -> Self {
        Self {
            cancel: keys(&["Escape", "q"]),
            confirm: keys(&["Enter"]),
        }
    }
}

/// Accept `key = "x"` as well as `key = ["x", "y"]`.
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(key) => vec![key],
        OneOrMany::Many(keys) => keys,
    })
}

type Bindings<'a> = Vec<(&'static str, &'a [String])>;

impl Keys {
    /// Actions per context, as they appear under `[keys.<context>]`.
    fn contexts(&self) -> [(&'static str, Bindings<'_>); 4] {
        let global = &self.global;
        let input = &self.search_input;
        let results = &self.results;
        [
            (
                "global",
                vec![
                    ("quit", global.quit.as_slice()),
                    ("search", global.search.as_slice()),
                    ("language", global.language.as_slice()),
                ],
            ),
            (
                "search_input",
                vec![
                    ("cancel", input.cancel.as_slice()),
                    ("confirm", input.confirm.as_slice()),
                    ("next", input.next.as_slice()),
                    ("prev", input.prev.as_slice()),
                ],
            ),
            (
                "results",
                vec![
                    ("next", results.next.as_slice()),
                    ("prev", results.prev.as_slice()),
                    ("page_down", results.page_down.as_slice()),
                    ("page_up", results.page_up.as_slice()),
                    ("details", results.details.as_slice()),
                    ("mark", results.mark.as_slice()),
                    ("reset", results.reset.as_slice()),
                    ("export", results.export.as_slice()),
                    ("clear", results.clear.as_slice()),
                ],
            ),
            (
                "modal",
                vec![
                    ("cancel", self.modal.cancel.as_slice()),
                    ("confirm", self.modal.confirm.as_slice()),
                ],
            ),
        ]
    }

    /// Reject a key bound to two actions of the same context. The results
    /// context is checked together with the global keys it also accepts.
    fn validate(&self) -> Result<()> {
        let contexts = self.contexts();
        let global = &contexts[0].1;
        for (name, bindings) in &contexts {
            let mut in_scope: Bindings = bindings.clone();
            if *name == "results" {
                in_scope.extend(global.iter().copied());
            }

            let mut owner: HashMap<String, &str> = HashMap::new();
            for (action, keys) in in_scope {
                for key in keys {
                    let Some(canonical) = canonical_key(key) else {
                        continue;
                    };
                    if let Some(previous) = owner.insert(canonical, action) {
                        if previous != action {
                            bail!(
                                "key binding collision in [keys.{name}]: '{key}' is bound to both '{previous}' and '{action}'"
                            );
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

/// Single characters are case-sensitive (`L` is Shift+l); named keys are not.
fn canonical_key(key: &str) -> Option<String> {
    let key = key.trim();
    match key.chars().count() {
        0 => None,
        1 => Some(key.to_string()),
        _ => Some(key.to_ascii_lowercase()),
    }
}

// =============================================================================
// Config file structure
// =============================================================================

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    server: ServerFile,
    export: ExportFile,
    keys: Keys,
    ui: UiConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct ServerFile {
    base_url: String,
    timeout_secs: u64,
}

impl Default for ServerFile {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ServerFile {
    fn into_config(self) -> Result<ServerConfig> {
        let base_url = self.base_url.trim().to_string();
        parse_base_url(&base_url).context("invalid server.base_url")?;
        if self.timeout_secs == 0 {
            bail!("server.timeout_secs must be greater than zero");
        }
        Ok(ServerConfig {
            base_url,
            timeout: Duration::from_secs(self.timeout_secs),
        })
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ExportFile {
    dir: Option<PathBuf>,
}

impl From<ExportFile> for ExportConfig {
    fn from(file: ExportFile) -> Self {
        Self {
            dir: file
                .dir
                .map(|dir| expand_tilde(&dir))
                .unwrap_or_else(|| PathBuf::from(".")),
        }
    }
}

fn config_root() -> Result<PathBuf> {
    let base = BaseDirs::new().context("unable to determine base directories")?;
    Ok(base.config_dir().join(APP_NAME))
}

pub fn config_path() -> Result<PathBuf> {
    Ok(config_root()?.join(CONFIG_FILE_NAME))
}

/// Directory for the log file written while the TUI owns the terminal.
pub fn data_dir() -> Result<PathBuf> {
    let base = BaseDirs::new().context("unable to determine base directories")?;
    let dir = base.data_local_dir().join(APP_NAME);
    if !dir.exists() {
        fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create data dir: {}", dir.display()))?;
    }
    Ok(dir)
}

/// Load configuration. An explicit path must exist; the default file is
/// optional and its absence means built-in defaults.
pub fn load(explicit: Option<&Path>) -> Result<Config> {
    let path = match explicit {
        Some(path) => {
            let path = expand_tilde(path);
            if !path.exists() {
                bail!("configuration file not found at {}", path.display());
            }
            path
        }
        None => {
            let path = config_path()?;
            if !path.exists() {
                tracing::debug!(path = %path.display(), "no configuration file, using defaults");
                return parse("", path);
            }
            path
        }
    };

    let raw = fs::read_to_string(&path)
        .with_context(|| format!("failed to read configuration file at {}", path.display()))?;
    parse(&raw, path)
}

/// Build a configuration from TOML text.
pub fn parse(raw: &str, path: PathBuf) -> Result<Config> {
    let value: toml::Value = toml::from_str(raw)
        .with_context(|| format!("failed to parse {} as TOML", path.display()))?;

    for warning in unknown_keys(&value) {
        eprintln!("warning: {}", warning);
    }

    let cfg_file: ConfigFile = value
        .try_into()
        .with_context(|| format!("failed to deserialize config from {}", path.display()))?;

    let server = cfg_file.server.into_config()?;

    cfg_file.keys.validate()?;

    Ok(Config {
        config_path: path,
        server,
        export: cfg_file.export.into(),
        keys: cfg_file.keys,
        ui: cfg_file.ui,
    })
}

// =============================================================================
// Unknown key warnings
// =============================================================================

fn unknown_keys(value: &toml::Value) -> Vec<String> {
    let mut warnings = Vec::new();
    let Some(table) = value.as_table() else {
        return warnings;
    };

    let known = HashSet::from(["server", "export", "keys", "ui"]);
    for key in table.keys() {
        if !known.contains(key.as_str()) {
            warnings.push(format!("unknown configuration key `{}`", key));
        }
    }

    if let Some(v) = table.get("server") {
        unknown_in_section(v, "server", &["base_url", "timeout_secs"], &mut warnings);
    }
    if let Some(v) = table.get("export") {
        unknown_in_section(v, "export", &["dir"], &mut warnings);
    }
    if let Some(keys_val) = table.get("keys") {
        unknown_keys_section(keys_val, &mut warnings);
    }
    if let Some(ui_val) = table.get("ui") {
        unknown_in_section(ui_val, "ui", &["colors"], &mut warnings);
        if let Some(colors) = ui_val.get("colors") {
            unknown_in_section(colors, "ui.colors", &COLOR_NAMES, &mut warnings);
        }
    }

    warnings
}

fn unknown_keys_section(value: &toml::Value, warnings: &mut Vec<String>) {
    let Some(table) = value.as_table() else {
        return;
    };

    let defaults = Keys::default();
    let contexts = defaults.contexts();
    for key in table.keys() {
        if !contexts.iter().any(|(name, _)| *name == key.as_str()) {
            warnings.push(format!("unknown keys.* context `{}`", key));
        }
    }

    for (name, bindings) in &contexts {
        if let Some(v) = table.get(*name) {
            let actions: Vec<&str> = bindings.iter().map(|(action, _)| *action).collect();
            unknown_in_section(v, &format!("keys.{name}"), &actions, warnings);
        }
    }
}

fn unknown_in_section(value: &toml::Value, section: &str, known: &[&str], warnings: &mut Vec<String>) {
    let Some(table) = value.as_table() else {
        return;
    };
    let known_set: HashSet<&str> = known.iter().copied().collect();
    for key in table.keys() {
        if !known_set.contains(key.as_str()) {
            warnings.push(format!("unknown {} entry `{}`", section, key));
        }
    }
}

impl RgbColor {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl<'de> serde::Deserialize<'de> for RgbColor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Helper {
            Array([u8; 3]),
            Map { r: u8, g: u8, b: u8 },
        }

        let helper = Helper::deserialize(deserializer)?;
        let (r, g, b) = match helper {
            Helper::Array(values) => (values[0], values[1], values[2]),
            Helper::Map { r, g, b } => (r, g, b),
        };
        Ok(RgbColor { r, g, b })
    }
}
