/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use log::warn;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

// Upper bounds for values that size allocations or feed `Instant` arithmetic.
const MAX_ROWS: usize = 1_000;
const MAX_COLUMNS: usize = 1_000;
const MAX_LOCKOUT_SECS: u64 = 24 * 60 * 60;
const MAX_GUESS_DEBOUNCE_MS: u64 = 60_000;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub puzzle: PuzzleConfig,
    pub timing: TimingConfig,
    pub login: LoginConfig,
    pub gamepad: GamepadConfig,
    /// Word list file. `None` = built-in list.
    pub dictionary: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
}

#[derive(Clone, Debug)]
pub struct PuzzleConfig {
    pub rows: usize,
    pub columns: usize,
    pub row_stride: usize,       // rows per rendered block; Left/Right wrap distance
    pub word_length: usize,
    pub max_lives: u32,
    pub special_chance: f64,
    pub dud_chance: f64,
    pub noise: Vec<char>,
}

#[derive(Clone, Debug)]
pub struct TimingConfig {
    pub tick_rate_ms: u64,
    pub type_chars_per_tick: usize,
    pub lockout_secs: u64,
    pub guess_debounce_ms: u64,
    pub boot_pause_ticks: u32,
}

#[derive(Clone, Debug)]
pub struct LoginConfig {
    pub user: String,
    pub password: String,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub activate: Vec<String>,
    pub cancel: Vec<String>,
}

impl PuzzleConfig {
    /// Total number of cells in the grid.
    pub fn capacity(&self) -> usize {
        self.rows * self.columns
    }
}

impl TimingConfig {
    pub fn lockout(&self) -> Duration {
        Duration::from_secs(self.lockout_secs)
    }

    pub fn guess_debounce(&self) -> Duration {
        Duration::from_millis(self.guess_debounce_ms)
    }
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    puzzle: TomlPuzzle,
    #[serde(default)]
    timing: TomlTiming,
    #[serde(default)]
    login: TomlLogin,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlPuzzle {
    #[serde(default = "default_rows")]
    rows: usize,
    #[serde(default = "default_columns")]
    columns: usize,
    #[serde(default = "default_row_stride")]
    row_stride: usize,
    #[serde(default = "default_word_length")]
    word_length: usize,
    #[serde(default = "default_max_lives")]
    max_lives: u32,
    #[serde(default = "default_special_chance")]
    special_chance: f64,
    #[serde(default = "default_dud_chance")]
    dud_chance: f64,
    #[serde(default = "default_noise")]
    noise: String,
}

#[derive(Deserialize, Debug)]
struct TomlTiming {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default = "default_type_chars")]
    type_chars_per_tick: usize,
    #[serde(default = "default_lockout")]
    lockout_secs: u64,
    #[serde(default = "default_guess_debounce")]
    guess_debounce_ms: u64,
    #[serde(default = "default_boot_pause")]
    boot_pause_ticks: u32,
}

#[derive(Deserialize, Debug)]
struct TomlLogin {
    #[serde(default = "default_user")]
    user: String,
    #[serde(default = "default_password")]
    password: String,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_activate")]
    activate: Vec<String>,
    #[serde(default = "default_cancel")]
    cancel: Vec<String>,
}

#[derive(Deserialize, Debug, Default)]
struct TomlGeneral {
    #[serde(default)]
    dictionary: Option<String>,
    #[serde(default)]
    log_file: Option<String>,
}

// ── Defaults ──

fn default_rows() -> usize { 34 }
fn default_columns() -> usize { 12 }
fn default_row_stride() -> usize { 17 }
fn default_word_length() -> usize { 6 }
fn default_max_lives() -> u32 { 5 }
fn default_special_chance() -> f64 { 0.3 }
fn default_dud_chance() -> f64 { 0.66 }
fn default_noise() -> String { r#"!@#$%^&*()-_[]{}<>\|'";:/?,."#.into() }

fn default_tick_rate() -> u64 { 15 }
fn default_type_chars() -> usize { 2 }
fn default_lockout() -> u64 { 30 }
fn default_guess_debounce() -> u64 { 5000 }
fn default_boot_pause() -> u32 { 60 }      // ~0.9s at 15ms tick

fn default_user() -> String { "admin".into() }
fn default_password() -> String { "admin".into() }

fn default_activate() -> Vec<String> { vec!["A".into(), "Start".into()] }
fn default_cancel() -> Vec<String> { vec!["B".into(), "Select".into()] }

impl Default for TomlPuzzle {
    fn default() -> Self {
        TomlPuzzle {
            rows: default_rows(),
            columns: default_columns(),
            row_stride: default_row_stride(),
            word_length: default_word_length(),
            max_lives: default_max_lives(),
            special_chance: default_special_chance(),
            dud_chance: default_dud_chance(),
            noise: default_noise(),
        }
    }
}

impl Default for TomlTiming {
    fn default() -> Self {
        TomlTiming {
            tick_rate_ms: default_tick_rate(),
            type_chars_per_tick: default_type_chars(),
            lockout_secs: default_lockout(),
            guess_debounce_ms: default_guess_debounce(),
            boot_pause_ticks: default_boot_pause(),
        }
    }
}

impl Default for TomlLogin {
    fn default() -> Self {
        TomlLogin {
            user: default_user(),
            password: default_password(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            activate: default_activate(),
            cancel: default_cancel(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: exe directory, current working directory,
    /// ~/.local/share/termlink, /usr/share/termlink.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);
        Self::from_toml(toml_cfg, &search_dirs)
    }

    /// Parse a config document directly (no file search).
    #[allow(dead_code)]
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        let toml_cfg = toml::from_str::<TomlConfig>(text)?;
        Ok(Self::from_toml(toml_cfg, &[]))
    }

    fn from_toml(cfg: TomlConfig, search_dirs: &[PathBuf]) -> Self {
        let p = cfg.puzzle;

        let rows = at_most("puzzle.rows", positive_or("puzzle.rows", p.rows, default_rows()), MAX_ROWS);
        let columns = at_most(
            "puzzle.columns",
            positive_or("puzzle.columns", p.columns, default_columns()),
            MAX_COLUMNS,
        );
        let row_stride = positive_or("puzzle.row_stride", p.row_stride, default_row_stride());
        let word_length = positive_or("puzzle.word_length", p.word_length, default_word_length());
        let max_lives = if p.max_lives == 0 {
            warn!("puzzle.max_lives must be at least 1, using {}", default_max_lives());
            default_max_lives()
        } else {
            p.max_lives
        };
        let noise: Vec<char> = if p.noise.is_empty() {
            warn!("puzzle.noise is empty, using the default alphabet");
            default_noise().chars().collect()
        } else {
            p.noise.chars().collect()
        };

        GameConfig {
            puzzle: PuzzleConfig {
                rows,
                columns,
                row_stride,
                word_length,
                max_lives,
                special_chance: probability("puzzle.special_chance", p.special_chance),
                dud_chance: probability("puzzle.dud_chance", p.dud_chance),
                noise,
            },
            timing: TimingConfig {
                tick_rate_ms: cfg.timing.tick_rate_ms.max(1),
                type_chars_per_tick: cfg.timing.type_chars_per_tick.max(1),
                lockout_secs: at_most("timing.lockout_secs", cfg.timing.lockout_secs, MAX_LOCKOUT_SECS),
                guess_debounce_ms: at_most(
                    "timing.guess_debounce_ms",
                    cfg.timing.guess_debounce_ms,
                    MAX_GUESS_DEBOUNCE_MS,
                ),
                boot_pause_ticks: cfg.timing.boot_pause_ticks,
            },
            login: LoginConfig {
                user: cfg.login.user,
                password: cfg.login.password,
            },
            gamepad: GamepadConfig {
                activate: cfg.gamepad.activate,
                cancel: cfg.gamepad.cancel,
            },
            dictionary: cfg.general.dictionary
                .filter(|s| !s.is_empty())
                .map(|s| resolve_path(&s, search_dirs)),
            log_file: cfg.general.log_file
                .filter(|s| !s.is_empty())
                .map(PathBuf::from),
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::from_toml(TomlConfig::default(), &[])
    }
}

fn positive_or(key: &str, value: usize, fallback: usize) -> usize {
    if value == 0 {
        warn!("{key} must be positive, using {fallback}");
        fallback
    } else {
        value
    }
}

fn at_most<T: PartialOrd + Copy + std::fmt::Display>(key: &str, value: T, max: T) -> T {
    if value > max {
        warn!("{key} = {value} is too large, using {max}");
        max
    } else {
        value
    }
}

fn probability(key: &str, value: f64) -> f64 {
    if !(0.0..=1.0).contains(&value) {
        warn!("{key} = {value} is outside [0, 1], clamping");
    }
    if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) }
}

/// Relative paths are looked up in the candidate dirs; first existing hit wins.
fn resolve_path(path: &str, search_dirs: &[PathBuf]) -> PathBuf {
    let p = PathBuf::from(path);
    if p.is_absolute() {
        return p;
    }
    search_dirs.iter()
        .map(|d| d.join(path))
        .find(|c| c.is_file())
        .unwrap_or(p)
}

/// Candidate directories to search: exe dir + CWD + system paths (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. XDG data home (~/.local/share/termlink)
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/termlink");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    // 4. System data directory (/usr/share/termlink)
    let sys = PathBuf::from("/usr/share/termlink");
    if sys.is_dir() && !dirs.iter().any(|d| d == &sys) {
        dirs.push(sys);
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        warn!("config.toml parse error: {e}; using default settings");
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    warn!("could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_terminal_layout() {
        let cfg = GameConfig::default();
        assert_eq!(cfg.puzzle.rows, 34);
        assert_eq!(cfg.puzzle.columns, 12);
        assert_eq!(cfg.puzzle.capacity(), 408);
        assert_eq!(cfg.puzzle.row_stride, 17);
        assert_eq!(cfg.puzzle.word_length, 6);
        assert_eq!(cfg.puzzle.max_lives, 5);
        assert!((cfg.puzzle.special_chance - 0.3).abs() < 1e-9);
        assert!((cfg.puzzle.dud_chance - 0.66).abs() < 1e-9);
        assert!(cfg.puzzle.noise.contains(&'<'));
        assert!(cfg.dictionary.is_none());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let cfg = GameConfig::from_toml_str(
            "[puzzle]\nword_length = 7\n\n[login]\nuser = \"overseer\"\n",
        ).unwrap();
        assert_eq!(cfg.puzzle.word_length, 7);
        assert_eq!(cfg.puzzle.rows, 34);
        assert_eq!(cfg.login.user, "overseer");
        assert_eq!(cfg.login.password, "admin");
    }

    #[test]
    fn invalid_values_fall_back() {
        let cfg = GameConfig::from_toml_str(
            "[puzzle]\nrows = 0\nmax_lives = 0\nnoise = \"\"\ndud_chance = 1.5\n",
        ).unwrap();
        assert_eq!(cfg.puzzle.rows, 34);
        assert_eq!(cfg.puzzle.max_lives, 5);
        assert!(!cfg.puzzle.noise.is_empty());
        assert_eq!(cfg.puzzle.dud_chance, 1.0);
    }

    #[test]
    fn oversized_values_are_capped() {
        let cfg = GameConfig::from_toml_str(
            "[puzzle]\nrows = 4000000000\ncolumns = 4000000000\n\n\
             [timing]\nlockout_secs = 9223372036854775807\nguess_debounce_ms = 9223372036854775807\n",
        ).unwrap();
        assert_eq!(cfg.puzzle.rows, MAX_ROWS);
        assert_eq!(cfg.puzzle.columns, MAX_COLUMNS);
        assert_eq!(cfg.puzzle.capacity(), MAX_ROWS * MAX_COLUMNS);
        assert_eq!(cfg.timing.lockout(), Duration::from_secs(MAX_LOCKOUT_SECS));
        assert_eq!(cfg.timing.guess_debounce(), Duration::from_millis(MAX_GUESS_DEBOUNCE_MS));
    }

    #[test]
    fn values_within_bounds_are_kept() {
        let cfg = GameConfig::from_toml_str("[timing]\nlockout_secs = 90\nguess_debounce_ms = 250\n").unwrap();
        assert_eq!(cfg.timing.lockout_secs, 90);
        assert_eq!(cfg.timing.guess_debounce_ms, 250);
    }

    #[test]
    fn empty_dictionary_path_means_builtin() {
        let cfg = GameConfig::from_toml_str("[general]\ndictionary = \"\"\n").unwrap();
        assert!(cfg.dictionary.is_none());
        let cfg = GameConfig::from_toml_str("[general]\ndictionary = \"/tmp/words.txt\"\n").unwrap();
        assert_eq!(cfg.dictionary, Some(PathBuf::from("/tmp/words.txt")));
    }

    #[test]
    fn malformed_toml_is_an_error() {
        assert!(GameConfig::from_toml_str("[puzzle\nrows = 3").is_err());
    }
}
