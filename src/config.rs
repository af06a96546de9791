//! Configuration loading for Vitrina.
//!
//! Configuration follows a precedence chain:
//! 1. Environment variables (highest priority)
//! 2. Project config (`.vitrina/config.toml`)
//! 3. User config (`~/.vitrina/config.toml`)
//! 4. Defaults (lowest priority)
//!
//! All configuration is optional. The search engine runs with the built-in
//! dictionary and default tolerances when no config exists.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{Result, VitrinaError};
use crate::util::{read_to_string_limited, write_atomic};

/// Main configuration struct for Vitrina.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Fuzzy matching and fallback configuration.
    pub search: SearchConfig,
    /// Search history configuration.
    pub history: HistoryConfig,
    /// Autocomplete suggestion configuration.
    pub suggestions: SuggestionConfig,
    /// Extra dictionary entries layered over the built-in tables.
    pub dictionary: DictionaryConfig,
    /// Catalog source configuration.
    pub catalog: CatalogConfig,
    /// Registration email-code configuration.
    pub verification: VerificationConfig,
}

/// Fuzzy matching configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SearchConfig {
    /// Maximum edit distance per term character for a field to match.
    pub threshold: f64,
    /// Terms shorter than this (in chars) are never matched.
    pub min_match_chars: usize,
    /// Score recorded for products found by the substring fallback.
    pub fallback_score: f64,
    /// Relative weight of each indexed field.
    pub weights: FieldWeights,
}

impl SearchConfig {
    /// Check if a threshold value is valid (finite, in [0.0, 1.0]).
    pub fn is_valid_threshold(value: f64) -> bool {
        value.is_finite() && (0.0..=1.0).contains(&value)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            threshold: 0.4,
            min_match_chars: 2,
            fallback_score: 0.5,
            weights: FieldWeights::default(),
        }
    }
}

/// Field weights used when combining per-field match scores.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FieldWeights {
    pub name: f64,
    pub description: f64,
    pub category: f64,
}

impl FieldWeights {
    /// Weights must be finite, non-negative and not all zero.
    pub fn is_valid(&self) -> bool {
        let all = [self.name, self.description, self.category];
        all.iter().all(|w| w.is_finite() && *w >= 0.0) && all.iter().sum::<f64>() > 0.0
    }
}

impl Default for FieldWeights {
    fn default() -> Self {
        Self {
            name: 0.6,
            description: 0.3,
            category: 0.1,
        }
    }
}

/// Search history configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HistoryConfig {
    /// Most recent entries kept.
    pub max_entries: usize,
    /// Storage key the history list is persisted under.
    pub storage_key: String,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_entries: 10,
            storage_key: "search-history".to_string(),
        }
    }
}

/// Autocomplete suggestion configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SuggestionConfig {
    /// Maximum suggestions returned per keystroke.
    pub max_suggestions: usize,
    /// Partial queries shorter than this (in chars) get no suggestions.
    pub min_query_chars: usize,
    /// Debounce interval for keystroke-driven suggestion requests.
    pub debounce_ms: u64,
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            max_suggestions: 8,
            min_query_chars: 2,
            debounce_ms: 150,
        }
    }
}

/// Extra dictionary entries.
///
/// Synonym groups whose key matches a built-in key extend that group.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DictionaryConfig {
    /// Canonical key to interchangeable terms.
    pub synonyms: BTreeMap<String, Vec<String>>,
    /// Misspelling to correction.
    pub corrections: BTreeMap<String, String>,
    /// Extra popular search terms offered as suggestions.
    pub popular: Vec<String>,
    /// Drop the built-in tables and use only the entries above.
    pub replace_builtin: bool,
}

/// Catalog source configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CatalogConfig {
    /// Default JSON catalog used when the CLI gets no `--catalog`.
    pub path: Option<PathBuf>,
}

/// Registration email-code configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VerificationConfig {
    /// Number of digits in a code.
    pub code_length: usize,
    /// Seconds a code stays valid.
    pub ttl_seconds: u64,
    /// Wrong guesses allowed before the code is withdrawn.
    pub max_attempts: u32,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            code_length: 6,
            ttl_seconds: 600,
            max_attempts: 3,
        }
    }
}

impl Config {
    /// Load configuration with full precedence chain.
    pub fn load() -> Self {
        match env::current_dir() {
            Ok(cwd) => Self::load_from_cwd(&cwd),
            Err(_) => {
                let mut config = Config::default();
                if let Some(user_config) = Self::load_user_config() {
                    config = config.merge(user_config);
                }
                config.apply_env_overrides();
                config
            }
        }
    }

    /// Load configuration with a specific working directory.
    pub fn load_from_cwd(cwd: &Path) -> Self {
        let mut config = Config::default();

        if let Some(user_config) = Self::load_user_config() {
            config = config.merge(user_config);
        }

        if let Some(project_config) = Self::load_project_config(cwd) {
            config = config.merge(project_config);
        }

        config.apply_env_overrides();

        config
    }

    /// Load user config from `<vitrina_home>/config.toml`.
    fn load_user_config() -> Option<Config> {
        let home = vitrina_home()?;
        Self::load_if_present(&home.join("config.toml"))
    }

    /// Load project config from `.vitrina/config.toml` above `cwd`.
    fn load_project_config(cwd: &Path) -> Option<Config> {
        Self::load_if_present(&project_vitrina_dir(cwd).join("config.toml"))
    }

    fn load_if_present(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        match Self::load_from_file(path) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config");
                None
            }
        }
    }

    /// Load config from a specific file path.
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let content = read_to_string_limited(path)?;
        toml::from_str(&content).map_err(|e| VitrinaError::config(e.to_string()))
    }

    /// Apply environment variable overrides.
    ///
    /// Invalid values are reported and ignored.
    fn apply_env_overrides(&mut self) {
        if let Some(n) = env_parse::<f64>("VITRINA_FUZZY_THRESHOLD") {
            if SearchConfig::is_valid_threshold(n) {
                self.search.threshold = n;
            } else {
                tracing::warn!(
                    "invalid VITRINA_FUZZY_THRESHOLD value '{}', must be in [0.0, 1.0]; keeping '{}'",
                    n,
                    self.search.threshold
                );
            }
        }

        if let Some(n) = env_parse_positive::<usize>("VITRINA_HISTORY_LIMIT") {
            self.history.max_entries = n;
        }

        if let Some(n) = env_parse_positive::<usize>("VITRINA_SUGGESTION_LIMIT") {
            self.suggestions.max_suggestions = n;
        }

        if let Ok(val) = env::var("VITRINA_CATALOG") {
            if val.trim().is_empty() {
                tracing::warn!("VITRINA_CATALOG is empty, ignoring");
            } else {
                self.catalog.path = Some(PathBuf::from(val));
            }
        }

        if let Some(n) = env_parse_positive::<u64>("VITRINA_CODE_TTL_SECONDS") {
            self.verification.ttl_seconds = n;
        }

        if let Some(n) = env_parse_positive::<u32>("VITRINA_MAX_CODE_ATTEMPTS") {
            self.verification.max_attempts = n;
        }
    }

    /// Merge another config into this one.
    ///
    /// Non-default fields from `other` win. A layer cannot reset a value back
    /// to its default once a lower layer changed it.
    fn merge(mut self, other: Config) -> Self {
        let default_search = SearchConfig::default();
        if other.search.threshold != default_search.threshold {
            self.search.threshold = other.search.threshold;
        }
        if other.search.min_match_chars != default_search.min_match_chars {
            self.search.min_match_chars = other.search.min_match_chars;
        }
        if other.search.fallback_score != default_search.fallback_score {
            self.search.fallback_score = other.search.fallback_score;
        }
        if other.search.weights != default_search.weights {
            if other.search.weights.is_valid() {
                self.search.weights = other.search.weights;
            } else {
                tracing::warn!(weights = ?other.search.weights, "ignoring invalid field weights");
            }
        }

        let default_history = HistoryConfig::default();
        if other.history.max_entries != default_history.max_entries && other.history.max_entries > 0
        {
            self.history.max_entries = other.history.max_entries;
        }
        if other.history.storage_key != default_history.storage_key {
            self.history.storage_key = other.history.storage_key;
        }

        let default_suggestions = SuggestionConfig::default();
        if other.suggestions.max_suggestions != default_suggestions.max_suggestions {
            self.suggestions.max_suggestions = other.suggestions.max_suggestions;
        }
        if other.suggestions.min_query_chars != default_suggestions.min_query_chars {
            self.suggestions.min_query_chars = other.suggestions.min_query_chars;
        }
        if other.suggestions.debounce_ms != default_suggestions.debounce_ms {
            self.suggestions.debounce_ms = other.suggestions.debounce_ms;
        }

        // Dictionary entries are additive across layers
        for (key, terms) in other.dictionary.synonyms {
            self.dictionary.synonyms.entry(key).or_default().extend(terms);
        }
        self.dictionary.corrections.extend(other.dictionary.corrections);
        for term in other.dictionary.popular {
            if !self.dictionary.popular.contains(&term) {
                self.dictionary.popular.push(term);
            }
        }
        self.dictionary.replace_builtin |= other.dictionary.replace_builtin;

        if other.catalog.path.is_some() {
            self.catalog.path = other.catalog.path;
        }

        let default_verification = VerificationConfig::default();
        if other.verification.code_length != default_verification.code_length {
            self.verification.code_length = other.verification.code_length;
        }
        if other.verification.ttl_seconds != default_verification.ttl_seconds {
            self.verification.ttl_seconds = other.verification.ttl_seconds;
        }
        if other.verification.max_attempts != default_verification.max_attempts {
            self.verification.max_attempts = other.verification.max_attempts;
        }

        self
    }

    /// Save configuration to `.vitrina/config.toml` under `cwd`.
    pub fn save_project(&self, cwd: &Path) -> Result<()> {
        let dir = cwd.join(".vitrina");
        if !dir.exists() {
            fs::create_dir_all(&dir).map_err(|e| VitrinaError::storage(&dir, e))?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| VitrinaError::config(e.to_string()))?;
        write_atomic(&dir.join("config.toml"), &content)
    }
}

/// Parse an environment variable, warning when it is set but unparseable.
fn env_parse<T: FromStr>(name: &str) -> Option<T> {
    let val = env::var(name).ok()?;
    match val.trim().parse::<T>() {
        Ok(n) => Some(n),
        Err(_) => {
            tracing::warn!("invalid {} value '{}', ignoring", name, val);
            None
        }
    }
}

/// Like [`env_parse`], additionally rejecting zero.
fn env_parse_positive<T: FromStr + PartialOrd + Default + std::fmt::Display>(
    name: &str,
) -> Option<T> {
    let n = env_parse::<T>(name)?;
    if n > T::default() {
        Some(n)
    } else {
        tracing::warn!("invalid {} value '{}', must be >= 1; ignoring", name, n);
        None
    }
}

/// Get the Vitrina home directory.
///
/// Checks `VITRINA_HOME` first, then falls back to `~/.vitrina`.
pub fn vitrina_home() -> Option<PathBuf> {
    if let Ok(home) = env::var("VITRINA_HOME") {
        if home.is_empty() {
            tracing::warn!("VITRINA_HOME is empty, using default");
        } else {
            let path = PathBuf::from(&home);
            if path.is_absolute() {
                return Some(path);
            }
            if let Ok(canonical) = path.canonicalize() {
                return Some(canonical);
            }
            tracing::warn!("VITRINA_HOME is relative and doesn't exist, using as-is");
            return Some(path);
        }
    }

    if let Some(home) = dirs::home_dir() {
        return Some(home.join(".vitrina"));
    }

    let fallback_path = fallback_vitrina_home();
    tracing::warn!(
        "HOME not set, using fallback location: {}",
        fallback_path.display()
    );
    Some(fallback_path)
}

#[cfg(unix)]
fn fallback_vitrina_home() -> PathBuf {
    use std::os::unix::fs::MetadataExt;
    let uid = std::fs::metadata("/").map(|m| m.uid()).unwrap_or(0);
    PathBuf::from(format!("/tmp/vitrina-{}", uid))
}

#[cfg(not(unix))]
fn fallback_vitrina_home() -> PathBuf {
    std::env::temp_dir().join("vitrina")
}

/// Directory holding persisted key/value state such as search history.
///
/// Returns `<vitrina_home>/storage/`.
pub fn storage_dir() -> Option<PathBuf> {
    vitrina_home().map(|h| h.join("storage"))
}

/// Path of the crash log written by the CLI panic hook.
pub fn crash_log_path() -> Option<PathBuf> {
    vitrina_home().map(|h| h.join("crash.log"))
}

/// Find the nearest `.vitrina/` directory at or above `cwd`.
///
/// Falls back to `<cwd>/.vitrina` when no ancestor has one.
pub fn project_vitrina_dir(cwd: &Path) -> PathBuf {
    cwd.ancestors()
        .map(|a| a.join(".vitrina"))
        .find(|p| p.is_dir())
        .unwrap_or_else(|| cwd.join(".vitrina"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    fn clear_env() {
        for name in [
            "VITRINA_FUZZY_THRESHOLD",
            "VITRINA_HISTORY_LIMIT",
            "VITRINA_SUGGESTION_LIMIT",
            "VITRINA_CATALOG",
            "VITRINA_CODE_TTL_SECONDS",
            "VITRINA_MAX_CODE_ATTEMPTS",
        ] {
            env::remove_var(name);
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!((config.search.threshold - 0.4).abs() < f64::EPSILON);
        assert_eq!(config.search.min_match_chars, 2);
        assert!((config.search.fallback_score - 0.5).abs() < f64::EPSILON);
        assert!((config.search.weights.name - 0.6).abs() < f64::EPSILON);
        assert!((config.search.weights.description - 0.3).abs() < f64::EPSILON);
        assert!((config.search.weights.category - 0.1).abs() < f64::EPSILON);

        assert_eq!(config.history.max_entries, 10);
        assert_eq!(config.history.storage_key, "search-history");

        assert_eq!(config.suggestions.max_suggestions, 8);
        assert_eq!(config.suggestions.min_query_chars, 2);

        assert!(config.dictionary.synonyms.is_empty());
        assert!(!config.dictionary.replace_builtin);
        assert!(config.catalog.path.is_none());

        assert_eq!(config.verification.code_length, 6);
        assert_eq!(config.verification.ttl_seconds, 600);
        assert_eq!(config.verification.max_attempts, 3);
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[search]
threshold = 0.3

[history]
max_entries = 5

[dictionary.synonyms]
bicicleta = ["bici", "bike"]

[dictionary.corrections]
bisicleta = "bicicleta"
"#,
        )
        .unwrap();

        let config = Config::load_from_file(&path).unwrap();
        assert!((config.search.threshold - 0.3).abs() < f64::EPSILON);
        assert_eq!(config.search.min_match_chars, 2);
        assert_eq!(config.history.max_entries, 5);
        assert_eq!(
            config.dictionary.synonyms.get("bicicleta"),
            Some(&vec!["bici".to_string(), "bike".to_string()])
        );
        assert_eq!(
            config.dictionary.corrections.get("bisicleta").map(String::as_str),
            Some("bicicleta")
        );
    }

    #[test]
    fn test_load_from_file_invalid_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "this is not = = toml").unwrap();

        let err = Config::load_from_file(&path).unwrap_err();
        assert!(matches!(err, VitrinaError::Config { .. }));
    }

    #[test]
    fn test_merge_takes_non_default_values() {
        let mut other = Config::default();
        other.search.threshold = 0.2;
        other.suggestions.max_suggestions = 4;
        other.catalog.path = Some(PathBuf::from("/srv/catalog.json"));

        let merged = Config::default().merge(other);
        assert!((merged.search.threshold - 0.2).abs() < f64::EPSILON);
        assert_eq!(merged.suggestions.max_suggestions, 4);
        assert_eq!(merged.history.max_entries, 10);
        assert_eq!(merged.catalog.path, Some(PathBuf::from("/srv/catalog.json")));
    }

    #[test]
    fn test_merge_default_does_not_override() {
        let mut base = Config::default();
        base.history.max_entries = 20;

        let merged = base.merge(Config::default());
        assert_eq!(merged.history.max_entries, 20);
    }

    #[test]
    fn test_merge_dictionary_is_additive() {
        let mut base = Config::default();
        base.dictionary
            .synonyms
            .insert("moto".to_string(), vec!["motocicleta".to_string()]);
        base.dictionary.popular.push("motos".to_string());

        let mut other = Config::default();
        other
            .dictionary
            .synonyms
            .insert("moto".to_string(), vec!["scooter".to_string()]);
        other.dictionary.popular.push("motos".to_string());
        other.dictionary.popular.push("cascos".to_string());

        let merged = base.merge(other);
        assert_eq!(
            merged.dictionary.synonyms["moto"],
            vec!["motocicleta".to_string(), "scooter".to_string()]
        );
        assert_eq!(merged.dictionary.popular, vec!["motos", "cascos"]);
    }

    #[test]
    fn test_merge_rejects_invalid_weights() {
        let mut other = Config::default();
        other.search.weights = FieldWeights {
            name: -1.0,
            description: 0.0,
            category: 0.0,
        };

        let merged = Config::default().merge(other);
        assert_eq!(merged.search.weights, FieldWeights::default());
    }

    #[test]
    fn test_field_weights_validity() {
        assert!(FieldWeights::default().is_valid());
        assert!(!FieldWeights {
            name: 0.0,
            description: 0.0,
            category: 0.0
        }
        .is_valid());
        assert!(!FieldWeights {
            name: f64::NAN,
            description: 0.3,
            category: 0.1
        }
        .is_valid());
    }

    #[test]
    fn test_is_valid_threshold() {
        assert!(SearchConfig::is_valid_threshold(0.0));
        assert!(SearchConfig::is_valid_threshold(0.4));
        assert!(SearchConfig::is_valid_threshold(1.0));
        assert!(!SearchConfig::is_valid_threshold(-0.1));
        assert!(!SearchConfig::is_valid_threshold(1.5));
        assert!(!SearchConfig::is_valid_threshold(f64::INFINITY));
    }

    #[test]
    #[serial]
    fn test_env_var_valid_threshold_applied() {
        clear_env();
        env::set_var("VITRINA_FUZZY_THRESHOLD", "0.25");

        let mut config = Config::default();
        config.apply_env_overrides();
        assert!((config.search.threshold - 0.25).abs() < f64::EPSILON);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_env_var_invalid_threshold_ignored() {
        clear_env();
        env::set_var("VITRINA_FUZZY_THRESHOLD", "2.0");

        let mut config = Config::default();
        config.apply_env_overrides();
        assert!((config.search.threshold - 0.4).abs() < f64::EPSILON);

        env::set_var("VITRINA_FUZZY_THRESHOLD", "loose");
        config.apply_env_overrides();
        assert!((config.search.threshold - 0.4).abs() < f64::EPSILON);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_env_var_limits() {
        clear_env();
        env::set_var("VITRINA_HISTORY_LIMIT", "15");
        env::set_var("VITRINA_SUGGESTION_LIMIT", "0");
        env::set_var("VITRINA_MAX_CODE_ATTEMPTS", "5");
        env::set_var("VITRINA_CODE_TTL_SECONDS", "abc");

        let mut config = Config::default();
        config.apply_env_overrides();
        assert_eq!(config.history.max_entries, 15);
        assert_eq!(config.suggestions.max_suggestions, 8);
        assert_eq!(config.verification.max_attempts, 5);
        assert_eq!(config.verification.ttl_seconds, 600);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_env_var_catalog_path() {
        clear_env();
        env::set_var("VITRINA_CATALOG", "/data/products.json");

        let mut config = Config::default();
        config.apply_env_overrides();
        assert_eq!(config.catalog.path, Some(PathBuf::from("/data/products.json")));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_load_from_cwd_reads_project_config() {
        clear_env();
        let home = TempDir::new().unwrap();
        env::set_var("VITRINA_HOME", home.path());

        let project = TempDir::new().unwrap();
        let vitrina_dir = project.path().join(".vitrina");
        fs::create_dir_all(&vitrina_dir).unwrap();
        fs::write(
            vitrina_dir.join("config.toml"),
            "[suggestions]\nmax_suggestions = 3\n",
        )
        .unwrap();

        let nested = project.path().join("src").join("deep");
        fs::create_dir_all(&nested).unwrap();

        let config = Config::load_from_cwd(&nested);
        assert_eq!(config.suggestions.max_suggestions, 3);

        env::remove_var("VITRINA_HOME");
    }

    #[test]
    #[serial]
    fn test_project_config_overrides_user_config() {
        clear_env();
        let home = TempDir::new().unwrap();
        fs::write(
            home.path().join("config.toml"),
            "[history]\nmax_entries = 20\n[search]\nthreshold = 0.3\n",
        )
        .unwrap();
        env::set_var("VITRINA_HOME", home.path());

        let project = TempDir::new().unwrap();
        fs::create_dir_all(project.path().join(".vitrina")).unwrap();
        fs::write(
            project.path().join(".vitrina").join("config.toml"),
            "[search]\nthreshold = 0.2\n",
        )
        .unwrap();

        let config = Config::load_from_cwd(project.path());
        assert_eq!(config.history.max_entries, 20);
        assert!((config.search.threshold - 0.2).abs() < f64::EPSILON);

        env::remove_var("VITRINA_HOME");
    }

    #[test]
    #[serial]
    fn test_vitrina_home_env() {
        let dir = TempDir::new().unwrap();
        env::set_var("VITRINA_HOME", dir.path());

        assert_eq!(vitrina_home(), Some(dir.path().to_path_buf()));
        assert_eq!(storage_dir(), Some(dir.path().join("storage")));
        assert_eq!(crash_log_path(), Some(dir.path().join("crash.log")));

        env::remove_var("VITRINA_HOME");
    }

    #[test]
    fn test_save_project_round_trip() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.search.threshold = 0.35;
        config
            .dictionary
            .corrections
            .insert("selular".to_string(), "celular".to_string());

        config.save_project(dir.path()).unwrap();

        let path = dir.path().join(".vitrina").join("config.toml");
        assert!(path.exists());
        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_project_vitrina_dir_fallback() {
        let dir = TempDir::new().unwrap();
        assert_eq!(project_vitrina_dir(dir.path()), dir.path().join(".vitrina"));
    }
}
