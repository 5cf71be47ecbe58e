//! Typed reconciliation configuration.
//!
//! The configuration is a YAML document deserialized straight into
//! [`ReconConfig`] and validated once at load time, so later stages can index
//! into it without re-checking. Lookup order for the file is:
//!
//! 1. an explicit path (the CLI `--config` flag),
//! 2. the `RECONCILE_CONFIG_PATH` environment variable,
//! 3. `config/config.yaml` under the working directory.

use std::{
    collections::{BTreeMap, HashSet},
    env, fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Deserializer, Serialize};

use crate::{classify::Category, error::ConfigError, merge::Origin};

pub const CONFIG_PATH_ENV: &str = "RECONCILE_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config/config.yaml";
pub const RESULT_COLUMN: &str = "result";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReconConfig {
    #[serde(deserialize_with = "one_or_many")]
    pub merge_key: Vec<String>,
    pub merge_suffixes: (String, String),
    pub merge_indicator: String,
    pub merge_status: MergeStatus,
    #[serde(default)]
    pub comparison_pairs: Vec<ComparisonPair>,
    pub result_labels: ResultLabels,
    #[serde(default)]
    pub rename_columns: BTreeMap<String, String>,
    #[serde(default = "default_required_columns")]
    pub required_columns: Vec<String>,
    #[serde(default)]
    pub duplicate_keys: DuplicateKeyPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MergeStatus {
    pub both: String,
    pub left_only: String,
    pub right_only: String,
}

impl MergeStatus {
    pub fn marker(&self, origin: Origin) -> &str {
        match origin {
            Origin::Both => &self.both,
            Origin::LeftOnly => &self.left_only,
            Origin::RightOnly => &self.right_only,
        }
    }

    pub fn origin_of(&self, marker: &str) -> Option<Origin> {
        [Origin::Both, Origin::LeftOnly, Origin::RightOnly]
            .into_iter()
            .find(|origin| self.marker(*origin) == marker)
    }
}

/// One field compared between the two sides of a `both` row.
///
/// Without explicit suffixes the pair uses the merge suffixes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComparisonPair {
    pub base: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffixes: Option<(String, String)>,
}

impl ComparisonPair {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            suffixes: None,
        }
    }

    pub fn columns(&self, merge_suffixes: &(String, String)) -> (String, String) {
        let (left, right) = self.suffixes.as_ref().unwrap_or(merge_suffixes);
        (format!("{}{left}", self.base), format!("{}{right}", self.base))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResultLabels {
    pub matched: String,
    pub only_internal: String,
    pub only_provider: String,
    pub mismatched: String,
}

impl ResultLabels {
    pub fn get(&self, category: Category) -> &str {
        match category {
            Category::Matched => &self.matched,
            Category::OnlyInternal => &self.only_internal,
            Category::OnlyProvider => &self.only_provider,
            Category::Mismatched => &self.mismatched,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateKeyPolicy {
    /// Every duplicate joins against every matching row on the other side.
    #[default]
    FanOut,
    Reject,
}

fn default_required_columns() -> Vec<String> {
    ["transaction_reference", "amount", "status"]
        .iter()
        .map(|c| c.to_string())
        .collect()
}

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

impl Default for ReconConfig {
    fn default() -> Self {
        let rename_columns = [
            ("transaction_reference", "Transaction Reference"),
            ("amount_internal", "Internal Amount"),
            ("amount_provider", "Provider Amount"),
            ("status_internal", "Internal Status"),
            ("status_provider", "Provider Status"),
        ]
        .into_iter()
        .map(|(from, to)| (from.to_string(), to.to_string()))
        .collect();
        Self {
            merge_key: vec!["transaction_reference".to_string()],
            merge_suffixes: ("_internal".to_string(), "_provider".to_string()),
            merge_indicator: "_merge".to_string(),
            merge_status: MergeStatus {
                both: "both".to_string(),
                left_only: "left_only".to_string(),
                right_only: "right_only".to_string(),
            },
            comparison_pairs: vec![ComparisonPair::new("amount"), ComparisonPair::new("status")],
            result_labels: ResultLabels {
                matched: "Matched".to_string(),
                only_internal: "Only in Internal".to_string(),
                only_provider: "Only in Provider".to_string(),
                mismatched: "Mismatched".to_string(),
            },
            rename_columns,
            required_columns: default_required_columns(),
            duplicate_keys: DuplicateKeyPolicy::FanOut,
        }
    }
}

impl ReconConfig {
    /// Resolves the config location: explicit path, then env var, then default.
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        if let Some(path) = explicit {
            return path.to_path_buf();
        }
        match env::var_os(CONFIG_PATH_ENV) {
            Some(value) if !value.is_empty() => PathBuf::from(value),
            _ => PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    pub fn locate(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load(&Self::resolve_path(explicit))
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: PathBuf::from("<inline>"),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml_string(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.merge_key.is_empty() {
            return invalid("merge_key must name at least one column");
        }
        let mut seen = HashSet::new();
        for key in &self.merge_key {
            if key.trim().is_empty() {
                return invalid("merge_key entries cannot be blank");
            }
            if !seen.insert(key.as_str()) {
                return invalid(format!("merge_key '{key}' is listed more than once"));
            }
        }

        check_suffixes("merge_suffixes", &self.merge_suffixes)?;

        if self.merge_indicator.trim().is_empty() {
            return invalid("merge_indicator cannot be blank");
        }
        if self.merge_indicator == RESULT_COLUMN {
            return invalid(format!(
                "merge_indicator cannot be '{RESULT_COLUMN}', that column holds the category label"
            ));
        }
        if self.merge_key.contains(&self.merge_indicator) {
            return invalid(format!(
                "merge_indicator '{}' collides with a merge key",
                self.merge_indicator
            ));
        }

        let markers = [
            &self.merge_status.both,
            &self.merge_status.left_only,
            &self.merge_status.right_only,
        ];
        if markers.iter().any(|m| m.is_empty()) {
            return invalid("merge_status values cannot be empty");
        }
        if markers.iter().collect::<HashSet<_>>().len() != markers.len() {
            return invalid("merge_status values must be distinct");
        }

        for pair in &self.comparison_pairs {
            if pair.base.trim().is_empty() {
                return invalid("comparison_pairs entries need a non-empty base");
            }
            if self.merge_key.contains(&pair.base) {
                return invalid(format!(
                    "comparison pair '{}' is a merge key and is never suffixed",
                    pair.base
                ));
            }
            if let Some(suffixes) = &pair.suffixes {
                check_suffixes(&format!("comparison pair '{}'", pair.base), suffixes)?;
            }
        }

        for category in Category::ALL {
            if self.result_labels.get(category).trim().is_empty() {
                return invalid(format!("result_labels.{} cannot be blank", category.key()));
            }
        }

        if let Some((from, _)) = self.rename_columns.iter().find(|(_, to)| to.trim().is_empty())
        {
            return invalid(format!("rename_columns target for '{from}' cannot be blank"));
        }
        Ok(())
    }
}

fn check_suffixes(context: &str, suffixes: &(String, String)) -> Result<(), ConfigError> {
    if suffixes.0.is_empty() || suffixes.1.is_empty() {
        return invalid(format!("{context}: suffixes cannot be empty"));
    }
    if suffixes.0 == suffixes.1 {
        return invalid(format!("{context}: suffixes must differ"));
    }
    Ok(())
}

fn invalid(message: impl Into<String>) -> Result<(), ConfigError> {
    Err(ConfigError::Invalid(message.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
merge_key: transaction_reference
merge_suffixes: ["_internal", "_provider"]
merge_indicator: _merge
merge_status:
  both: both
  left_only: left_only
  right_only: right_only
comparison_pairs:
  - base: amount
    suffixes: ["_internal", "_provider"]
  - base: status
result_labels:
  matched: Matched
  only_internal: Only in Internal
  only_provider: Only in Provider
  mismatched: Mismatched
rename_columns:
  amount_internal: Internal Amount
"#;

    #[test]
    fn parses_single_key_and_defaults() {
        let config = ReconConfig::from_yaml_str(SAMPLE).unwrap();
        assert_eq!(config.merge_key, vec!["transaction_reference"]);
        assert_eq!(config.comparison_pairs.len(), 2);
        assert_eq!(config.required_columns, default_required_columns());
        assert_eq!(config.duplicate_keys, DuplicateKeyPolicy::FanOut);
        assert_eq!(
            config.comparison_pairs[1].columns(&config.merge_suffixes),
            ("status_internal".to_string(), "status_provider".to_string())
        );
    }

    #[test]
    fn parses_key_list() {
        let raw = SAMPLE.replace(
            "merge_key: transaction_reference",
            "merge_key: [transaction_reference, currency]",
        );
        let config = ReconConfig::from_yaml_str(&raw).unwrap();
        assert_eq!(config.merge_key, vec!["transaction_reference", "currency"]);
    }

    #[test]
    fn rejects_unknown_fields() {
        let raw = format!("{SAMPLE}\nfuzzy_match: true\n");
        assert!(matches!(
            ReconConfig::from_yaml_str(&raw),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn rejects_identical_suffixes() {
        let raw = SAMPLE.replace(
            "merge_suffixes: [\"_internal\", \"_provider\"]",
            "merge_suffixes: [\"_x\", \"_x\"]",
        );
        let err = ReconConfig::from_yaml_str(&raw).unwrap_err();
        assert!(err.to_string().contains("suffixes must differ"), "{err}");
    }

    #[test]
    fn rejects_duplicate_merge_status_markers() {
        let raw = SAMPLE.replace("right_only: right_only", "right_only: both");
        let err = ReconConfig::from_yaml_str(&raw).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn default_config_is_valid_and_round_trips_through_yaml() {
        let config = ReconConfig::default();
        config.validate().unwrap();
        let yaml = config.to_yaml_string().unwrap();
        assert_eq!(ReconConfig::from_yaml_str(&yaml).unwrap(), config);
    }

    #[test]
    fn merge_status_maps_markers_to_origins() {
        let status = ReconConfig::default().merge_status;
        assert_eq!(status.origin_of("left_only"), Some(Origin::LeftOnly));
        assert_eq!(status.origin_of("nope"), None);
        assert_eq!(status.marker(Origin::RightOnly), "right_only");
    }

    #[test]
    fn resolve_path_prefers_explicit_argument() {
        let explicit = Path::new("custom.yaml");
        assert_eq!(ReconConfig::resolve_path(Some(explicit)), PathBuf::from("custom.yaml"));
    }
}
