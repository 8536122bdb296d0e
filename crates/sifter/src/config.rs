//! Pipeline configuration and its JSON persistence.
//!
//! Every mapping the stages depend on (rename rules, merge groups, fill
//! labels, the schema contract) lives here and is handed to the transform
//! operations explicitly. [`PipelineConfig::default`] reproduces the layout of
//! the Star Wars survey export.

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SifterError};
use crate::input::ParserConfig;
use crate::schema::SchemaContract;
use crate::sink::SinkConfig;
use crate::transform::{MissingColumnPolicy, RenamePolicy, RenameRule, TransformOperation};

/// Default input file.
pub const DEFAULT_INPUT: &str = "StarWars.csv";

/// Default CSV output file.
pub const DEFAULT_OUTPUT: &str = "output.csv";

/// Default separator for merged answers.
pub const DEFAULT_SEPARATOR: &str = " , ";

const RENAME_RULES: &[(&str, &str)] = &[
    ("have_you_seen_any_of_the_6_films", "has_seen_star_wars"),
    ("do_you_consider_yourself_to_be_a_fan_of_the_star_w", "are_you_a_fan"),
    ("which_of_the_following_star_wars_films_have_you_se", "star_wars_films_seen"),
    ("please_rank_the_star_wars_films_in_order_of_prefer", "star_wars_film_ranking"),
    ("please_state_whether_you_view_the_following_charac", "character_opinion"),
    ("which_character_shot_first", "first_shooter"),
    ("are_you_familiar_with_the_expanded_universe", "familiar_with_expanded_universe"),
    ("do_you_consider_yourself_to_be_a_fan_of_the_expand", "fan_of_expanded_universe"),
    ("do_you_consider_yourself_to_be_a_fan_of_the_star_t", "st_fan"),
];

const MERGE_GROUPS: &[(&str, &[&str])] = &[
    ("star_wars_films_seen", &["c4", "c5", "c6", "c7", "c8"]),
    ("star_wars_film_ranking", &["c10", "c11", "c12", "c13", "c14"]),
    (
        "character_opinion",
        &[
            "c16", "c17", "c18", "c19", "c20", "c21", "c22", "c23", "c24", "c25", "c26", "c27",
            "c28",
        ],
    ),
];

const FILL_DEFAULTS: &[(&str, &str)] = &[
    ("are_you_a_fan", "N/A"),
    ("star_wars_films_seen", "None"),
    ("star_wars_film_ranking", "No Rankings"),
    ("character_opinion", "N/A"),
    ("first_shooter", "N/A"),
    ("familiar_with_expanded_universe", "N/A"),
    ("fan_of_expanded_universe", "N/A"),
    ("st_fan", "N/A"),
    ("gender", "N/A"),
    ("age", "N/A"),
    ("household_income", "N/A"),
    ("education", "N/A"),
    ("location_census_region", "N/A"),
];

/// Which rows count as a repeated header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderFilterConfig {
    /// Column inspected; the stage is skipped when it is absent.
    pub column: String,
    /// Case-sensitive substring marking a header row.
    pub marker: String,
}

impl Default for HeaderFilterConfig {
    fn default() -> Self {
        Self {
            column: "has_seen_star_wars".to_string(),
            marker: "Response".to_string(),
        }
    }
}

/// Where the cleaned dataset goes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// CSV file to overwrite (None = skip).
    pub csv: Option<PathBuf>,
    /// Relational table to overwrite (None = skip).
    pub database: Option<SinkConfig>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            csv: Some(PathBuf::from(DEFAULT_OUTPUT)),
            database: Some(SinkConfig::default()),
        }
    }
}

/// Configuration for a whole cleaning run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Loader settings.
    pub parser: ParserConfig,
    /// Prefix renames, applied in order.
    pub rename_rules: Vec<RenameRule>,
    /// Handling of prefixes matching several columns.
    pub rename_policy: RenamePolicy,
    /// Repeated-header detection.
    pub header_filter: HeaderFilterConfig,
    /// Target column to ordered companion columns.
    pub merge_groups: IndexMap<String, Vec<String>>,
    /// Separator placed between merged answers.
    pub merge_separator: String,
    /// Handling of merge columns that are not present.
    pub missing_column_policy: MissingColumnPolicy,
    /// Column to label written over its nulls.
    pub fill_defaults: IndexMap<String, String>,
    /// Extra columns required once names are final.
    pub contract: SchemaContract,
    /// Sinks.
    pub output: OutputConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            parser: ParserConfig::default(),
            rename_rules: RENAME_RULES
                .iter()
                .map(|(prefix, name)| RenameRule::new(*prefix, *name))
                .collect(),
            rename_policy: RenamePolicy::First,
            header_filter: HeaderFilterConfig::default(),
            merge_groups: MERGE_GROUPS
                .iter()
                .map(|(target, companions)| {
                    (
                        target.to_string(),
                        companions.iter().map(|c| c.to_string()).collect(),
                    )
                })
                .collect(),
            merge_separator: DEFAULT_SEPARATOR.to_string(),
            missing_column_policy: MissingColumnPolicy::Fail,
            fill_defaults: FILL_DEFAULTS
                .iter()
                .map(|(column, label)| (column.to_string(), label.to_string()))
                .collect(),
            contract: SchemaContract::default(),
            output: OutputConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Check the configuration for mistakes that would make stages misbehave.
    pub fn validate(&self) -> Result<()> {
        let mut targets = HashSet::new();
        for rule in &self.rename_rules {
            if rule.prefix.is_empty() {
                return Err(SifterError::Config(format!(
                    "Rename rule for '{}' has an empty prefix",
                    rule.name
                )));
            }
            if !targets.insert(rule.name.as_str()) {
                return Err(SifterError::Config(format!(
                    "Several rename rules target '{}'",
                    rule.name
                )));
            }
        }

        for (target, companions) in &self.merge_groups {
            if companions.iter().any(|c| c == target) {
                return Err(SifterError::Config(format!(
                    "Merge group '{}' lists itself as a companion",
                    target
                )));
            }
        }

        if self.header_filter.marker.is_empty() {
            return Err(SifterError::Config(
                "Header filter marker must not be empty".to_string(),
            ));
        }

        if let Some(database) = &self.output.database {
            database.validate()?;
        }

        Ok(())
    }

    /// The contract checked before any value is rewritten.
    ///
    /// Under [`MissingColumnPolicy::Fail`] every merge target and companion
    /// is required as well, so absent columns are reported up front.
    pub fn effective_contract(&self) -> SchemaContract {
        let contract = self.contract.clone();
        match self.missing_column_policy {
            MissingColumnPolicy::Fail => contract.require(
                self.merge_groups
                    .iter()
                    .flat_map(|(target, companions)| std::iter::once(target).chain(companions))
                    .cloned(),
            ),
            MissingColumnPolicy::Skip => contract,
        }
    }

    /// The ordered stage list for this configuration.
    pub fn operations(&self) -> Vec<TransformOperation> {
        vec![
            TransformOperation::NormalizeNames,
            TransformOperation::DropEmptyColumns,
            TransformOperation::RenameByPrefix {
                rules: self.rename_rules.clone(),
                policy: self.rename_policy,
            },
            TransformOperation::DropHeaderRows {
                column: self.header_filter.column.clone(),
                marker: self.header_filter.marker.clone(),
            },
            TransformOperation::ValidateSchema {
                contract: self.effective_contract(),
            },
            TransformOperation::MergeColumns {
                groups: self.merge_groups.clone(),
                separator: self.merge_separator.clone(),
                policy: self.missing_column_policy,
            },
            TransformOperation::EmptyToNull,
            TransformOperation::FillNulls {
                defaults: self.fill_defaults.clone(),
            },
        ]
    }

    /// Save the configuration to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| SifterError::io(parent, e))?;
            }
        }

        let file = File::create(path).map_err(|e| SifterError::io(path, e))?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }

    /// Load a configuration from a JSON file. Missing fields take defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| SifterError::io(path, e))?;
        let config: PipelineConfig = serde_json::from_reader(BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }
}
