use crate::volby::fetcher::has_placeholder;
use crate::volby::*;

use serde::{Deserialize, Serialize};
use std::fs;
use std::time::Duration;

// Municipal elections 2018, as published on volby.cz
pub const DEFAULT_REGISTRY_URL: &str =
    "https://www.volby.cz/opendata/kv2018/KV2018reg20181008_csv.zip";
pub const DEFAULT_REGISTRY_ENTRY: &str = "kvrzcoco.csv";
pub const DEFAULT_RESULTS_URL_TEMPLATE: &str =
    "https://www.volby.cz/pls/kv2018/vysledky_obec?cislo_obce={code}";
pub const DEFAULT_CODE_COLUMN: &str = "KODZASTUP";
pub const DEFAULT_OUTPUT_PATH: &str = "volby.results.csv";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// The output header. HLASY and HLASY_PROC appear twice: once for the party
/// and once for the candidate. A row only holds one value for each, so both
/// columns carry the same (most specific) value.
pub const DEFAULT_FIELD_NAMES: [&str; 29] = [
    "KODZASTUP",
    "NAZEVZAST",
    "OZNAC_TYPU",
    "VOLENO_ZASTUP",
    "POCET_OBVODU",
    "JE_SPOCTENO",
    "OKRSKY_CELKEM",
    "OKRSKY_ZPRAC",
    "OKRSKY_ZPRAC_PROC",
    "ZAPSANI_VOLICI",
    "VYDANE_OBALKY",
    "UCAST_PROC",
    "ODEVZDANE_OBALKY",
    "PLATNE_HLASY",
    "POR_STR_HLAS_LIST",
    "VSTRANA",
    "NAZEV_STRANY",
    "HLASY",
    "HLASY_PROC",
    "KANDIDATU_POCET",
    "ZASTUPITELE_POCET",
    "ZASTUPITELE_PROC",
    "PORADOVE_CISLO",
    "JMENO",
    "PRIJMENI",
    "TITULPRED",
    "TITULZA",
    "HLASY",
    "HLASY_PROC",
];

/// The configuration file, as written by the user. All the keys are optional.
#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(rename = "registryUrl")]
    pub registry_url: Option<String>,
    #[serde(rename = "registryEntryName")]
    pub registry_entry_name: Option<String>,
    #[serde(rename = "resultsUrlTemplate")]
    pub results_url_template: Option<String>,
    #[serde(rename = "codeColumnName")]
    pub code_column_name: Option<String>,
    #[serde(rename = "outputFieldNames")]
    pub output_field_names: Option<Vec<String>>,
    #[serde(rename = "outputPath")]
    pub output_path: Option<String>,
    pub delimiter: Option<String>,
    // 0 disables the timeout
    #[serde(rename = "requestTimeoutSecs")]
    pub request_timeout_secs: Option<u64>,
    #[serde(rename = "strictFields")]
    pub strict_fields: Option<bool>,
    pub limit: Option<usize>,
}

/// The validated settings of a run.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RunConfig {
    pub registry_url: String,
    pub registry_entry_name: String,
    pub results_url_template: String,
    pub code_column_name: String,
    pub output_field_names: Vec<String>,
    pub output_path: String,
    pub delimiter: u8,
    pub request_timeout: Option<Duration>,
    /// Skip a municipality when its document has fields that are not in the header.
    pub strict_fields: bool,
    /// Only process the first municipalities of the registry.
    pub limit: Option<usize>,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            registry_url: DEFAULT_REGISTRY_URL.to_string(),
            registry_entry_name: DEFAULT_REGISTRY_ENTRY.to_string(),
            results_url_template: DEFAULT_RESULTS_URL_TEMPLATE.to_string(),
            code_column_name: DEFAULT_CODE_COLUMN.to_string(),
            output_field_names: DEFAULT_FIELD_NAMES.iter().map(|s| s.to_string()).collect(),
            output_path: DEFAULT_OUTPUT_PATH.to_string(),
            delimiter: b',',
            request_timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            strict_fields: false,
            limit: None,
        }
    }
}

impl ConfigFile {
    pub fn resolve(self) -> VolbyResult<RunConfig> {
        let defaults = RunConfig::default();

        let results_url_template = self
            .results_url_template
            .unwrap_or(defaults.results_url_template);
        ensure!(
            has_placeholder(&results_url_template),
            InvalidTemplateSnafu {
                template: results_url_template
            }
        );

        let output_field_names = self
            .output_field_names
            .unwrap_or(defaults.output_field_names);
        ensure!(!output_field_names.is_empty(), EmptyHeaderSnafu {});

        let delimiter = match self.delimiter {
            None => defaults.delimiter,
            Some(d) => read_delimiter(&d)?,
        };

        let request_timeout = match self.request_timeout_secs {
            Some(0) => None,
            Some(x) => Some(Duration::from_secs(x)),
            None => defaults.request_timeout,
        };

        Ok(RunConfig {
            registry_url: self.registry_url.unwrap_or(defaults.registry_url),
            registry_entry_name: self
                .registry_entry_name
                .unwrap_or(defaults.registry_entry_name),
            results_url_template,
            code_column_name: self.code_column_name.unwrap_or(defaults.code_column_name),
            output_field_names,
            output_path: self.output_path.unwrap_or(defaults.output_path),
            delimiter,
            request_timeout,
            strict_fields: self.strict_fields.unwrap_or(defaults.strict_fields),
            limit: self.limit,
        })
    }
}

fn read_delimiter(s: &str) -> VolbyResult<u8> {
    match s {
        "\\t" | "tab" => Ok(b'\t'),
        _ if s.len() == 1 && s.is_ascii() => Ok(s.as_bytes()[0]),
        _ => InvalidDelimiterSnafu { delimiter: s }.fail(),
    }
}

pub fn read_config(path: &str) -> VolbyResult<ConfigFile> {
    let contents = fs::read_to_string(path).context(OpeningConfigSnafu { path })?;
    let config: ConfigFile =
        serde_json::from_str(contents.as_str()).context(ParsingConfigSnafu { path })?;
    debug!("read_config: {:?}", config);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config: ConfigFile = serde_json::from_str("{}").unwrap();
        let rc = config.resolve().unwrap();
        assert_eq!(rc, RunConfig::default());
        assert_eq!(rc.output_field_names.len(), 29);
        assert_eq!(
            rc.output_field_names
                .iter()
                .filter(|n| n.as_str() == "HLASY")
                .count(),
            2
        );
    }

    #[test]
    fn keys_override_defaults() {
        let config: ConfigFile = serde_json::from_str(
            r#"{
                "registryUrl": "file:///tmp/reg.zip",
                "resultsUrlTemplate": "https://v.example/obec?cislo_obce=%s",
                "outputFieldNames": ["KODZASTUP", "JMENO"],
                "outputPath": "out.csv",
                "delimiter": "tab",
                "requestTimeoutSecs": 0,
                "strictFields": true,
                "limit": 10
            }"#,
        )
        .unwrap();
        let rc = config.resolve().unwrap();
        assert_eq!(rc.registry_url, "file:///tmp/reg.zip");
        assert_eq!(rc.registry_entry_name, DEFAULT_REGISTRY_ENTRY);
        assert_eq!(rc.output_field_names, vec!["KODZASTUP", "JMENO"]);
        assert_eq!(rc.delimiter, b'\t');
        assert_eq!(rc.request_timeout, None);
        assert!(rc.strict_fields);
        assert_eq!(rc.limit, Some(10));
    }

    #[test]
    fn template_without_placeholder_is_rejected() {
        let config = ConfigFile {
            results_url_template: Some("https://v.example/obec".to_string()),
            ..ConfigFile::default()
        };
        assert!(matches!(
            config.resolve(),
            Err(VolbyError::InvalidTemplate { .. })
        ));
    }

    #[test]
    fn bad_delimiter_is_rejected() {
        let config = ConfigFile {
            delimiter: Some(";;".to_string()),
            ..ConfigFile::default()
        };
        assert!(matches!(
            config.resolve(),
            Err(VolbyError::InvalidDelimiter { .. })
        ));
    }

    #[test]
    fn empty_header_is_rejected() {
        let config = ConfigFile {
            output_field_names: Some(vec![]),
            ..ConfigFile::default()
        };
        assert!(matches!(config.resolve(), Err(VolbyError::EmptyHeader {})));
    }

    #[test]
    fn reads_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("volby.json");
        fs::write(&path, r#"{"codeColumnName": "KODZASTUP2"}"#).unwrap();
        let config = read_config(&path.display().to_string()).unwrap();
        assert_eq!(config.code_column_name, Some("KODZASTUP2".to_string()));

        fs::write(&path, "{").unwrap();
        assert!(matches!(
            read_config(&path.display().to_string()),
            Err(VolbyError::ParsingConfig { .. })
        ));
    }
}
