use log::{debug, info, warn};

use result_flattening::*;
use snafu::{prelude::*, Snafu};

use std::io::Write;

pub mod config_reader;
pub mod fetcher;
pub mod http;
pub mod output;
pub mod registry;

use crate::volby::config_reader::RunConfig;
use crate::volby::fetcher::fetch_results;
use crate::volby::http::{HttpTransport, Transport, TransportError};
use crate::volby::output::{create_output_file, OutputTable};
use crate::volby::registry::{extract_codes, load_registry};

/// Errors that stop the whole run.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum VolbyError {
    #[snafu(display("Error opening configuration file {path}"))]
    OpeningConfig {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing configuration file {path}"))]
    ParsingConfig {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Results URL template {template:?} has no {{code}} or %s placeholder"))]
    InvalidTemplate { template: String },
    #[snafu(display("Delimiter {delimiter:?} is not a single ASCII character"))]
    InvalidDelimiter { delimiter: String },
    #[snafu(display("The list of output field names is empty"))]
    EmptyHeader {},

    #[snafu(display("Cannot create the HTTP client"))]
    HttpClient { source: reqwest::Error },

    #[snafu(display("Error downloading the registry from {url}"))]
    RegistryDownload { source: TransportError, url: String },
    #[snafu(display("Error opening the registry archive"))]
    RegistryArchive { source: zip::result::ZipError },
    #[snafu(display("Cannot find {entry} in the registry archive"))]
    RegistryEntry {
        source: zip::result::ZipError,
        entry: String,
    },
    #[snafu(display("Error reading {entry} from the registry archive"))]
    RegistryRead {
        source: std::io::Error,
        entry: String,
    },
    #[snafu(display("Error parsing the registry at line {lineno}"))]
    RegistryCsv { source: csv::Error, lineno: usize },
    #[snafu(display("Registry line {lineno} has no column {column}"))]
    MissingColumn { column: String, lineno: usize },

    #[snafu(display("Error opening output file {path}"))]
    OpeningOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error writing the output table"))]
    WritingOutput { source: csv::Error },
    #[snafu(display("Error flushing the output table"))]
    FlushingOutput { source: std::io::Error },
    #[snafu(display("Error writing the progress report"))]
    Reporting { source: std::io::Error },
}

pub type VolbyResult<T> = Result<T, VolbyError>;

/// Errors that only skip one municipality.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ItemError {
    #[snafu(display("download failed: {source}"))]
    Download {
        code: MunicipalityCode,
        source: TransportError,
    },
    #[snafu(display("response is not valid UTF-8: {source}"))]
    Encoding {
        code: MunicipalityCode,
        source: std::str::Utf8Error,
    },
    #[snafu(display("invalid XML: {source}"))]
    ParsingXml {
        code: MunicipalityCode,
        source: roxmltree::Error,
    },
    #[snafu(display("unexpected document shape: {source}"))]
    Shape {
        code: MunicipalityCode,
        source: FlattenErrors,
    },
    #[snafu(display("field {field} is not part of the output header"))]
    UnknownField {
        code: MunicipalityCode,
        field: String,
    },
}

impl ItemError {
    pub fn code(&self) -> &MunicipalityCode {
        match self {
            ItemError::Download { code, .. }
            | ItemError::Encoding { code, .. }
            | ItemError::ParsingXml { code, .. }
            | ItemError::Shape { code, .. }
            | ItemError::UnknownField { code, .. } => code,
        }
    }
}

/// What happened during a run.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct RunSummary {
    pub total: usize,
    pub processed: usize,
    pub rows_written: usize,
    /// The skipped municipalities, with the reason.
    pub failed: Vec<(MunicipalityCode, String)>,
}

/// Fetches and flattens one municipality, and projects the rows onto the output header.
///
/// Nothing is returned unless every step succeeded, so that a failing
/// municipality never leaves partial rows in the output.
fn process_municipality(
    config: &RunConfig,
    transport: &dyn Transport,
    code: &MunicipalityCode,
) -> Result<Vec<Vec<String>>, ItemError> {
    let tree = fetch_results(transport, &config.results_url_template, code)?;
    let rows = flatten(&tree).context(ShapeSnafu { code: code.clone() })?;

    for row in rows.iter() {
        let unknown = row.unknown_fields(&config.output_field_names);
        if let Some(field) = unknown.first() {
            if config.strict_fields {
                return UnknownFieldSnafu {
                    code: code.clone(),
                    field: field.to_string(),
                }
                .fail();
            }
            debug!(
                "process_municipality: {}: dropping fields {:?}",
                code, unknown
            );
        }
    }

    Ok(rows
        .iter()
        .map(|row| {
            row.project(&config.output_field_names)
                .into_iter()
                .map(String::from)
                .collect()
        })
        .collect())
}

/// Runs the whole scrape: registry, then every municipality in registry order.
///
/// The output is only opened once the list of municipalities is known.
/// Progress lines go to `progress`, one line per skipped municipality goes
/// to `diagnostics`.
pub fn run_batch<W, F>(
    config: &RunConfig,
    transport: &dyn Transport,
    open_output: F,
    progress: &mut dyn Write,
    diagnostics: &mut dyn Write,
) -> VolbyResult<RunSummary>
where
    W: Write,
    F: FnOnce() -> VolbyResult<W>,
{
    let registry = load_registry(
        transport,
        &config.registry_url,
        &config.registry_entry_name,
    )?;
    let mut codes = extract_codes(&registry, &config.code_column_name)?;
    if let Some(limit) = config.limit {
        codes.truncate(limit);
    }
    info!("run_batch: {} municipalities to process", codes.len());

    let mut table = OutputTable::new(
        open_output()?,
        &config.output_field_names,
        config.delimiter,
    )?;

    let total = codes.len();
    let mut summary = RunSummary {
        total,
        ..RunSummary::default()
    };
    for (idx, code) in codes.iter().enumerate() {
        match process_municipality(config, transport, code) {
            Ok(rows) => {
                table.write_rows(&rows)?;
                summary.processed += 1;
            }
            Err(e) => {
                warn!("Skipping municipality {}: {:?}", e.code(), e);
                writeln!(diagnostics, "Error in processing {}: {}", code, e)
                    .context(ReportingSnafu {})?;
                summary.failed.push((code.clone(), e.to_string()));
            }
        }
        let position = idx + 1;
        writeln!(
            progress,
            "{}\t{}/{}\t{:.2} %",
            code,
            position,
            total,
            100.0 * position as f64 / total as f64
        )
        .context(ReportingSnafu {})?;
    }

    summary.rows_written = table.finish()?;
    info!(
        "run_batch: {} rows written, {} of {} municipalities skipped",
        summary.rows_written,
        summary.failed.len(),
        total
    );
    Ok(summary)
}

/// Runs the scrape against the network, writing the table to the configured file.
pub fn run_scrape(config: &RunConfig) -> VolbyResult<RunSummary> {
    let transport = HttpTransport::new(config.request_timeout).context(HttpClientSnafu {})?;
    let stdout = std::io::stdout();
    let stderr = std::io::stderr();
    run_batch(
        config,
        &transport,
        || create_output_file(&config.output_path),
        &mut stdout.lock(),
        &mut stderr.lock(),
    )
}
