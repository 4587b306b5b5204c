use clap::Parser;

/// Downloads the results of the municipal elections and flattens them into a single CSV table,
/// with one row per candidate (or per party, for the parties without candidates).
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON configuration file. All its keys are optional, and the
    /// command line options below take precedence over it.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) Where to write the flat table. Defaults to volby.results.csv.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (URL) The ZIP archive of the municipality registry. file:// URLs are read from disk.
    #[clap(long, value_parser)]
    pub registry_url: Option<String>,

    /// The name of the registry file inside the archive.
    #[clap(long, value_parser)]
    pub registry_entry: Option<String>,

    /// (URL template) The results of one municipality. {code} is replaced by the
    /// municipality code.
    #[clap(long, value_parser)]
    pub results_url: Option<String>,

    /// The registry column holding the municipality code.
    #[clap(long, value_parser)]
    pub code_column: Option<String>,

    /// (default ,) The delimiter of the output table. Use 'tab' for tabulations.
    #[clap(long, value_parser)]
    pub delimiter: Option<String>,

    /// (seconds, default 30) Timeout of each HTTP request. 0 disables the timeout.
    #[clap(long, value_parser)]
    pub timeout: Option<u64>,

    /// Only process the first N municipalities of the registry.
    #[clap(long, value_parser)]
    pub limit: Option<usize>,

    /// If passed as an argument, a municipality whose results contain fields that are not
    /// part of the output header is skipped.
    #[clap(long, takes_value = false)]
    pub strict_fields: bool,

    /// If passed as an argument, the program exits with status 2 when some municipalities
    /// were skipped.
    #[clap(long, takes_value = false)]
    pub fail_on_skipped: bool,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
