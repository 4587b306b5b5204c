mod args;
mod volby;

use clap::Parser;
use log::{error, info};
use std::error::Error;
use std::process::ExitCode;

use crate::args::Args;
use crate::volby::config_reader::{read_config, ConfigFile, RunConfig};
use crate::volby::{run_scrape, VolbyResult};

fn build_config(args: &Args) -> VolbyResult<RunConfig> {
    let file = match &args.config {
        Some(path) => read_config(path)?,
        None => ConfigFile::default(),
    };
    let config = ConfigFile {
        registry_url: args.registry_url.clone().or(file.registry_url),
        registry_entry_name: args.registry_entry.clone().or(file.registry_entry_name),
        results_url_template: args.results_url.clone().or(file.results_url_template),
        code_column_name: args.code_column.clone().or(file.code_column_name),
        output_field_names: file.output_field_names,
        output_path: args.out.clone().or(file.output_path),
        delimiter: args.delimiter.clone().or(file.delimiter),
        request_timeout_secs: args.timeout.or(file.request_timeout_secs),
        strict_fields: if args.strict_fields {
            Some(true)
        } else {
            file.strict_fields
        },
        limit: args.limit.or(file.limit),
    };
    config.resolve()
}

fn report_fatal(e: &dyn Error) {
    eprintln!("An error occured: {}", e);
    let mut source = e.source();
    while let Some(s) = source {
        eprintln!("  caused by: {}", s);
        source = s.source();
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let res = build_config(&args).and_then(|config| {
        info!("config: {:?}", config);
        run_scrape(&config)
    });

    match res {
        Ok(summary) => {
            info!(
                "Done: {} rows from {} municipalities, {} skipped",
                summary.rows_written,
                summary.processed,
                summary.failed.len()
            );
            if args.fail_on_skipped && !summary.failed.is_empty() {
                ExitCode::from(2)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            error!("Fatal error {:?}", e);
            report_fatal(&e);
            ExitCode::FAILURE
        }
    }
}
