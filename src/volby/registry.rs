// Reading the municipality registry: a CSV file inside a ZIP archive.

use std::io::{Cursor, Read};

use crate::volby::http::Transport;
use crate::volby::*;

/// One line of the registry, keyed by the header names.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RegistryRow {
    pub lineno: usize,
    pub fields: AttrBag,
}

/// Downloads the archive and parses the given entry.
///
/// The registry is published in Windows-1250, with `;` as the separator.
pub fn load_registry(
    transport: &dyn Transport,
    archive_url: &str,
    entry_name: &str,
) -> VolbyResult<Vec<RegistryRow>> {
    info!("Attempting to read registry {:?} from {:?}", entry_name, archive_url);
    let archive = transport
        .get(archive_url)
        .context(RegistryDownloadSnafu { url: archive_url })?;
    let raw = read_archive_entry(&archive, entry_name)?;
    let text = decode_windows_1250(&raw);
    let rows = parse_registry(&text)?;
    info!("load_registry: {} rows", rows.len());
    Ok(rows)
}

fn read_archive_entry(archive: &[u8], entry_name: &str) -> VolbyResult<Vec<u8>> {
    let mut zip = zip::ZipArchive::new(Cursor::new(archive)).context(RegistryArchiveSnafu {})?;
    debug!("read_archive_entry: {} entries", zip.len());
    let mut entry = zip
        .by_name(entry_name)
        .context(RegistryEntrySnafu { entry: entry_name })?;
    let mut raw: Vec<u8> = Vec::new();
    entry
        .read_to_end(&mut raw)
        .context(RegistryReadSnafu { entry: entry_name })?;
    Ok(raw)
}

fn decode_windows_1250(raw: &[u8]) -> String {
    let (text, had_errors) = encoding_rs::WINDOWS_1250.decode_without_bom_handling(raw);
    if had_errors {
        warn!("decode_windows_1250: some bytes could not be decoded and were replaced");
    }
    text.into_owned()
}

fn parse_registry(text: &str) -> VolbyResult<Vec<RegistryRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .from_reader(text.as_bytes());
    let header = rdr
        .headers()
        .context(RegistryCsvSnafu { lineno: 1usize })?
        .clone();
    debug!("parse_registry: header: {:?}", header);

    let mut res: Vec<RegistryRow> = Vec::new();
    for (idx, line_r) in rdr.records().enumerate() {
        // The header is line 1.
        let lineno = idx + 2;
        let line = line_r.context(RegistryCsvSnafu { lineno })?;
        let fields: AttrBag = header.iter().zip(line.iter()).collect();
        res.push(RegistryRow { lineno, fields });
    }
    Ok(res)
}

/// The codes of all the municipalities, in registry order.
pub fn extract_codes(rows: &[RegistryRow], column: &str) -> VolbyResult<Vec<MunicipalityCode>> {
    rows.iter()
        .map(|row| {
            row.fields
                .get(column)
                .map(|c| MunicipalityCode(c.to_string()))
                .context(MissingColumnSnafu {
                    column,
                    lineno: row.lineno,
                })
        })
        .collect()
}
