// The flat output table.

use std::fs::File;
use std::io::Write;

use crate::volby::*;

/// A CSV table with a fixed header. Rows are only appended.
pub struct OutputTable<W: Write> {
    writer: csv::Writer<W>,
    width: usize,
    rows_written: usize,
}

impl<W: Write> OutputTable<W> {
    /// Wraps the sink and writes the header.
    ///
    /// Field names may repeat: the header is written as given.
    pub fn new(sink: W, field_names: &[String], delimiter: u8) -> VolbyResult<OutputTable<W>> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(sink);
        writer
            .write_record(field_names)
            .context(WritingOutputSnafu {})?;
        Ok(OutputTable {
            writer,
            width: field_names.len(),
            rows_written: 0,
        })
    }

    /// Appends rows that were already projected onto the header.
    pub fn write_rows(&mut self, rows: &[Vec<String>]) -> VolbyResult<()> {
        for row in rows {
            debug_assert_eq!(row.len(), self.width);
            self.writer.write_record(row).context(WritingOutputSnafu {})?;
            self.rows_written += 1;
        }
        Ok(())
    }

    /// Flushes the table and returns the number of rows written.
    pub fn finish(mut self) -> VolbyResult<usize> {
        self.writer.flush().context(FlushingOutputSnafu {})?;
        Ok(self.rows_written)
    }
}

pub fn create_output_file(path: &str) -> VolbyResult<File> {
    info!("Writing results to {:?}", path);
    File::create(path).context(OpeningOutputSnafu { path })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn header_keeps_duplicates() {
        let mut out: Vec<u8> = Vec::new();
        let table = OutputTable::new(&mut out, &names(&["HLASY", "JMENO", "HLASY"]), b',').unwrap();
        assert_eq!(table.finish().unwrap(), 0);
        assert_eq!(String::from_utf8(out).unwrap(), "HLASY,JMENO,HLASY\n");
    }

    #[test]
    fn rows_use_the_delimiter() {
        let mut out: Vec<u8> = Vec::new();
        let mut table = OutputTable::new(&mut out, &names(&["A", "B"]), b';').unwrap();
        table
            .write_rows(&[names(&["1", "Obec; sever"]), names(&["2", ""])])
            .unwrap();
        assert_eq!(table.finish().unwrap(), 2);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "A;B\n1;\"Obec; sever\"\n2;\n"
        );
    }

    #[test]
    fn output_file_in_missing_directory_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.csv");
        let res = create_output_file(&path.display().to_string());
        assert!(matches!(res, Err(VolbyError::OpeningOutput { .. })));
    }
}
