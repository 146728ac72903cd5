//! CSV persistence of event records.
//!
//! One row per record, in emission order, under the fixed
//! `CSV_COLUMNS` header. Missing fields are written as empty cells.

use super::json::{ensure_parent_dir, validate_output_path};
use crate::parser::schema::EventRecord;
use crate::utils::config::CSV_COLUMNS;
use crate::utils::error::OutputError;
use csv::{ReaderBuilder, Writer, WriterBuilder};
use log::{debug, info};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

/// Row writer for the records CSV
pub struct CsvRecordWriter {
    writer: Writer<File>,
    path: PathBuf,
    rows: u64,
}

impl CsvRecordWriter {
    /// Create (or truncate) `path` and write the header
    ///
    /// **Public** - used for one-shot conversion
    pub fn create(path: impl AsRef<Path>) -> Result<Self, OutputError> {
        let path = path.as_ref();
        validate_output_path(path)?;
        ensure_parent_dir(path)?;

        let file = File::create(path).map_err(OutputError::WriteFailed)?;
        let mut writer = Self::wrap(file, path);
        writer.write_header()?;

        info!("Writing records to: {}", path.display());
        Ok(writer)
    }

    /// Open `path` for appending
    ///
    /// **Public** - used by the follow session
    ///
    /// The header is written only when the file is new or empty, so
    /// repeated runs keep extending the same table.
    ///
    /// # Errors
    /// * `OutputError::SchemaMismatch` - the existing file has other columns;
    ///   nothing is written to it
    pub fn append(path: impl AsRef<Path>) -> Result<Self, OutputError> {
        let path = path.as_ref();
        validate_output_path(path)?;
        ensure_parent_dir(path)?;

        let needs_header = std::fs::metadata(path)
            .map(|m| m.len() == 0)
            .unwrap_or(true);
        if !needs_header {
            check_existing_header(path)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(OutputError::WriteFailed)?;

        let mut writer = Self::wrap(file, path);
        if needs_header {
            writer.write_header()?;
        } else {
            debug!("Appending to existing table: {}", path.display());
        }

        Ok(writer)
    }

    fn wrap(file: File, path: &Path) -> Self {
        Self {
            writer: WriterBuilder::new().has_headers(false).from_writer(file),
            path: path.to_path_buf(),
            rows: 0,
        }
    }

    fn write_header(&mut self) -> Result<(), OutputError> {
        self.writer.write_record(CSV_COLUMNS)?;
        Ok(())
    }

    /// Append one row
    pub fn write_record(&mut self, record: &EventRecord) -> Result<(), OutputError> {
        self.writer.serialize(record)?;
        self.rows += 1;
        Ok(())
    }

    /// Append rows in iteration order
    pub fn write_all<'a, I>(&mut self, records: I) -> Result<(), OutputError>
    where
        I: IntoIterator<Item = &'a EventRecord>,
    {
        for record in records {
            self.write_record(record)?;
        }
        Ok(())
    }

    /// Push buffered rows to disk
    pub fn flush(&mut self) -> Result<(), OutputError> {
        self.writer.flush().map_err(OutputError::WriteFailed)
    }

    /// Rows written through this writer (header excluded)
    pub fn rows_written(&self) -> u64 {
        self.rows
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Fail unless the first row of `path` is exactly `CSV_COLUMNS`
fn check_existing_header(path: &Path) -> Result<(), OutputError> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let headers = reader.headers()?;

    if headers.iter().eq(CSV_COLUMNS.iter().copied()) {
        Ok(())
    } else {
        Err(OutputError::SchemaMismatch(
            headers.iter().collect::<Vec<_>>().join(","),
        ))
    }
}

/// Write a full record collection to a fresh CSV file
///
/// **Public** - convenience wrapper over [`CsvRecordWriter`]
pub fn write_records_csv(
    records: &[EventRecord],
    output_path: impl AsRef<Path>,
) -> Result<(), OutputError> {
    let mut writer = CsvRecordWriter::create(output_path)?;
    writer.write_all(records)?;
    writer.flush()?;

    info!(
        "{} rows written to {}",
        writer.rows_written(),
        writer.path().display()
    );
    Ok(())
}

/// Read a records CSV back
///
/// # Errors
/// * `OutputError::SchemaMismatch` - header differs from `CSV_COLUMNS`
/// * `OutputError::Csv` - unreadable file or malformed row
pub fn read_records(input_path: impl AsRef<Path>) -> Result<Vec<EventRecord>, OutputError> {
    let input_path = input_path.as_ref();
    debug!("Reading records from: {}", input_path.display());

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_path(input_path)?;

    let headers = reader.headers()?;
    if !headers.iter().eq(CSV_COLUMNS.iter().copied()) {
        return Err(OutputError::SchemaMismatch(
            headers.iter().collect::<Vec<_>>().join(","),
        ));
    }

    let records = reader
        .deserialize()
        .collect::<Result<Vec<EventRecord>, _>>()?;

    debug!("Loaded {} records", records.len());
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_record(ts: u64) -> EventRecord {
        EventRecord {
            timestamp: Some(ts),
            address: Some("0xab".to_string()),
            event_type: Some("cycles".to_string()),
            event_size: Some("0x10".to_string()),
            thread_id: Some("5".to_string()),
            process_id: Some("10".to_string()),
            dso: Some("/usr/lib/libc.so.6".to_string()),
            period: Some(4000),
            ip_address: Some("0x401000".to_string()),
            raw_data: Some(". raw event: size 8\n.  0000:  01 02".to_string()),
            timestamp_readable: chrono::DateTime::from_timestamp(0, ts as u32),
            address_numeric: Some(0xab),
        }
    }

    #[test]
    fn test_header_matches_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        write_records_csv(&[], &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.trim_end(), CSV_COLUMNS.join(","));
    }

    #[test]
    fn test_write_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let records = vec![sample_record(1), EventRecord::default(), sample_record(2)];

        write_records_csv(&records, &path).unwrap();

        assert_eq!(read_records(&path).unwrap(), records);
    }

    #[test]
    fn test_null_fields_are_empty_cells() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        write_records_csv(&[EventRecord::default()], &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let row = content.lines().nth(1).unwrap();
        assert_eq!(row, ",".repeat(CSV_COLUMNS.len() - 1));
    }

    #[test]
    fn test_append_writes_header_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        for ts in [1, 2] {
            let mut writer = CsvRecordWriter::append(&path).unwrap();
            writer.write_record(&sample_record(ts)).unwrap();
            writer.flush().unwrap();
        }

        let loaded = read_records(&path).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].timestamp, Some(1));
        assert_eq!(loaded[1].timestamp, Some(2));
    }

    #[test]
    fn test_read_rejects_foreign_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("other.csv");
        std::fs::write(&path, "Timestamp,Address,Event\n1,0x1,x\n").unwrap();

        assert!(matches!(
            read_records(&path),
            Err(OutputError::SchemaMismatch(_))
        ));
    }

    #[test]
    fn test_append_rejects_foreign_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("other.csv");
        std::fs::write(&path, "Timestamp,Address,Event\n1,0x1,x\n").unwrap();

        assert!(matches!(
            CsvRecordWriter::append(&path),
            Err(OutputError::SchemaMismatch(_))
        ));
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "Timestamp,Address,Event\n1,0x1,x\n"
        );
    }

    #[test]
    fn test_append_to_header_only_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        write_records_csv(&[], &path).unwrap();

        let mut writer = CsvRecordWriter::append(&path).unwrap();
        writer.write_record(&sample_record(3)).unwrap();
        writer.flush().unwrap();

        assert_eq!(read_records(&path).unwrap(), vec![sample_record(3)]);
    }

    #[test]
    fn test_create_rejects_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(CsvRecordWriter::create(dir.path()).is_err());
    }
}
