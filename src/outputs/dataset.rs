//! The persisted CSV dataset.
//!
//! Two files live in the data directory:
//!
//! ```text
//! data_dir/
//! ├── final_new.csv   # working file, appended after every source
//! └── news.csv        # canonical snapshot read by the ticker
//! ```
//!
//! The working file only ever grows: a missing file is created with the
//! header row, an existing one gets rows appended. There is no dedup key, so
//! re-scraping an article adds another row.
//!
//! Readers never open the working file. After each cycle it is copied into a
//! temporary file next to the canonical one, synced, and renamed over it, so
//! a reader sees either the previous snapshot or the new one in full.

use crate::error::WriteError;
use crate::models::NewsRecord;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{info, instrument, warn};

/// Column names, in on-disk order.
pub const HEADER: [&str; 4] = ["Date", "Summary", "Final Label", "URL"];

/// Dataset shipped with the binary, used when no dataset exists yet.
pub const SEED_DATASET: &str = include_str!("../../assets/default_news.csv");

/// Append `records` to the dataset at `path`, writing the header first if
/// the file is new or empty. Returns the number of rows written.
///
/// Rows follow the column order of the existing header, which may be any
/// permutation of [`HEADER`]. A row left unfinished by an interrupted write
/// is cut off before anything is appended.
#[instrument(level = "info", skip_all, fields(path = %path.display(), count = records.len()))]
pub fn append_records(path: &Path, records: &[NewsRecord]) -> Result<usize, WriteError> {
    if records.is_empty() {
        return Ok(0);
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut file = OpenOptions::new().create(true).read(true).append(true).open(path)?;
    let len = drop_partial_row(&mut file)?;
    let order = if len == 0 { None } else { Some(column_order(&mut file)?) };

    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
    let order = match order {
        Some(order) => order,
        None => {
            writer.write_record(HEADER)?;
            [0, 1, 2, 3]
        }
    };
    for record in records {
        let fields = columns(record);
        writer.write_record(order.iter().map(|&c| fields[c]))?;
    }
    writer.flush()?;

    info!("Appended records to dataset");
    Ok(records.len())
}

/// Field values of `record` in [`HEADER`] order; missing values are empty.
fn columns(record: &NewsRecord) -> [&str; 4] {
    [
        record.date.as_deref().unwrap_or_default(),
        record.summary.as_deref().unwrap_or_default(),
        record.label.as_str(),
        record.url.as_deref().unwrap_or_default(),
    ]
}

/// Map each physical column of the file's header to its index in [`HEADER`].
fn column_order(file: &mut File) -> Result<[usize; 4], WriteError> {
    file.seek(SeekFrom::Start(0))?;
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(&mut *file);
    let found = reader.headers()?.clone();
    let mismatch = || WriteError::Header(found.iter().collect::<Vec<_>>().join(","));

    if found.len() != HEADER.len() {
        return Err(mismatch());
    }
    let mut order = [0usize; 4];
    let mut seen = [false; 4];
    for (slot, name) in found.iter().enumerate() {
        let column = HEADER
            .iter()
            .position(|h| *h == name.trim())
            .ok_or_else(mismatch)?;
        if seen[column] {
            return Err(mismatch());
        }
        seen[column] = true;
        order[slot] = column;
    }
    Ok(order)
}

/// Truncate an unterminated last row left by an interrupted write and
/// return the resulting file length.
///
/// The cut point is the start of the last CSV record, so a row broken off
/// inside a quoted field goes too.
fn drop_partial_row(file: &mut File) -> Result<u64, WriteError> {
    let len = file.metadata()?.len();
    if len == 0 || ends_with_newline(file, len)? {
        return Ok(len);
    }

    file.seek(SeekFrom::Start(0))?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(&mut *file);
    let mut row = csv::ByteRecord::new();
    let mut last_start = 0;
    loop {
        let start = reader.position().byte();
        if !reader.read_byte_record(&mut row)? {
            break;
        }
        last_start = start;
    }
    drop(reader);

    file.set_len(last_start)?;
    warn!(kept = last_start, dropped = len - last_start, "Dropped unfinished row from dataset");
    Ok(last_start)
}

fn ends_with_newline(file: &mut File, len: u64) -> io::Result<bool> {
    let mut last = [0u8; 1];
    file.seek(SeekFrom::Start(len - 1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

/// Read every well-formed row of the dataset at `path`.
///
/// Rows that do not match the four-column layout (for example a row cut off
/// by a crash) are skipped with a warning.
#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub fn read_records(path: &Path) -> Result<Vec<NewsRecord>, WriteError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let mut records = Vec::new();
    for (row, result) in reader.deserialize::<NewsRecord>().enumerate() {
        match result {
            Ok(record) => records.push(record),
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => warn!(row, error = %e, "Skipping malformed dataset row"),
        }
    }
    Ok(records)
}

/// Create the dataset at `path` from [`SEED_DATASET`] if it does not exist.
///
/// Returns `true` when the seed was written. An existing file, empty or not,
/// is never touched.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub fn ensure_dataset(path: &Path) -> Result<bool, WriteError> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(mut file) => {
            file.write_all(SEED_DATASET.as_bytes())?;
            file.sync_all()?;
            info!("Seeded dataset from bundled default");
            Ok(true)
        }
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Replace `canonical` with a copy of `working` in one rename.
///
/// Returns the number of bytes published.
#[instrument(level = "info", skip_all, fields(working = %working.display(), canonical = %canonical.display()))]
pub fn publish_snapshot(working: &Path, canonical: &Path) -> Result<u64, WriteError> {
    let dir = match canonical.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut source = File::open(working)?;
    let mut staged = NamedTempFile::new_in(dir)?;
    let bytes = io::copy(&mut source, staged.as_file_mut())?;
    staged.as_file().sync_all()?;
    staged.persist(canonical)?;

    info!(bytes, "Published dataset snapshot");
    Ok(bytes)
}
