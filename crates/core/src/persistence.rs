//! Flat-file persistence for events and customers.
//!
//! Each record is written as a fixed block of lines, one field per line in
//! declaration order. Files are replaced atomically: the new content goes to
//! a temporary file next to the target, which is then renamed over it.

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::models::{Customer, Event};

/// A record that maps to a fixed number of single-line text fields.
pub trait FlatRecord: Sized {
    /// Lines occupied by one record.
    const FIELD_COUNT: usize;

    /// Fields in file order. Must yield exactly [`Self::FIELD_COUNT`] values.
    fn to_fields(&self) -> Vec<String>;

    /// Rebuild a record from exactly [`Self::FIELD_COUNT`] lines, or `None` if any field is malformed.
    fn from_fields(fields: &[&str]) -> Option<Self>;
}

impl FlatRecord for Event {
    const FIELD_COUNT: usize = 8;

    fn to_fields(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            single_line(&self.name),
            single_line(&self.location),
            single_line(&self.date),
            single_line(&self.time),
            self.price.to_string(),
            self.total_seats.to_string(),
            self.booked_seats.to_string(),
        ]
    }

    fn from_fields(fields: &[&str]) -> Option<Self> {
        let [id, name, location, date, time, price, total_seats, booked_seats] = fields else {
            return None;
        };
        Some(Self {
            id: id.trim().parse().ok()?,
            name: name.to_string(),
            location: location.to_string(),
            date: date.to_string(),
            time: time.to_string(),
            price: price.trim().parse().ok()?,
            total_seats: total_seats.trim().parse().ok()?,
            booked_seats: booked_seats.trim().parse().ok()?,
        })
    }
}

impl FlatRecord for Customer {
    const FIELD_COUNT: usize = 8;

    fn to_fields(&self) -> Vec<String> {
        vec![
            single_line(&self.name),
            single_line(&self.cnic),
            single_line(&self.contact),
            single_line(&self.booked_event),
            self.event_id.to_string(),
            self.seats_booked.to_string(),
            if self.payment_done { "1" } else { "0" }.to_string(),
            single_line(&self.booking_date),
        ]
    }

    fn from_fields(fields: &[&str]) -> Option<Self> {
        let [name, cnic, contact, booked_event, event_id, seats_booked, payment_done, booking_date] =
            fields
        else {
            return None;
        };
        let payment_done = match payment_done.trim() {
            "0" => false,
            "1" => true,
            _ => return None,
        };
        Some(Self {
            name: name.to_string(),
            cnic: cnic.to_string(),
            contact: contact.to_string(),
            booked_event: booked_event.to_string(),
            event_id: event_id.trim().parse().ok()?,
            seats_booked: seats_booked.trim().parse().ok()?,
            payment_done,
            booking_date: booking_date.to_string(),
        })
    }
}

/// Records recovered from a file plus the number of trailing lines that were discarded.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded<T> {
    /// Records parsed before the first malformed block.
    pub records: Vec<T>,
    /// Lines from the first malformed or truncated block to the end of input.
    pub discarded_lines: usize,
}

/// Serialize records into the flat line format.
pub fn encode<T: FlatRecord>(records: &[T]) -> String {
    let mut out = String::new();
    for record in records {
        for field in record.to_fields() {
            out.push_str(&field);
            out.push('\n');
        }
    }
    out
}

/// Parse records until the first malformed or truncated block.
pub fn decode<T: FlatRecord>(content: &str) -> Decoded<T> {
    let lines: Vec<&str> = content.lines().collect();
    let mut records = Vec::new();
    let mut consumed = 0;
    for block in lines.chunks(T::FIELD_COUNT) {
        if block.len() < T::FIELD_COUNT {
            break;
        }
        match T::from_fields(block) {
            Some(record) => {
                records.push(record);
                consumed += block.len();
            }
            None => break,
        }
    }
    Decoded {
        records,
        discarded_lines: lines.len() - consumed,
    }
}

/// Parse raw file bytes. A line that is not valid UTF-8 makes its block malformed,
/// so parsing stops at that block like any other bad record.
pub fn decode_bytes<T: FlatRecord>(bytes: &[u8]) -> Decoded<T> {
    let err = match std::str::from_utf8(bytes) {
        Ok(content) => return decode(content),
        Err(err) => err,
    };
    let valid = &bytes[..err.valid_up_to()];
    let cut = valid
        .iter()
        .rposition(|&byte| byte == b'\n')
        .map_or(0, |newline| newline + 1);
    let content = std::str::from_utf8(&bytes[..cut]).unwrap_or_default();

    let rest = &bytes[cut..];
    let rest_lines = rest.iter().filter(|&&byte| byte == b'\n').count()
        + usize::from(rest.last() != Some(&b'\n'));
    let mut decoded = decode(content);
    decoded.discarded_lines += rest_lines;
    decoded
}

/// A data file holding one record type.
#[derive(Debug, Clone)]
pub struct FlatFile {
    path: PathBuf,
}

impl FlatFile {
    /// Bind to a file path. Nothing is touched until the first load or save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every well-formed record. A missing file yields an empty list.
    pub fn load<T: FlatRecord>(&self) -> Result<Vec<T>> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "data file missing, starting empty");
            return Ok(Vec::new());
        }

        let bytes =
            fs::read(&self.path).with_context(|| format!("failed to read {}", self.path.display()))?;
        let decoded = decode_bytes::<T>(&bytes);
        if decoded.discarded_lines > 0 {
            warn!(
                path = %self.path.display(),
                kept = decoded.records.len(),
                discarded_lines = decoded.discarded_lines,
                "Dropped malformed trailing records"
            );
        }
        debug!(path = %self.path.display(), records = decoded.records.len(), "loaded data file");
        Ok(decoded.records)
    }

    /// Replace the file contents with `records`.
    pub fn save<T: FlatRecord>(&self, records: &[T]) -> Result<()> {
        let parent = parent_dir(&self.path);
        fs::create_dir_all(&parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;

        let mut staged = NamedTempFile::new_in(&parent)
            .with_context(|| format!("failed to stage write in {}", parent.display()))?;
        staged
            .write_all(encode(records).as_bytes())
            .and_then(|_| staged.as_file().sync_all())
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        staged
            .persist(&self.path)
            .map_err(|err| err.error)
            .with_context(|| format!("failed to replace {}", self.path.display()))?;

        debug!(path = %self.path.display(), records = records.len(), "saved data file");
        Ok(())
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn single_line(value: &str) -> String {
    value.replace(['\r', '\n'], " ")
}
