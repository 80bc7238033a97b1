use std::fmt::{Display, Formatter};
use std::io::{self, Read, Write};

use csv::{ReaderBuilder, StringRecord};
use pilosa_utils::time::{format_time, parse_time};

use crate::{Error, Result};

/// SLICE_WIDTH is the number of profile ids held by one slice.
pub const SLICE_WIDTH: u64 = 1 << 20;

/// Bit is a single set bit in import and export files.
///
/// Bits order by bitmap then profile, which is the import order. The
/// timestamp only breaks ties so that rewriting a sorted file is stable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Bit {
    pub bitmap_id: u64,
    pub profile_id: u64,
    /// unix nanoseconds, zero when the row carries no timestamp
    pub timestamp: i64,
}

impl Bit {
    pub fn new(bitmap_id: u64, profile_id: u64, timestamp: i64) -> Self {
        Self {
            bitmap_id,
            profile_id,
            timestamp,
        }
    }

    /// pos returns the import order key of the bit.
    pub fn pos(&self) -> (u64, u64) {
        (self.bitmap_id, self.profile_id)
    }

    /// slice returns the index of the slice holding the profile.
    pub fn slice(&self) -> u64 {
        self.profile_id / SLICE_WIDTH
    }

    /// write_csv writes the bit as a single CSV row.
    pub fn write_csv<W: Write>(&self, mut w: W) -> io::Result<()> {
        writeln!(w, "{}", self)
    }
}

/// The timestamp column is only written when set so files without
/// timestamps survive a rewrite byte for byte.
impl Display for Bit {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.bitmap_id, self.profile_id)?;
        if self.timestamp != 0 {
            write!(f, ",{}", format_time(self.timestamp))?;
        }
        Ok(())
    }
}

/// csv_reader returns a reader for headerless files with a variable number
/// of columns per row.
pub fn csv_reader<R: Read>(r: R) -> csv::Reader<R> {
    ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(r)
}

/// read_row decodes a bit from a CSV row.
///
/// Returns `Ok(None)` for a blank row, which callers skip.
pub fn read_row(record: &StringRecord) -> Result<Option<Bit>> {
    if record.get(0).unwrap_or("").is_empty() {
        return Ok(None);
    } else if record.len() < 2 {
        return Err(Error::MalformedRecord(record.len()));
    }

    let bitmap_id = record[0]
        .parse::<u64>()
        .map_err(|_| Error::InvalidBitmapId(record[0].to_string()))?;

    let profile_id = record[1]
        .parse::<u64>()
        .map_err(|_| Error::InvalidProfileId(record[1].to_string()))?;

    let timestamp = match record.get(2) {
        Some(s) if !s.is_empty() => {
            parse_time(s).map_err(|_| Error::InvalidTimestamp(s.to_string()))?
        }
        _ => 0,
    };

    Ok(Some(Bit::new(bitmap_id, profile_id, timestamp)))
}
