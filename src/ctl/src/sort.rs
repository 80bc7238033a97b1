use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::PathBuf;
use std::time::Instant;

use csv::StringRecord;
use pilosa_utils::time::format_elapsed;

use crate::bit::{csv_reader, read_row, Bit};
use crate::{Error, Result};

/// Initial capacity of the bit buffer. Import files commonly hold millions
/// of rows.
pub const DEFAULT_BIT_CAPACITY: usize = 1_000_000;

/// read_bits decodes every row of `r`, skipping blank rows.
/// Fails on the first row that cannot be decoded.
pub fn read_bits<R: Read>(r: R) -> Result<Vec<Bit>> {
    let mut r = csv_reader(r);
    let mut record = StringRecord::new();

    let mut bits = Vec::with_capacity(DEFAULT_BIT_CAPACITY);
    while r.read_record(&mut record)? {
        match read_row(&record)? {
            Some(bit) => bits.push(bit),
            None => continue,
        }
    }

    Ok(bits)
}

/// sort_bits rewrites the bits read from `r` to `w` in import order.
///
/// All rows are decoded before anything is written, so a malformed row
/// leaves `w` untouched. Nothing more reaches `w` once a write fails.
/// Returns the number of rows written.
pub fn sort_bits<R: Read, W: Write>(r: R, w: W) -> Result<usize> {
    let mut bits = read_bits(r)?;
    bits.sort_unstable();

    let mut w = BufWriter::new(w);
    let ret = bits
        .iter()
        .try_for_each(|bit| bit.write_csv(&mut w))
        .and_then(|_| w.flush());
    if let Err(e) = ret {
        // drop the buffered rows instead of flushing them on drop
        let _ = w.into_parts();
        return Err(e.into());
    }

    Ok(bits.len())
}

/// SortCommand sorts an import file into the optimal order for importing.
#[derive(Debug, Clone)]
pub struct SortCommand {
    pub path: PathBuf,
}

impl SortCommand {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn run<W: Write>(&self, stdout: W) -> Result<()> {
        let f = File::open(&self.path).map_err(|source| Error::Open {
            path: self.path.display().to_string(),
            source,
        })?;

        let t = Instant::now();
        let n = sort_bits(f, stdout)?;
        tracing::info!(
            path = %self.path.display(),
            bits = n,
            elapsed = %format_elapsed(t.elapsed()),
            "sorted"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::{self, Write};

    use quickcheck::quickcheck;

    use crate::bit::Bit;
    use crate::sort::{read_bits, sort_bits, SortCommand};
    use crate::Error;

    fn sort_str(input: &str) -> crate::Result<String> {
        let mut out = Vec::new();
        sort_bits(input.as_bytes(), &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_sort_bits() {
        let out = sort_str("3,1\n1,20\n2,5,2016-07-14T09:30\n1,10\n1,10\n").unwrap();
        assert_eq!(out, "1,10\n1,10\n1,20\n2,5,2016-07-14T09:30\n3,1\n");
    }

    #[test]
    fn test_sort_bits_blank_rows() {
        assert_eq!(sort_str("1,10\n\n2,5\n").unwrap(), "1,10\n2,5\n");
        assert_eq!(sort_str(",7\n2,5\n").unwrap(), "2,5\n");
    }

    #[test]
    fn test_sort_bits_empty() {
        assert_eq!(sort_str("").unwrap(), "");
        assert_eq!(sort_str("\n\n,1\n").unwrap(), "");
    }

    #[test]
    fn test_sort_bits_malformed_row_writes_nothing() {
        let mut out = Vec::new();
        let err = sort_bits("1,10\nX,5\n".as_bytes(), &mut out).unwrap_err();
        assert!(matches!(err, Error::InvalidBitmapId(s) if s == "X"));
        assert!(out.is_empty());

        let mut out = Vec::new();
        let err = sort_bits("5\n".as_bytes(), &mut out).unwrap_err();
        assert!(matches!(err, Error::MalformedRecord(1)));
        assert!(out.is_empty());

        let mut out = Vec::new();
        let err = sort_bits("1,10\n3,2,2016-7-4T9:30\n".as_bytes(), &mut out).unwrap_err();
        assert!(matches!(err, Error::InvalidTimestamp(s) if s == "2016-7-4T9:30"));
        assert!(out.is_empty());
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
    }

    #[test]
    fn test_sort_bits_flush_failure() {
        let err = sort_bits("1,1\n".as_bytes(), FailingWriter).unwrap_err();
        assert!(matches!(err, Error::Io(e) if e.kind() == io::ErrorKind::BrokenPipe));
    }

    /// Fails the first write and counts every write attempted.
    #[derive(Default)]
    struct ClosedPipe {
        writes: usize,
    }

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            self.writes += 1;
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_sort_bits_stops_writing_after_failure() {
        // larger than the write buffer so the failure happens mid-stream
        let input = (0..4000)
            .map(|i| format!("{},{}\n", i, i))
            .collect::<String>();

        let mut w = ClosedPipe::default();
        let err = sort_bits(input.as_bytes(), &mut w).unwrap_err();
        assert!(matches!(err, Error::Io(e) if e.kind() == io::ErrorKind::BrokenPipe));
        assert_eq!(w.writes, 1);
    }

    #[test]
    fn test_sort_command() -> io::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.as_ref().join("bits.csv");
        std::fs::write(&path, "9,9\n0,1\n")?;

        let mut out = Vec::new();
        SortCommand::new(&path).run(&mut out).unwrap();
        assert_eq!(out, b"0,1\n9,9\n");

        let err = SortCommand::new(dir.as_ref().join("missing"))
            .run(&mut out)
            .unwrap_err();
        assert!(matches!(err, Error::Open { .. }));

        Ok(())
    }

    fn render(bits: &[(u64, u64)]) -> String {
        bits.iter()
            .map(|(b, p)| format!("{},{}\n", b, p))
            .collect::<String>()
    }

    quickcheck! {
        fn prop_sorted_output_is_ordered(bits: Vec<(u64, u64)>) -> bool {
            let out = sort_str(&render(&bits)).unwrap();
            let sorted = read_bits(out.as_bytes()).unwrap();
            sorted.len() == bits.len()
                && sorted.windows(2).all(|w| w[0].pos() <= w[1].pos())
        }

        fn prop_sort_is_idempotent(bits: Vec<(u64, u64, bool)>) -> bool {
            let input = bits
                .iter()
                .map(|&(b, p, ts)| {
                    let ts = if ts { (p % 1_000_000 + 1) as i64 * 60_000_000_000 } else { 0 };
                    format!("{}\n", Bit::new(b, p, ts))
                })
                .collect::<String>();

            let once = sort_str(&input).unwrap();
            let twice = sort_str(&once).unwrap();
            once == twice
        }
    }
}
