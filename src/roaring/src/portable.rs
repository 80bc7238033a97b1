//! Binding of [`Codec`] to the portable roaring serialization.
//!
//! Layout (all integers little endian):
//!
//! | cookie | [run flags] | (key, n-1) * size | [offset * size] | containers |
//!
//! The directory is read here to locate container payloads. Validating the
//! payloads themselves is left to the `roaring` crate.

use bytes::Buf;
use roaring::RoaringBitmap;

use crate::{
    BitmapInfo, CheckError, Codec, ContainerInfo, ContainerKind, DecodeError, DecodedBitmap,
    ErrorList,
};

const SERIAL_COOKIE_NO_RUNCONTAINER: u32 = 12346;
const SERIAL_COOKIE: u32 = 12347;

/// Files with run containers omit the offset header below this many containers.
const NO_OFFSET_THRESHOLD: usize = 4;

/// Containers above this cardinality are stored as bitmaps.
const ARRAY_MAX_SIZE: u32 = 4096;

const BITMAP_SIZE: usize = 8192;

#[derive(Debug, Default, Clone, Copy)]
pub struct PortableCodec;

impl Codec for PortableCodec {
    fn decode<'a>(&self, data: &'a [u8]) -> Result<Box<dyn DecodedBitmap<'a> + 'a>, DecodeError> {
        let bm = PortableBitmap::decode(data)?;
        tracing::debug!(containers = bm.containers.len(), "decoded portable bitmap");
        Ok(Box::new(bm))
    }
}

pub struct PortableBitmap<'a> {
    data: &'a [u8],
    containers: Vec<ContainerInfo<'a>>,
    /// actual payload position of each container
    positions: Vec<usize>,
    /// offset header, when the file carries one
    offsets: Option<Vec<u32>>,
    /// position right after the last container
    end: usize,
}

fn need(buf: &[u8], n: usize, what: &'static str) -> Result<(), DecodeError> {
    if buf.remaining() < n {
        return Err(DecodeError::Short {
            what,
            need: n,
            have: buf.remaining(),
        });
    }
    Ok(())
}

impl<'a> PortableBitmap<'a> {
    pub fn decode(data: &'a [u8]) -> Result<Self, DecodeError> {
        let mut buf = data;

        need(buf, 4, "cookie")?;
        let cookie = buf.get_u32_le();
        let (size, run_flags) = if cookie & 0xFFFF == SERIAL_COOKIE {
            let size = (cookie >> 16) as usize + 1;
            let n = (size + 7) / 8;
            need(buf, n, "run flags")?;
            let flags = &data[4..4 + n];
            buf.advance(n);
            (size, Some(flags))
        } else if cookie == SERIAL_COOKIE_NO_RUNCONTAINER {
            need(buf, 4, "container count")?;
            (buf.get_u32_le() as usize, None)
        } else {
            return Err(DecodeError::InvalidCookie(cookie));
        };

        need(buf, size * 4, "descriptive header")?;
        let mut header = Vec::with_capacity(size);
        for _ in 0..size {
            let key = buf.get_u16_le() as u64;
            let n = buf.get_u16_le() as u32 + 1;
            header.push((key, n));
        }

        let offsets = if run_flags.is_none() || size >= NO_OFFSET_THRESHOLD {
            need(buf, size * 4, "offset header")?;
            Some((0..size).map(|_| buf.get_u32_le()).collect::<Vec<_>>())
        } else {
            None
        };

        let mut pos = data.len() - buf.remaining();
        let mut containers = Vec::with_capacity(size);
        let mut positions = Vec::with_capacity(size);
        for (i, (key, n)) in header.into_iter().enumerate() {
            let is_run = run_flags
                .map(|flags| flags[i / 8] & (1 << (i % 8)) != 0)
                .unwrap_or(false);

            let (kind, len) = if is_run {
                let mut rest = &data[pos..];
                need(rest, 2, "run count")?;
                let runs = rest.get_u16_le() as usize;
                (ContainerKind::Run, 2 + runs * 4)
            } else if n <= ARRAY_MAX_SIZE {
                (ContainerKind::Array, n as usize * 2)
            } else {
                (ContainerKind::Bitmap, BITMAP_SIZE)
            };

            let end = pos + len;
            if end > data.len() {
                return Err(DecodeError::ContainerOutOfBounds {
                    key,
                    end,
                    len: data.len(),
                });
            }

            containers.push(ContainerInfo {
                key,
                kind,
                n,
                alloc: len as u32,
                data: &data[pos..end],
            });
            positions.push(pos);
            pos = end;
        }

        Ok(Self {
            data,
            containers,
            positions,
            offsets,
            end: pos,
        })
    }
}

impl<'a> DecodedBitmap<'a> for PortableBitmap<'a> {
    fn info(&self) -> BitmapInfo<'a> {
        BitmapInfo {
            containers: self.containers.clone(),
            op_n: 0,
        }
    }

    fn check(&self) -> Result<(), CheckError> {
        let mut errs = ErrorList::new();

        for pair in self.containers.windows(2) {
            if pair[1].key <= pair[0].key {
                errs.push(format!(
                    "container key out of order: {} after {}",
                    pair[1].key, pair[0].key
                ));
            }
        }

        if let Some(offsets) = &self.offsets {
            for ((c, &pos), &offset) in self.containers.iter().zip(&self.positions).zip(offsets) {
                if offset as usize != pos {
                    errs.push(format!(
                        "container {}: offset header is {}, payload starts at {}",
                        c.key, offset, pos
                    ));
                }
            }
        }

        if self.end < self.data.len() {
            errs.push(format!(
                "{} trailing bytes after last container",
                self.data.len() - self.end
            ));
        }

        if let Err(e) = RoaringBitmap::deserialize_from(self.data) {
            errs.push(format!("invalid container data: {}", e));
        }

        errs.into_result()
    }
}
