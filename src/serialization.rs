//! The core serialization payload (§6): the raw bytes a host binding
//! needs to round-trip a counter, without the pickling/reducer-tuple
//! framing that wraps it on the Python side this crate's ancestor came
//! from.

use std::io::Cursor;

use byteorder::{ByteOrder, LE, ReadBytesExt};

use crate::error::Error;

/// Bytes per on-wire cell: an 8-byte occupancy marker (zero iff empty)
/// followed by an 8-byte little-endian count. The marker occupies the
/// same width as the original implementation's key pointer field, but
/// carries no address of its own — only non-null/null is meaningful.
pub(crate) const CELL_BYTES: usize = 16;

/// The full, in-scope external serialization payload of a counter (§6).
///
/// Produced by [`crate::Counter::to_state`] and consumed by
/// [`crate::Counter::from_state`]. The surrounding `(type, (buckets,),
/// state)` reducer tuple a host binding would pickle this inside of is
/// out of scope for this crate.
pub struct SerializedState {
    pub buckets: u32,
    pub total: i64,
    pub str_allocated: u64,
    pub size: u32,
    pub max_prune: i64,
    pub table_bytes: Vec<u8>,
    pub strings_blob: Vec<u8>,
    pub histogram_bytes: Vec<u8>,
    pub hll_bytes: Vec<u8>,
}

pub(crate) fn encode_table(cells: &[crate::table::Cell]) -> Vec<u8> {
    let mut bytes = vec![0u8; cells.len() * CELL_BYTES];
    for (cell, chunk) in cells.iter().zip(bytes.chunks_exact_mut(CELL_BYTES)) {
        let marker: u64 = if cell.key.is_some() { 1 } else { 0 };
        LE::write_u64(&mut chunk[0..8], marker);
        LE::write_i64(&mut chunk[8..16], cell.count);
    }
    bytes
}

pub(crate) fn encode_strings(cells: &[crate::table::Cell]) -> Vec<u8> {
    let mut blob = Vec::new();
    for cell in cells {
        if let Some(key) = &cell.key {
            blob.extend_from_slice(key);
            blob.push(0);
        }
    }
    blob
}

pub(crate) fn encode_histogram(counts: &[u32; 256]) -> Vec<u8> {
    let mut bytes = vec![0u8; 256 * 4];
    for (c, chunk) in counts.iter().zip(bytes.chunks_exact_mut(4)) {
        LE::write_u32(chunk, *c);
    }
    bytes
}

/// Decodes the table and strings payload into `(marker, count)` pairs
/// plus the owned key for each occupied cell, in bucket-index order.
pub(crate) fn decode_cells(
    buckets: u32,
    table_bytes: &[u8],
    strings_blob: &[u8],
) -> Result<Vec<(Option<Box<[u8]>>, i64)>, Error> {
    if table_bytes.len() != buckets as usize * CELL_BYTES {
        return Err(Error::malformed(format!(
            "table_bytes has {} bytes, expected {}",
            table_bytes.len(),
            buckets as usize * CELL_BYTES
        )));
    }

    let mut cursor = Cursor::new(table_bytes);
    let mut string_offset = 0usize;
    let mut cells = Vec::with_capacity(buckets as usize);

    for _ in 0..buckets {
        let marker = cursor
            .read_u64::<LE>()
            .map_err(|e| Error::insufficient_data("table marker", e))?;
        let count = cursor
            .read_i64::<LE>()
            .map_err(|e| Error::insufficient_data("table count", e))?;

        if marker == 0 {
            cells.push((None, 0));
            continue;
        }

        if string_offset >= strings_blob.len() {
            return Err(Error::malformed(
                "strings_blob exhausted before all occupied cells were read",
            ));
        }
        let nul = strings_blob[string_offset..]
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| Error::malformed("strings_blob entry is missing its terminator"))?;
        let key = strings_blob[string_offset..string_offset + nul].to_vec();
        string_offset += nul + 1;

        cells.push((Some(key.into_boxed_slice()), count));
    }

    Ok(cells)
}

pub(crate) fn decode_histogram(bytes: &[u8]) -> Result<[u32; 256], Error> {
    if bytes.len() != 256 * 4 {
        return Err(Error::malformed(format!(
            "histogram_bytes has {} bytes, expected {}",
            bytes.len(),
            256 * 4
        )));
    }
    let mut cursor = Cursor::new(bytes);
    let mut counts = [0u32; 256];
    for c in counts.iter_mut() {
        *c = cursor
            .read_u32::<LE>()
            .map_err(|e| Error::insufficient_data("histogram bin", e))?;
    }
    Ok(counts)
}
