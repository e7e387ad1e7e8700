//! The public counter facade (component F): the single type that owns
//! the table, histogram, and HLL register bank, and ties their shared
//! invariants together.

use crate::error::Error;
use crate::hash;
use crate::histogram::{self, Histogram};
use crate::hll::HyperLogLog;
use crate::iter::{Items, Keys};
use crate::prune;
use crate::serialization::{self, SerializedState};
use crate::table::Table;
use crate::update::UpdateSource;

const MIN_BUCKETS: u32 = 4;
const MAX_BUCKETS: u32 = 1 << 31;

/// Bytes per on-wire cell, used by [`Counter::mem`] to match the
/// footprint the serialization payload would actually occupy.
const CELL_BYTES: u64 = serialization::CELL_BYTES as u64;

/// A bounded-memory approximate frequency counter for string keys.
///
/// Holds a fixed-size, open-addressed table of `(key, count)` cells, a
/// 256-bin logarithmic histogram of current counts, and a HyperLogLog
/// register bank fed by the same hash used for bucket placement. Once
/// occupancy crosses 75%, writes trigger an in-place compacting prune
/// that evicts low-count cells to make room, which is what keeps memory
/// bounded at the cost of losing the least-frequent keys.
pub struct Counter {
    table: Table,
    histogram: Histogram,
    hll: HyperLogLog,
    total: i64,
    size: u32,
    str_allocated: u64,
    max_prune: i64,
}

impl Counter {
    /// Creates a counter with a bucket array sized to the largest power
    /// of two not exceeding `buckets`, clamped to `[4, 2^31]`.
    pub fn new(buckets: u32) -> Result<Self, Error> {
        if buckets < MIN_BUCKETS {
            return Err(Error::invalid_argument(
                "the number of buckets must be at least 4",
            ));
        }
        if buckets > MAX_BUCKETS {
            return Err(Error::invalid_argument(
                "the number of buckets is too large",
            ));
        }
        // largest power of two <= buckets
        let effective = 1u32 << (31 - buckets.leading_zeros());

        Ok(Self {
            table: Table::try_new(effective)?,
            histogram: Histogram::new(),
            hll: HyperLogLog::new(),
            total: 0,
            size: 0,
            str_allocated: 0,
            max_prune: 0,
        })
    }

    fn check_key(key: &[u8]) -> Result<(), Error> {
        if key.contains(&0) {
            return Err(Error::invalid_argument("string contains null bytes"));
        }
        Ok(())
    }

    fn prune_watermark(&self) -> u32 {
        (self.table.buckets() >> 2) * 3
    }

    /// Finds `key`'s cell without allocating one, without feeding the
    /// HLL (component B is fed only on first insertion — see
    /// [`Self::allocate`]).
    fn find(&self, key: &[u8]) -> Option<usize> {
        let raw_hash = hash::hash(key);
        let index = self.table.find_cell(key, raw_hash);
        self.table.cell(index).is_occupied().then_some(index)
    }

    /// Finds `key`'s cell, allocating and occupying an empty one if
    /// absent. Runs an automatic prune first if occupancy is already at
    /// the 75% watermark, then re-probes (pruning may free a slot closer
    /// to the home bucket).
    fn allocate(&mut self, key: &[u8]) -> usize {
        let raw_hash = hash::hash(key);
        let mut index = self.table.find_cell(key, raw_hash);

        if self.table.cell(index).is_occupied() {
            return index;
        }

        if self.size >= self.prune_watermark() {
            let boundary = prune::prune_size_threshold(
                &self.histogram,
                self.size,
                self.table.buckets(),
            );
            self.run_prune(boundary);
            index = self.table.find_cell(key, raw_hash);
        }

        self.table.occupy(index, key);
        self.hll.add(raw_hash);
        self.size += 1;
        self.str_allocated += key.len() as u64 + 1;
        self.histogram.incr(0);
        index
    }

    fn run_prune(&mut self, boundary: i64) {
        if boundary > self.max_prune {
            self.max_prune = boundary;
        }
        let (survivors, freed_bytes) =
            prune::prune(&mut self.table, &mut self.histogram, boundary);
        self.size = survivors;
        self.str_allocated -= freed_bytes;
    }

    /// Increments `key`'s count by `delta` (default 1 via callers),
    /// allocating a cell for `key` if it is new.
    pub fn increment(&mut self, key: &str, delta: i64) -> Result<(), Error> {
        Self::check_key(key.as_bytes())?;
        if delta < 0 {
            return Err(Error::invalid_argument("increment must be positive"));
        }
        if delta == 0 {
            return Ok(());
        }

        let index = self.allocate(key.as_bytes());
        let old_count = self.table.cell(index).count;
        if old_count > i64::MAX - delta {
            return Err(Error::overflow("counter overflow"));
        }

        self.histogram.decr(old_count);
        let new_count = old_count + delta;
        self.table.cell_mut(index).count = new_count;
        self.histogram.incr(new_count);
        self.total += delta;
        Ok(())
    }

    /// Forces `key`'s count to `value`. A `value` of 0 on an absent key
    /// is a no-op and does not allocate a cell.
    pub fn set(&mut self, key: &str, value: i64) -> Result<(), Error> {
        Self::check_key(key.as_bytes())?;
        if value < 0 {
            return Err(Error::invalid_argument(
                "the counter only supports positive values",
            ));
        }

        let index = if value == 0 {
            match self.find(key.as_bytes()) {
                Some(index) => index,
                None => return Ok(()),
            }
        } else {
            self.allocate(key.as_bytes())
        };

        let old_count = self.table.cell(index).count;
        self.histogram.decr(old_count);
        self.histogram.incr(value);
        self.total += value - old_count;
        self.table.cell_mut(index).count = value;
        Ok(())
    }

    /// Returns `key`'s current count, or 0 if absent or logically
    /// deleted.
    pub fn get(&self, key: &str) -> Result<i64, Error> {
        Self::check_key(key.as_bytes())?;
        Ok(match self.find(key.as_bytes()) {
            Some(index) => self.table.cell(index).count,
            None => 0,
        })
    }

    /// Zeroes `key`'s count if present; a no-op if absent. The cell
    /// itself stays occupied until a prune reclaims it.
    pub fn delete(&mut self, key: &str) -> Result<(), Error> {
        Self::check_key(key.as_bytes())?;
        if let Some(index) = self.find(key.as_bytes()) {
            let old_count = self.table.cell(index).count;
            self.histogram.decr(old_count);
            self.histogram.incr(0);
            self.total -= old_count;
            self.table.cell_mut(index).count = 0;
        }
        Ok(())
    }

    /// Applies every update in `source`, short-circuiting on the first
    /// error.
    pub fn update(&mut self, source: UpdateSource<'_>) -> Result<(), Error> {
        match source {
            UpdateSource::Counter(other) => {
                for (key, count) in other.iterate_items() {
                    let key = std::str::from_utf8(key)
                        .map_err(|_| Error::invalid_argument("key is not valid UTF-8"))?;
                    self.increment(key, count)?;
                }
            }
            UpdateSource::Strings(iter) => {
                for key in iter {
                    self.increment(key, 1)?;
                }
            }
            UpdateSource::Pairs(iter) => {
                for (key, delta) in iter {
                    self.increment(key, delta)?;
                }
            }
        }
        Ok(())
    }

    /// Sum of counts over all occupied cells.
    pub fn total(&self) -> i64 {
        self.total
    }

    /// Number of occupied cells whose count is nonzero.
    pub fn size(&self) -> u32 {
        self.size - self.histogram.get(0)
    }

    /// Estimated number of distinct keys ever inserted. Exact (equal to
    /// [`Self::size`]) until the first prune; a HyperLogLog estimate
    /// afterward, since pruned keys are no longer counted by `size`.
    ///
    /// The HLL register bank only ever grows, so `set`/`delete` calls
    /// that lower a count do not lower this estimate: cardinality after
    /// such operations will overestimate relative to the keys that are
    /// still actually present.
    pub fn cardinality(&self) -> i64 {
        if self.max_prune == 0 {
            self.size() as i64
        } else {
            self.hll.cardinality() as i64
        }
    }

    /// Ratio of [`Self::cardinality`] to 75% of the bucket count — an
    /// operational signal for how close the counter is to losing
    /// accuracy to eviction pressure.
    pub fn quality(&self) -> f64 {
        let limit = self.prune_watermark() as f64;
        let estimate = if self.max_prune == 0 {
            self.size() as f64
        } else {
            self.hll.cardinality()
        };
        estimate / limit
    }

    /// The bucket array's length (a power of two).
    pub fn buckets(&self) -> u32 {
        self.table.buckets()
    }

    /// Approximate memory footprint: cell array plus owned key bytes
    /// plus the histogram array.
    pub fn mem(&self) -> u64 {
        self.table.buckets() as u64 * CELL_BYTES + self.str_allocated + 256 * 4
    }

    /// Forces a prune at the given boundary, evicting every cell whose
    /// count is at or below it.
    pub fn prune(&mut self, boundary: i64) {
        self.run_prune(boundary);
    }

    /// Iterates occupied, nonzero-count keys in bucket-index order. Does
    /// not snapshot; see the `iter` module for what that means under
    /// concurrent mutation.
    pub fn iterate_keys(&self) -> Keys<'_> {
        Keys::new(self.table.cells())
    }

    /// Iterates occupied, nonzero-count `(key, count)` pairs in
    /// bucket-index order.
    pub fn iterate_items(&self) -> Items<'_> {
        Items::new(self.table.cells())
    }

    /// For every histogram bin `0..254`, yields `(lower_bound,
    /// upper_bound, count)`. Bin 255 is a saturation sentinel for counts
    /// at or above the histogram's representable range and is excluded.
    pub fn histogram_dump(&self) -> Vec<(i64, i64, u32)> {
        (0u8..255)
            .map(|bin| {
                let lower = histogram::lower_bound(bin);
                let upper = histogram::lower_bound(bin + 1) - 1;
                (lower, upper, self.histogram.get(bin))
            })
            .collect()
    }

    /// Produces the external serialization payload (§6).
    pub fn to_state(&self) -> SerializedState {
        SerializedState {
            buckets: self.table.buckets(),
            total: self.total,
            str_allocated: self.str_allocated,
            size: self.size,
            max_prune: self.max_prune,
            table_bytes: serialization::encode_table(self.table.cells()),
            strings_blob: serialization::encode_strings(self.table.cells()),
            histogram_bytes: serialization::encode_histogram(self.histogram.counts()),
            hll_bytes: self.hll.registers().to_vec(),
        }
    }

    /// Reconstructs a counter from a payload produced by
    /// [`Self::to_state`]. Rejects a payload whose strings blob overruns
    /// its declared length or whose section lengths don't match
    /// `buckets`.
    pub fn from_state(state: SerializedState) -> Result<Self, Error> {
        if !state.buckets.is_power_of_two() || state.buckets < MIN_BUCKETS {
            return Err(Error::malformed("buckets is not a valid power of two"));
        }

        let cells = serialization::decode_cells(
            state.buckets,
            &state.table_bytes,
            &state.strings_blob,
        )?;
        let mut table = Table::try_new(state.buckets)?;
        for (index, (key, count)) in cells.into_iter().enumerate() {
            if let Some(key) = key {
                table.occupy(index, &key);
                table.cell_mut(index).count = count;
            }
        }

        let histo_counts = serialization::decode_histogram(&state.histogram_bytes)?;
        let mut histogram = Histogram::new();
        histogram.load(histo_counts);

        let mut hll = HyperLogLog::new();
        if state.hll_bytes.len() != hll.registers().len() {
            return Err(Error::malformed(format!(
                "hll_bytes has {} bytes, expected {}",
                state.hll_bytes.len(),
                hll.registers().len()
            )));
        }
        hll.load_registers(&state.hll_bytes);

        Ok(Self {
            table,
            histogram,
            hll,
            total: state.total,
            size: state.size,
            str_allocated: state.str_allocated,
            max_prune: state.max_prune,
        })
    }
}
