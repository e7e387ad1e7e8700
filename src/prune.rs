//! The in-place compacting prune engine (component E).
//!
//! Removes every occupied cell whose count is at or below a boundary
//! and re-lays survivors so the linear-probe chain invariant still
//! holds, without ever allocating a second table.

use crate::histogram::{self, Histogram};
use crate::table::Table;

/// Chooses the smallest boundary such that removing every cell with
/// `count <= boundary` would bring `size` down to `buckets / 2`.
///
/// Scans the histogram from bin 0 upward, accumulating bin counts until
/// the running total reaches `size - buckets / 2`.
pub(crate) fn prune_size_threshold(histogram: &Histogram, size: u32, buckets: u32) -> i64 {
    let required = size.saturating_sub(buckets >> 1);
    let mut removing: u32 = 0;
    let mut index: u32 = 0;
    while removing < required {
        removing += histogram.get(index as u8);
        index += 1;
    }
    let boundary = if index < 16 {
        index as i64
    } else {
        (8 + (index & 7) as i64) << ((index >> 3) - 1)
    };
    boundary - 1
}

/// Removes all cells with `count <= boundary`, frees their keys, and
/// slides survivors so every probe chain remains intact. Rebuilds the
/// histogram from scratch and returns the new occupied-cell count and
/// the total freed key bytes (`key.len() + 1` per evicted cell, for the
/// caller to subtract from `str_allocated`).
pub(crate) fn prune(table: &mut Table, histogram: &mut Histogram, boundary: i64) -> (u32, u64) {
    histogram.clear();

    let mask = table.mask();
    let buckets = table.buckets();

    let mut start: u32 = 0;
    while table.cell(start as usize).is_occupied() {
        start += 1;
        debug_assert!(start < buckets, "table has no empty cell to start from");
    }

    let mut survivors: u32 = 0;
    let mut freed_bytes: u64 = 0;
    let mut last_free = start;
    let mut i = start;
    loop {
        i = (i + 1) & mask;

        if table.cell(i as usize).is_occupied() {
            let count = table.cell(i as usize).count;

            if count > boundary {
                let key_hash = {
                    let key = table.cell(i as usize).key.as_ref().unwrap();
                    crate::hash::hash(key)
                };
                let home = key_hash & mask;

                let mut target = home;
                if ((i.wrapping_sub(last_free)) & mask) > ((i.wrapping_sub(home)) & mask) {
                    target = i;
                }
                while target != i && table.cell(target as usize).is_occupied() {
                    target = (target + 1) & mask;
                }

                if target != i {
                    table.move_cell(i as usize, target as usize);
                    last_free = i;
                }

                histogram.incr(count);
                survivors += 1;
            } else {
                let key_len = table.cell(i as usize).key.as_ref().unwrap().len();
                freed_bytes += key_len as u64 + 1;
                table.clear_cell(i as usize);
                last_free = i;
            }
        } else {
            last_free = i;
        }

        if i == start {
            break;
        }
    }

    (survivors, freed_bytes)
}
