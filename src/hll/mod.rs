//! HyperLogLog cardinality estimator (component B), fixed at `2^16`
//! registers and fed from the same 32-bit hash the table uses for
//! bucket placement.
//!
//! Unlike this corpus's other HLL implementations, which track a
//! historical-inverse-probability (HIP) accumulator alongside the
//! register bank, this one uses the classic Flajolet bias-corrected
//! harmonic-mean estimator: cardinality must remain computable purely
//! from register state after the table has destructively pruned
//! entries the HLL already folded in, which rules out an estimator
//! whose accuracy depends on having seen every update in order.

/// `log2` of the register count; fixed per the frequency counter's
/// design (independent of the table's own bucket count).
const P: u32 = 16;
const REGISTERS: usize = 1 << P;

pub(crate) struct HyperLogLog {
    registers: Box<[u8]>,
}

impl HyperLogLog {
    pub(crate) fn new() -> Self {
        Self {
            registers: vec![0u8; REGISTERS].into_boxed_slice(),
        }
    }

    pub(crate) fn registers(&self) -> &[u8] {
        &self.registers
    }

    pub(crate) fn load_registers(&mut self, bytes: &[u8]) {
        debug_assert_eq!(bytes.len(), REGISTERS);
        self.registers.copy_from_slice(bytes);
    }

    /// Feeds a raw 32-bit hash into the register bank. The low `P` bits
    /// select a register; the rank is `1 + leading_zeros` of the
    /// remaining bits.
    pub(crate) fn add(&mut self, raw_hash: u32) {
        let index = (raw_hash & (REGISTERS as u32 - 1)) as usize;
        let remaining = raw_hash >> P;
        // `remaining` only has `32 - P` meaningful bits; count leading
        // zeros within that width, not the full u32.
        let rank = (remaining.leading_zeros() - P) as u8 + 1;
        if rank > self.registers[index] {
            self.registers[index] = rank;
        }
    }

    /// Bias-corrected harmonic-mean cardinality estimate, with
    /// small-range (linear counting) and large-range corrections, as in
    /// Flajolet et al.'s original HyperLogLog paper.
    pub(crate) fn cardinality(&self) -> f64 {
        let m = REGISTERS as f64;
        let alpha = alpha_m(REGISTERS);

        let mut sum = 0.0f64;
        let mut zeros = 0u32;
        for &r in self.registers.iter() {
            sum += 2f64.powi(-(r as i32));
            if r == 0 {
                zeros += 1;
            }
        }

        let raw_estimate = alpha * m * m / sum;

        if raw_estimate <= 2.5 * m && zeros > 0 {
            // small-range correction: linear counting
            m * (m / zeros as f64).ln()
        } else if raw_estimate <= (1u64 << 32) as f64 / 30.0 {
            raw_estimate
        } else {
            // large-range correction for hashes that saturate a 32-bit
            // space
            -(2f64.powi(32)) * (1.0 - raw_estimate / 2f64.powi(32)).ln()
        }
    }
}

fn alpha_m(m: usize) -> f64 {
    match m {
        16 => 0.673,
        32 => 0.697,
        64 => 0.709,
        _ => 0.7213 / (1.0 + 1.079 / m as f64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_estimate_is_zero() {
        let hll = HyperLogLog::new();
        assert_eq!(hll.cardinality(), 0.0);
    }

    #[test]
    fn distinct_inserts_produce_plausible_estimate() {
        let mut hll = HyperLogLog::new();
        for i in 0..10_000u32 {
            hll.add(crate::hash::hash(i.to_string().as_bytes()));
        }
        let estimate = hll.cardinality();
        assert!(
            (8_000.0..12_000.0).contains(&estimate),
            "estimate {estimate} out of expected range"
        );
    }

    #[test]
    fn repeated_inserts_do_not_inflate_estimate() {
        let mut hll = HyperLogLog::new();
        for _ in 0..1_000 {
            hll.add(crate::hash::hash(b"same-key"));
        }
        assert!(hll.cardinality() < 5.0);
    }

    #[test]
    fn registers_round_trip() {
        let mut hll = HyperLogLog::new();
        hll.add(crate::hash::hash(b"a"));
        hll.add(crate::hash::hash(b"b"));
        let bytes = hll.registers().to_vec();

        let mut restored = HyperLogLog::new();
        restored.load_registers(&bytes);
        assert_eq!(restored.registers(), hll.registers());
    }
}
