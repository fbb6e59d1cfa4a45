//! ─── Run-length codec ───────────────────────────────────────────────────────
//!
//! Frequency vectors are mostly zeroes once a window spans a wide value
//! range, so the quantile store persists them run-length encoded: a flat
//! sequence of `(value, count)` pairs.

use sidetree_core::{SidetreeError, SidetreeResult};

/// Encode `values` as alternating `(value, count)` pairs. `encode(&[])`
/// is `[]`.
pub fn encode(values: &[u64]) -> Vec<u64> {
    let mut encoded = Vec::new();
    let mut iter = values.iter().peekable();
    while let Some(&value) = iter.next() {
        let mut count = 1u64;
        while iter.peek() == Some(&&value) {
            iter.next();
            count += 1;
        }
        encoded.push(value);
        encoded.push(count);
    }
    encoded
}

/// Decode a flat `(value, count)`-pair sequence back into the original
/// values. An odd-length input has no valid pairing and is an error;
/// `decode(&[])` is `Ok([])`.
pub fn decode(encoded: &[u64]) -> SidetreeResult<Vec<u64>> {
    if encoded.len() % 2 != 0 {
        return Err(SidetreeError::OddLengthRunLength);
    }
    let mut values = Vec::with_capacity(encoded.len());
    for pair in encoded.chunks_exact(2) {
        let (value, count) = (pair[0], pair[1]);
        values.extend(std::iter::repeat(value).take(count as usize));
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_round_trips_to_empty() {
        assert_eq!(encode(&[]), Vec::<u64>::new());
        assert_eq!(decode(&[]).unwrap(), Vec::<u64>::new());
    }

    #[test]
    fn decode_of_odd_length_is_an_error() {
        assert!(matches!(decode(&[1, 2, 3]), Err(SidetreeError::OddLengthRunLength)));
    }

    #[test]
    fn round_trips_a_run_heavy_sequence() {
        let values = vec![0, 0, 0, 5, 5, 3, 3, 3, 3];
        let encoded = encode(&values);
        assert_eq!(encoded, vec![0, 3, 5, 2, 3, 4]);
        assert_eq!(decode(&encoded).unwrap(), values);
    }

    #[test]
    fn round_trips_a_sequence_with_no_repeats() {
        let values = vec![1, 2, 3, 4, 5];
        assert_eq!(decode(&encode(&values)).unwrap(), values);
    }
}
