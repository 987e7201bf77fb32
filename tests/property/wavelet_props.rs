//! Wavelet sequence queries against the naive oracles.

use proptest::prelude::*;
use wavedex::WaveletSequence;

use crate::common::{encoding_strategy, naive_rank, naive_select, sequence_strategy};

proptest! {
    #[test]
    fn access_rank_select_match_naive(
        (seq, sigma) in sequence_strategy(),
        encoding in encoding_strategy(),
    ) {
        let ws = WaveletSequence::build(&seq, sigma, encoding).unwrap();
        prop_assert_eq!(ws.len(), seq.len());

        for (i, &s) in seq.iter().enumerate() {
            prop_assert_eq!(ws.access(i), Some(s));
            prop_assert_eq!(ws.access_rank(i), Some((s, naive_rank(&seq, s, i))));
        }
        prop_assert_eq!(ws.access(seq.len()), None);

        for symbol in 0..sigma {
            for pos in [0, seq.len() / 3, seq.len() / 2, seq.len()] {
                prop_assert_eq!(ws.rank(symbol, pos), naive_rank(&seq, symbol, pos));
            }
            let freq = naive_rank(&seq, symbol, seq.len());
            prop_assert_eq!(ws.frequency(symbol), freq);
            for k in 0..=freq {
                prop_assert_eq!(ws.select(symbol, k), naive_select(&seq, symbol, k));
            }
        }
        prop_assert_eq!(ws.rank(sigma, seq.len()), 0);
    }

    #[test]
    fn occurrence_table_counts_smaller_symbols(
        (seq, sigma) in sequence_strategy(),
        encoding in encoding_strategy(),
    ) {
        let ws = WaveletSequence::build(&seq, sigma, encoding).unwrap();
        for symbol in 0..=sigma {
            let smaller = seq.iter().filter(|&&s| s < symbol).count();
            prop_assert_eq!(ws.occ(symbol), smaller);
        }
    }

    #[test]
    fn bytes_round_trip_preserves_queries(
        (seq, sigma) in sequence_strategy(),
        encoding in encoding_strategy(),
    ) {
        let ws = WaveletSequence::build(&seq, sigma, encoding).unwrap();
        let loaded = WaveletSequence::from_bytes(&ws.to_bytes().unwrap()).unwrap();
        prop_assert_eq!(&loaded, &ws);
        for (i, &s) in seq.iter().enumerate() {
            prop_assert_eq!(loaded.access(i), Some(s));
        }
    }
}
