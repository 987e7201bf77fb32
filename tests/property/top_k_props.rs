//! Best-first top-K, filtered variants and intersection against brute force.

use std::collections::BTreeSet;

use proptest::prelude::*;
use wavedex::{AuxFilter, MatchRange, RankedSymbol, WaveletSequence, WeightedRange};

use crate::common::{encoding_strategy, naive_intersect, naive_scores, naive_top_k, sequence_strategy};

/// Up to six ranges inside `0..len`, with small integral weights so sums are exact.
fn weighted_ranges(len: usize) -> impl Strategy<Value = Vec<WeightedRange>> {
    prop::collection::vec(
        (0..len, 0..len, prop::sample::select(vec![0.0, 1.0, 2.0, 3.0])),
        1..6,
    )
    .prop_map(|v| {
        v.into_iter()
            .map(|(a, b, w)| WeightedRange::new(a.min(b)..a.max(b) + 1, w))
            .collect()
    })
}

fn sequence_with_ranges() -> impl Strategy<Value = (Vec<u32>, u32, Vec<WeightedRange>, usize)> {
    sequence_strategy().prop_flat_map(|(seq, sigma)| {
        let len = seq.len();
        (Just(seq), Just(sigma), weighted_ranges(len), 0usize..12)
    })
}

/// Same scores in the same order as the oracle, up to ties.
fn assert_matches_oracle(
    got: &[RankedSymbol],
    allowed: &std::collections::BTreeMap<u32, f64>,
    k: usize,
) -> Result<(), TestCaseError> {
    let mut expected: Vec<f64> = allowed.values().copied().collect();
    expected.sort_by(|a, b| b.total_cmp(a));
    expected.truncate(k);

    let scores: Vec<f64> = got.iter().map(|r| r.score).collect();
    prop_assert_eq!(&scores, &expected);
    let distinct: BTreeSet<u32> = got.iter().map(|r| r.symbol).collect();
    prop_assert_eq!(distinct.len(), got.len());
    for r in got {
        prop_assert_eq!(allowed.get(&r.symbol).copied(), Some(r.score));
    }
    Ok(())
}

proptest! {
    #[test]
    fn top_k_union_matches_naive(
        (seq, sigma, ranges, k) in sequence_with_ranges(),
        encoding in encoding_strategy(),
    ) {
        let ws = WaveletSequence::build(&seq, sigma, encoding).unwrap();
        let got = ws.top_k_union(&ranges, k);
        assert_matches_oracle(&got, &naive_scores(&seq, &ranges), k)?;
        prop_assert_eq!(got.len(), naive_top_k(&seq, &ranges, k).len());
    }

    #[test]
    fn filtered_top_k_keeps_only_filter_symbols(
        (seq, sigma, ranges, k) in sequence_with_ranges(),
        encoding in encoding_strategy(),
        (fa, fb) in (0usize..200, 0usize..200),
    ) {
        let ws = WaveletSequence::build(&seq, sigma, encoding).unwrap();
        let (a, b) = (fa % seq.len(), fb % seq.len());
        let filter = MatchRange::new(a.min(b), a.max(b) + 1);
        let admitted: BTreeSet<u32> = seq[filter.as_range()].iter().copied().collect();

        let mut allowed = naive_scores(&seq, &ranges);
        allowed.retain(|s, _| admitted.contains(s));

        let got = ws.top_k_union_with_filters(&[filter], &ranges, k);
        assert_matches_oracle(&got, &allowed, k)?;
    }

    #[test]
    fn aux_filtered_top_k_across_encodings(
        (seq, sigma, ranges, k) in sequence_with_ranges(),
        encoding in encoding_strategy(),
        aux_encoding in encoding_strategy(),
        aux_seq in prop::collection::vec(0u32..40, 1..100),
        split in 0usize..100,
    ) {
        let ws = WaveletSequence::build(&seq, sigma, encoding).unwrap();
        let aux_seq: Vec<u32> = aux_seq.into_iter().map(|s| s % sigma).collect();
        let aux = WaveletSequence::build(&aux_seq, sigma, aux_encoding).unwrap();
        let split = split % aux_seq.len();
        let aux_ranges = vec![MatchRange::new(0, split), MatchRange::new(split, aux_seq.len())];
        let admitted: BTreeSet<u32> = aux_seq.iter().copied().collect();

        let mut allowed = naive_scores(&seq, &ranges);
        allowed.retain(|s, _| admitted.contains(s));

        let filters = [AuxFilter { sequence: &aux, ranges: aux_ranges }];
        let got = ws.top_k_union_with_aux_filters(&filters, &ranges, k);
        assert_matches_oracle(&got, &allowed, k)?;
    }

    #[test]
    fn intersect_matches_naive(
        (seq, sigma, ranges, _k) in sequence_with_ranges(),
        encoding in encoding_strategy(),
        threshold in 0usize..4,
    ) {
        let ws = WaveletSequence::build(&seq, sigma, encoding).unwrap();
        let plain: Vec<MatchRange> = ranges.iter().map(|wr| wr.range).collect();
        let got = ws.intersect(&plain, threshold, usize::MAX);
        prop_assert_eq!(got, naive_intersect(&seq, &plain, threshold));
    }
}
