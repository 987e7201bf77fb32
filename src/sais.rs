// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! SA-IS: Suffix Array by Induced Sorting
//!
//! Linear-time O(n) suffix array construction over an integer alphabet.
//!
//! # Algorithm Overview
//!
//! ```text
//! Input: "banana"
//!
//! Step 1: Shift symbols up by one, append sentinel (0), classify suffixes
//! ┌───┬───┬───┬───┬───┬───┬───┐
//! │ b │ a │ n │ a │ n │ a │ $ │   ($ = sentinel, value 0)
//! ├───┼───┼───┼───┼───┼───┼───┤
//! │ L │ S │ L │ S │ L │ L │ S │   (S = smaller than next, L = larger)
//! └───┴───┴───┴───┴───┴───┴───┘
//!
//! Step 2: Find LMS (Leftmost S-type) suffixes
//!         LMS = S-type preceded by L-type
//!         Positions: 1, 3, 6
//!
//! Step 3: Induced sorting
//!         - Place LMS suffixes at bucket tails
//!         - Induce L-type positions (left-to-right)
//!         - Induce S-type positions (right-to-left)
//!
//! Step 4: If LMS substrings not unique, recurse on reduced problem
//!
//! Step 5: Use sorted LMS order to induce final suffix array
//!
//! Output (sentinel dropped): [5, 3, 1, 0, 4, 2]
//! ```
//!
//! # References
//!
//! - Nong, Zhang, Chan (2009): "Linear Suffix Array Construction by Almost Pure Induced-Sorting"
//! - <https://doi.org/10.1109/DCC.2009.42>

/// Suffix type classification.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum SuffixType {
    /// S-type: suffix is lexicographically smaller than the next suffix
    S,
    /// L-type: suffix is lexicographically larger than the next suffix
    L,
}

/// Sentinel value (smaller than every shifted input symbol).
const SENTINEL: usize = 0;

const EMPTY: usize = usize::MAX;

/// Build the suffix array of `text` over symbols `0..alphabet_size`.
///
/// `sa[i]` is the starting position of the i-th smallest suffix. Returns an
/// empty vector for empty input. Symbols `>= alphabet_size` are a caller bug.
pub fn build_suffix_array(text: &[u32], alphabet_size: u32) -> Vec<usize> {
    if text.is_empty() {
        return Vec::new();
    }
    debug_assert!(
        text.iter().all(|&c| c < alphabet_size),
        "Contract violation: suffix array input symbol outside alphabet"
    );

    // Shift every symbol up so the sentinel is strictly smallest.
    let mut shifted: Vec<usize> = Vec::with_capacity(text.len() + 1);
    shifted.extend(text.iter().map(|&c| c as usize + 1));
    shifted.push(SENTINEL);

    let sa = sais(&shifted, alphabet_size as usize + 1);

    // The sentinel always sorts first.
    sa.into_iter().filter(|&pos| pos < text.len()).collect()
}

/// Suffix array of a byte string.
pub fn build_suffix_array_bytes(text: &[u8]) -> Vec<usize> {
    let symbols: Vec<u32> = text.iter().map(|&b| b as u32).collect();
    build_suffix_array(&symbols, 256)
}

/// Core SA-IS. `text` must end with a unique smallest symbol.
fn sais(text: &[usize], alphabet_size: usize) -> Vec<usize> {
    let n = text.len();
    if n == 0 {
        return Vec::new();
    }
    if n == 1 {
        return vec![0];
    }
    if n == 2 {
        return if text[0] < text[1] {
            vec![0, 1]
        } else {
            vec![1, 0]
        };
    }

    let types = classify_suffixes(text);
    let lms_positions: Vec<usize> = (1..n).filter(|&i| is_lms(&types, i)).collect();

    if lms_positions.is_empty() {
        let mut sa: Vec<usize> = (0..n).collect();
        sa.sort_by(|&a, &b| text[a..].cmp(&text[b..]));
        return sa;
    }

    let bucket_sizes = compute_bucket_sizes(text, alphabet_size);

    // First pass: LMS in text order, enough to sort LMS substrings.
    let mut sa = vec![EMPTY; n];
    induced_sort(text, &types, &bucket_sizes, &lms_positions, &mut sa);

    // Name LMS substrings
    let mut name = 0usize;
    let mut prev_pos: Option<usize> = None;
    let mut lms_names = vec![0usize; n];

    for &pos in &sa {
        if pos == EMPTY || !is_lms(&types, pos) {
            continue;
        }
        if let Some(prev) = prev_pos {
            if !lms_substrings_equal(text, &types, prev, pos) {
                name += 1;
            }
        }
        lms_names[pos] = name;
        prev_pos = Some(pos);
    }

    let unique_count = name + 1;
    let reduced: Vec<usize> = lms_positions.iter().map(|&pos| lms_names[pos]).collect();

    let sorted_lms_indices = if unique_count < lms_positions.len() {
        sais(&reduced, unique_count)
    } else {
        // All unique: the names themselves give the order
        let mut order = vec![0usize; reduced.len()];
        for (i, &name) in reduced.iter().enumerate() {
            order[name] = i;
        }
        order
    };

    let sorted_lms: Vec<usize> = sorted_lms_indices
        .iter()
        .map(|&i| lms_positions[i])
        .collect();

    // Final pass with correctly ordered LMS suffixes
    sa.fill(EMPTY);
    induced_sort(text, &types, &bucket_sizes, &sorted_lms, &mut sa);

    sa
}

/// Place `lms` at bucket tails (last one first), then induce L and S types.
fn induced_sort(
    text: &[usize],
    types: &[SuffixType],
    bucket_sizes: &[usize],
    lms: &[usize],
    sa: &mut [usize],
) {
    let n = text.len();

    let mut tails = compute_bucket_tails(bucket_sizes);
    for &pos in lms.iter().rev() {
        let c = text[pos];
        tails[c] -= 1;
        sa[tails[c]] = pos;
    }

    // Induce L-type
    let mut heads = compute_bucket_heads(bucket_sizes);
    for i in 0..n {
        if sa[i] == EMPTY || sa[i] == 0 {
            continue;
        }
        let j = sa[i] - 1;
        if types[j] == SuffixType::L {
            let c = text[j];
            sa[heads[c]] = j;
            heads[c] += 1;
        }
    }

    // Induce S-type
    let mut tails = compute_bucket_tails(bucket_sizes);
    for i in (0..n).rev() {
        if sa[i] == EMPTY || sa[i] == 0 {
            continue;
        }
        let j = sa[i] - 1;
        if types[j] == SuffixType::S {
            let c = text[j];
            tails[c] -= 1;
            sa[tails[c]] = j;
        }
    }
}

/// Classify each suffix as S-type or L-type.
fn classify_suffixes(text: &[usize]) -> Vec<SuffixType> {
    let n = text.len();
    let mut types = vec![SuffixType::S; n];

    // Last position is always S-type (sentinel)
    for i in (0..n - 1).rev() {
        types[i] = if text[i] > text[i + 1] {
            SuffixType::L
        } else if text[i] < text[i + 1] {
            SuffixType::S
        } else {
            types[i + 1]
        };
    }

    types
}

#[inline]
fn is_lms(types: &[SuffixType], i: usize) -> bool {
    i > 0 && types[i] == SuffixType::S && types[i - 1] == SuffixType::L
}

fn compute_bucket_sizes(text: &[usize], alphabet_size: usize) -> Vec<usize> {
    let mut sizes = vec![0; alphabet_size];
    for &c in text {
        sizes[c] += 1;
    }
    sizes
}

fn compute_bucket_heads(sizes: &[usize]) -> Vec<usize> {
    let mut heads = vec![0; sizes.len()];
    let mut sum = 0;
    for (i, &size) in sizes.iter().enumerate() {
        heads[i] = sum;
        sum += size;
    }
    heads
}

fn compute_bucket_tails(sizes: &[usize]) -> Vec<usize> {
    let mut tails = vec![0; sizes.len()];
    let mut sum = 0;
    for (i, &size) in sizes.iter().enumerate() {
        sum += size;
        tails[i] = sum;
    }
    tails
}

/// Compare two LMS substrings (up to and including the next LMS position).
fn lms_substrings_equal(text: &[usize], types: &[SuffixType], i: usize, j: usize) -> bool {
    if i == j {
        return true;
    }

    let n = text.len();
    let mut k = 0;

    loop {
        let pi = i + k;
        let pj = j + k;

        if pi >= n || pj >= n {
            return pi >= n && pj >= n;
        }
        if text[pi] != text[pj] || types[pi] != types[pj] {
            return false;
        }
        if k > 0 {
            let lms_i = is_lms(types, pi);
            let lms_j = is_lms(types, pj);
            if lms_i && lms_j {
                return true;
            }
            if lms_i != lms_j {
                return false;
            }
        }

        k += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_suffix_array(text: &[u32], sa: &[usize]) {
        assert_eq!(sa.len(), text.len());

        let mut positions = sa.to_vec();
        positions.sort_unstable();
        assert_eq!(positions, (0..text.len()).collect::<Vec<_>>());

        for i in 1..sa.len() {
            assert!(
                text[sa[i - 1]..] < text[sa[i]..],
                "Not sorted at {}: {:?} >= {:?}",
                i,
                &text[sa[i - 1]..],
                &text[sa[i]..]
            );
        }
    }

    fn bytes(s: &str) -> Vec<u32> {
        s.bytes().map(u32::from).collect()
    }

    #[test]
    fn banana() {
        let sa = build_suffix_array_bytes(b"banana");
        assert_eq!(sa, vec![5, 3, 1, 0, 4, 2]);
    }

    #[test]
    fn mississippi() {
        let text = bytes("mississippi");
        assert_suffix_array(&text, &build_suffix_array(&text, 256));
    }

    #[test]
    fn single_and_repeated() {
        assert_eq!(build_suffix_array(&[0], 1), vec![0]);
        assert_eq!(build_suffix_array(&[0, 0, 0], 1), vec![2, 1, 0]);
        assert_eq!(build_suffix_array(&[1, 1], 2), vec![1, 0]);
    }

    #[test]
    fn empty_and_two_symbols() {
        assert!(build_suffix_array(&[], 4).is_empty());
        assert_eq!(build_suffix_array(&[0, 1], 2), vec![0, 1]);
        assert_eq!(build_suffix_array(&[1, 0], 2), vec![1, 0]);
    }

    #[test]
    fn classify_banana() {
        // "banana" shifted, plus sentinel
        let text: Vec<usize> = b"banana".iter().map(|&b| b as usize + 1).chain([0]).collect();
        let types = classify_suffixes(&text);
        assert_eq!(types[0], SuffixType::L); // b > a
        assert_eq!(types[1], SuffixType::S); // a < n
        assert_eq!(types[2], SuffixType::L); // n > a
        assert_eq!(types[3], SuffixType::S); // a < n
        assert_eq!(types[4], SuffixType::L); // n > a
        assert_eq!(types[5], SuffixType::L); // a > $
        assert_eq!(types[6], SuffixType::S); // $
    }

    #[test]
    fn large_alphabet_symbols() {
        let text: Vec<u32> = (0..500).map(|i| (i * 7919 % 1000) as u32).collect();
        assert_suffix_array(&text, &build_suffix_array(&text, 1000));
    }

    #[test]
    fn assorted_inputs() {
        for s in [
            "abracadabra",
            "aaaaaa",
            "zyxwvutsrqponmlkjihgfedcba",
            "abcabcabcabcabcabcab",
            "the quick brown fox jumps over the lazy dog",
            "banana\nananas\n",
        ] {
            let text = bytes(s);
            assert_suffix_array(&text, &build_suffix_array(&text, 256));
        }
    }
}
