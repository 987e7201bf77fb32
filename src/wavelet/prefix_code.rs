// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Prefix-code encoding: a Huffman-shaped wavelet tree.
//!
//! Frequent symbols sit near the root, so a skewed sequence costs roughly
//! `n · H0` bits instead of `n · ⌈log2 σ⌉`. Internal nodes live in an arena;
//! the root is node 0 unless the sequence holds a single distinct symbol, in
//! which case the root is that leaf and there are no bits at all.
//!
//! Each node records its parent as an arena index plus the bit that leads
//! back down, and each present symbol records its leaf slot the same way.
//! That is all `select` needs to walk up.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::io::{Read, Write};

use crate::binary::{read_u32, read_u8, write_u32, write_u8, MAX_TREE_NODES};
use crate::error::{Error, Result};
use crate::succinct::{BitVector, BitVectorBuilder};
use crate::types::MatchRange;

use super::traversal::{Cursor, Partition};
use super::WaveletSequence;

/// Largest alphabet the prefix-code encoding accepts.
pub const MAX_PREFIX_CODE_ALPHABET: u32 = 65_536;

/// Longest code a loaded tree may use.
const MAX_CODE_LEN: u8 = 64;

const TAG_INTERNAL: u8 = 0;
const TAG_LEAF: u8 = 1;

/// A child slot: another internal node or a resolved symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Child {
    Node(u32),
    Leaf(u32),
}

impl From<Child> for Cursor<u32> {
    fn from(child: Child) -> Self {
        match child {
            Child::Node(i) => Cursor::Node(i),
            Child::Leaf(s) => Cursor::Leaf(s),
        }
    }
}

/// Where a node or leaf hangs: parent arena index and the bit leading to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Slot {
    parent: u32,
    bit: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Node {
    bits: BitVector,
    parent: Option<Slot>,
    children: [Child; 2],
}

/// Huffman-shaped wavelet tree over `0..alphabet_size`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixCodeTree {
    nodes: Vec<Node>,
    root: Child,
    /// Leaf slot per symbol; `None` for absent symbols and for a leaf root.
    leaves: Vec<Option<Slot>>,
    /// Code bits (MSB first) and code length per symbol.
    codes: Vec<Option<(u64, u8)>>,
    len: usize,
}

impl PrefixCodeTree {
    /// Build from validated symbols. `counts[c]` is the frequency of `c`.
    pub(crate) fn build(symbols: &[u32], counts: &[usize]) -> Self {
        // Min-heap on (frequency, creation order); ties resolve deterministically.
        let mut heap: BinaryHeap<Reverse<(usize, u32, Child)>> = BinaryHeap::new();
        let mut order = 0u32;
        for (symbol, &count) in counts.iter().enumerate() {
            if count > 0 {
                heap.push(Reverse((count, order, Child::Leaf(symbol as u32))));
                order += 1;
            }
        }

        // Shape only; bits are filled in below.
        let mut shape: Vec<[Child; 2]> = Vec::new();
        while heap.len() > 1 {
            let (Some(Reverse((f0, _, c0))), Some(Reverse((f1, _, c1)))) = (heap.pop(), heap.pop())
            else {
                break;
            };
            shape.push([c0, c1]);
            heap.push(Reverse((f0 + f1, order, Child::Node(shape.len() as u32 - 1))));
            order += 1;
        }

        let root = match heap.pop() {
            Some(Reverse((_, _, child))) => child,
            None => Child::Leaf(0),
        };

        // Renumber so the root is node 0 and children follow parents (preorder).
        let mut nodes: Vec<(Option<Slot>, [Child; 2])> = Vec::with_capacity(shape.len());
        let mut remap = vec![0u32; shape.len()];
        if let Child::Node(r) = root {
            let mut stack = vec![(r, None)];
            while let Some((old, parent)) = stack.pop() {
                let new = nodes.len() as u32;
                remap[old as usize] = new;
                nodes.push((parent, shape[old as usize]));
                for bit in [true, false] {
                    if let Child::Node(c) = shape[old as usize][bit as usize] {
                        stack.push((c, Some(Slot { parent: new, bit })));
                    }
                }
            }
            for (_, children) in &mut nodes {
                for child in children.iter_mut() {
                    if let Child::Node(c) = child {
                        *c = remap[*c as usize];
                    }
                }
            }
        }
        let root = match root {
            Child::Node(_) => Child::Node(0),
            leaf => leaf,
        };

        // Partition the sequence down the tree.
        let codes = Self::assign_codes(&nodes, root, counts.len());
        let mut builders: Vec<BitVectorBuilder> =
            (0..nodes.len()).map(|_| BitVectorBuilder::new()).collect();
        for &symbol in symbols {
            let Some((code, len)) = codes[symbol as usize] else {
                continue;
            };
            let mut cursor = root;
            let mut depth = 0u8;
            while let Child::Node(i) = cursor {
                let bit = (code >> (len - 1 - depth)) & 1 == 1;
                builders[i as usize].push(bit);
                cursor = nodes[i as usize].1[bit as usize];
                depth += 1;
            }
        }

        let nodes: Vec<Node> = nodes
            .into_iter()
            .zip(builders)
            .map(|((parent, children), builder)| Node {
                bits: builder.build(),
                parent,
                children,
            })
            .collect();

        Self::from_nodes(nodes, root, counts.len(), symbols.len())
    }

    fn assign_codes(
        nodes: &[(Option<Slot>, [Child; 2])],
        root: Child,
        alphabet_size: usize,
    ) -> Vec<Option<(u64, u8)>> {
        let mut codes = vec![None; alphabet_size];
        match root {
            Child::Leaf(s) => {
                if let Some(c) = codes.get_mut(s as usize) {
                    *c = Some((0, 0));
                }
            }
            Child::Node(r) => {
                let mut stack = vec![(r, 0u64, 0u8)];
                while let Some((i, code, len)) = stack.pop() {
                    for bit in 0..2 {
                        let child_code = (code << 1) | bit as u64;
                        match nodes[i as usize].1[bit] {
                            Child::Node(c) => stack.push((c, child_code, len + 1)),
                            Child::Leaf(s) => {
                                if let Some(c) = codes.get_mut(s as usize) {
                                    *c = Some((child_code, len + 1));
                                }
                            }
                        }
                    }
                }
            }
        }
        codes
    }

    /// Finish a tree whose nodes and bits are in place.
    fn from_nodes(nodes: Vec<Node>, root: Child, alphabet_size: usize, len: usize) -> Self {
        let mut leaves = vec![None; alphabet_size];
        for (i, node) in nodes.iter().enumerate() {
            for (bit, child) in node.children.iter().enumerate() {
                if let Child::Leaf(s) = child {
                    if let Some(slot) = leaves.get_mut(*s as usize) {
                        *slot = Some(Slot {
                            parent: i as u32,
                            bit: bit == 1,
                        });
                    }
                }
            }
        }
        let shape: Vec<(Option<Slot>, [Child; 2])> =
            nodes.iter().map(|n| (n.parent, n.children)).collect();
        let codes = Self::assign_codes(&shape, root, alphabet_size);
        Self {
            nodes,
            root,
            leaves,
            codes,
            len,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of internal nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// `(elements routed by the parent, bits stored)` for every internal node.
    pub(crate) fn node_populations(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.nodes.iter().map(|node| {
            let routed = match node.parent {
                None => self.len,
                Some(Slot { parent, bit }) => {
                    let bits = &self.nodes[parent as usize].bits;
                    if bit {
                        bits.count_ones()
                    } else {
                        bits.count_zeros()
                    }
                }
            };
            (routed, node.bits.len())
        })
    }

    /// Code length of `symbol`, or `None` if it does not occur.
    pub fn code_len(&self, symbol: u32) -> Option<u8> {
        self.codes.get(symbol as usize).copied().flatten().map(|(_, len)| len)
    }

    #[inline]
    fn rank_bit(bits: &BitVector, pos: usize, bit: bool) -> usize {
        if bit {
            bits.rank1(pos)
        } else {
            bits.rank0(pos)
        }
    }

    pub fn access(&self, pos: usize) -> Option<u32> {
        self.access_rank(pos).map(|(symbol, _)| symbol)
    }

    /// Symbol at `pos` and its rank at `pos`, in one descent.
    pub fn access_rank(&self, mut pos: usize) -> Option<(u32, usize)> {
        if pos >= self.len {
            return None;
        }
        let mut cursor = self.root;
        loop {
            match cursor {
                Child::Leaf(symbol) => return Some((symbol, pos)),
                Child::Node(i) => {
                    let node = &self.nodes[i as usize];
                    let bit = node.bits.get(pos);
                    pos = Self::rank_bit(&node.bits, pos, bit);
                    cursor = node.children[bit as usize];
                }
            }
        }
    }

    /// Occurrences of `symbol` in `[0, pos)`; 0 for absent symbols.
    pub fn rank(&self, symbol: u32, pos: usize) -> usize {
        let Some((code, len)) = self.codes.get(symbol as usize).copied().flatten() else {
            return 0;
        };
        let mut pos = pos.min(self.len);
        let mut cursor = self.root;
        for depth in 0..len {
            let Child::Node(i) = cursor else { break };
            let bit = (code >> (len - 1 - depth)) & 1 == 1;
            let node = &self.nodes[i as usize];
            pos = Self::rank_bit(&node.bits, pos, bit);
            cursor = node.children[bit as usize];
        }
        pos
    }

    /// Position of occurrence `k` of `symbol`, walking up through parents.
    ///
    /// The caller has checked `k < freq(symbol)`.
    pub fn select(&self, symbol: u32, k: usize) -> Option<usize> {
        if let Child::Leaf(s) = self.root {
            return (s == symbol && k < self.len).then_some(k);
        }
        let mut slot = (*self.leaves.get(symbol as usize)?)?;
        let mut pos = k;
        loop {
            let node = &self.nodes[slot.parent as usize];
            pos = if slot.bit {
                node.bits.select1(pos)?
            } else {
                node.bits.select0(pos)?
            };
            match node.parent {
                Some(parent) => slot = parent,
                None => return Some(pos),
            }
        }
    }

    pub fn alloc_size(&self) -> usize {
        self.nodes
            .iter()
            .map(|n| n.bits.alloc_size() + std::mem::size_of::<Node>())
            .sum::<usize>()
            + self.leaves.len() * std::mem::size_of::<Option<Slot>>()
            + self.codes.len() * std::mem::size_of::<Option<(u64, u8)>>()
    }

    /// Preorder dump: `0` + bit vector for an internal node, `1` + symbol for a leaf.
    pub(crate) fn save<W: Write>(&self, w: &mut W) -> Result<()> {
        let mut stack = vec![self.root];
        while let Some(child) = stack.pop() {
            match child {
                Child::Leaf(symbol) => {
                    write_u8(w, TAG_LEAF)?;
                    write_u32(w, symbol)?;
                }
                Child::Node(i) => {
                    let node = &self.nodes[i as usize];
                    write_u8(w, TAG_INTERNAL)?;
                    node.bits.save(w)?;
                    stack.push(node.children[1]);
                    stack.push(node.children[0]);
                }
            }
        }
        Ok(())
    }

    pub(crate) fn load<R: Read>(
        r: &mut R,
        alphabet_size: u32,
        len: usize,
        counts: &[usize],
    ) -> Result<Self> {
        let mut nodes: Vec<Node> = Vec::new();
        let mut root = None;
        let mut seen = vec![false; alphabet_size as usize];
        // Slots still waiting for a child, with the population that child must
        // have and its depth.
        let mut pending: Vec<(Option<Slot>, usize, u8)> = vec![(None, len, 0)];

        while let Some((slot, population, depth)) = pending.pop() {
            let child = match read_u8(r)? {
                TAG_LEAF => {
                    let symbol = read_u32(r)?;
                    if symbol >= alphabet_size || seen[symbol as usize] {
                        return Err(Error::corrupt(format!(
                            "prefix-code leaf symbol {} invalid or repeated",
                            symbol
                        )));
                    }
                    seen[symbol as usize] = true;
                    if counts[symbol as usize] != population {
                        return Err(Error::corrupt(format!(
                            "prefix-code leaf {} holds {} elements, occurrence table says {}",
                            symbol, population, counts[symbol as usize]
                        )));
                    }
                    Child::Leaf(symbol)
                }
                TAG_INTERNAL => {
                    if nodes.len() >= MAX_TREE_NODES.min(alphabet_size as usize) {
                        return Err(Error::corrupt("prefix-code tree has too many nodes"));
                    }
                    // Codes are held in a u64.
                    if depth >= MAX_CODE_LEN {
                        return Err(Error::corrupt("prefix-code tree is too deep"));
                    }
                    let bits = BitVector::load(r)?;
                    if bits.len() != population {
                        return Err(Error::corrupt(format!(
                            "prefix-code node has {} bits, parent routes {} elements to it",
                            bits.len(),
                            population
                        )));
                    }
                    let index = nodes.len() as u32;
                    let child_depth = depth + 1;
                    pending.push((Some(Slot { parent: index, bit: true }), bits.count_ones(), child_depth));
                    pending.push((Some(Slot { parent: index, bit: false }), bits.count_zeros(), child_depth));
                    nodes.push(Node {
                        bits,
                        parent: slot,
                        children: [Child::Leaf(u32::MAX); 2],
                    });
                    Child::Node(index)
                }
                tag => {
                    return Err(Error::SerializationMismatch {
                        what: "prefix-code node tag",
                        expected: TAG_INTERNAL as u64,
                        found: tag as u64,
                    })
                }
            };
            match slot {
                None => root = Some(child),
                Some(Slot { parent, bit }) => nodes[parent as usize].children[bit as usize] = child,
            }
        }

        let root = root.ok_or_else(|| Error::corrupt("prefix-code tree has no root"))?;
        if let Some(missing) = counts
            .iter()
            .enumerate()
            .find(|&(s, &c)| c > 0 && !seen[s])
        {
            return Err(Error::corrupt(format!(
                "symbol {} occurs but has no prefix-code leaf",
                missing.0
            )));
        }
        Ok(Self::from_nodes(nodes, root, alphabet_size as usize, len))
    }
}

impl Partition for PrefixCodeTree {
    type Node = u32;

    fn root(&self) -> Cursor<u32> {
        self.root.into()
    }

    #[inline]
    fn split(&self, node: u32, range: MatchRange) -> [MatchRange; 2] {
        let bits = &self.nodes[node as usize].bits;
        [
            MatchRange::new(bits.rank0(range.start), bits.rank0(range.end)),
            MatchRange::new(bits.rank1(range.start), bits.rank1(range.end)),
        ]
    }

    #[inline]
    fn child(&self, node: u32, bit: usize) -> Cursor<u32> {
        self.nodes[node as usize].children[bit].into()
    }

    fn lockstep<'a>(&self, _other: &'a WaveletSequence) -> Option<&'a Self> {
        None
    }
}
