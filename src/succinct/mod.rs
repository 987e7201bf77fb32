// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Bit-level succinct building blocks.
//!
//! - [`BitVector`]: rank/select over a plain bit sequence (Rank9 layout)
//! - [`CumulativeArray`]: Elias–Fano prefix sums with predecessor `find`
//!
//! Both are immutable after construction and carry no interior mutability,
//! so they are `Send + Sync` and can be queried from any number of threads.

mod bit_vector;
mod cumulative;

pub use bit_vector::{BitVector, BitVectorBuilder};
pub use cumulative::{CumulativeArray, CumulativeArrayBuilder};
