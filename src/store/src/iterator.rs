// Copyright 2026 The TagDex Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Lazy sorted-`i32` streams over posting lists, and the combinators that
//! compose them (intersection, union, difference, negation, limit, shuffle).
//! Every iterator carries an optional fast `skip_until`; combinators fall
//! back to linear advance when a child doesn't offer one.

use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::codec::{self, CODEC_INT24, CODEC_RAW_INT32, CODEC_VARINT_DELTA};
use crate::error::Result;

/// Capability set shared by every posting-list stream: peek/advance plus an
/// optional fast-forward. Boxed as a trait object at combinator boundaries
/// rather than monomorphizing arbitrarily deep combinator trees.
pub trait PostingIter {
    fn has_more(&mut self) -> bool;
    fn peek(&mut self) -> i32;
    fn next(&mut self) -> i32;

    /// Advances while the current value is less than `target`. The default
    /// falls back to linear `next()` calls; leaf decoders override it with
    /// a tighter loop over their own cursor.
    fn skip_until(&mut self, target: i32) {
        while self.has_more() && self.peek() < target {
            self.next();
        }
    }
}

pub type BoxedIter = Box<dyn PostingIter + Send>;

/// Drains `iter` into a freshly allocated, owned vector.
pub fn to_vec(mut iter: BoxedIter) -> Vec<i32> {
    let mut out = Vec::new();
    while iter.has_more() {
        out.push(iter.next());
    }
    out
}

// ---------------------------------------------------------------------
// Leaf iterators
// ---------------------------------------------------------------------

pub struct EmptyIter;

impl PostingIter for EmptyIter {
    fn has_more(&mut self) -> bool {
        false
    }

    fn peek(&mut self) -> i32 {
        panic!("peek() called on an empty posting iterator")
    }

    fn next(&mut self) -> i32 {
        panic!("next() called on an empty posting iterator")
    }
}

pub fn empty() -> BoxedIter {
    Box::new(EmptyIter)
}

pub struct SliceIter {
    values: Vec<i32>,
    pos: usize,
}

impl SliceIter {
    pub fn new(values: Vec<i32>) -> Self {
        Self { values, pos: 0 }
    }
}

impl PostingIter for SliceIter {
    fn has_more(&mut self) -> bool {
        self.pos < self.values.len()
    }

    fn peek(&mut self) -> i32 {
        self.values[self.pos]
    }

    fn next(&mut self) -> i32 {
        let v = self.values[self.pos];
        self.pos += 1;
        v
    }

    fn skip_until(&mut self, target: i32) {
        while self.pos < self.values.len() && self.values[self.pos] < target {
            self.pos += 1;
        }
    }
}

pub fn slice(values: Vec<i32>) -> BoxedIter {
    Box::new(SliceIter::new(values))
}

/// Decodes a big-endian, sign-extended 3-byte-per-value sequence.
pub struct Int24Iter {
    bytes: Vec<u8>,
    pos: usize,
}

impl Int24Iter {
    fn new(bytes: Vec<u8>) -> Self {
        Self { bytes, pos: 0 }
    }

    fn at(&self, pos: usize) -> i32 {
        codec::bytes_to_int24([self.bytes[pos], self.bytes[pos + 1], self.bytes[pos + 2]])
    }
}

impl PostingIter for Int24Iter {
    fn has_more(&mut self) -> bool {
        self.pos + 3 <= self.bytes.len()
    }

    fn peek(&mut self) -> i32 {
        self.at(self.pos)
    }

    fn next(&mut self) -> i32 {
        let v = self.at(self.pos);
        self.pos += 3;
        v
    }

    fn skip_until(&mut self, target: i32) {
        while self.pos + 3 <= self.bytes.len() && self.at(self.pos) < target {
            self.pos += 3;
        }
    }
}

/// Decodes successive zig-zag varint deltas. Decoding is eager one-step-
/// ahead (`advance`) so `peek` never has to re-decode.
pub struct VarintDeltaIter {
    bytes: Vec<u8>,
    pos: usize,
    previous: i64,
    next_value: i32,
    more: bool,
}

impl VarintDeltaIter {
    fn new(bytes: Vec<u8>) -> Self {
        let mut it = Self {
            bytes,
            pos: 0,
            previous: 0,
            next_value: 0,
            more: true,
        };
        it.advance();
        it
    }

    fn advance(&mut self) {
        if self.pos >= self.bytes.len() {
            self.more = false;
            return;
        }

        let (delta, n) = codec::read_zigzag_varint32(&self.bytes[self.pos..])
            .expect("posting list contains a corrupt varint-delta payload");
        self.pos += n;
        self.previous += delta as i64;
        self.next_value = self.previous as i32;
    }
}

impl PostingIter for VarintDeltaIter {
    fn has_more(&mut self) -> bool {
        self.more
    }

    fn peek(&mut self) -> i32 {
        self.next_value
    }

    fn next(&mut self) -> i32 {
        let v = self.next_value;
        self.advance();
        v
    }
}

/// Decodes a little-endian, 4-byte-per-value sequence.
pub struct RawInt32Iter {
    bytes: Vec<u8>,
    pos: usize,
}

impl RawInt32Iter {
    fn new(bytes: Vec<u8>) -> Self {
        Self { bytes, pos: 0 }
    }

    fn at(&self, pos: usize) -> i32 {
        i32::from_le_bytes([
            self.bytes[pos],
            self.bytes[pos + 1],
            self.bytes[pos + 2],
            self.bytes[pos + 3],
        ])
    }
}

impl PostingIter for RawInt32Iter {
    fn has_more(&mut self) -> bool {
        self.pos + 4 <= self.bytes.len()
    }

    fn peek(&mut self) -> i32 {
        self.at(self.pos)
    }

    fn next(&mut self) -> i32 {
        let v = self.at(self.pos);
        self.pos += 4;
        v
    }

    fn skip_until(&mut self, target: i32) {
        while self.pos + 4 <= self.bytes.len() && self.at(self.pos) < target {
            self.pos += 4;
        }
    }
}

/// Builds the leaf iterator for a physical posting list: `bytes[0]` selects
/// the codec, `bytes[1..]` is the payload. An empty slice decodes to the
/// empty iterator.
pub fn decode_leaf(bytes: &[u8]) -> Result<BoxedIter> {
    if bytes.is_empty() {
        return Ok(empty());
    }

    let codec_id = bytes[0];
    codec::validate_codec_id(codec_id)?;
    let payload = bytes[1..].to_vec();

    Ok(match codec_id {
        CODEC_INT24 => Box::new(Int24Iter::new(payload)),
        CODEC_VARINT_DELTA => Box::new(VarintDeltaIter::new(payload)),
        CODEC_RAW_INT32 => Box::new(RawInt32Iter::new(payload)),
        _ => unreachable!("validated above"),
    })
}

// ---------------------------------------------------------------------
// Combinators
// ---------------------------------------------------------------------

pub struct NegateIter(BoxedIter);

impl NegateIter {
    pub fn new(inner: BoxedIter) -> BoxedIter {
        Box::new(Self(inner))
    }
}

impl PostingIter for NegateIter {
    fn has_more(&mut self) -> bool {
        self.0.has_more()
    }

    fn peek(&mut self) -> i32 {
        -self.0.peek()
    }

    fn next(&mut self) -> i32 {
        -self.0.next()
    }
}

pub struct LimitIter {
    remaining: usize,
    inner: BoxedIter,
}

impl LimitIter {
    pub fn new(limit: usize, inner: BoxedIter) -> BoxedIter {
        Box::new(Self {
            remaining: limit,
            inner,
        })
    }
}

impl PostingIter for LimitIter {
    fn has_more(&mut self) -> bool {
        self.remaining > 0 && self.inner.has_more()
    }

    fn peek(&mut self) -> i32 {
        self.inner.peek()
    }

    fn next(&mut self) -> i32 {
        self.remaining -= 1;
        self.inner.next()
    }
}

/// Materializes the whole input, then replays it in a freshly-seeded
/// Fisher-Yates shuffle. Does not preserve order; combine at the outermost
/// position only.
pub struct ShuffleIter {
    values: Vec<i32>,
    pos: usize,
}

impl ShuffleIter {
    pub fn new(inner: BoxedIter) -> BoxedIter {
        let mut values = to_vec(inner);
        let mut rng = rand::rngs::StdRng::from_entropy();
        values.shuffle(&mut rng);
        Box::new(Self { values, pos: 0 })
    }
}

impl PostingIter for ShuffleIter {
    fn has_more(&mut self) -> bool {
        self.pos < self.values.len()
    }

    fn peek(&mut self) -> i32 {
        self.values[self.pos]
    }

    fn next(&mut self) -> i32 {
        let v = self.values[self.pos];
        self.pos += 1;
        v
    }
}

pub struct AndIter {
    first: BoxedIter,
    second: BoxedIter,
}

impl AndIter {
    pub fn new(first: BoxedIter, second: BoxedIter) -> BoxedIter {
        Box::new(Self { first, second })
    }
}

impl PostingIter for AndIter {
    fn has_more(&mut self) -> bool {
        while self.first.has_more() && self.second.has_more() {
            let a = self.first.peek();
            let b = self.second.peek();
            if a == b {
                return true;
            } else if a < b {
                self.first.skip_until(b);
            } else {
                self.second.skip_until(a);
            }
        }
        false
    }

    fn peek(&mut self) -> i32 {
        self.first.peek()
    }

    fn next(&mut self) -> i32 {
        self.first.next()
    }
}

pub struct OrIter {
    first: BoxedIter,
    second: BoxedIter,
}

impl OrIter {
    pub fn new(first: BoxedIter, second: BoxedIter) -> BoxedIter {
        Box::new(Self { first, second })
    }
}

impl PostingIter for OrIter {
    fn has_more(&mut self) -> bool {
        self.first.has_more() || self.second.has_more()
    }

    fn peek(&mut self) -> i32 {
        match (self.first.has_more(), self.second.has_more()) {
            (true, true) => {
                let a = self.first.peek();
                let b = self.second.peek();
                a.min(b)
            }
            (true, false) => self.first.peek(),
            (false, true) => self.second.peek(),
            (false, false) => panic!("peek() past the end of an OR iterator"),
        }
    }

    fn next(&mut self) -> i32 {
        match (self.first.has_more(), self.second.has_more()) {
            (true, true) => {
                let a = self.first.peek();
                let b = self.second.peek();
                if a == b {
                    self.second.next();
                    self.first.next()
                } else if a < b {
                    self.first.next()
                } else {
                    self.second.next()
                }
            }
            (true, false) => self.first.next(),
            (false, true) => self.second.next(),
            (false, false) => panic!("next() past the end of an OR iterator"),
        }
    }
}

pub struct DiffIter {
    first: BoxedIter,
    second: BoxedIter,
}

impl DiffIter {
    pub fn new(first: BoxedIter, second: BoxedIter) -> BoxedIter {
        Box::new(Self { first, second })
    }
}

impl PostingIter for DiffIter {
    fn has_more(&mut self) -> bool {
        while self.first.has_more() {
            if !self.second.has_more() {
                return true;
            }

            let a = self.first.peek();
            let b = self.second.peek();
            if a < b {
                return true;
            } else if a == b {
                let a = self.first.next();
                self.second.skip_until(a);
            } else {
                self.second.skip_until(a);
            }
        }
        false
    }

    fn peek(&mut self) -> i32 {
        self.first.peek()
    }

    fn next(&mut self) -> i32 {
        self.first.next()
    }
}

/// Folds an n-ary AND left: `op(x1, op(x2, op(x3, ...)))`. Zero operands
/// yields the empty iterator; one operand is returned unchanged.
pub fn and_n(mut iters: Vec<BoxedIter>) -> BoxedIter {
    match iters.len() {
        0 => empty(),
        1 => iters.pop().unwrap(),
        _ => {
            let first = iters.remove(0);
            and_n_pair(first, iters)
        }
    }
}

fn and_n_pair(first: BoxedIter, mut rest: Vec<BoxedIter>) -> BoxedIter {
    if rest.is_empty() {
        first
    } else {
        let second = and_n(std::mem::take(&mut rest));
        AndIter::new(first, second)
    }
}

pub fn or_n(mut iters: Vec<BoxedIter>) -> BoxedIter {
    match iters.len() {
        0 => empty(),
        1 => iters.pop().unwrap(),
        _ => {
            let first = iters.remove(0);
            let second = or_n(iters);
            OrIter::new(first, second)
        }
    }
}

/// `x1 - AND(x2, x3, ...)` when more than two operands: the first operand
/// is the minuend, the rest are ANDed together before being subtracted.
pub fn diff_n(mut iters: Vec<BoxedIter>) -> BoxedIter {
    match iters.len() {
        0 => empty(),
        1 => iters.pop().unwrap(),
        2 => {
            let second = iters.pop().unwrap();
            let first = iters.pop().unwrap();
            DiffIter::new(first, second)
        }
        _ => {
            let first = iters.remove(0);
            let second = and_n(iters);
            DiffIter::new(first, second)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{encode, CODEC_INT24, CODEC_RAW_INT32, CODEC_VARINT_DELTA};

    fn leaf_bytes(codec_id: u8, values: &[i32]) -> Vec<u8> {
        let mut bytes = vec![codec_id];
        bytes.extend(encode(codec_id, values).unwrap());
        bytes
    }

    #[test]
    fn decode_leaf_round_trips_each_codec() {
        let values = vec![-40, -2, 0, 5, 19, 1000];
        for codec_id in [CODEC_INT24, CODEC_VARINT_DELTA, CODEC_RAW_INT32] {
            let bytes = leaf_bytes(codec_id, &values);
            let iter = decode_leaf(&bytes).unwrap();
            assert_eq!(to_vec(iter), values, "codec {codec_id}");
        }
    }

    #[test]
    fn decode_leaf_empty_bytes_is_empty_iterator() {
        let iter = decode_leaf(&[]).unwrap();
        assert_eq!(to_vec(iter), Vec::<i32>::new());
    }

    #[test]
    fn decode_leaf_unknown_codec_errors() {
        assert!(decode_leaf(&[9, 1, 2, 3]).is_err());
    }

    fn sorted_unique(mut v: Vec<i32>) -> Vec<i32> {
        v.sort_unstable();
        v.dedup();
        v
    }

    #[test]
    fn and_is_intersection() {
        let a = sorted_unique(vec![1, 2, 3, 5, 8]);
        let b = sorted_unique(vec![2, 3, 4, 8, 9]);
        let expect: Vec<i32> = a.iter().filter(|x| b.contains(x)).copied().collect();

        let result = to_vec(AndIter::new(slice(a), slice(b)));
        assert_eq!(result, expect);
    }

    #[test]
    fn or_is_union_without_duplicates() {
        let a = sorted_unique(vec![1, 3, 5]);
        let b = sorted_unique(vec![2, 3, 4]);
        let mut expect = a.clone();
        expect.extend(b.iter());
        let expect = sorted_unique(expect);

        let result = to_vec(OrIter::new(slice(a), slice(b)));
        assert_eq!(result, expect);
    }

    #[test]
    fn diff_is_set_minus() {
        let a = sorted_unique(vec![1, 2, 3, 4, 5]);
        let b = sorted_unique(vec![2, 4]);
        let expect: Vec<i32> = a.iter().filter(|x| !b.contains(x)).copied().collect();

        let result = to_vec(DiffIter::new(slice(a), slice(b)));
        assert_eq!(result, expect);
    }

    #[test]
    fn not_equals_diff_of_all_and_a() {
        let all = sorted_unique(vec![1, 2, 3, 4, 5, 6, 7]);
        let a = sorted_unique(vec![1, 2, 3, 4, 5]);

        let not_a = to_vec(DiffIter::new(slice(all.clone()), slice(a.clone())));
        let expect: Vec<i32> = all.iter().filter(|x| !a.contains(x)).copied().collect();
        assert_eq!(not_a, expect);
    }

    #[test]
    fn or_with_empty_is_identity() {
        let a = vec![1, 2, 3];
        let result = to_vec(OrIter::new(slice(a.clone()), empty()));
        assert_eq!(result, a);
    }

    #[test]
    fn and_with_all_is_identity() {
        let all = vec![1, 2, 3, 4];
        let a = vec![2, 3];
        let result = to_vec(AndIter::new(slice(all), slice(a.clone())));
        assert_eq!(result, a);
    }

    #[test]
    fn negate_flips_sign_and_order() {
        // internal ascending [-5, -3, -1] negates to descending [5, 3, 1]
        let internal = vec![-5, -3, -1];
        let result = to_vec(NegateIter::new(slice(internal)));
        assert_eq!(result, vec![5, 3, 1]);
    }

    #[test]
    fn limit_caps_result_length() {
        let values: Vec<i32> = (0..500).collect();
        let result = to_vec(LimitIter::new(120, slice(values)));
        assert_eq!(result.len(), 120);
        assert_eq!(result[0], 0);
        assert_eq!(result[119], 119);
    }

    #[test]
    fn shuffle_preserves_the_set_but_not_necessarily_the_order() {
        let values: Vec<i32> = (0..200).collect();
        let result = to_vec(ShuffleIter::new(slice(values.clone())));
        let mut sorted = result.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, values);
    }

    #[test]
    fn n_ary_and_folds_left() {
        let a = slice(vec![1, 2, 3, 4, 5]);
        let b = slice(vec![2, 3, 4]);
        let c = slice(vec![3, 4, 5]);
        let result = to_vec(and_n(vec![a, b, c]));
        assert_eq!(result, vec![3, 4]);
    }

    #[test]
    fn n_ary_diff_subtracts_and_of_the_rest() {
        let a = slice(vec![1, 2, 3, 4, 5]);
        let b = slice(vec![2, 4]);
        let c = slice(vec![2, 3]);
        // a - AND(b, c) = a - {2} = {1,3,4,5}
        let result = to_vec(diff_n(vec![a, b, c]));
        assert_eq!(result, vec![1, 3, 4, 5]);
    }

    #[test]
    fn skip_until_on_int24_leaf_is_fast_path() {
        let bytes = leaf_bytes(CODEC_INT24, &[1, 3, 5, 7, 9]);
        let mut iter = decode_leaf(&bytes).unwrap();
        iter.skip_until(6);
        assert_eq!(iter.next(), 7);
    }
}
