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

//! The three interchangeable encodings for sorted `i32` sequences, each
//! self-identifying by a leading tag byte. Ids 1, 2 and 4 are reserved for
//! backward compatibility with existing checkpoints; an unrecognized id is
//! a hard failure (see [`StoreError::UnknownCodec`]).

use crate::error::{Result, StoreError};

pub const CODEC_INT24: u8 = 1;
pub const CODEC_VARINT_DELTA: u8 = 2;
pub const CODEC_RAW_INT32: u8 = 4;

/// Threshold above which a full `replace` picks the raw int32 codec over
/// varint-delta.
const RAW_INT32_THRESHOLD: usize = 100_000;

/// Picks the codec id used when fully replacing a posting list of `len`
/// values. Single-value appends to a fresh key always use int24 instead
/// (handled by the iter-store facade, not here).
pub fn optimal_codec(len: usize) -> u8 {
    if len > RAW_INT32_THRESHOLD {
        CODEC_RAW_INT32
    } else {
        CODEC_VARINT_DELTA
    }
}

pub fn can_append(codec_id: u8) -> Result<bool> {
    match codec_id {
        CODEC_INT24 => Ok(true),
        CODEC_VARINT_DELTA | CODEC_RAW_INT32 => Ok(false),
        other => Err(StoreError::UnknownCodec(other)),
    }
}

pub fn validate_codec_id(codec_id: u8) -> Result<()> {
    match codec_id {
        CODEC_INT24 | CODEC_VARINT_DELTA | CODEC_RAW_INT32 => Ok(()),
        other => Err(StoreError::UnknownCodec(other)),
    }
}

/// Encodes `values` (assumed sorted ascending) with the given codec id.
pub fn encode(codec_id: u8, values: &[i32]) -> Result<Vec<u8>> {
    match codec_id {
        CODEC_INT24 => Ok(encode_int24(values)),
        CODEC_VARINT_DELTA => Ok(encode_varint_delta(values)),
        CODEC_RAW_INT32 => Ok(encode_raw_int32(values)),
        other => Err(StoreError::UnknownCodec(other)),
    }
}

pub fn int24_to_bytes(value: i32) -> [u8; 3] {
    [
        ((value >> 16) & 0xff) as u8,
        ((value >> 8) & 0xff) as u8,
        (value & 0xff) as u8,
    ]
}

pub fn bytes_to_int24(bytes: [u8; 3]) -> i32 {
    let value = ((bytes[0] as i32) << 16) | ((bytes[1] as i32) << 8) | (bytes[2] as i32);
    if bytes[0] & 0x80 != 0 {
        value | !0xff_ffff
    } else {
        value
    }
}

fn encode_int24(values: &[i32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(values.len() * 3);
    for &value in values {
        out.extend_from_slice(&int24_to_bytes(value));
    }
    out
}

fn encode_raw_int32(values: &[i32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(values.len() * 4);
    for &value in values {
        out.extend_from_slice(&value.to_le_bytes());
    }
    out
}

/// Encodes successive deltas (first delta is relative to 0) as zig-zag
/// varints, matching the classic `binary.PutVarint` layout: bit 0 of the
/// zig-zag encoding carries the sign, the remaining bits the magnitude,
/// and each byte's high bit signals "more bytes follow".
fn encode_varint_delta(values: &[i32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(values.len() * 2);
    let mut previous: i64 = 0;
    for &value in values {
        let delta = value as i64 - previous;
        write_zigzag_varint(&mut out, delta);
        previous = value as i64;
    }
    out
}

fn write_zigzag_varint(out: &mut Vec<u8>, value: i64) {
    let mut zigzag = ((value << 1) ^ (value >> 63)) as u64;
    loop {
        let mut byte = (zigzag & 0x7f) as u8;
        zigzag >>= 7;
        if zigzag != 0 {
            byte |= 0x80;
            out.push(byte);
        } else {
            out.push(byte);
            break;
        }
    }
}

/// Decodes one zig-zag varint from the front of `bytes`, returning the
/// decoded delta and the number of bytes consumed. Overflow past 32 bits
/// and truncation (ran out of bytes without a terminating byte) are both
/// reported as errors rather than left to panic incidentally elsewhere.
pub fn read_zigzag_varint32(bytes: &[u8]) -> Result<(i32, usize)> {
    let mut ux: u32 = 0;
    let mut shift: u32 = 0;
    for (i, &b) in bytes.iter().enumerate() {
        if b < 0x80 {
            if i > 4 || (i == 4 && b > 1) {
                return Err(StoreError::VarintOverflow);
            }
            ux |= (b as u32) << shift;
            let mut x = (ux >> 1) as i32;
            if ux & 1 != 0 {
                x = !x;
            }
            return Ok((x, i + 1));
        }
        ux |= ((b & 0x7f) as u32) << shift;
        shift += 7;
    }
    Err(StoreError::VarintTruncated)
}
