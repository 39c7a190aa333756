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

use thiserror::Error;

/// Corruption-class errors from the codec layer. Per the error handling
/// design, these are programmer/data errors: callers are expected to let
/// them propagate and crash rather than swallow them.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum StoreError {
    #[error("unknown codec id {0}")]
    UnknownCodec(u8),

    #[error("varint overflowed 32 bits while decoding a posting list")]
    VarintOverflow,

    #[error("truncated varint while decoding a posting list")]
    VarintTruncated,

    #[error("attempted to append to a non-append-friendly codec")]
    AppendNotSupported,
}

pub type Result<T> = std::result::Result<T, StoreError>;
