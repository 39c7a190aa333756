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

//! The storage engine: a byte-keyed blob store, codecs for sorted `i32`
//! sequences, lazy posting-list iterators and their combinators, and the
//! facade that ties them together.

pub mod byte_store;
pub mod codec;
pub mod error;
pub mod iter_store;
pub mod iterator;

pub use byte_store::ByteStore;
pub use error::{Result, StoreError};
pub use iter_store::{merge_into, IterStore};
pub use iterator::{BoxedIter, PostingIter};
