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

//! Ties the store and query crates into a running index: the coordinator
//! that holds the live store behind a lock, the engine that answers
//! searches against it, the updater that pulls deltas from upstream, and
//! the checkpoint format that persists it all to disk.

pub mod checkpoint;
pub mod coordinator;
pub mod engine;
pub mod error;
pub mod term_synthesis;
pub mod updater;
pub mod upstream;

pub use checkpoint::StoreState;
pub use coordinator::{Coordinator, Live};
pub use engine::{search, SearchOptions};
pub use error::{IndexError, Result};
pub use upstream::{PostInfo, TagInfo, UpstreamClient};
