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

#[derive(Error, Debug)]
pub enum IndexError {
    #[error(transparent)]
    Store(#[from] tagdex_store::StoreError),

    #[error(transparent)]
    QueryParse(#[from] tagdex_query::QueryError),

    #[error("internal error while executing a search: {0}")]
    SearchInternal(String),

    #[error("updater could not reach upstream: {0}")]
    Updater(String),

    #[error("checkpoint I/O failed: {0}")]
    Checkpoint(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, IndexError>;
