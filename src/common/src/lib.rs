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

//! Shared ambient stack: error taxonomy, CLI/config, logging and metrics.
//!
//! These pieces carry no index-specific logic; they exist so the other
//! crates in this workspace can report errors, take flags, and emit
//! structured telemetry the same way the rest of the service does.

pub mod byte_size;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;

pub use byte_size::ByteSize;
pub use config::Opts;
pub use error::{CommonError, Result};
pub use logging::{init_logger, LoggerSettings};
pub use metrics::Metrics;
