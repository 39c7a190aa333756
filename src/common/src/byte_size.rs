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

use std::fmt;

/// A byte count with a human-readable `Display`, used when logging the
/// store's `memory_size()`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct ByteSize(pub u64);

const KB: f64 = 1024.0;
const MB: f64 = KB * 1024.0;
const GB: f64 = MB * 1024.0;

impl fmt::Display for ByteSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.0 as f64;
        match bytes {
            b if b >= GB => write!(f, "{:.2}gb", b / GB),
            b if b >= MB => write!(f, "{:.2}mb", b / MB),
            b if b >= KB => write!(f, "{:.2}kb", b / KB),
            b => write!(f, "{b:.0}b"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_by_magnitude() {
        assert_eq!(ByteSize(42).to_string(), "42b");
        assert_eq!(ByteSize(2048).to_string(), "2.00kb");
        assert_eq!(ByteSize(5 * 1024 * 1024).to_string(), "5.00mb");
    }
}
