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

use clap::Parser;

use crate::error::{CommonError, Result};

/// Command-line flags for the search service.
#[derive(Parser, Debug, Clone)]
#[command(name = "tagdex", about = "In-memory inverted-index search service")]
pub struct Opts {
    /// Rescans all item infos from the database on startup.
    #[arg(long)]
    pub rebuild_items: bool,

    /// Rescans all tag infos from the database on startup.
    #[arg(long)]
    pub rebuild_tags: bool,

    /// Executes a fixed "slow" query a lot of times, then exits.
    #[arg(long)]
    pub benchmark: bool,

    /// Filename of the checkpoint file to read and write.
    #[arg(long, default_value = "/tmp/checkpoint.store")]
    pub checkpoint_file: String,

    /// Connection string for the upstream Postgres database.
    #[arg(long, env = "TAGDEX_POSTGRES")]
    pub postgres: String,

    /// Listen address for the rest api http server.
    #[arg(long, default_value = ":8080")]
    pub http_listen: String,

    /// Raises this service's own log targets to DEBUG.
    #[arg(long)]
    pub verbose: bool,
}

impl Opts {
    /// Expands a leading `:port` shorthand to `0.0.0.0:port` and validates
    /// that the result is a usable socket address.
    pub fn normalized_listen_addr(&self) -> Result<String> {
        let expanded = match self.http_listen.strip_prefix(':') {
            Some(port) => format!("0.0.0.0:{port}"),
            None => self.http_listen.clone(),
        };

        expanded.parse::<std::net::SocketAddr>().map_err(|_| {
            CommonError::Config(format!("invalid http listen address: {}", self.http_listen))
        })?;

        Ok(expanded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flags_with_defaults() {
        let opts = Opts::parse_from([
            "tagdex",
            "--rebuild-items",
            "--checkpoint-file",
            "/tmp/x",
            "--postgres",
            "postgres://localhost/tags",
        ]);

        assert!(opts.rebuild_items);
        assert!(!opts.rebuild_tags);
        assert!(!opts.benchmark);
        assert_eq!(opts.checkpoint_file, "/tmp/x");
        assert_eq!(opts.http_listen, ":8080");
        assert!(!opts.verbose);
    }

    #[test]
    fn normalized_listen_addr_expands_bare_port() {
        let mut opts = base_opts();
        opts.http_listen = ":8080".to_string();
        assert_eq!(opts.normalized_listen_addr().unwrap(), "0.0.0.0:8080");
    }

    #[test]
    fn normalized_listen_addr_rejects_garbage() {
        let mut opts = base_opts();
        opts.http_listen = "not-an-address".to_string();
        assert!(matches!(
            opts.normalized_listen_addr(),
            Err(CommonError::Config(_))
        ));
    }

    fn base_opts() -> Opts {
        Opts::parse_from(["tagdex", "--postgres", "postgres://localhost/tags"])
    }
}
