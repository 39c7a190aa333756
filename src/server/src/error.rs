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

//! Maps `IndexError` onto an HTTP status and a `{error}` JSON body. Parse
//! failures are the client's fault (400); everything else is ours (500).

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use tagdex_index::IndexError;

pub struct ApiError(IndexError);

pub type Result<T> = std::result::Result<T, ApiError>;

impl From<IndexError> for ApiError {
    fn from(value: IndexError) -> Self {
        ApiError(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self.0 {
            IndexError::QueryParse(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let mut resp = Json(json!({ "error": self.0.to_string() })).into_response();
        *resp.status_mut() = status;
        resp
    }
}
