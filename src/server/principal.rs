// Copyright 2025 Fernando Borretti
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

use axum::extract::FromRequestParts;
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::Html;
use maud::html;

use crate::server::state::ServerState;
use crate::server::template::bare_page;
use crate::types::entities::User;

/// The user a request acts on behalf of. Extracting it checks that the
/// server's principal still exists.
pub struct CurrentUser(pub User);

impl FromRequestParts<ServerState> for CurrentUser {
    type Rejection = (StatusCode, Html<String>);

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        match state.db.get_user(state.principal) {
            Ok(Some(user)) => Ok(CurrentUser(user)),
            Ok(None) => {
                log::warn!("User {} no longer exists.", state.principal);
                let body = html! {
                    h1 { "Unauthorized" }
                    p { "Your account no longer exists. Restart the server with another user." }
                };
                Err((
                    StatusCode::UNAUTHORIZED,
                    Html(bare_page(body).into_string()),
                ))
            }
            Err(e) => {
                log::error!("{e}");
                let body = html! {
                    h1 { "Internal Server Error" }
                };
                Err((
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Html(bare_page(body).into_string()),
                ))
            }
        }
    }
}
