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

use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use axum::Router;
use axum::http::HeaderName;
use axum::http::StatusCode;
use axum::http::header::CACHE_CONTROL;
use axum::http::header::CONTENT_TYPE;
use axum::response::Html;
use axum::routing::get;
use axum::routing::post;
use maud::html;
use tokio::net::TcpListener;
use tokio::net::TcpStream;
use tokio::signal;
use tokio::time::sleep;

use crate::config::Config;
use crate::db::Database;
use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::fail;
use crate::server::attendance;
use crate::server::course;
use crate::server::dashboard::dashboard_handler;
use crate::server::state::ServerState;
use crate::server::teacher;
use crate::server::template::bare_page;

pub const DATABASE_FILE_NAME: &str = "attendance.db";

/// Open the database in `directory`, creating it if needed.
pub fn open_database(directory: &Path) -> Fallible<Database> {
    if !directory.exists() {
        return fail("directory does not exist.");
    }
    let db_path = directory.join(DATABASE_FILE_NAME);
    let db_path = db_path
        .to_str()
        .ok_or_else(|| ErrorReport::new("invalid path"))?;
    Database::new(db_path)
}

pub async fn start_server(directory: PathBuf, username: String, config: Config) -> Fallible<()> {
    let db = open_database(&directory)?;
    let Some(user) = db.find_user_by_username(&username)? else {
        return fail(format!(
            "no such user: {username}. Create one with the add-user command."
        ));
    };
    log::debug!("Serving as {} ({}).", user.username, user.id);

    let bind = config.bind_address();
    let open_browser = config.open_browser;
    let state = ServerState::new(db, config, user.id);
    let app = router(state);

    if open_browser {
        // Open the browser once the server accepts connections.
        let url = format!("http://{bind}/");
        let probe = bind.clone();
        tokio::spawn(async move {
            loop {
                if let Ok(stream) = TcpStream::connect(&probe).await {
                    drop(stream);
                    break;
                }
                sleep(Duration::from_millis(1)).await;
            }
            let _ = open::that(url);
        });
    }

    log::info!("Starting server on {bind}");
    let listener = TcpListener::bind(&bind).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    log::info!("Server stopped.");
    Ok(())
}

pub fn router(state: ServerState) -> Router {
    let app = Router::new();
    let app = app.route("/", get(dashboard_handler));
    let app = app.route("/courses", get(course::list_handler));
    let app = app.route(
        "/course/add",
        get(course::add_form_handler).post(course::add_handler),
    );
    let app = app.route("/course/{id}", get(course::detail_handler));
    let app = app.route(
        "/course/{id}/edit",
        get(course::edit_form_handler).post(course::edit_handler),
    );
    let app = app.route("/course/{id}/delete", post(course::delete_handler));
    let app = app.route("/course/{id}/enroll", post(course::enroll_handler));
    let app = app.route(
        "/course/{id}/mark",
        get(attendance::mark_form_handler).post(attendance::mark_handler),
    );
    let app = app.route(
        "/course/{id}/quick-mark/{status}",
        post(attendance::quick_mark_handler),
    );
    let app = app.route("/attendance/{id}/edit", post(attendance::edit_handler));
    let app = app.route("/attendance/{id}/delete", post(attendance::delete_handler));
    let app = app.route("/teachers", get(teacher::list_handler));
    let app = app.route(
        "/teacher/add",
        get(teacher::add_form_handler).post(teacher::add_handler),
    );
    let app = app.route(
        "/teacher/{id}/edit",
        get(teacher::edit_form_handler).post(teacher::edit_handler),
    );
    let app = app.route("/teacher/{id}/delete", post(teacher::delete_handler));
    let app = app.route("/style.css", get(stylesheet));
    let app = app.fallback(not_found_handler);
    app.with_state(state)
}

async fn stylesheet() -> (StatusCode, [(HeaderName, &'static str); 2], &'static [u8]) {
    let bytes = include_bytes!("style.css");
    (
        StatusCode::OK,
        [
            (CONTENT_TYPE, "text/css"),
            (CACHE_CONTROL, "public, max-age=604800, immutable"),
        ],
        bytes,
    )
}

async fn not_found_handler() -> (StatusCode, Html<String>) {
    let body = html! {
        h1 { "Not Found" }
        p { a href="/" { "Back to the dashboard" } }
    };
    (StatusCode::NOT_FOUND, Html(bare_page(body).into_string()))
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        log::error!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    log::debug!("Shutdown signal received.");
}
