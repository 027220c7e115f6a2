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

use axum::response::Html;
use maud::DOCTYPE;
use maud::Markup;
use maud::html;

use crate::projector::AttendanceReport;
use crate::server::state::Notice;
use crate::server::state::ServerState;
use crate::types::entities::User;

fn head(title: &str) -> Markup {
    html! {
        head {
            meta charset="utf-8";
            meta name="viewport" content="width=device-width, initial-scale=1";
            title { (title) " · attendance" }
            link rel="stylesheet" href="/style.css";
        }
    }
}

pub fn page_template(user: &User, notice: Option<Notice>, title: &str, body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            (head(title))
            body {
                nav {
                    a href="/" { "Dashboard" }
                    a href="/courses" { "Courses" }
                    a href="/teachers" { "Teachers" }
                    span.user { (user.full_name) }
                }
                @if let Some(notice) = notice {
                    div class={ "notice " (notice.level.as_str()) } {
                        (notice.message)
                    }
                }
                main {
                    (body)
                }
            }
        }
    }
}

/// A page without navigation, for requests that have no principal.
pub fn bare_page(body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            (head("attendance"))
            body {
                main {
                    (body)
                }
            }
        }
    }
}

/// Render a full page, consuming the pending notice.
pub fn render(state: &ServerState, user: &User, title: &str, body: Markup) -> Html<String> {
    let notice = state.take_notice();
    Html(page_template(user, notice, title, body).into_string())
}

/// The dead zone is shown in preference to the danger zone.
pub fn status_badge(report: &AttendanceReport) -> Markup {
    if report.dead_zone {
        html! { span.badge.dead { "Dead zone" } }
    } else if report.danger_zone {
        html! { span.badge.danger { "Danger zone" } }
    } else if report.classes_needed == 0 {
        html! { span.badge.safe { "Threshold met" } }
    } else {
        html! { span.badge.ok { "On track" } }
    }
}

pub fn format_percentage(value: f64) -> String {
    format!("{value:.2}%")
}
