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

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use maud::Markup;
use maud::html;

use crate::report::CourseStanding;
use crate::report::load_summary;
use crate::server::principal::CurrentUser;
use crate::server::state::ServerState;
use crate::server::template::format_percentage;
use crate::server::template::render;
use crate::server::template::status_badge;

pub async fn dashboard_handler(
    State(state): State<ServerState>,
    CurrentUser(user): CurrentUser,
) -> (StatusCode, Html<String>) {
    let body = match load_summary(&state.db, user.id) {
        Ok(courses) => summary_table(&courses),
        Err(e) => {
            log::error!("{e}");
            html! {
                p.error { "Could not load your courses: " (e.message()) }
            }
        }
    };
    let body = html! {
        h1 { "Welcome, " (user.full_name) }
        (body)
    };
    (StatusCode::OK, render(&state, &user, "Dashboard", body))
}

fn summary_table(courses: &[CourseStanding]) -> Markup {
    if courses.is_empty() {
        return html! {
            p.empty {
                "No courses yet. "
                a href="/course/add" { "Add a course" }
                " to start tracking attendance."
            }
        };
    }
    html! {
        table.summary {
            thead {
                tr {
                    th { "Course" }
                    th { "Teacher" }
                    th { "Attendance" }
                    th { "Required" }
                    th { "Held" }
                    th { "Present" }
                    th { "Absent" }
                    th { "Remaining" }
                    th { "Needed" }
                    th { "Can miss" }
                    th { "Status" }
                    th { "Today" }
                }
            }
            tbody {
                @for standing in courses {
                    (summary_row(standing))
                }
            }
        }
    }
}

fn summary_row(standing: &CourseStanding) -> Markup {
    let course = &standing.course;
    let counts = &standing.counts;
    let report = &standing.report;
    let quick_present = format!("/course/{}/quick-mark/present", course.id);
    let quick_absent = format!("/course/{}/quick-mark/absent", course.id);
    html! {
        tr {
            td {
                a href={ "/course/" (course.id) } {
                    (course.course_code)
                }
                " "
                span.name { (course.course_name) }
            }
            td { (course.teacher_name) }
            td.percentage { (format_percentage(report.attendance_percentage)) }
            td { (format_percentage(counts.required_percentage)) }
            td { (counts.classes_held) " / " (course.total_classes) }
            td { (counts.present_count) }
            td { (counts.absent_count) }
            td { (report.remaining_classes) }
            td { (report.classes_needed) }
            td { (report.classes_can_miss) }
            td { (status_badge(report)) }
            td.quick {
                form action=(quick_present) method="post" {
                    input type="submit" value="Present";
                }
                form action=(quick_absent) method="post" {
                    input type="submit" value="Absent";
                }
            }
        }
    }
}
