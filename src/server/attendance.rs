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

use axum::Form;
use axum::extract::Path;
use axum::extract::State;
use axum::response::Html;
use axum::response::Redirect;
use maud::html;
use serde::Deserialize;

use crate::error::Fallible;
use crate::server::course::status_select;
use crate::server::principal::CurrentUser;
use crate::server::state::NoticeLevel;
use crate::server::state::ServerState;
use crate::server::template::render;
use crate::types::attendance_status::AttendanceStatus;
use crate::types::date::Date;
use crate::types::entities::CourseId;
use crate::types::entities::RecordId;

const QUICK_MARK_NOTE: &str = "Quick marked from dashboard";

pub async fn mark_form_handler(
    State(state): State<ServerState>,
    CurrentUser(user): CurrentUser,
    Path(course_id): Path<CourseId>,
) -> Result<Html<String>, Redirect> {
    let loaded = state
        .db
        .enrolled_course(user.id, course_id)
        .and_then(|enrolled| match enrolled {
            Some(enrolled) => Ok(Some((enrolled, state.db.classes_held(user.id, course_id)?))),
            None => Ok(None),
        });
    let (enrolled, classes_held) = match loaded {
        Ok(Some(loaded)) => loaded,
        Ok(None) => {
            state.notify(NoticeLevel::Danger, "Enrollment not found!");
            return Err(Redirect::to("/"));
        }
        Err(e) => {
            log::error!("{e}");
            state.notify(NoticeLevel::Danger, e.message());
            return Err(Redirect::to("/"));
        }
    };
    let course = enrolled.course;
    let full = classes_held >= course.total_classes;
    let body = html! {
        h1 { "Mark attendance" }
        p.meta {
            (course.course_code) " · " (course.course_name) " · "
            (classes_held) " / " (course.total_classes) " classes marked"
        }
        @if full {
            p.warning.danger { "Every planned class already has a record." }
        } @else {
            form.mark action={ "/course/" (course.id) "/mark" } method="post" {
                label {
                    "Date"
                    input type="date" name="class_date" value=(Date::today().to_string()) required;
                }
                label {
                    "Status"
                    (status_select(AttendanceStatus::Present))
                }
                label {
                    "Notes"
                    input type="text" name="notes";
                }
                input type="submit" value="Mark";
            }
        }
    };
    Ok(render(&state, &user, "Mark attendance", body))
}

#[derive(Deserialize)]
pub struct MarkForm {
    class_date: String,
    status: AttendanceStatus,
    #[serde(default)]
    notes: String,
}

pub async fn mark_handler(
    State(state): State<ServerState>,
    CurrentUser(user): CurrentUser,
    Path(course_id): Path<CourseId>,
    Form(form): Form<MarkForm>,
) -> Redirect {
    let result: Fallible<RecordId> = Date::parse(&form.class_date).and_then(|date| {
        state
            .db
            .mark_attendance(user.id, course_id, date, form.status, form.notes.trim())
    });
    state.report(result, "Attendance marked successfully!");
    Redirect::to(&format!("/course/{course_id}"))
}

pub async fn quick_mark_handler(
    State(state): State<ServerState>,
    CurrentUser(user): CurrentUser,
    Path((course_id, status)): Path<(CourseId, String)>,
) -> Redirect {
    let status = match AttendanceStatus::try_from(status.as_str()) {
        Ok(status) => status,
        Err(_) => {
            state.notify(NoticeLevel::Danger, "Invalid status!");
            return Redirect::to("/");
        }
    };
    let result = state.db.mark_attendance(
        user.id,
        course_id,
        Date::today(),
        status,
        QUICK_MARK_NOTE,
    );
    let message = format!(
        "Attendance marked as {} for today!",
        status.as_str().to_uppercase()
    );
    state.report(result, message);
    Redirect::to("/")
}

#[derive(Deserialize)]
pub struct EditForm {
    course_id: CourseId,
    status: AttendanceStatus,
    #[serde(default)]
    notes: String,
}

pub async fn edit_handler(
    State(state): State<ServerState>,
    CurrentUser(user): CurrentUser,
    Path(record_id): Path<RecordId>,
    Form(form): Form<EditForm>,
) -> Redirect {
    state.report(
        state
            .db
            .update_attendance(user.id, record_id, form.status, form.notes.trim()),
        "Attendance updated successfully!",
    );
    Redirect::to(&format!("/course/{}", form.course_id))
}

#[derive(Deserialize)]
pub struct DeleteForm {
    course_id: CourseId,
}

pub async fn delete_handler(
    State(state): State<ServerState>,
    CurrentUser(user): CurrentUser,
    Path(record_id): Path<RecordId>,
    Form(form): Form<DeleteForm>,
) -> Redirect {
    state.report(
        state.db.delete_attendance(user.id, record_id),
        "Attendance record deleted successfully!",
    );
    Redirect::to(&format!("/course/{}", form.course_id))
}
