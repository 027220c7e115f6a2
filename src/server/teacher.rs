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
use axum::extract::Query;
use axum::extract::State;
use axum::response::Html;
use axum::response::Redirect;
use maud::Markup;
use maud::html;
use serde::Deserialize;

use crate::server::principal::CurrentUser;
use crate::server::state::NoticeLevel;
use crate::server::state::ServerState;
use crate::server::template::render;
use crate::types::entities::TeacherFields;
use crate::types::entities::TeacherId;
use crate::types::entities::TeacherListing;

pub async fn list_handler(
    State(state): State<ServerState>,
    CurrentUser(user): CurrentUser,
) -> Html<String> {
    let body = match state.db.list_teachers(user.id) {
        Ok(teachers) => teachers_table(&teachers),
        Err(e) => {
            log::error!("{e}");
            html! { p.error { (e.message()) } }
        }
    };
    let body = html! {
        div.header {
            h1 { "Teachers" }
            a.button href="/teacher/add" { "Add teacher" }
        }
        (body)
    };
    render(&state, &user, "Teachers", body)
}

fn teachers_table(teachers: &[TeacherListing]) -> Markup {
    if teachers.is_empty() {
        return html! { p.empty { "You have not added any teachers." } };
    }
    html! {
        table.teachers {
            thead {
                tr {
                    th { "Name" }
                    th { "Email" }
                    th { "Department" }
                    th { "Courses" }
                    th {}
                }
            }
            tbody {
                @for listing in teachers {
                    @let teacher = &listing.teacher;
                    tr {
                        td { (teacher.name) }
                        td { (teacher.email) }
                        td { (teacher.department) }
                        td { (listing.course_count) }
                        td.actions {
                            a href={ "/teacher/" (teacher.id) "/edit" } { "Edit" }
                            form.inline action={ "/teacher/" (teacher.id) "/delete" } method="post" {
                                input.delete type="submit" value="Delete";
                            }
                        }
                    }
                }
            }
        }
    }
}

#[derive(Deserialize)]
pub struct TeacherForm {
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    department: String,
}

impl TeacherForm {
    fn into_fields(self) -> TeacherFields {
        TeacherFields {
            name: self.name,
            email: self.email.trim().to_string(),
            department: self.department.trim().to_string(),
        }
    }
}

/// Where to go after adding a teacher.
#[derive(Deserialize)]
pub struct AddQuery {
    redirect: Option<String>,
}

impl AddQuery {
    fn returns_to_course_form(&self) -> bool {
        self.redirect.as_deref() == Some("add_course")
    }
}

pub async fn add_form_handler(
    State(state): State<ServerState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<AddQuery>,
) -> Html<String> {
    let action = if query.returns_to_course_form() {
        "/teacher/add?redirect=add_course"
    } else {
        "/teacher/add"
    };
    let empty = TeacherFields {
        name: String::new(),
        email: String::new(),
        department: String::new(),
    };
    render(
        &state,
        &user,
        "Add teacher",
        teacher_form("Add teacher", action, &empty),
    )
}

pub async fn add_handler(
    State(state): State<ServerState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<AddQuery>,
    Form(form): Form<TeacherForm>,
) -> Redirect {
    let fields = form.into_fields();
    match state.report(
        state.db.add_teacher(user.id, &fields),
        "Teacher added successfully!",
    ) {
        Some(_) if query.returns_to_course_form() => Redirect::to("/course/add"),
        Some(_) => Redirect::to("/teachers"),
        None => Redirect::to("/teacher/add"),
    }
}

pub async fn edit_form_handler(
    State(state): State<ServerState>,
    CurrentUser(user): CurrentUser,
    Path(teacher_id): Path<TeacherId>,
) -> Result<Html<String>, Redirect> {
    match state.db.get_teacher(user.id, teacher_id) {
        Ok(Some(teacher)) => {
            let fields = TeacherFields {
                name: teacher.name,
                email: teacher.email,
                department: teacher.department,
            };
            let action = format!("/teacher/{teacher_id}/edit");
            let body = teacher_form("Edit teacher", &action, &fields);
            Ok(render(&state, &user, "Edit teacher", body))
        }
        Ok(None) => {
            state.notify(
                NoticeLevel::Danger,
                "Teacher not found or you do not have permission to edit.",
            );
            Err(Redirect::to("/teachers"))
        }
        Err(e) => {
            log::error!("{e}");
            state.notify(NoticeLevel::Danger, e.message());
            Err(Redirect::to("/teachers"))
        }
    }
}

pub async fn edit_handler(
    State(state): State<ServerState>,
    CurrentUser(user): CurrentUser,
    Path(teacher_id): Path<TeacherId>,
    Form(form): Form<TeacherForm>,
) -> Redirect {
    let fields = form.into_fields();
    match state.report(
        state.db.update_teacher(user.id, teacher_id, &fields),
        "Teacher updated successfully!",
    ) {
        Some(_) => Redirect::to("/teachers"),
        None => Redirect::to(&format!("/teacher/{teacher_id}/edit")),
    }
}

pub async fn delete_handler(
    State(state): State<ServerState>,
    CurrentUser(user): CurrentUser,
    Path(teacher_id): Path<TeacherId>,
) -> Redirect {
    state.report(
        state.db.delete_teacher(user.id, teacher_id),
        "Teacher deleted successfully!",
    );
    Redirect::to("/teachers")
}

fn teacher_form(title: &str, action: &str, fields: &TeacherFields) -> Markup {
    html! {
        h1 { (title) }
        form.teacher action=(action) method="post" {
            label {
                "Name"
                input type="text" name="name" value=(fields.name) required;
            }
            label {
                "Email"
                input type="email" name="email" value=(fields.email);
            }
            label {
                "Department"
                input type="text" name="department" value=(fields.department);
            }
            input type="submit" value="Save";
        }
    }
}
