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
use maud::Markup;
use maud::html;
use serde::Deserialize;

use crate::report::CourseDetail;
use crate::report::load_detail;
use crate::server::principal::CurrentUser;
use crate::server::state::NoticeLevel;
use crate::server::state::ServerState;
use crate::server::template::format_percentage;
use crate::server::template::render;
use crate::server::template::status_badge;
use crate::types::attendance_status::AttendanceStatus;
use crate::types::entities::CourseFields;
use crate::types::entities::CourseId;
use crate::types::entities::CourseListing;
use crate::types::entities::TeacherListing;
use crate::types::entities::User;

pub async fn detail_handler(
    State(state): State<ServerState>,
    CurrentUser(user): CurrentUser,
    Path(course_id): Path<CourseId>,
) -> Result<Html<String>, Redirect> {
    let detail = match load_detail(&state.db, user.id, course_id) {
        Ok(Some(detail)) => detail,
        Ok(None) => {
            state.notify(NoticeLevel::Danger, "Course not found.");
            return Err(Redirect::to("/"));
        }
        Err(e) => {
            log::error!("{e}");
            state.notify(NoticeLevel::Danger, e.message());
            return Err(Redirect::to("/"));
        }
    };
    let title = detail.standing.course.course_code.clone();
    Ok(render(&state, &user, &title, detail_body(&detail)))
}

fn detail_body(detail: &CourseDetail) -> Markup {
    let course = &detail.standing.course;
    let counts = &detail.standing.counts;
    let report = &detail.standing.report;
    html! {
        div.header {
            h1 { (course.course_code) " · " (course.course_name) }
            (status_badge(report))
        }
        p.meta {
            (course.teacher_name)
            @if !course.semester.is_empty() {
                " · " (course.semester)
            }
        }
        @if report.dead_zone {
            p.warning.dead {
                "Even attending every remaining class will not reach "
                (format_percentage(counts.required_percentage)) "."
            }
        } @else if report.danger_zone {
            p.warning.danger { "You cannot miss any more classes." }
        }
        dl.stats {
            dt { "Attendance" } dd { (format_percentage(report.attendance_percentage)) }
            dt { "Required" } dd { (format_percentage(counts.required_percentage)) }
            dt { "Classes held" } dd { (counts.classes_held) " / " (course.total_classes) }
            dt { "Present" } dd { (counts.present_count) }
            dt { "Absent" } dd { (counts.absent_count) }
            dt { "Remaining" } dd { (report.remaining_classes) }
            dt { "Classes needed" } dd { (report.classes_needed) }
            dt { "Can miss" } dd { (report.classes_can_miss) }
        }
        div.actions {
            a.button href={ "/course/" (course.id) "/mark" } { "Mark attendance" }
            a.button href={ "/course/" (course.id) "/edit" } { "Edit course" }
        }
        h2 { "Records" }
        @if detail.records.is_empty() {
            p.empty { "No attendance recorded yet." }
        } @else {
            table.records {
                thead {
                    tr {
                        th { "Date" }
                        th { "Status" }
                        th { "Notes" }
                        th {}
                    }
                }
                tbody {
                    @for record in &detail.records {
                        tr {
                            td { (record.class_date.to_string()) }
                            td colspan="2" {
                                form.inline action={ "/attendance/" (record.id) "/edit" } method="post" {
                                    input type="hidden" name="course_id" value=(course.id);
                                    (status_select(record.status))
                                    input type="text" name="notes" value=(record.notes);
                                    input type="submit" value="Save";
                                }
                            }
                            td {
                                form.inline action={ "/attendance/" (record.id) "/delete" } method="post" {
                                    input type="hidden" name="course_id" value=(course.id);
                                    input.delete type="submit" value="Delete";
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

pub fn status_select(selected: AttendanceStatus) -> Markup {
    let options = [AttendanceStatus::Present, AttendanceStatus::Absent];
    html! {
        select name="status" {
            @for status in options {
                option value=(status.as_str()) selected[status == selected] {
                    (status.as_str())
                }
            }
        }
    }
}

pub async fn list_handler(
    State(state): State<ServerState>,
    CurrentUser(user): CurrentUser,
) -> Html<String> {
    let body = match state.db.list_courses(user.id) {
        Ok(courses) => courses_table(&courses),
        Err(e) => {
            log::error!("{e}");
            html! { p.error { (e.message()) } }
        }
    };
    let body = html! {
        div.header {
            h1 { "Courses" }
            a.button href="/course/add" { "Add course" }
        }
        (body)
    };
    render(&state, &user, "Courses", body)
}

fn courses_table(courses: &[CourseListing]) -> Markup {
    if courses.is_empty() {
        return html! { p.empty { "You have not added any courses." } };
    }
    html! {
        table.courses {
            thead {
                tr {
                    th { "Code" }
                    th { "Name" }
                    th { "Teacher" }
                    th { "Semester" }
                    th { "Total classes" }
                    th {}
                }
            }
            tbody {
                @for listing in courses {
                    @let course = &listing.course;
                    tr {
                        td { a href={ "/course/" (course.id) } { (course.course_code) } }
                        td { (course.course_name) }
                        td { (course.teacher_name) }
                        td { (course.semester) }
                        td { (course.total_classes) }
                        td.actions {
                            a href={ "/course/" (course.id) "/edit" } { "Edit" }
                            @if !listing.is_enrolled {
                                form.inline action={ "/course/" (course.id) "/enroll" } method="post" {
                                    input type="submit" value="Enroll";
                                }
                            }
                            form.inline action={ "/course/" (course.id) "/delete" } method="post" {
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
pub struct CourseForm {
    course_code: String,
    course_name: String,
    teacher_id: i64,
    #[serde(default)]
    semester: String,
    #[serde(default)]
    total_classes: i64,
    required_percentage: f64,
}

impl CourseForm {
    fn into_fields(self) -> CourseFields {
        CourseFields {
            course_code: self.course_code,
            course_name: self.course_name,
            teacher_id: self.teacher_id,
            semester: self.semester,
            total_classes: self.total_classes,
            required_percentage: self.required_percentage,
        }
    }
}

pub async fn add_form_handler(
    State(state): State<ServerState>,
    CurrentUser(user): CurrentUser,
) -> Html<String> {
    let empty = CourseFields {
        course_code: String::new(),
        course_name: String::new(),
        teacher_id: 0,
        semester: String::new(),
        total_classes: 0,
        required_percentage: state.config.default_required_percentage,
    };
    course_form_page(&state, &user, "Add course", "/course/add", &empty)
}

pub async fn add_handler(
    State(state): State<ServerState>,
    CurrentUser(user): CurrentUser,
    Form(form): Form<CourseForm>,
) -> Redirect {
    let fields = form.into_fields();
    match state.report(
        state.db.add_course(user.id, &fields),
        "Course added successfully!",
    ) {
        Some(_) => Redirect::to("/courses"),
        None => Redirect::to("/course/add"),
    }
}

pub async fn edit_form_handler(
    State(state): State<ServerState>,
    CurrentUser(user): CurrentUser,
    Path(course_id): Path<CourseId>,
) -> Result<Html<String>, Redirect> {
    let course = match state.db.get_course(user.id, course_id) {
        Ok(Some(course)) => course,
        Ok(None) => {
            state.notify(
                NoticeLevel::Danger,
                "Course not found or you do not have permission to edit it.",
            );
            return Err(Redirect::to("/courses"));
        }
        Err(e) => {
            log::error!("{e}");
            state.notify(NoticeLevel::Danger, e.message());
            return Err(Redirect::to("/courses"));
        }
    };
    let required_percentage = match state.db.required_percentage(user.id, course_id) {
        Ok(value) => value,
        Err(e) => {
            log::error!("{e}");
            state.notify(NoticeLevel::Danger, e.message());
            return Err(Redirect::to("/courses"));
        }
    };
    let fields = CourseFields {
        course_code: course.course_code,
        course_name: course.course_name,
        teacher_id: course.teacher_id,
        semester: course.semester,
        total_classes: course.total_classes,
        required_percentage,
    };
    let action = format!("/course/{course_id}/edit");
    Ok(course_form_page(&state, &user, "Edit course", &action, &fields))
}

pub async fn edit_handler(
    State(state): State<ServerState>,
    CurrentUser(user): CurrentUser,
    Path(course_id): Path<CourseId>,
    Form(form): Form<CourseForm>,
) -> Redirect {
    let fields = form.into_fields();
    match state.report(
        state.db.update_course(user.id, course_id, &fields),
        "Course updated successfully!",
    ) {
        Some(_) => Redirect::to("/courses"),
        None => Redirect::to(&format!("/course/{course_id}/edit")),
    }
}

pub async fn delete_handler(
    State(state): State<ServerState>,
    CurrentUser(user): CurrentUser,
    Path(course_id): Path<CourseId>,
) -> Redirect {
    state.report(
        state.db.delete_course(user.id, course_id),
        "Course deleted successfully!",
    );
    Redirect::to("/courses")
}

pub async fn enroll_handler(
    State(state): State<ServerState>,
    CurrentUser(user): CurrentUser,
    Path(course_id): Path<CourseId>,
) -> Redirect {
    state.report(
        state.db.enroll(user.id, course_id),
        "Successfully enrolled in course!",
    );
    Redirect::to("/courses")
}

fn course_form_page(
    state: &ServerState,
    user: &User,
    title: &str,
    action: &str,
    fields: &CourseFields,
) -> Html<String> {
    let teachers: Vec<TeacherListing> = match state.db.list_teachers(user.id) {
        Ok(teachers) => teachers,
        Err(e) => {
            log::error!("{e}");
            Vec::new()
        }
    };
    let body = html! {
        h1 { (title) }
        @if teachers.is_empty() {
            p.empty {
                "Add a teacher before adding a course. "
                a href="/teacher/add?redirect=add_course" { "Add teacher" }
            }
        } @else {
            form.course action=(action) method="post" {
                label {
                    "Course code"
                    input type="text" name="course_code" value=(fields.course_code) required;
                }
                label {
                    "Course name"
                    input type="text" name="course_name" value=(fields.course_name) required;
                }
                label {
                    "Teacher"
                    select name="teacher_id" {
                        @for listing in &teachers {
                            @let teacher = &listing.teacher;
                            option value=(teacher.id) selected[teacher.id == fields.teacher_id] {
                                (teacher.name)
                            }
                        }
                    }
                    a href="/teacher/add?redirect=add_course" { "New teacher" }
                }
                label {
                    "Semester"
                    input type="text" name="semester" value=(fields.semester);
                }
                label {
                    "Total classes"
                    input type="number" name="total_classes" min="0" value=(fields.total_classes) required;
                }
                label {
                    "Required attendance (%)"
                    input type="number" name="required_percentage" min="0" max="100" step="0.01" value=(fields.required_percentage) required;
                }
                input type="submit" value="Save";
            }
        }
    };
    render(state, user, title, body)
}
