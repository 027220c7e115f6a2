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

use serde::Serialize;

use crate::types::attendance_status::AttendanceStatus;
use crate::types::date::Date;

pub type UserId = i64;
pub type TeacherId = i64;
pub type CourseId = i64;
pub type EnrollmentId = i64;
pub type RecordId = i64;

#[derive(Clone, Debug, PartialEq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub full_name: String,
    pub email: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Teacher {
    pub id: TeacherId,
    pub name: String,
    pub email: String,
    pub department: String,
}

/// The editable fields of a teacher.
#[derive(Clone, Debug)]
pub struct TeacherFields {
    pub name: String,
    pub email: String,
    pub department: String,
}

/// A teacher, with the number of the user's courses they teach.
#[derive(Clone, Debug)]
pub struct TeacherListing {
    pub teacher: Teacher,
    pub course_count: i64,
}

/// A course's base record, as shown in both the summary and detail views.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: CourseId,
    pub course_code: String,
    pub course_name: String,
    pub teacher_id: TeacherId,
    pub teacher_name: String,
    pub semester: String,
    pub total_classes: i64,
}

/// The editable fields of a course, including the user's threshold.
#[derive(Clone, Debug)]
pub struct CourseFields {
    pub course_code: String,
    pub course_name: String,
    pub teacher_id: TeacherId,
    pub semester: String,
    pub total_classes: i64,
    pub required_percentage: f64,
}

#[derive(Clone, Debug)]
pub struct CourseListing {
    pub course: Course,
    pub is_enrolled: bool,
}

/// A course the user is enrolled in.
#[derive(Clone, Debug)]
pub struct Enrolled {
    pub course: Course,
    pub enrollment_id: EnrollmentId,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AttendanceRecord {
    pub id: RecordId,
    pub enrollment_id: EnrollmentId,
    pub class_date: Date,
    pub status: AttendanceStatus,
    pub notes: String,
}
