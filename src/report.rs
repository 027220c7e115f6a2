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

use crate::db::CourseCounts;
use crate::db::Database;
use crate::error::Fallible;
use crate::projector::AttendanceReport;
use crate::projector::CourseAttendanceInput;
use crate::types::attendance_status::AttendanceStatus;
use crate::types::entities::AttendanceRecord;
use crate::types::entities::Course;
use crate::types::entities::CourseId;
use crate::types::entities::UserId;

/// A course's base record merged with its counts and projection. This is
/// what both the dashboard and the course page display.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CourseStanding {
    #[serde(flatten)]
    pub course: Course,
    #[serde(flatten)]
    pub counts: CourseAttendanceInput,
    #[serde(flatten)]
    pub report: AttendanceReport,
}

impl CourseStanding {
    fn new(course: Course, counts: CourseAttendanceInput) -> Fallible<Self> {
        let report = counts.project()?;
        Ok(Self {
            course,
            counts,
            report,
        })
    }
}

pub struct CourseDetail {
    pub standing: CourseStanding,
    /// Most recent class first.
    pub records: Vec<AttendanceRecord>,
}

/// Project every course in a summary.
pub fn assemble_summary(rows: Vec<CourseCounts>) -> Fallible<Vec<CourseStanding>> {
    rows.into_iter()
        .map(|row| CourseStanding::new(row.course, row.input))
        .collect()
}

/// Project a single course from its list of records.
pub fn assemble_detail(
    course: Course,
    records: Vec<AttendanceRecord>,
    required_percentage: f64,
) -> Fallible<CourseDetail> {
    let classes_held = records.len() as i64;
    let present_count = records
        .iter()
        .filter(|record| record.status == AttendanceStatus::Present)
        .count() as i64;
    let counts = CourseAttendanceInput {
        total_classes: course.total_classes,
        classes_held,
        present_count,
        absent_count: classes_held - present_count,
        required_percentage,
    };
    let standing = CourseStanding::new(course, counts)?;
    Ok(CourseDetail { standing, records })
}

/// The summary of every course the user is enrolled in.
pub fn load_summary(db: &Database, user: UserId) -> Fallible<Vec<CourseStanding>> {
    assemble_summary(db.course_summaries(user)?)
}

/// The detail of one course the user is enrolled in.
pub fn load_detail(db: &Database, user: UserId, course: CourseId) -> Fallible<Option<CourseDetail>> {
    let Some(enrolled) = db.enrolled_course(user, course)? else {
        return Ok(None);
    };
    let records = db.list_attendance(enrolled.enrollment_id)?;
    let required_percentage = db.required_percentage(user, course)?;
    let detail = assemble_detail(enrolled.course, records, required_percentage)?;
    Ok(Some(detail))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::tests::course_fields;
    use crate::db::tests::fixture;
    use crate::types::date::Date;

    #[test]
    fn test_summary_and_detail_agree() -> Fallible<()> {
        let f = fixture()?;
        let course = f
            .db
            .add_course(f.user.id, &course_fields(f.teacher, "CS101", 10, 100.0))?;
        for day in 1..=5 {
            let date = Date::parse(&format!("2025-09-{day:02}"))?;
            f.db.mark_attendance(f.user.id, course, date, AttendanceStatus::Present, "")?;
        }
        let summary = load_summary(&f.db, f.user.id)?;
        let detail = load_detail(&f.db, f.user.id, course)?.unwrap();
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0], detail.standing);
        assert_eq!(detail.records.len(), 5);
        let report = detail.standing.report;
        assert_eq!(report.classes_needed, 5);
        assert_eq!(report.remaining_classes, 5);
        assert_eq!(report.classes_can_miss, 0);
        assert!(report.danger_zone);
        assert!(!report.dead_zone);
        Ok(())
    }

    #[test]
    fn test_detail_of_unknown_course() -> Fallible<()> {
        let f = fixture()?;
        assert!(load_detail(&f.db, f.user.id, 99)?.is_none());
        Ok(())
    }

    #[test]
    fn test_detail_counts_absences() -> Fallible<()> {
        let course = Course {
            id: 1,
            course_code: "CS101".to_string(),
            course_name: "Intro".to_string(),
            teacher_id: 1,
            teacher_name: "Babbage".to_string(),
            semester: String::new(),
            total_classes: 30,
        };
        let record = |id, status| AttendanceRecord {
            id,
            enrollment_id: 1,
            class_date: Date::today(),
            status,
            notes: String::new(),
        };
        let records = vec![
            record(1, AttendanceStatus::Present),
            record(2, AttendanceStatus::Absent),
            record(3, AttendanceStatus::Absent),
        ];
        let detail = assemble_detail(course, records, 60.0)?;
        assert_eq!(detail.standing.counts.classes_held, 3);
        assert_eq!(detail.standing.counts.present_count, 1);
        assert_eq!(detail.standing.counts.absent_count, 2);
        assert_eq!(detail.standing.report.classes_needed, 17);
        assert_eq!(detail.standing.report.classes_can_miss, 10);
        Ok(())
    }

    #[test]
    fn test_summary_serializes_flat() -> Fallible<()> {
        let f = fixture()?;
        f.db.add_course(f.user.id, &course_fields(f.teacher, "CS101", 30, 60.0))?;
        let summary = load_summary(&f.db, f.user.id)?;
        let json = serde_json::to_value(&summary)?;
        assert_eq!(json[0]["courseCode"], "CS101");
        assert_eq!(json[0]["totalClasses"], 30);
        assert_eq!(json[0]["requiredPercentage"], 60.0);
        assert_eq!(json[0]["classesNeeded"], 18);
        assert_eq!(json[0]["deadZone"], false);
        Ok(())
    }
}
