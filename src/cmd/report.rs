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

use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Write;
use std::path::Path;

use clap::ValueEnum;

use crate::error::Fallible;
use crate::error::fail;
use crate::report::CourseStanding;
use crate::report::load_summary;
use crate::server::server::open_database;

#[derive(ValueEnum, Clone)]
pub enum ReportFormat {
    /// Plain text output.
    Text,
    /// JSON output.
    Json,
}

impl Display for ReportFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportFormat::Text => write!(f, "text"),
            ReportFormat::Json => write!(f, "json"),
        }
    }
}

pub fn print_report(directory: &Path, username: &str, format: ReportFormat) -> Fallible<()> {
    let db = open_database(directory)?;
    let Some(user) = db.find_user_by_username(username)? else {
        return fail(format!("no such user: {username}"));
    };
    let summary = load_summary(&db, user.id)?;
    match format {
        ReportFormat::Text => print!("{}", format_text(&summary)),
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
    }
    Ok(())
}

fn zone(standing: &CourseStanding) -> &'static str {
    let report = &standing.report;
    if report.dead_zone {
        "DEAD ZONE"
    } else if report.danger_zone {
        "DANGER ZONE"
    } else {
        "ok"
    }
}

pub fn format_text(summary: &[CourseStanding]) -> String {
    if summary.is_empty() {
        return "No courses.\n".to_string();
    }
    let mut out = String::new();
    for standing in summary {
        let course = &standing.course;
        let counts = &standing.counts;
        let report = &standing.report;
        let _ = writeln!(
            out,
            "{} {}: {:.2}% of {:.2}% ({}/{} held, {} present), need {}, can miss {}, {}",
            course.course_code,
            course.course_name,
            report.attendance_percentage,
            counts.required_percentage,
            counts.classes_held,
            course.total_classes,
            counts.present_count,
            report.classes_needed,
            report.classes_can_miss,
            zone(standing),
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::tests::course_fields;
    use crate::db::tests::fixture;
    use crate::types::attendance_status::AttendanceStatus;
    use crate::types::date::Date;

    #[test]
    fn test_non_existent_directory() {
        let result = print_report(Path::new("./derpherp"), "ada", ReportFormat::Json);
        assert!(result.is_err());
    }

    #[test]
    fn test_format_text() -> Fallible<()> {
        let f = fixture()?;
        let course = f
            .db
            .add_course(f.user.id, &course_fields(f.teacher, "CS101", 30, 60.0))?;
        for day in 1..=8 {
            let date = Date::parse(&format!("2025-09-{day:02}"))?;
            f.db.mark_attendance(f.user.id, course, date, AttendanceStatus::Present, "")?;
        }
        let date = Date::parse("2025-09-09")?;
        f.db.mark_attendance(f.user.id, course, date, AttendanceStatus::Absent, "")?;
        let summary = load_summary(&f.db, f.user.id)?;
        assert_eq!(
            format_text(&summary),
            "CS101 Course CS101: 26.67% of 60.00% (9/30 held, 8 present), need 10, can miss 11, ok\n"
        );
        assert_eq!(format_text(&[]), "No courses.\n");
        Ok(())
    }
}
