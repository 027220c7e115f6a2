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

use std::error::Error;
use std::fmt::Display;
use std::fmt::Formatter;

use serde::Serialize;

/// The threshold used when no attendance setting is on record.
pub const DEFAULT_REQUIRED_PERCENTAGE: f64 = 60.0;

/// Raw attendance counts for one course, as read from the database.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseAttendanceInput {
    /// Planned number of sessions for the whole course. Serialized with the
    /// course's base record.
    #[serde(skip_serializing)]
    pub total_classes: i64,
    /// Number of sessions with an attendance record.
    pub classes_held: i64,
    pub present_count: i64,
    pub absent_count: i64,
    /// Minimum attendance, in percent of `total_classes`.
    pub required_percentage: f64,
}

impl CourseAttendanceInput {
    pub fn project(&self) -> Result<AttendanceReport, ProjectionError> {
        require_non_negative("absent_count", self.absent_count)?;
        project(
            self.total_classes,
            self.classes_held,
            self.present_count,
            self.required_percentage,
        )
    }
}

/// Where a course stands, and what it takes to reach the threshold by the
/// end of the course.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceReport {
    /// Presents over total planned classes, rounded to two decimals.
    pub attendance_percentage: f64,
    /// Exact number of presents the threshold asks for over the whole course.
    pub required_present: f64,
    pub remaining_classes: u64,
    /// Additional presents needed to reach the threshold.
    pub classes_needed: u64,
    /// Remaining classes that may be skipped while still reaching it.
    pub classes_can_miss: u64,
    /// Every remaining class must be attended.
    pub danger_zone: bool,
    /// The threshold cannot be reached anymore.
    pub dead_zone: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ProjectionError {
    NegativeCount { field: &'static str, value: i64 },
    InvalidPercentage(f64),
}

impl Display for ProjectionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ProjectionError::NegativeCount { field, value } => {
                write!(f, "invalid input: {field} must be non-negative, got {value}")
            }
            ProjectionError::InvalidPercentage(value) => {
                write!(
                    f,
                    "invalid input: required percentage must be between 0 and 100, got {value}"
                )
            }
        }
    }
}

impl Error for ProjectionError {}

/// Compute the attendance report for a course.
///
/// The percentage is relative to the total number of planned classes, not
/// to the classes held so far.
pub fn project(
    total_classes: i64,
    classes_held: i64,
    present_count: i64,
    required_percentage: f64,
) -> Result<AttendanceReport, ProjectionError> {
    require_non_negative("total_classes", total_classes)?;
    require_non_negative("classes_held", classes_held)?;
    require_non_negative("present_count", present_count)?;
    if !required_percentage.is_finite() || !(0.0..=100.0).contains(&required_percentage) {
        return Err(ProjectionError::InvalidPercentage(required_percentage));
    }

    let total = total_classes as f64;
    let present = present_count as f64;

    let attendance_percentage = if total_classes > 0 {
        round_to_hundredths(present / total * 100.0)
    } else {
        0.0
    };
    let required_present = required_percentage * total / 100.0;
    let classes_needed = ceil_count(required_present - present);
    let remaining_classes = (total_classes - classes_held).max(0) as u64;
    let classes_can_miss = if classes_needed > 0 {
        remaining_classes.saturating_sub(classes_needed)
    } else {
        remaining_classes
    };
    let danger_zone = remaining_classes > 0 && remaining_classes == classes_needed;
    let dead_zone = present + (remaining_classes as f64) < required_present;

    Ok(AttendanceReport {
        attendance_percentage,
        required_present,
        remaining_classes,
        classes_needed,
        classes_can_miss,
        danger_zone,
        dead_zone,
    })
}

fn require_non_negative(field: &'static str, value: i64) -> Result<(), ProjectionError> {
    if value < 0 {
        Err(ProjectionError::NegativeCount { field, value })
    } else {
        Ok(())
    }
}

/// The smallest whole number of classes covering `x`, or zero when `x` is
/// not positive. An integral `x` is returned as is.
fn ceil_count(x: f64) -> u64 {
    if x <= 0.0 {
        return 0;
    }
    let whole = x.trunc();
    if x > whole {
        whole as u64 + 1
    } else {
        whole as u64
    }
}

fn round_to_hundredths(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
