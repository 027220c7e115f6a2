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

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use rusqlite::Connection;
use rusqlite::ErrorCode;
use rusqlite::OptionalExtension;
use rusqlite::Row;
use rusqlite::Transaction;
use rusqlite::config::DbConfig;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::fail;
use crate::projector::CourseAttendanceInput;
use crate::projector::DEFAULT_REQUIRED_PERCENTAGE;
use crate::types::attendance_status::AttendanceStatus;
use crate::types::date::Date;
use crate::types::entities::AttendanceRecord;
use crate::types::entities::Course;
use crate::types::entities::CourseFields;
use crate::types::entities::CourseId;
use crate::types::entities::CourseListing;
use crate::types::entities::Enrolled;
use crate::types::entities::EnrollmentId;
use crate::types::entities::RecordId;
use crate::types::entities::Teacher;
use crate::types::entities::TeacherFields;
use crate::types::entities::TeacherId;
use crate::types::entities::TeacherListing;
use crate::types::entities::User;
use crate::types::entities::UserId;

#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

/// A course's base record together with the counts the projector needs.
#[derive(Clone, Debug)]
pub struct CourseCounts {
    pub course: Course,
    pub input: CourseAttendanceInput,
}

const COURSE_COLUMNS: &str = "c.course_id, c.course_code, c.course_name, c.teacher_id, t.name, c.semester, c.total_classes";

impl Database {
    pub fn new(database_path: &str) -> Fallible<Self> {
        let mut conn = Connection::open(database_path)?;
        conn.set_db_config(DbConfig::SQLITE_DBCONFIG_ENABLE_FKEY, true)?;
        {
            let tx = conn.transaction()?;
            if !probe_schema_exists(&tx)? {
                log::debug!("Creating database schema.");
                tx.execute_batch(include_str!("schema.sql"))?;
                tx.commit()?;
            }
        }
        let conn = Arc::new(Mutex::new(conn));
        Ok(Self { conn })
    }

    // Users.

    pub fn create_user(&self, username: &str, full_name: &str, email: &str) -> Fallible<User> {
        let username = username.trim();
        if username.is_empty() {
            return fail("Username must not be empty.");
        }
        let conn = self.acquire()?;
        let sql = "insert into users (username, full_name, email) values (?, ?, ?) returning user_id;";
        let id: UserId = conn
            .query_row(sql, (username, full_name, email), |row| row.get(0))
            .map_err(|e| constraint_message(e, "Username already exists."))?;
        log::info!("Created user {username} ({id}).");
        Ok(User {
            id,
            username: username.to_string(),
            full_name: full_name.to_string(),
            email: email.to_string(),
        })
    }

    pub fn find_user_by_username(&self, username: &str) -> Fallible<Option<User>> {
        let conn = self.acquire()?;
        let sql = "select user_id, username, full_name, email from users where username = ?;";
        let user = conn.query_row(sql, [username], read_user).optional()?;
        Ok(user)
    }

    pub fn get_user(&self, user: UserId) -> Fallible<Option<User>> {
        let conn = self.acquire()?;
        let sql = "select user_id, username, full_name, email from users where user_id = ?;";
        let user = conn.query_row(sql, [user], read_user).optional()?;
        Ok(user)
    }

    // Teachers.

    pub fn add_teacher(&self, user: UserId, fields: &TeacherFields) -> Fallible<TeacherId> {
        validate_teacher(fields)?;
        let conn = self.acquire()?;
        let sql = "insert into teachers (user_id, name, email, department) values (?, ?, ?, ?) returning teacher_id;";
        let id: TeacherId = conn.query_row(
            sql,
            (
                user,
                fields.name.trim(),
                &fields.email,
                &fields.department,
            ),
            |row| row.get(0),
        )?;
        log::debug!("Added teacher {id}.");
        Ok(id)
    }

    /// The user's teachers, ordered by name, with the number of the user's
    /// courses each one teaches.
    pub fn list_teachers(&self, user: UserId) -> Fallible<Vec<TeacherListing>> {
        let conn = self.acquire()?;
        let sql = "select t.teacher_id, t.name, t.email, t.department, count(c.course_id) from teachers t left join courses c on c.teacher_id = t.teacher_id and c.user_id = ?1 where t.user_id = ?1 group by t.teacher_id order by t.name;";
        let mut stmt = conn.prepare(sql)?;
        let mut rows = stmt.query([user])?;
        let mut teachers = Vec::new();
        while let Some(row) = rows.next()? {
            teachers.push(TeacherListing {
                teacher: read_teacher(row)?,
                course_count: row.get(4)?,
            });
        }
        Ok(teachers)
    }

    pub fn get_teacher(&self, user: UserId, teacher: TeacherId) -> Fallible<Option<Teacher>> {
        let conn = self.acquire()?;
        let sql = "select teacher_id, name, email, department from teachers where teacher_id = ? and user_id = ?;";
        let teacher = conn.query_row(sql, (teacher, user), read_teacher).optional()?;
        Ok(teacher)
    }

    pub fn update_teacher(
        &self,
        user: UserId,
        teacher: TeacherId,
        fields: &TeacherFields,
    ) -> Fallible<()> {
        validate_teacher(fields)?;
        let conn = self.acquire()?;
        let sql = "update teachers set name = ?, email = ?, department = ? where teacher_id = ? and user_id = ?;";
        let changed = conn.execute(
            sql,
            (
                fields.name.trim(),
                &fields.email,
                &fields.department,
                teacher,
                user,
            ),
        )?;
        if changed == 0 {
            return fail("Teacher not found.");
        }
        Ok(())
    }

    /// Delete a teacher. Teachers who still have courses are kept.
    pub fn delete_teacher(&self, user: UserId, teacher: TeacherId) -> Fallible<()> {
        let mut conn = self.acquire()?;
        let tx = conn.transaction()?;
        let exists: i64 = tx.query_row(
            "select count(*) from teachers where teacher_id = ? and user_id = ?;",
            (teacher, user),
            |row| row.get(0),
        )?;
        if exists == 0 {
            return fail("Teacher not found.");
        }
        let courses: i64 = tx.query_row(
            "select count(*) from courses where teacher_id = ?;",
            [teacher],
            |row| row.get(0),
        )?;
        if courses > 0 {
            return fail("Cannot delete teacher who has courses assigned.");
        }
        tx.execute("delete from teachers where teacher_id = ?;", [teacher])?;
        tx.commit()?;
        log::debug!("Deleted teacher {teacher}.");
        Ok(())
    }

    // Courses.

    /// Add a course, enroll its owner in it, and record the owner's
    /// required percentage for it.
    pub fn add_course(&self, user: UserId, fields: &CourseFields) -> Fallible<CourseId> {
        validate_course(fields)?;
        let mut conn = self.acquire()?;
        let tx = conn.transaction()?;
        require_own_teacher(&tx, user, fields.teacher_id)?;
        let sql = "insert into courses (user_id, course_code, course_name, teacher_id, semester, total_classes) values (?, ?, ?, ?, ?, ?) returning course_id;";
        let course_id: CourseId = tx
            .query_row(
                sql,
                (
                    user,
                    fields.course_code.trim(),
                    fields.course_name.trim(),
                    fields.teacher_id,
                    &fields.semester,
                    fields.total_classes,
                ),
                |row| row.get(0),
            )
            .map_err(|e| constraint_message(e, "Course code already exists."))?;
        tx.execute(
            "insert into enrollments (user_id, course_id) values (?, ?);",
            (user, course_id),
        )?;
        upsert_setting(&tx, user, course_id, fields.required_percentage)?;
        tx.commit()?;
        log::info!("Added course {} ({course_id}).", fields.course_code.trim());
        Ok(course_id)
    }

    /// The courses owned by the user, ordered by course code.
    pub fn list_courses(&self, user: UserId) -> Fallible<Vec<CourseListing>> {
        let conn = self.acquire()?;
        let sql = format!(
            "select {COURSE_COLUMNS}, exists(select 1 from enrollments e where e.user_id = ?1 and e.course_id = c.course_id) from courses c join teachers t on t.teacher_id = c.teacher_id where c.user_id = ?1 order by c.course_code;"
        );
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query([user])?;
        let mut courses = Vec::new();
        while let Some(row) = rows.next()? {
            courses.push(CourseListing {
                course: read_course(row)?,
                is_enrolled: row.get(7)?,
            });
        }
        Ok(courses)
    }

    /// A course owned by the user.
    pub fn get_course(&self, user: UserId, course: CourseId) -> Fallible<Option<Course>> {
        let conn = self.acquire()?;
        let sql = format!(
            "select {COURSE_COLUMNS} from courses c join teachers t on t.teacher_id = c.teacher_id where c.course_id = ? and c.user_id = ?;"
        );
        let course = conn.query_row(&sql, (course, user), read_course).optional()?;
        Ok(course)
    }

    pub fn update_course(&self, user: UserId, course: CourseId, fields: &CourseFields) -> Fallible<()> {
        validate_course(fields)?;
        let mut conn = self.acquire()?;
        let tx = conn.transaction()?;
        require_own_teacher(&tx, user, fields.teacher_id)?;
        let sql = "update courses set course_code = ?, course_name = ?, teacher_id = ?, semester = ?, total_classes = ? where course_id = ? and user_id = ?;";
        let changed = tx
            .execute(
                sql,
                (
                    fields.course_code.trim(),
                    fields.course_name.trim(),
                    fields.teacher_id,
                    &fields.semester,
                    fields.total_classes,
                    course,
                    user,
                ),
            )
            .map_err(|e| constraint_message(e, "Course code already exists."))?;
        if changed == 0 {
            return fail("Course not found.");
        }
        upsert_setting(&tx, user, course, fields.required_percentage)?;
        tx.commit()?;
        Ok(())
    }

    /// Delete a course, along with its enrollments, settings and records.
    pub fn delete_course(&self, user: UserId, course: CourseId) -> Fallible<()> {
        let conn = self.acquire()?;
        let changed = conn.execute(
            "delete from courses where course_id = ? and user_id = ?;",
            (course, user),
        )?;
        if changed == 0 {
            return fail("Course not found.");
        }
        log::debug!("Deleted course {course}.");
        Ok(())
    }

    /// Enroll the user in one of their own courses. An existing threshold
    /// is kept; otherwise the default one is recorded.
    pub fn enroll(&self, user: UserId, course: CourseId) -> Fallible<()> {
        let mut conn = self.acquire()?;
        let tx = conn.transaction()?;
        let owned: i64 = tx.query_row(
            "select count(*) from courses where course_id = ? and user_id = ?;",
            (course, user),
            |row| row.get(0),
        )?;
        if owned == 0 {
            return fail("Course not found.");
        }
        tx.execute(
            "insert into enrollments (user_id, course_id) values (?, ?);",
            (user, course),
        )
        .map_err(|e| constraint_message(e, "Already enrolled in this course."))?;
        tx.execute(
            "insert into attendance_settings (user_id, course_id, required_percentage) values (?, ?, ?) on conflict (user_id, course_id) do nothing;",
            (user, course, DEFAULT_REQUIRED_PERCENTAGE),
        )?;
        tx.commit()?;
        Ok(())
    }

    /// A course the user is enrolled in, with the enrollment.
    pub fn enrolled_course(&self, user: UserId, course: CourseId) -> Fallible<Option<Enrolled>> {
        let conn = self.acquire()?;
        let sql = format!(
            "select {COURSE_COLUMNS}, e.enrollment_id from courses c join teachers t on t.teacher_id = c.teacher_id join enrollments e on e.course_id = c.course_id where c.course_id = ? and e.user_id = ?;"
        );
        let enrolled = conn
            .query_row(&sql, (course, user), |row| {
                Ok(Enrolled {
                    course: read_course(row)?,
                    enrollment_id: row.get(7)?,
                })
            })
            .optional()?;
        Ok(enrolled)
    }

    /// The user's threshold for a course, or the default one if none is on
    /// record.
    pub fn required_percentage(&self, user: UserId, course: CourseId) -> Fallible<f64> {
        let conn = self.acquire()?;
        let sql = "select required_percentage from attendance_settings where user_id = ? and course_id = ?;";
        let value: Option<f64> = conn
            .query_row(sql, (user, course), |row| row.get(0))
            .optional()?;
        Ok(value.unwrap_or(DEFAULT_REQUIRED_PERCENTAGE))
    }

    // Attendance records.

    /// Record attendance for one class. Fails if the course already has a
    /// record for each of its planned classes.
    pub fn mark_attendance(
        &self,
        user: UserId,
        course: CourseId,
        class_date: Date,
        status: AttendanceStatus,
        notes: &str,
    ) -> Fallible<RecordId> {
        let mut conn = self.acquire()?;
        let tx = conn.transaction()?;
        let enrollment: Option<(EnrollmentId, i64)> = tx
            .query_row(
                "select e.enrollment_id, c.total_classes from enrollments e join courses c on c.course_id = e.course_id where e.user_id = ? and e.course_id = ?;",
                (user, course),
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        let Some((enrollment_id, total_classes)) = enrollment else {
            return fail("Enrollment not found.");
        };
        let classes_held = count_records(&tx, enrollment_id)?;
        if classes_held >= total_classes {
            return fail(format!(
                "Cannot add more attendance. Already marked {classes_held} out of {total_classes} total classes."
            ));
        }
        let sql = "insert into attendance_records (enrollment_id, class_date, status, notes) values (?, ?, ?, ?) returning record_id;";
        let record_id: RecordId = tx.query_row(
            sql,
            (enrollment_id, class_date, status, notes),
            |row| row.get(0),
        )?;
        tx.commit()?;
        log::debug!("Marked {status} on {class_date} for course {course}.");
        Ok(record_id)
    }

    /// An enrollment's records, most recent class first.
    pub fn list_attendance(&self, enrollment: EnrollmentId) -> Fallible<Vec<AttendanceRecord>> {
        let conn = self.acquire()?;
        let sql = "select record_id, enrollment_id, class_date, status, notes from attendance_records where enrollment_id = ? order by class_date desc, record_id desc;";
        let mut stmt = conn.prepare(sql)?;
        let mut rows = stmt.query([enrollment])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(AttendanceRecord {
                id: row.get(0)?,
                enrollment_id: row.get(1)?,
                class_date: row.get(2)?,
                status: row.get(3)?,
                notes: row.get(4)?,
            });
        }
        Ok(records)
    }

    /// The number of records entered for the user's enrollment in a course.
    pub fn classes_held(&self, user: UserId, course: CourseId) -> Fallible<i64> {
        let conn = self.acquire()?;
        let sql = "select count(r.record_id) from enrollments e left join attendance_records r on r.enrollment_id = e.enrollment_id where e.user_id = ? and e.course_id = ?;";
        let count: i64 = conn.query_row(sql, (user, course), |row| row.get(0))?;
        Ok(count)
    }

    pub fn update_attendance(
        &self,
        user: UserId,
        record: RecordId,
        status: AttendanceStatus,
        notes: &str,
    ) -> Fallible<()> {
        let conn = self.acquire()?;
        let sql = "update attendance_records set status = ?, notes = ? where record_id = ? and enrollment_id in (select enrollment_id from enrollments where user_id = ?);";
        let changed = conn.execute(sql, (status, notes, record, user))?;
        if changed == 0 {
            return fail("Attendance record not found.");
        }
        Ok(())
    }

    pub fn delete_attendance(&self, user: UserId, record: RecordId) -> Fallible<()> {
        let conn = self.acquire()?;
        let sql = "delete from attendance_records where record_id = ? and enrollment_id in (select enrollment_id from enrollments where user_id = ?);";
        let changed = conn.execute(sql, (record, user))?;
        if changed == 0 {
            return fail("Attendance record not found.");
        }
        Ok(())
    }

    // Projection inputs.

    /// Counts for every course the user is enrolled in, ordered by course
    /// code.
    pub fn course_summaries(&self, user: UserId) -> Fallible<Vec<CourseCounts>> {
        let conn = self.acquire()?;
        let sql = format!(
            "select {COURSE_COLUMNS}, coalesce(s.required_percentage, ?2), count(r.record_id), coalesce(sum(case when r.status = 'present' then 1 else 0 end), 0), coalesce(sum(case when r.status = 'absent' then 1 else 0 end), 0) from courses c join teachers t on t.teacher_id = c.teacher_id join enrollments e on e.course_id = c.course_id left join attendance_records r on r.enrollment_id = e.enrollment_id left join attendance_settings s on s.course_id = c.course_id and s.user_id = ?1 where e.user_id = ?1 group by c.course_id order by c.course_code;"
        );
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query((user, DEFAULT_REQUIRED_PERCENTAGE))?;
        let mut summaries = Vec::new();
        while let Some(row) = rows.next()? {
            let course = read_course(row)?;
            let input = CourseAttendanceInput {
                total_classes: course.total_classes,
                classes_held: row.get(8)?,
                present_count: row.get(9)?,
                absent_count: row.get(10)?,
                required_percentage: row.get(7)?,
            };
            summaries.push(CourseCounts { course, input });
        }
        Ok(summaries)
    }

    fn acquire(&self) -> Fallible<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| ErrorReport::new("database lock poisoned"))
    }
}

fn read_user(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        full_name: row.get(2)?,
        email: row.get(3)?,
    })
}

fn read_teacher(row: &Row<'_>) -> rusqlite::Result<Teacher> {
    Ok(Teacher {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        department: row.get(3)?,
    })
}

/// Reads the columns listed in `COURSE_COLUMNS`.
fn read_course(row: &Row<'_>) -> rusqlite::Result<Course> {
    Ok(Course {
        id: row.get(0)?,
        course_code: row.get(1)?,
        course_name: row.get(2)?,
        teacher_id: row.get(3)?,
        teacher_name: row.get(4)?,
        semester: row.get(5)?,
        total_classes: row.get(6)?,
    })
}

fn validate_teacher(fields: &TeacherFields) -> Fallible<()> {
    if fields.name.trim().is_empty() {
        return fail("Teacher name must not be empty.");
    }
    Ok(())
}

fn validate_course(fields: &CourseFields) -> Fallible<()> {
    if fields.course_code.trim().is_empty() {
        return fail("Course code must not be empty.");
    }
    if fields.course_name.trim().is_empty() {
        return fail("Course name must not be empty.");
    }
    if fields.total_classes < 0 {
        return fail("Total classes must not be negative.");
    }
    validate_percentage(fields.required_percentage)
}

pub fn validate_percentage(value: f64) -> Fallible<()> {
    if value.is_finite() && (0.0..=100.0).contains(&value) {
        Ok(())
    } else {
        fail("Percentage must be between 0 and 100.")
    }
}

fn require_own_teacher(tx: &Transaction, user: UserId, teacher: TeacherId) -> Fallible<()> {
    let count: i64 = tx.query_row(
        "select count(*) from teachers where teacher_id = ? and user_id = ?;",
        (teacher, user),
        |row| row.get(0),
    )?;
    if count == 0 {
        return fail("Teacher not found.");
    }
    Ok(())
}

fn upsert_setting(
    tx: &Transaction,
    user: UserId,
    course: CourseId,
    required_percentage: f64,
) -> Fallible<()> {
    let sql = "insert into attendance_settings (user_id, course_id, required_percentage) values (?, ?, ?) on conflict (user_id, course_id) do update set required_percentage = excluded.required_percentage;";
    tx.execute(sql, (user, course, required_percentage))?;
    Ok(())
}

fn count_records(tx: &Transaction, enrollment: EnrollmentId) -> Fallible<i64> {
    let count: i64 = tx.query_row(
        "select count(*) from attendance_records where enrollment_id = ?;",
        [enrollment],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Turn a uniqueness violation into a readable message.
fn constraint_message(e: rusqlite::Error, message: &str) -> ErrorReport {
    match e.sqlite_error_code() {
        Some(ErrorCode::ConstraintViolation) => ErrorReport::new(message),
        _ => e.into(),
    }
}

fn probe_schema_exists(tx: &Transaction) -> Fallible<bool> {
    let sql = "select count(*) from sqlite_master where type='table' AND name=?;";
    let count: i64 = tx.query_row(sql, ["courses"], |row| row.get(0))?;
    Ok(count > 0)
}

#[cfg(test)]
pub mod tests {
    use super::*;

    pub struct Fixture {
        pub db: Database,
        pub user: User,
        pub teacher: TeacherId,
    }

    pub fn fixture() -> Fallible<Fixture> {
        let db = Database::new(":memory:")?;
        let user = db.create_user("ada", "Ada Lovelace", "ada@example.com")?;
        let teacher = db.add_teacher(
            user.id,
            &TeacherFields {
                name: "Charles Babbage".to_string(),
                email: String::new(),
                department: "Mathematics".to_string(),
            },
        )?;
        Ok(Fixture { db, user, teacher })
    }

    pub fn course_fields(teacher: TeacherId, code: &str, total: i64, required: f64) -> CourseFields {
        CourseFields {
            course_code: code.to_string(),
            course_name: format!("Course {code}"),
            teacher_id: teacher,
            semester: "Fall".to_string(),
            total_classes: total,
            required_percentage: required,
        }
    }

    fn day(n: u32) -> Date {
        Date::parse(&format!("2025-09-{n:02}")).unwrap()
    }

    #[test]
    fn test_duplicate_username() -> Fallible<()> {
        let f = fixture()?;
        let result = f.db.create_user("ada", "Someone Else", "");
        assert_eq!(result.unwrap_err().message(), "Username already exists.");
        assert_eq!(f.db.find_user_by_username("ada")?, Some(f.user.clone()));
        assert_eq!(f.db.get_user(f.user.id)?, Some(f.user));
        assert_eq!(f.db.find_user_by_username("grace")?, None);
        Ok(())
    }

    #[test]
    fn test_add_course_enrolls_and_stores_threshold() -> Fallible<()> {
        let f = fixture()?;
        let course = f
            .db
            .add_course(f.user.id, &course_fields(f.teacher, "CS101", 30, 75.0))?;
        let enrolled = f.db.enrolled_course(f.user.id, course)?.unwrap();
        assert_eq!(enrolled.course.course_code, "CS101");
        assert_eq!(enrolled.course.teacher_name, "Charles Babbage");
        assert_eq!(f.db.required_percentage(f.user.id, course)?, 75.0);
        let listings = f.db.list_courses(f.user.id)?;
        assert_eq!(listings.len(), 1);
        assert!(listings[0].is_enrolled);
        Ok(())
    }

    #[test]
    fn test_duplicate_course_code() -> Fallible<()> {
        let f = fixture()?;
        f.db.add_course(f.user.id, &course_fields(f.teacher, "CS101", 30, 60.0))?;
        let result = f
            .db
            .add_course(f.user.id, &course_fields(f.teacher, "CS101", 10, 60.0));
        assert_eq!(result.unwrap_err().message(), "Course code already exists.");
        Ok(())
    }

    #[test]
    fn test_course_validation() -> Fallible<()> {
        let f = fixture()?;
        assert!(
            f.db.add_course(f.user.id, &course_fields(f.teacher, "CS101", -1, 60.0))
                .is_err()
        );
        assert!(
            f.db.add_course(f.user.id, &course_fields(f.teacher, "CS101", 30, 120.0))
                .is_err()
        );
        assert!(
            f.db.add_course(f.user.id, &course_fields(f.teacher + 100, "CS101", 30, 60.0))
                .is_err()
        );
        assert!(f.db.list_courses(f.user.id)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_update_course_upserts_threshold() -> Fallible<()> {
        let f = fixture()?;
        let course = f
            .db
            .add_course(f.user.id, &course_fields(f.teacher, "CS101", 30, 60.0))?;
        f.db.update_course(
            f.user.id,
            course,
            &course_fields(f.teacher, "CS102", 40, 80.0),
        )?;
        let updated = f.db.get_course(f.user.id, course)?.unwrap();
        assert_eq!(updated.course_code, "CS102");
        assert_eq!(updated.total_classes, 40);
        assert_eq!(f.db.required_percentage(f.user.id, course)?, 80.0);
        Ok(())
    }

    #[test]
    fn test_mark_attendance_respects_total_classes() -> Fallible<()> {
        let f = fixture()?;
        let course = f
            .db
            .add_course(f.user.id, &course_fields(f.teacher, "CS101", 2, 60.0))?;
        f.db.mark_attendance(f.user.id, course, day(1), AttendanceStatus::Present, "")?;
        f.db.mark_attendance(f.user.id, course, day(2), AttendanceStatus::Absent, "sick")?;
        let result = f
            .db
            .mark_attendance(f.user.id, course, day(3), AttendanceStatus::Present, "");
        assert_eq!(
            result.unwrap_err().message(),
            "Cannot add more attendance. Already marked 2 out of 2 total classes."
        );
        assert_eq!(f.db.classes_held(f.user.id, course)?, 2);
        let enrolled = f.db.enrolled_course(f.user.id, course)?.unwrap();
        let records = f.db.list_attendance(enrolled.enrollment_id)?;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].class_date, day(2));
        assert_eq!(records[0].status, AttendanceStatus::Absent);
        assert_eq!(records[0].notes, "sick");
        Ok(())
    }

    #[test]
    fn test_mark_attendance_without_enrollment() -> Fallible<()> {
        let f = fixture()?;
        let result = f
            .db
            .mark_attendance(f.user.id, 42, day(1), AttendanceStatus::Present, "");
        assert_eq!(result.unwrap_err().message(), "Enrollment not found.");
        Ok(())
    }

    #[test]
    fn test_edit_and_delete_attendance() -> Fallible<()> {
        let f = fixture()?;
        let other = f.db.create_user("grace", "Grace Hopper", "")?;
        let course = f
            .db
            .add_course(f.user.id, &course_fields(f.teacher, "CS101", 5, 60.0))?;
        let record =
            f.db.mark_attendance(f.user.id, course, day(1), AttendanceStatus::Absent, "")?;
        assert!(
            f.db.update_attendance(other.id, record, AttendanceStatus::Present, "")
                .is_err()
        );
        f.db.update_attendance(f.user.id, record, AttendanceStatus::Present, "late")?;
        let enrolled = f.db.enrolled_course(f.user.id, course)?.unwrap();
        let records = f.db.list_attendance(enrolled.enrollment_id)?;
        assert_eq!(records[0].status, AttendanceStatus::Present);
        assert_eq!(records[0].notes, "late");
        assert!(f.db.delete_attendance(other.id, record).is_err());
        f.db.delete_attendance(f.user.id, record)?;
        assert!(f.db.list_attendance(enrolled.enrollment_id)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_delete_teacher_with_courses() -> Fallible<()> {
        let f = fixture()?;
        let course = f
            .db
            .add_course(f.user.id, &course_fields(f.teacher, "CS101", 5, 60.0))?;
        let result = f.db.delete_teacher(f.user.id, f.teacher);
        assert_eq!(
            result.unwrap_err().message(),
            "Cannot delete teacher who has courses assigned."
        );
        let teachers = f.db.list_teachers(f.user.id)?;
        assert_eq!(teachers[0].course_count, 1);
        f.db.delete_course(f.user.id, course)?;
        f.db.delete_teacher(f.user.id, f.teacher)?;
        assert!(f.db.list_teachers(f.user.id)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_teachers_are_scoped_to_owner() -> Fallible<()> {
        let f = fixture()?;
        let other = f.db.create_user("grace", "Grace Hopper", "")?;
        assert_eq!(f.db.get_teacher(other.id, f.teacher)?, None);
        let fields = TeacherFields {
            name: "Somebody".to_string(),
            email: String::new(),
            department: String::new(),
        };
        assert!(f.db.update_teacher(other.id, f.teacher, &fields).is_err());
        assert!(f.db.delete_teacher(other.id, f.teacher).is_err());
        f.db.update_teacher(f.user.id, f.teacher, &fields)?;
        let teacher = f.db.get_teacher(f.user.id, f.teacher)?.unwrap();
        assert_eq!(teacher.name, "Somebody");
        Ok(())
    }

    #[test]
    fn test_enroll_twice() -> Fallible<()> {
        let f = fixture()?;
        let course = f
            .db
            .add_course(f.user.id, &course_fields(f.teacher, "CS101", 5, 70.0))?;
        let result = f.db.enroll(f.user.id, course);
        assert_eq!(
            result.unwrap_err().message(),
            "Already enrolled in this course."
        );
        assert_eq!(f.db.required_percentage(f.user.id, course)?, 70.0);
        Ok(())
    }

    #[test]
    fn test_course_summaries() -> Fallible<()> {
        let f = fixture()?;
        let b = f
            .db
            .add_course(f.user.id, &course_fields(f.teacher, "B200", 10, 100.0))?;
        let a = f
            .db
            .add_course(f.user.id, &course_fields(f.teacher, "A100", 30, 60.0))?;
        f.db.mark_attendance(f.user.id, a, day(1), AttendanceStatus::Present, "")?;
        f.db.mark_attendance(f.user.id, a, day(2), AttendanceStatus::Absent, "")?;
        f.db.mark_attendance(f.user.id, a, day(3), AttendanceStatus::Present, "")?;
        let summaries = f.db.course_summaries(f.user.id)?;
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].course.id, a);
        assert_eq!(
            summaries[0].input,
            CourseAttendanceInput {
                total_classes: 30,
                classes_held: 3,
                present_count: 2,
                absent_count: 1,
                required_percentage: 60.0,
            }
        );
        assert_eq!(summaries[1].course.id, b);
        assert_eq!(summaries[1].input.classes_held, 0);
        assert_eq!(summaries[1].input.present_count, 0);
        assert_eq!(summaries[1].input.required_percentage, 100.0);
        Ok(())
    }
}
