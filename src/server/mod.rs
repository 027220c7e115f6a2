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

mod attendance;
mod course;
mod dashboard;
mod principal;
pub mod server;
mod state;
mod teacher;
mod template;

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::time::Duration;

    use reqwest::StatusCode;
    use tempfile::TempDir;
    use tempfile::tempdir;
    use tokio::net::TcpStream;
    use tokio::spawn;
    use tokio::time::sleep;

    use crate::config::Config;
    use crate::error::Fallible;
    use crate::server::server::open_database;
    use crate::server::server::start_server;

    /// Start a server on a free port with a fresh database and one user.
    async fn spawn_server() -> Fallible<(TempDir, String)> {
        let dir = tempdir()?;
        let db = open_database(dir.path())?;
        db.create_user("ada", "Ada Lovelace", "ada@example.com")?;
        drop(db);

        let port = portpicker::pick_unused_port().expect("no free port");
        let config = Config {
            port,
            ..Config::default()
        };
        let directory = dir.path().to_path_buf();
        spawn(async move { start_server(directory, "ada".to_string(), config).await });
        let bind = format!("127.0.0.1:{port}");
        loop {
            if let Ok(stream) = TcpStream::connect(&bind).await {
                drop(stream);
                break;
            }
            sleep(Duration::from_millis(1)).await;
        }
        Ok((dir, format!("http://{bind}")))
    }

    async fn post(url: String, form: &[(&str, &str)]) -> Fallible<String> {
        let response = reqwest::Client::new()
            .post(url)
            .form(form)
            .send()
            .await
            .expect("request failed");
        assert!(response.status().is_success());
        Ok(response.text().await.expect("no body"))
    }

    #[tokio::test]
    async fn test_start_server_on_non_existent_directory() -> Fallible<()> {
        let directory = PathBuf::from("./derpherp");
        let result = start_server(directory, "ada".to_string(), Config::default()).await;
        let err = result.err().unwrap();
        assert_eq!(err.to_string(), "error: directory does not exist.");
        Ok(())
    }

    #[tokio::test]
    async fn test_start_server_with_unknown_user() -> Fallible<()> {
        let dir = tempdir()?;
        let result = start_server(
            dir.path().to_path_buf(),
            "nobody".to_string(),
            Config::default(),
        )
        .await;
        let err = result.err().unwrap();
        assert!(err.message().starts_with("no such user: nobody"));
        Ok(())
    }

    #[tokio::test]
    async fn test_e2e() -> Fallible<()> {
        let (_dir, base) = spawn_server().await?;

        // Static and missing pages.
        let response = reqwest::get(format!("{base}/style.css")).await.unwrap();
        assert!(response.status().is_success());
        assert_eq!(response.headers().get("content-type").unwrap(), "text/css");
        let response = reqwest::get(format!("{base}/herp-derp")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        // Empty dashboard.
        let response = reqwest::get(format!("{base}/")).await.unwrap();
        assert!(response.status().is_success());
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "text/html; charset=utf-8"
        );
        let html = response.text().await.unwrap();
        assert!(html.contains("Welcome, Ada Lovelace"));
        assert!(html.contains("No courses yet."));

        // Add a teacher, coming back to the course form.
        let html = post(
            format!("{base}/teacher/add?redirect=add_course"),
            &[("name", "Charles Babbage"), ("department", "Mathematics")],
        )
        .await?;
        assert!(html.contains("Teacher added successfully!"));
        assert!(html.contains("Charles Babbage"));

        // Add a course that requires full attendance.
        let html = post(
            format!("{base}/course/add"),
            &[
                ("course_code", "CS101"),
                ("course_name", "Analytical Engines"),
                ("teacher_id", "1"),
                ("semester", "Fall"),
                ("total_classes", "10"),
                ("required_percentage", "100"),
            ],
        )
        .await?;
        assert!(html.contains("Course added successfully!"));
        assert!(html.contains("CS101"));

        // Attend half of the classes.
        for _ in 0..5 {
            let html = post(format!("{base}/course/1/quick-mark/present"), &[]).await?;
            assert!(html.contains("Attendance marked as PRESENT for today!"));
        }
        let html = reqwest::get(format!("{base}/"))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert!(html.contains("Danger zone"));
        let html = reqwest::get(format!("{base}/course/1"))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert!(html.contains("5 / 10"));
        assert!(html.contains("You cannot miss any more classes."));

        // Bad status.
        let html = post(format!("{base}/course/1/quick-mark/late"), &[]).await?;
        assert!(html.contains("Invalid status!"));

        // One absence makes the threshold unreachable.
        let html = post(
            format!("{base}/course/1/mark"),
            &[
                ("class_date", "2025-09-01"),
                ("status", "absent"),
                ("notes", "sick"),
            ],
        )
        .await?;
        assert!(html.contains("Attendance marked successfully!"));
        assert!(html.contains("Dead zone"));
        assert!(html.contains("2025-09-01"));

        // Turning the absence into a presence leaves no slack.
        let html = post(
            format!("{base}/attendance/6/edit"),
            &[("course_id", "1"), ("status", "present"), ("notes", "")],
        )
        .await?;
        assert!(html.contains("Attendance updated successfully!"));
        assert!(html.contains("Danger zone"));

        // Deleting it brings the course back to five presents.
        let html = post(
            format!("{base}/attendance/6/delete"),
            &[("course_id", "1")],
        )
        .await?;
        assert!(html.contains("Attendance record deleted successfully!"));
        assert!(html.contains("5 / 10"));

        // The teacher is still referenced by the course.
        let html = post(format!("{base}/teacher/1/delete"), &[]).await?;
        assert!(html.contains("Cannot delete teacher who has courses assigned."));

        // Unknown course.
        let html = reqwest::get(format!("{base}/course/99"))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert!(html.contains("Course not found."));

        Ok(())
    }
}
