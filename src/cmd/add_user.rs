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

use std::path::Path;

use crate::error::Fallible;
use crate::server::server::open_database;

pub fn add_user(directory: &Path, username: &str, full_name: &str, email: &str) -> Fallible<()> {
    let db = open_database(directory)?;
    let user = db.create_user(username, full_name, email)?;
    println!("Created user {}.", user.username);
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_add_user_twice() -> Fallible<()> {
        let dir = tempdir()?;
        add_user(dir.path(), "ada", "Ada Lovelace", "")?;
        let result = add_user(dir.path(), "ada", "Ada Lovelace", "");
        assert_eq!(result.unwrap_err().message(), "Username already exists.");
        Ok(())
    }

    #[test]
    fn test_non_existent_directory() {
        assert!(add_user(Path::new("./derpherp"), "ada", "Ada", "").is_err());
    }
}
