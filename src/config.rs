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

use std::fs::read_to_string;
use std::path::Path;

use serde::Deserialize;

use crate::db::validate_percentage;
use crate::error::Fallible;
use crate::projector::DEFAULT_REQUIRED_PERCENTAGE;

pub const CONFIG_FILE_NAME: &str = "attendance.toml";

/// Settings read from `attendance.toml` in the data directory. Every field is
/// optional.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Pre-filled threshold when adding a course.
    pub default_required_percentage: f64,
    /// Open the dashboard in a browser once the server is up.
    pub open_browser: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            default_required_percentage: DEFAULT_REQUIRED_PERCENTAGE,
            open_browser: false,
        }
    }
}

impl Config {
    pub fn load(directory: &Path) -> Fallible<Self> {
        let path = directory.join(CONFIG_FILE_NAME);
        if !path.exists() {
            log::debug!("No configuration file, using defaults.");
            return Ok(Self::default());
        }
        log::debug!("Loading configuration from {}", path.display());
        Self::parse(&read_to_string(path)?)
    }

    pub fn parse(content: &str) -> Fallible<Self> {
        let config: Config = toml::from_str(content)?;
        validate_percentage(config.default_required_percentage)?;
        Ok(config)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_defaults() -> Fallible<()> {
        let config = Config::parse("")?;
        assert_eq!(config, Config::default());
        assert_eq!(config.bind_address(), "127.0.0.1:8000");
        Ok(())
    }

    #[test]
    fn test_partial_file() -> Fallible<()> {
        let config = Config::parse("port = 9000\ndefault_required_percentage = 75.0\n")?;
        assert_eq!(config.port, 9000);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.default_required_percentage, 75.0);
        Ok(())
    }

    #[test]
    fn test_invalid_files() {
        assert!(Config::parse("colour = \"blue\"").is_err());
        assert!(Config::parse("port = \"eighty\"").is_err());
        assert!(Config::parse("default_required_percentage = 140.0").is_err());
    }

    #[test]
    fn test_load_missing_file() -> Fallible<()> {
        let dir = tempdir()?;
        assert_eq!(Config::load(dir.path())?, Config::default());
        Ok(())
    }

    #[test]
    fn test_load_file() -> Fallible<()> {
        let dir = tempdir()?;
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "open_browser = true\n")?;
        assert!(Config::load(dir.path())?.open_browser);
        Ok(())
    }
}
