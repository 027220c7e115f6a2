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

use std::env::current_dir;
use std::path::PathBuf;

use clap::Parser;

use crate::cmd::add_user::add_user;
use crate::cmd::report::ReportFormat;
use crate::cmd::report::print_report;
use crate::config::Config;
use crate::error::Fallible;
use crate::server::server::start_server;

#[derive(Parser)]
#[command(version, about, long_about = None)]
enum Command {
    /// Serve the attendance tracker.
    Serve {
        /// Path to the data directory. Defaults to the current directory.
        directory: Option<String>,
        /// The user to act as.
        #[arg(long)]
        user: String,
        /// Address to listen on. Overrides the configuration file.
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on. Overrides the configuration file.
        #[arg(long)]
        port: Option<u16>,
        /// Open the dashboard in a browser.
        #[arg(long)]
        open_browser: bool,
    },
    /// Create a user.
    AddUser {
        /// Path to the data directory. Defaults to the current directory.
        directory: Option<String>,
        #[arg(long)]
        username: String,
        #[arg(long)]
        full_name: String,
        #[arg(long, default_value = "")]
        email: String,
    },
    /// Print the attendance summary of every course.
    Report {
        /// Path to the data directory. Defaults to the current directory.
        directory: Option<String>,
        /// The user to report on.
        #[arg(long)]
        user: String,
        /// Output format.
        #[arg(long, default_value_t = ReportFormat::Text)]
        format: ReportFormat,
    },
}

pub async fn entrypoint() -> Fallible<()> {
    let cli: Command = Command::parse();
    match cli {
        Command::Serve {
            directory,
            user,
            host,
            port,
            open_browser,
        } => {
            let directory = resolve_directory(directory)?;
            let mut config = Config::load(&directory)?;
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            if open_browser {
                config.open_browser = true;
            }
            start_server(directory, user, config).await
        }
        Command::AddUser {
            directory,
            username,
            full_name,
            email,
        } => {
            let directory = resolve_directory(directory)?;
            add_user(&directory, &username, &full_name, &email)
        }
        Command::Report {
            directory,
            user,
            format,
        } => {
            let directory = resolve_directory(directory)?;
            print_report(&directory, &user, format)
        }
    }
}

fn resolve_directory(directory: Option<String>) -> Fallible<PathBuf> {
    match directory {
        Some(dir) => Ok(PathBuf::from(dir)),
        None => Ok(current_dir()?),
    }
}
