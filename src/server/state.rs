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

use crate::config::Config;
use crate::db::Database;
use crate::error::Fallible;
use crate::types::entities::UserId;

#[derive(Clone)]
pub struct ServerState {
    pub db: Database,
    pub config: Config,
    /// The user this server acts on behalf of.
    pub principal: UserId,
    pub notice: Arc<Mutex<Option<Notice>>>,
}

/// A one-shot message shown on the next rendered page.
#[derive(Clone, Debug, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NoticeLevel {
    Success,
    Danger,
}

impl NoticeLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoticeLevel::Success => "success",
            NoticeLevel::Danger => "danger",
        }
    }
}

impl ServerState {
    pub fn new(db: Database, config: Config, principal: UserId) -> Self {
        Self {
            db,
            config,
            principal,
            notice: Arc::new(Mutex::new(None)),
        }
    }

    /// Replace the pending notice.
    pub fn notify(&self, level: NoticeLevel, message: impl Into<String>) {
        match self.notice.lock() {
            Ok(mut slot) => {
                *slot = Some(Notice {
                    level,
                    message: message.into(),
                });
            }
            Err(_) => log::error!("notice lock poisoned"),
        }
    }

    /// Turn the outcome of an action into a notice. Errors are logged.
    pub fn report<T>(&self, result: Fallible<T>, success: impl Into<String>) -> Option<T> {
        match result {
            Ok(value) => {
                self.notify(NoticeLevel::Success, success);
                Some(value)
            }
            Err(e) => {
                log::error!("{e}");
                self.notify(NoticeLevel::Danger, e.message());
                None
            }
        }
    }

    /// Take the pending notice, if any.
    pub fn take_notice(&self) -> Option<Notice> {
        match self.notice.lock() {
            Ok(mut slot) => slot.take(),
            Err(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::fail;

    #[test]
    fn test_notice_is_shown_once() -> Fallible<()> {
        let db = Database::new(":memory:")?;
        let state = ServerState::new(db, Config::default(), 1);
        assert_eq!(state.take_notice(), None);
        state.notify(NoticeLevel::Danger, "first");
        state.notify(NoticeLevel::Success, "second");
        assert_eq!(
            state.take_notice(),
            Some(Notice {
                level: NoticeLevel::Success,
                message: "second".to_string()
            })
        );
        assert_eq!(state.take_notice(), None);
        Ok(())
    }

    #[test]
    fn test_report() -> Fallible<()> {
        let db = Database::new(":memory:")?;
        let state = ServerState::new(db, Config::default(), 1);
        assert_eq!(state.report(Ok(3), "done"), Some(3));
        assert_eq!(state.take_notice().unwrap().level, NoticeLevel::Success);
        assert_eq!(state.report::<()>(fail("Course not found."), "done"), None);
        let notice = state.take_notice().unwrap();
        assert_eq!(notice.level, NoticeLevel::Danger);
        assert_eq!(notice.message, "Course not found.");
        Ok(())
    }
}
