use crate::config::ClientConfig;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{
    sync::{Mutex, MutexGuard, PoisonError},
    time::Duration,
};
use uuid::Uuid;

pub const DEFAULT_NOTICE_TTL: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A transient user-visible message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notice {
    pub id: String,
    pub level: NoticeLevel,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub ttl_ms: u64,
}

impl Notice {
    pub fn new(level: NoticeLevel, message: impl Into<String>, ttl: Duration) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            level,
            message: message.into(),
            created_at: Utc::now(),
            ttl_ms: ttl.as_millis() as u64,
        }
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.created_at + chrono::Duration::milliseconds(self.ttl_ms as i64)
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at()
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, level: NoticeLevel, message: &str);

    fn info(&self, message: &str) {
        self.notify(NoticeLevel::Info, message);
    }

    fn success(&self, message: &str) {
        self.notify(NoticeLevel::Success, message);
    }

    fn warning(&self, message: &str) {
        self.notify(NoticeLevel::Warning, message);
    }

    fn error(&self, message: &str) {
        self.notify(NoticeLevel::Error, message);
    }
}

/// Forwards notices to the `log` facade. Useful for headless hosts.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        match level {
            NoticeLevel::Info | NoticeLevel::Success => log::info!("🔔 {}", message),
            NoticeLevel::Warning => log::warn!("🔔 {}", message),
            NoticeLevel::Error => log::error!("🔔 {}", message),
        }
    }
}

/// Ordered list of notices with auto-dismiss after `ttl` and manual dismiss by id.
#[derive(Debug)]
pub struct NoticeBoard {
    ttl: Duration,
    notices: Mutex<Vec<Notice>>,
}

impl Default for NoticeBoard {
    fn default() -> Self {
        Self::new(DEFAULT_NOTICE_TTL)
    }
}

impl NoticeBoard {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            notices: Mutex::new(Vec::new()),
        }
    }

    /// Board whose notices live for `config.notice_ttl`.
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.notice_ttl)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn notices(&self) -> MutexGuard<'_, Vec<Notice>> {
        self.notices.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn active(&self) -> Vec<Notice> {
        self.active_at(Utc::now())
    }

    /// Drops notices that expired by `now` and returns the rest, oldest first.
    pub fn active_at(&self, now: DateTime<Utc>) -> Vec<Notice> {
        let mut notices = self.notices();
        notices.retain(|n| !n.is_expired_at(now));
        notices.clone()
    }

    pub fn dismiss(&self, id: &str) -> bool {
        let mut notices = self.notices();
        let before = notices.len();
        notices.retain(|n| n.id != id);
        notices.len() != before
    }

    pub fn clear(&self) {
        self.notices().clear();
    }

    /// Every recorded message, expired or not, oldest first.
    pub fn messages(&self) -> Vec<String> {
        self.notices().iter().map(|n| n.message.clone()).collect()
    }

    pub fn last(&self) -> Option<Notice> {
        self.notices().last().cloned()
    }
}

impl Notifier for NoticeBoard {
    fn notify(&self, level: NoticeLevel, message: &str) {
        LogNotifier.notify(level, message);
        self.notices().push(Notice::new(level, message, self.ttl));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_records_in_order() {
        let board = NoticeBoard::default();
        board.info("first");
        board.error("second");

        assert_eq!(board.messages(), vec!["first", "second"]);
        let last = board.last().unwrap();
        assert_eq!(last.level, NoticeLevel::Error);
        assert_eq!(last.ttl_ms, 5000);
    }

    #[test]
    fn test_notices_auto_dismiss() {
        let board = NoticeBoard::new(Duration::from_millis(100));
        board.warning("short lived");

        let created = board.last().unwrap().created_at;
        assert_eq!(board.active_at(created).len(), 1);
        assert!(board
            .active_at(created + chrono::Duration::milliseconds(100))
            .is_empty());
        assert!(board.messages().is_empty());
    }

    #[test]
    fn test_manual_dismiss() {
        let board = NoticeBoard::default();
        board.info("keep");
        board.info("drop");
        let id = board.last().unwrap().id;

        assert!(board.dismiss(&id));
        assert!(!board.dismiss(&id));
        assert_eq!(board.messages(), vec!["keep"]);
    }

    #[test]
    fn test_board_uses_configured_ttl() {
        let config = ClientConfig::new().with_notice_ttl(Duration::from_millis(200));
        let board = NoticeBoard::from_config(&config);
        assert_eq!(board.ttl(), Duration::from_millis(200));

        board.success("Image generated");
        let notice = board.last().unwrap();
        assert_eq!(notice.ttl_ms, 200);

        let created = notice.created_at;
        assert_eq!(
            board
                .active_at(created + chrono::Duration::milliseconds(199))
                .len(),
            1
        );
        assert!(board
            .active_at(created + chrono::Duration::milliseconds(200))
            .is_empty());
    }
}
