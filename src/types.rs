use std::collections::HashMap;

use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};

/// Backend user identifier, used in `api/notification/{id}/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Into)]
#[serde(transparent)]
pub struct UserId(pub String);

impl From<u64> for UserId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

/// Opaque user credential returned by `api/get-token`.
///
/// Lives only for the page session; sent as `Authorization: Token <key>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Display, From, Into)]
#[serde(transparent)]
pub struct UserToken(pub String);

impl UserToken {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Anti-forgery token sent as `X-CSRFToken` on every API request.
#[derive(Debug, Clone, PartialEq, Eq, Display, From, Into)]
pub struct CsrfToken(pub String);

impl CsrfToken {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Phone/telegram pair exchanged for a [`UserToken`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub phone: String,
    /// Telegram handle, e.g. `@nickname`.
    pub telegram: String,
}

impl Identity {
    #[must_use]
    pub fn new(phone: impl Into<String>, telegram: impl Into<String>) -> Self {
        Self {
            phone: phone.into(),
            telegram: telegram.into(),
        }
    }
}

/// One scheduled lesson. Only the date is consumed; other fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonRecord {
    pub date: String,
}

/// Number of booked lessons per date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LessonCountByDate(HashMap<String, usize>);

impl LessonCountByDate {
    /// Lessons booked on `date`; zero when the date is absent.
    #[must_use]
    pub fn count(&self, date: &str) -> usize {
        self.0.get(date).copied().unwrap_or(0)
    }

    /// Sum over all dates.
    #[must_use]
    pub fn total(&self) -> usize {
        self.0.values().sum()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.0.iter().map(|(date, count)| (date.as_str(), *count))
    }
}

impl FromIterator<LessonRecord> for LessonCountByDate {
    fn from_iter<I: IntoIterator<Item = LessonRecord>>(records: I) -> Self {
        let mut counts = HashMap::new();
        for record in records {
            *counts.entry(record.date).or_insert(0) += 1;
        }
        Self(counts)
    }
}

/// Server-side display decision for the user notification banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoticeInfo {
    pub notice: bool,
    #[serde(default)]
    pub amount_lesson: u32,
}
