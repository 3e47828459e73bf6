#![doc = include_str!("../README.md")]

#[cfg(feature = "advisor")]
pub mod advisor;
pub mod api;
pub mod cookies;
pub mod error;
#[cfg(feature = "notice")]
pub mod notice;
pub mod types;
pub mod ui;

// Re-exports for convenient access
#[cfg(feature = "advisor")]
pub use advisor::{
    ClickTarget, HIGH_COST_THRESHOLD, LessonCostAdvisor, Orientation, SubmitDecision, SubmitEvent,
};
pub use api::{ApiClient, ApiConfig};
pub use cookies::{CookieStore, MemoryCookieStore};
pub use error::Error;
#[cfg(feature = "notice")]
pub use notice::{NoticeOutcome, UserNoticeController};
pub use types::{
    CsrfToken, Identity, LessonCountByDate, LessonRecord, NoticeInfo, UserId, UserToken,
};
pub use ui::{CLOSE_DELAY, NoticeElement};
