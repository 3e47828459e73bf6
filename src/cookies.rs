use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use cookie::Cookie;
use time::{Duration, OffsetDateTime, Time};

/// Name of the "already dismissed today" cookie.
pub const NOTICE_COOKIE_NAME: &str = "notice";
/// Value marking the notice as suppressed.
pub const NOTICE_SUPPRESSED_VALUE: &str = "0";

/// Host-provided cookie storage (`document.cookie` in a browser).
pub trait CookieStore: Send + Sync + 'static {
    /// Current value of the cookie named `name`, if set and not expired.
    fn get(&self, name: &str) -> Option<String>;

    /// Store `cookie`, replacing any cookie with the same name.
    fn set(&self, cookie: Cookie<'static>);
}

/// Seconds left until the next local midnight; a full day at exactly midnight.
#[must_use]
pub fn seconds_until_midnight(now: Time) -> i64 {
    let (h, m, s) = now.as_hms();
    let elapsed = i64::from(h) * 3600 + i64::from(m) * 60 + i64::from(s);
    86_400 - elapsed
}

/// Create the suppression cookie, valid until local midnight of `now`.
#[must_use]
pub fn suppression_cookie(now: OffsetDateTime) -> Cookie<'static> {
    let lifetime = Duration::seconds(seconds_until_midnight(now.time()));
    Cookie::build((NOTICE_COOKIE_NAME, NOTICE_SUPPRESSED_VALUE))
        .path("/")
        .max_age(lifetime)
        .build()
}

/// Local wall-clock time, falling back to UTC when the offset is unknown.
#[cfg(feature = "notice")]
pub(crate) fn local_now() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

/// Whether the store carries the suppression flag.
#[must_use]
pub fn is_suppressed<C: CookieStore + ?Sized>(store: &C) -> bool {
    store
        .get(NOTICE_COOKIE_NAME)
        .is_some_and(|v| v == NOTICE_SUPPRESSED_VALUE)
}

struct StoredCookie {
    value: String,
    expires_at: Option<OffsetDateTime>,
}

/// In-memory [`CookieStore`] honoring `Max-Age` and `Expires`.
#[derive(Default)]
pub struct MemoryCookieStore {
    cookies: Mutex<HashMap<String, StoredCookie>>,
}

impl MemoryCookieStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store from a raw `Cookie` header (`a=1; b=2`). Malformed pairs are skipped.
    #[must_use]
    pub fn from_header(header: &str) -> Self {
        let store = Self::new();
        for cookie in Cookie::split_parse(header).filter_map(Result::ok) {
            store.set(cookie.into_owned());
        }
        store
    }
}

impl CookieStore for MemoryCookieStore {
    fn get(&self, name: &str) -> Option<String> {
        let mut cookies = self.cookies.lock().unwrap_or_else(PoisonError::into_inner);
        let expired = cookies
            .get(name)?
            .expires_at
            .is_some_and(|at| at <= OffsetDateTime::now_utc());
        if expired {
            cookies.remove(name);
            return None;
        }
        cookies.get(name).map(|c| c.value.clone())
    }

    fn set(&self, cookie: Cookie<'static>) {
        let mut cookies = self.cookies.lock().unwrap_or_else(PoisonError::into_inner);
        let now = OffsetDateTime::now_utc();
        // Max-Age wins over Expires when both are present.
        let expires_at = cookie
            .max_age()
            .map(|age| now + age)
            .or_else(|| cookie.expires_datetime());
        if expires_at.is_some_and(|at| at <= now) {
            cookies.remove(cookie.name());
            return;
        }
        cookies.insert(
            cookie.name().to_string(),
            StoredCookie {
                value: cookie.value().to_string(),
                expires_at,
            },
        );
    }
}
