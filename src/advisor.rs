//! High lesson cost warning.
//!
//! Booking a 4th (or later) lesson on the same date is charged at the high rate.
//! [`LessonCostAdvisor`] stops the booking form and shows a warning overlay so the
//! user has to acknowledge the cost before booking again.
//!
//! ```rust,ignore
//! let advisor = LessonCostAdvisor::new(ApiClient::new(ApiConfig::from_env()?), overlay)?;
//!
//! // form "submit" listener
//! let mut event = SubmitEvent::new(form.date_value());
//! advisor.on_submit(&mut event).await?;
//! if event.is_default_prevented() {
//!     dom_event.prevent_default();
//! }
//! ```

use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};

use crate::api::ApiClient;
use crate::error::Error;
use crate::types::LessonCountByDate;
use crate::ui::{ManagedElement, NoticeElement};

/// Lessons already booked on a date at which a new booking needs acknowledgment.
pub const HIGH_COST_THRESHOLD: usize = 4;

type CountsFuture = Shared<BoxFuture<'static, Result<Arc<LessonCountByDate>, Arc<Error>>>>;

/// A pending booking form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitEvent {
    date: String,
    default_prevented: bool,
}

impl SubmitEvent {
    /// Submission for the form's `date` field value.
    #[must_use]
    pub fn new(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            default_prevented: false,
        }
    }

    #[must_use]
    pub fn date(&self) -> &str {
        &self.date
    }

    /// Cancel the form's default submit action.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    #[must_use]
    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// Outcome of [`LessonCostAdvisor::on_submit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitDecision {
    /// Fewer than [`HIGH_COST_THRESHOLD`] lessons on the date.
    Proceed { booked: usize },
    /// Submission cancelled and the warning overlay shown.
    Blocked { booked: usize },
}

/// Where a click on the overlay landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    /// The overlay's own backdrop (event target == current target).
    Backdrop,
    /// Anything nested inside the overlay.
    Content,
}

/// Screen orientation, from `window.orientation` degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Portrait,
    Landscape,
}

impl Orientation {
    /// `0` is portrait, `90`/`-90` landscape; anything else is unknown.
    #[must_use]
    pub fn from_degrees(degrees: i32) -> Option<Self> {
        match degrees {
            0 => Some(Self::Portrait),
            90 | -90 => Some(Self::Landscape),
            _ => None,
        }
    }
}

/// Blocks booking forms on dates that already carry [`HIGH_COST_THRESHOLD`] lessons.
///
/// Lesson counts are fetched once, at construction, and every submission reuses
/// that snapshot. Lessons booked elsewhere afterwards are not seen until a new
/// advisor is built.
pub struct LessonCostAdvisor<E> {
    counts: CountsFuture,
    overlay: ManagedElement<E>,
}

impl<E: NoticeElement> LessonCostAdvisor<E> {
    /// Start fetching lesson counts in the background and return immediately.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if called outside a Tokio runtime.
    pub fn new(client: ApiClient, overlay: E) -> Result<Self, Error> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| Error::Config(format!("lesson advisor needs a Tokio runtime: {e}")))?;

        let handle = runtime.spawn(async move {
            let counts = client.lesson_counts().await;
            if let Err(e) = &counts {
                tracing::error!(error = %e, "Lesson counts request failed");
            }
            counts
        });

        let counts = async move {
            match handle.await {
                Ok(Ok(counts)) => Ok(Arc::new(counts)),
                Ok(Err(e)) => Err(Arc::new(e)),
                Err(e) => Err(Arc::new(Error::Task(e))),
            }
        };

        Ok(Self {
            counts: counts.boxed().shared(),
            overlay: ManagedElement::new(overlay),
        })
    }

    /// Use already known lesson counts instead of fetching them.
    #[must_use]
    pub fn with_lesson_counts(counts: LessonCountByDate, overlay: E) -> Self {
        let ready: Result<Arc<LessonCountByDate>, Arc<Error>> = Ok(Arc::new(counts));
        Self {
            counts: futures::future::ready(ready).boxed().shared(),
            overlay: ManagedElement::new(overlay),
        }
    }

    /// The overlay handle this advisor drives.
    #[must_use]
    pub fn overlay(&self) -> &E {
        self.overlay.get()
    }

    /// Wait for the lesson count snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LessonCounts`] if the background fetch failed.
    pub async fn lesson_counts(&self) -> Result<Arc<LessonCountByDate>, Error> {
        self.counts.clone().await.map_err(Error::LessonCounts)
    }

    /// Form `submit` handler.
    ///
    /// Cancels `event` and shows the overlay when the selected date already has
    /// [`HIGH_COST_THRESHOLD`] or more lessons. A date with no lessons proceeds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LessonCounts`] if the counts could not be loaded; the
    /// event and the overlay are left untouched.
    pub async fn on_submit(&self, event: &mut SubmitEvent) -> Result<SubmitDecision, Error> {
        let counts = self.lesson_counts().await.inspect_err(|e| {
            tracing::warn!(error = %e, date = event.date(), "Cannot check lesson cost");
        })?;

        let booked = counts.count(event.date());
        if booked < HIGH_COST_THRESHOLD {
            return Ok(SubmitDecision::Proceed { booked });
        }

        tracing::info!(date = event.date(), booked, "High lesson cost, submission blocked");
        event.prevent_default();
        self.show_warning_overlay();
        Ok(SubmitDecision::Blocked { booked })
    }

    pub fn show_warning_overlay(&self) {
        self.overlay.show();
    }

    /// Fade the overlay out and hide it after [`CLOSE_DELAY`](crate::ui::CLOSE_DELAY).
    /// Safe to call when already hidden.
    pub async fn dismiss_warning_overlay(&self) {
        self.overlay.close().await;
    }

    /// Overlay `click` handler: only a click on the backdrop itself closes it.
    pub async fn on_backdrop_click(&self, target: ClickTarget) {
        if target == ClickTarget::Backdrop {
            self.dismiss_warning_overlay().await;
        }
    }

    /// Window `keydown` handler, keyed by `KeyboardEvent.key`.
    pub async fn on_key(&self, key: &str) {
        if key == "Escape" {
            self.on_escape().await;
        }
    }

    /// Escape closes the overlay while it is open.
    pub async fn on_escape(&self) {
        if self.overlay.get().is_visible() {
            self.dismiss_warning_overlay().await;
        }
    }

    /// `orientationchange` handler. `None` when the platform reports no orientation.
    pub fn on_orientation_change(&self, degrees: Option<i32>) {
        match degrees.and_then(Orientation::from_degrees) {
            Some(Orientation::Portrait) => self.overlay.get().set_enlarged(true),
            Some(Orientation::Landscape) => self.overlay.get().set_enlarged(false),
            None => {}
        }
    }
}
