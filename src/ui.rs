#[cfg(any(feature = "advisor", feature = "notice"))]
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Delay between starting the close animation and hiding the element.
pub const CLOSE_DELAY: Duration = Duration::from_millis(500);

/// Host-provided handle to a notice element (overlay or banner).
///
/// The crate decides *when* an element is shown or hidden; the host decides
/// *how* (styles, animation names, markup).
///
/// # Example
///
/// ```rust,ignore
/// impl NoticeElement for DomNotice {
///     fn show(&self) {
///         self.style("animation", "show-notice 1s forwards");
///         self.style("display", "flex");
///         self.style("visibility", "visible");
///     }
///
///     fn start_close_animation(&self) {
///         self.style("animation", "close-notice 1s forwards");
///     }
///
///     fn hide(&self) {
///         self.style("display", "none");
///     }
///
///     fn is_visible(&self) -> bool {
///         self.computed("display") != "none"
///     }
/// }
/// ```
pub trait NoticeElement: Send + Sync + 'static {
    /// Make the element visible, playing its show animation if any.
    fn show(&self);

    /// Begin the fade-out. The element stays visible until [`hide`](Self::hide).
    fn start_close_animation(&self);

    /// Remove the element from view.
    fn hide(&self);

    fn is_visible(&self) -> bool;

    /// Toggle the enlarged control layout used in portrait orientation.
    fn set_enlarged(&self, _enlarged: bool) {}
}

/// A [`NoticeElement`] whose pending hide is cancelled by a later show.
///
/// Each [`show`](Self::show) bumps a generation counter. [`close`](Self::close) remembers
/// the generation it started in and only hides the element if no show happened during
/// the close delay.
#[cfg(any(feature = "advisor", feature = "notice"))]
pub(crate) struct ManagedElement<E> {
    element: E,
    generation: AtomicU64,
}

#[cfg(any(feature = "advisor", feature = "notice"))]
impl<E: NoticeElement> ManagedElement<E> {
    pub(crate) fn new(element: E) -> Self {
        Self {
            element,
            generation: AtomicU64::new(0),
        }
    }

    pub(crate) fn get(&self) -> &E {
        &self.element
    }

    pub(crate) fn show(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.element.show();
    }

    /// Fade the element out and hide it once [`CLOSE_DELAY`] has elapsed.
    pub(crate) async fn close(&self) {
        let started = self.generation.load(Ordering::SeqCst);
        self.element.start_close_animation();
        tokio::time::sleep(CLOSE_DELAY).await;
        if self.generation.load(Ordering::SeqCst) == started {
            self.element.hide();
        } else {
            tracing::debug!("Element shown again while closing, hide skipped");
        }
    }
}
