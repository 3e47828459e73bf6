use std::sync::Arc;

use serde_json::Value as JsonValue;

use crate::api::ApiClient;
use crate::cookies::{self, CookieStore};
use crate::error::Error;
use crate::types::{Identity, NoticeInfo, UserId, UserToken};
use crate::ui::{ManagedElement, NoticeElement};

/// What [`UserNoticeController::maybe_show_notification`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeOutcome {
    /// Suppression cookie present; nothing was requested.
    Suppressed,
    /// The backend said not to show the banner.
    NotRequested,
    /// Banner shown.
    Shown,
}

/// Per-user notification banner, dismissible until local midnight.
pub struct UserNoticeController<B, C> {
    client: ApiClient,
    banner: Arc<ManagedElement<B>>,
    cookies: Arc<C>,
}

// Manual Clone: avoid derive adding `B: Clone, C: Clone` bounds.
impl<B, C> Clone for UserNoticeController<B, C> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            banner: self.banner.clone(),
            cookies: self.cookies.clone(),
        }
    }
}

impl<B: NoticeElement, C: CookieStore> UserNoticeController<B, C> {
    #[must_use]
    pub fn new(client: ApiClient, banner: B, cookies: C) -> Self {
        Self {
            client,
            banner: Arc::new(ManagedElement::new(banner)),
            cookies: Arc::new(cookies),
        }
    }

    #[must_use]
    pub fn banner(&self) -> &B {
        self.banner.get()
    }

    #[must_use]
    pub fn cookies(&self) -> &C {
        &self.cookies
    }

    /// Whether the banner was already dismissed today.
    #[must_use]
    pub fn is_suppressed(&self) -> bool {
        cookies::is_suppressed(self.cookies.as_ref())
    }

    /// Exchange the user's phone/telegram identity for a token.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::get_token`].
    pub async fn fetch_user_token(&self, identity: &Identity) -> Result<UserToken, Error> {
        self.client.get_token(identity).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::get_notice_info`].
    pub async fn fetch_notice_info(
        &self,
        user_id: &UserId,
        user_token: &UserToken,
    ) -> Result<NoticeInfo, Error> {
        self.client.get_notice_info(user_id, user_token).await
    }

    /// Show the banner if it is not suppressed and the backend asks for it.
    ///
    /// The suppression cookie is checked first; when present no request is made.
    ///
    /// # Errors
    ///
    /// Returns the notice info request error; the banner is left untouched.
    pub async fn maybe_show_notification(
        &self,
        user_id: &UserId,
        user_token: &UserToken,
    ) -> Result<NoticeOutcome, Error> {
        if self.is_suppressed() {
            tracing::debug!(%user_id, "Notice suppressed by cookie");
            return Ok(NoticeOutcome::Suppressed);
        }

        let info = self
            .fetch_notice_info(user_id, user_token)
            .await
            .inspect_err(|e| tracing::warn!(error = %e, %user_id, "Notice info unavailable"))?;

        if !info.notice {
            return Ok(NoticeOutcome::NotRequested);
        }

        self.banner.show();
        tracing::debug!(%user_id, amount_lesson = info.amount_lesson, "Notice shown");
        Ok(NoticeOutcome::Shown)
    }

    /// Page load flow: obtain a token for `identity`, then [`maybe_show_notification`].
    ///
    /// [`maybe_show_notification`]: Self::maybe_show_notification
    ///
    /// # Errors
    ///
    /// Returns the token or notice info request error.
    pub async fn on_page_load(
        &self,
        identity: &Identity,
        user_id: &UserId,
    ) -> Result<NoticeOutcome, Error> {
        if self.is_suppressed() {
            return Ok(NoticeOutcome::Suppressed);
        }
        let user_token = self
            .fetch_user_token(identity)
            .await
            .inspect_err(|e| tracing::warn!(error = %e, %user_id, "User token unavailable"))?;
        self.maybe_show_notification(user_id, &user_token).await
    }

    /// Close the banner and suppress it until local midnight.
    ///
    /// The cookie is written before the close delay starts.
    pub async fn dismiss_notification(&self) {
        self.cookies.set(cookies::suppression_cookie(cookies::local_now()));
        self.banner.close().await;
    }

    /// Store the user's notice preference (`notice = false` means "do not disturb"),
    /// then dismiss the banner.
    ///
    /// # Errors
    ///
    /// Returns the update request error; the banner stays as it is.
    pub async fn set_do_not_disturb(
        &self,
        user_id: &UserId,
        user_token: &UserToken,
        notice: bool,
    ) -> Result<JsonValue, Error> {
        let updated = self
            .client
            .change_notice_status(user_id, user_token, notice)
            .await
            .inspect_err(|e| tracing::warn!(error = %e, %user_id, "Notice preference not saved"))?;
        tracing::info!(%user_id, notice, "Notice preference saved");
        self.dismiss_notification().await;
        Ok(updated)
    }
}
