//! Transactional notifications.
//!
//! Delivery is owned by a [`Notifier`] implementation. Callers never wait on
//! it: [`dispatch_detached`] runs the send on the tokio runtime and a failed
//! delivery is logged, never returned to whatever triggered it.

use std::{future::Future, sync::Arc};

use thiserror::Error;
use tokio::task::JoinHandle;

pub const PRODUCT_NAME: &str = "Habitly";

/// A templated email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
  /// Sent once, right after an account is created.
  Welcome {
    email:         String,
    user_name:     String,
    dashboard_url: String,
  },
}

impl Notification {
  pub fn recipient(&self) -> &str {
    match self {
      Self::Welcome { email, .. } => email,
    }
  }

  pub fn subject(&self) -> String {
    match self {
      Self::Welcome { .. } => format!("Welcome to {PRODUCT_NAME}!"),
    }
  }

  /// Plain-text body.
  pub fn text_body(&self) -> String {
    match self {
      Self::Welcome { user_name, dashboard_url, .. } => format!(
        "Welcome to {PRODUCT_NAME}!\n\
         \n\
         Hi {user_name},\n\
         \n\
         You've taken the first step towards building better habits.\n\
         \n\
         Get started:\n\
         - Create your first habit\n\
         - Track your progress\n\
         - Build consistency over time\n\
         \n\
         Go to your dashboard:\n\
         {dashboard_url}\n\
         \n\
         Happy habit building!\n\
         The {PRODUCT_NAME} Team"
      ),
    }
  }
}

#[derive(Debug, Error)]
pub enum NotifyError {
  #[error("delivery to {recipient} failed: {reason}")]
  Delivery { recipient: String, reason: String },
}

/// Something that can deliver a [`Notification`].
pub trait Notifier: Send + Sync + 'static {
  fn send(
    &self,
    notification: Notification,
  ) -> impl Future<Output = Result<(), NotifyError>> + Send + '_;
}

/// Development sender: writes the rendered email to the log instead of
/// delivering it.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
  async fn send(&self, notification: Notification) -> Result<(), NotifyError> {
    tracing::info!(
      to = notification.recipient(),
      subject = %notification.subject(),
      body = %notification.text_body(),
      "email (log only)"
    );
    Ok(())
  }
}

/// Send `notification` in the background.
///
/// The returned handle resolves once the attempt is over; it never carries the
/// delivery error, which is logged here instead.
pub fn dispatch_detached<N: Notifier>(
  notifier: Arc<N>,
  notification: Notification,
) -> JoinHandle<()> {
  tokio::spawn(async move {
    let recipient = notification.recipient().to_owned();
    match notifier.send(notification).await {
      Ok(()) => tracing::debug!(%recipient, "notification sent"),
      Err(e) => tracing::warn!(%recipient, error = %e, "failed to send notification"),
    }
  })
}
