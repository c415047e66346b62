//! Page controllers: Conditions, Upload and Talents.
//!
//! A page is built when the user navigates to it, fetches on `activate`,
//! mutates its own state in response to user actions and is dropped on
//! navigation away. Remote failures never escape a page: they are logged,
//! toasted and the previous data stays on screen.

pub mod conditions;
pub mod talents;
pub mod upload;

use crate::api::{ApiError, ScreeningApi};
use crate::notify::{Level, Notifier};

pub use conditions::ConditionsPage;
pub use talents::TalentsPage;
pub use upload::UploadPage;

pub struct PageContext<'a> {
    pub api: &'a dyn ScreeningApi,
    pub notifier: &'a mut dyn Notifier,
}

impl<'a> PageContext<'a> {
    pub fn new(api: &'a dyn ScreeningApi, notifier: &'a mut dyn Notifier) -> Self {
        Self { api, notifier }
    }

    /// Toast a failed remote call: the server's own message when it sent
    /// one, otherwise `fallback`.
    pub fn report(&mut self, fallback: &str, err: &ApiError) {
        tracing::warn!(error = %err, "{}", fallback);
        let message = err.user_message().unwrap_or(fallback);
        self.notifier.toast(Level::Error, message);
    }
}

pub trait Page {
    fn title(&self) -> &'static str;
    fn activate(&mut self, ctx: &mut PageContext<'_>);
    fn deactivate(&mut self) {}
}

/// Outcome of a list load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    Cached,
    Failed,
}
