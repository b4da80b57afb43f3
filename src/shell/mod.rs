//! Route outlet and navigation guard.
//!
//! The [`Shell`] owns the single mounted page. Before any route change it asks
//! that page, through [`UnsavedChanges`], whether leaving would lose work. The
//! page is dropped on unmount along with whatever it was guarding.

use crate::api::ApiClient;
use crate::configuration::Config;
use crate::pages::{
    Dialogs, NumberDetailPage, NumbersPage, PlaceDetailPage, PlacesPage, SearchPage, SettingsPage,
    UnsavedChoice,
};
use crate::usage::UsageError;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info, warn};

pub mod route;

pub use route::{NavSection, Route};

/// Implemented by every page. Only the detail pages ever report changes.
#[async_trait]
pub trait UnsavedChanges: Send {
    fn has_unsaved_changes(&self) -> bool {
        false
    }

    async fn save_changes(&mut self) -> Result<(), UsageError> {
        Ok(())
    }

    fn discard_changes(&mut self) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveDecision {
    Proceed,
    Stay,
}

/// Asks Save/Discard/Cancel when `guard` has unsaved changes.
pub async fn leave_page(guard: &mut dyn UnsavedChanges, dialogs: &dyn Dialogs) -> LeaveDecision {
    if !guard.has_unsaved_changes() {
        return LeaveDecision::Proceed;
    }
    match dialogs.unsaved_choice().await {
        UnsavedChoice::Save => match guard.save_changes().await {
            Ok(()) => LeaveDecision::Proceed,
            Err(e) => {
                error!(err = %e, "Saving before navigation failed");
                dialogs.alert(&e.user_message()).await;
                LeaveDecision::Stay
            }
        },
        UnsavedChoice::Discard => {
            guard.discard_changes();
            LeaveDecision::Proceed
        }
        UnsavedChoice::Cancel => LeaveDecision::Stay,
    }
}

pub enum Page {
    Search(SearchPage),
    Numbers(NumbersPage),
    NumberDetail(NumberDetailPage),
    Places(PlacesPage),
    PlaceDetail(PlaceDetailPage),
    Settings(SettingsPage),
}

impl Page {
    fn guard(&mut self) -> &mut dyn UnsavedChanges {
        match self {
            Page::Search(p) => p,
            Page::Numbers(p) => p,
            Page::NumberDetail(p) => p,
            Page::Places(p) => p,
            Page::PlaceDetail(p) => p,
            Page::Settings(p) => p,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavOutcome {
    Moved(Route),
    Blocked,
}

pub struct Shell {
    api: Arc<ApiClient>,
    config: Config,
    route: Route,
    page: Page,
}

impl Shell {
    /// Starts on the search page.
    pub fn new(api: Arc<ApiClient>, config: Config) -> Self {
        let page = Page::Search(SearchPage::new(
            api.clone(),
            config.debounce(),
            config.defaults.clone(),
        ));
        Self {
            api,
            config,
            route: Route::Search,
            page,
        }
    }

    pub fn route(&self) -> Route {
        self.route
    }

    pub fn section(&self) -> NavSection {
        self.route.section()
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn page_mut(&mut self) -> &mut Page {
        &mut self.page
    }

    pub fn has_unsaved_changes(&mut self) -> bool {
        self.page.guard().has_unsaved_changes()
    }

    /// Leaves the current page (asking first if it is dirty) and mounts `to`.
    pub async fn navigate(&mut self, to: Route, dialogs: &dyn Dialogs) -> NavOutcome {
        if leave_page(self.page.guard(), dialogs).await == LeaveDecision::Stay {
            info!(from = %self.route, to = %to, "Navigation cancelled");
            return NavOutcome::Blocked;
        }
        self.page = self.mount(to).await;
        self.route = to;
        info!(route = %to, "Page mounted");
        NavOutcome::Moved(to)
    }

    /// Runs the leave guard without mounting anything, for shutdown.
    pub async fn close(&mut self, dialogs: &dyn Dialogs) -> LeaveDecision {
        leave_page(self.page.guard(), dialogs).await
    }

    /// Re-fetches the mounted page without a guard check.
    pub async fn reload(&mut self) {
        self.page = self.mount(self.route).await;
    }

    async fn mount(&self, route: Route) -> Page {
        let api = self.api.clone();
        let defaults = &self.config.defaults;
        match route {
            Route::Search => Page::Search(SearchPage::new(
                api,
                self.config.debounce(),
                defaults.clone(),
            )),
            Route::Numbers => {
                let mut page = NumbersPage::new(api, defaults.operator);
                page.load().await;
                Page::Numbers(page)
            }
            Route::NumberDetail(id) => {
                let mut page = NumberDetailPage::new(api, id);
                if let Err(e) = page.load().await {
                    warn!(err = %e, %id, "Number detail did not load");
                }
                Page::NumberDetail(page)
            }
            Route::Places => {
                let mut page = PlacesPage::new(api, defaults.category);
                page.load().await;
                Page::Places(page)
            }
            Route::PlaceDetail(id) => {
                let mut page = PlaceDetailPage::new(api, id);
                if let Err(e) = page.load().await {
                    warn!(err = %e, %id, "Place detail did not load");
                }
                Page::PlaceDetail(page)
            }
            Route::Settings => {
                let mut page = SettingsPage::new(api);
                page.load().await;
                Page::Settings(page)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::testing::ScriptedDialogs;
    use crate::usage::UsageError;

    #[derive(Default)]
    struct FakeGuard {
        dirty: bool,
        fail_save: bool,
        saved: bool,
        discarded: bool,
    }

    #[async_trait]
    impl UnsavedChanges for FakeGuard {
        fn has_unsaved_changes(&self) -> bool {
            self.dirty
        }

        async fn save_changes(&mut self) -> Result<(), UsageError> {
            if self.fail_save {
                return Err(UsageError::NothingPending);
            }
            self.saved = true;
            self.dirty = false;
            Ok(())
        }

        fn discard_changes(&mut self) {
            self.discarded = true;
            self.dirty = false;
        }
    }

    #[tokio::test]
    async fn test_clean_page_leaves_without_asking() {
        let mut guard = FakeGuard::default();
        let dialogs = ScriptedDialogs::new(&[]).with_choices(&[UnsavedChoice::Save]);
        assert_eq!(leave_page(&mut guard, &dialogs).await, LeaveDecision::Proceed);
        assert!(!guard.saved);
    }

    #[tokio::test]
    async fn test_dirty_page_choices() {
        let mut guard = FakeGuard { dirty: true, ..Default::default() };
        let dialogs = ScriptedDialogs::new(&[]).with_choices(&[
            UnsavedChoice::Cancel,
            UnsavedChoice::Discard,
        ]);

        assert_eq!(leave_page(&mut guard, &dialogs).await, LeaveDecision::Stay);
        assert!(guard.dirty);
        assert_eq!(leave_page(&mut guard, &dialogs).await, LeaveDecision::Proceed);
        assert!(guard.discarded);
        assert!(!guard.saved);
    }

    #[tokio::test]
    async fn test_save_before_leave() {
        let mut guard = FakeGuard { dirty: true, ..Default::default() };
        let dialogs = ScriptedDialogs::new(&[]).with_choices(&[UnsavedChoice::Save]);
        assert_eq!(leave_page(&mut guard, &dialogs).await, LeaveDecision::Proceed);
        assert!(guard.saved);
    }

    #[tokio::test]
    async fn test_failed_save_keeps_page() {
        let mut guard = FakeGuard {
            dirty: true,
            fail_save: true,
            ..Default::default()
        };
        let dialogs = ScriptedDialogs::new(&[]).with_choices(&[UnsavedChoice::Save]);
        assert_eq!(leave_page(&mut guard, &dialogs).await, LeaveDecision::Stay);
        assert_eq!(dialogs.alerts().len(), 1);
    }

    #[tokio::test]
    async fn test_navigate_mounts_route() {
        let mut server = mockito::Server::new_async().await;
        let list = server
            .mock("GET", "/api/numbers")
            .with_status(200)
            .with_body("[]")
            .expect(1)
            .create_async()
            .await;

        let config = Config::from_json(&format!(r#"{{"api": {{"base_url": "{}"}}}}"#, server.url())).unwrap();
        let api = Arc::new(ApiClient::new(&config.api.base_url).unwrap());
        let mut shell = Shell::new(api, config);
        let dialogs = ScriptedDialogs::new(&[]);

        assert_eq!(shell.route(), Route::Search);
        let outcome = shell.navigate(Route::parse("/numbers"), &dialogs).await;
        assert_eq!(outcome, NavOutcome::Moved(Route::Numbers));
        assert_eq!(shell.section(), NavSection::Numbers);
        assert!(matches!(shell.page(), Page::Numbers(_)));
        assert!(!shell.has_unsaved_changes());
        list.assert_async().await;
    }
}
