use super::{gated_usage_change, gated_usage_stage, messages, Dialogs};
use crate::api::{ApiClient, ApiError, PhoneNumber, Place, PlaceForm, Promo};
use crate::catalog::OperatorKey;
use crate::shell::{Route, UnsavedChanges};
use crate::usage::{UsageBoard, UsageError, UsageFilter, UsageOwner, UsageSort};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

/// A Place with every Number and whether it was used there.
pub struct PlaceDetailPage {
    api: Arc<ApiClient>,
    id: Uuid,
    place: Option<Place>,
    board: Option<UsageBoard<PhoneNumber>>,
    operators: HashSet<OperatorKey>,
    sort: UsageSort,
}

#[async_trait]
impl UnsavedChanges for PlaceDetailPage {
    fn has_unsaved_changes(&self) -> bool {
        self.board.as_ref().map(|b| b.is_dirty()).unwrap_or(false)
    }

    async fn save_changes(&mut self) -> Result<(), UsageError> {
        match self.board.as_mut() {
            Some(board) => board.save_changes(self.api.as_ref()).await,
            None => Ok(()),
        }
    }

    fn discard_changes(&mut self) {
        if let Some(board) = self.board.as_mut() {
            board.discard_changes();
        }
    }
}

impl PlaceDetailPage {
    pub fn new(api: Arc<ApiClient>, id: Uuid) -> Self {
        Self {
            api,
            id,
            place: None,
            board: None,
            operators: OperatorKey::ALL.into_iter().collect(),
            sort: UsageSort::RecentUsed,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub async fn load(&mut self) -> Result<(), ApiError> {
        let (place, usage) =
            tokio::try_join!(self.api.get_place(self.id), self.api.place_usage(self.id))?;
        self.board = Some(UsageBoard::new(UsageOwner::Place(self.id), usage));
        self.place = Some(place);
        Ok(())
    }

    pub fn place(&self) -> Option<&Place> {
        self.place.as_ref()
    }

    pub fn board(&self) -> Option<&UsageBoard<PhoneNumber>> {
        self.board.as_ref()
    }

    pub fn last_action_at(&self) -> Option<DateTime<Utc>> {
        let place = self.place.as_ref()?;
        self.board
            .as_ref()
            .and_then(|b| b.last_event_at())
            .or(place.last_action_at)
            .or(place.updated_at)
            .or(place.created_at)
    }

    pub fn promo(&self) -> Option<Promo<'_>> {
        self.place.as_ref().and_then(|p| p.promo())
    }

    pub fn visible(&self) -> Vec<&PhoneNumber> {
        match &self.board {
            Some(board) => board.view(&UsageFilter::Operators(self.operators.clone()), self.sort),
            None => Vec::new(),
        }
    }

    pub fn sort(&self) -> UsageSort {
        self.sort
    }

    pub fn set_sort(&mut self, sort: UsageSort) -> bool {
        if !UsageSort::DETAIL_KEYS.contains(&sort) {
            return false;
        }
        self.sort = sort;
        true
    }

    pub fn operator_enabled(&self, op: OperatorKey) -> bool {
        self.operators.contains(&op)
    }

    pub fn toggle_operator(&mut self, op: OperatorKey) {
        if !self.operators.remove(&op) {
            self.operators.insert(op);
        }
    }

    pub fn select_all_operators(&mut self) {
        self.operators = OperatorKey::ALL.into_iter().collect();
    }

    pub fn clear_operators(&mut self) {
        self.operators.clear();
    }

    pub async fn set_usage(&mut self, number_id: Uuid, used: bool, dialogs: &dyn Dialogs) -> bool {
        let Some(board) = self.board.as_mut() else {
            return false;
        };
        gated_usage_change(board, self.api.as_ref(), number_id, used, dialogs).await
    }

    pub async fn logo(&self) -> Option<Vec<u8>> {
        let place = self.place.as_ref()?;
        if !place.has_logo {
            return None;
        }
        match self.api.place_logo(self.id).await {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                error!(err = %e, id = %self.id, "Failed to fetch place logo");
                None
            }
        }
    }

    /// Confirmed flip that is only staged. It is flushed or dropped when the page
    /// is left.
    pub async fn stage_usage(&mut self, number_id: Uuid, used: bool, dialogs: &dyn Dialogs) -> bool {
        let Some(board) = self.board.as_mut() else {
            return false;
        };
        gated_usage_stage(board, number_id, used, dialogs).await
    }

    pub fn edit_form(&self) -> Option<PlaceForm> {
        self.place.as_ref().map(PlaceForm::from)
    }

    pub async fn save_edit(&mut self, form: &PlaceForm, dialogs: &dyn Dialogs) -> bool {
        if let Err(e) = self.api.update_place(self.id, form).await {
            dialogs
                .alert(&e.user_message(messages::UPDATE_PLACE_FAILED))
                .await;
            return false;
        }
        if let Err(e) = self.load().await {
            error!(err = %e, id = %self.id, "Failed to reload place");
        }
        true
    }

    pub async fn delete(&mut self, dialogs: &dyn Dialogs) -> Option<Route> {
        let name = self.place.as_ref().map(|p| p.name.clone()).unwrap_or_default();
        let message = format!(
            "Вы уверены, что хотите удалить место \"{}\"? Это действие нельзя отменить.",
            name
        );
        if !dialogs.confirm(messages::DELETE_PLACE_TITLE, &message).await {
            return None;
        }
        match self.api.delete_place(self.id).await {
            Ok(()) => {
                info!(id = %self.id, "Place deleted");
                Some(Route::Places)
            }
            Err(e) => {
                dialogs
                    .alert(&e.user_message(messages::DELETE_PLACE_FAILED))
                    .await;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::testing::ScriptedDialogs;
    use crate::shell::UnsavedChanges;
    use mockito::{Matcher, ServerGuard};
    use serde_json::json;

    const PLACE_ID: &str = "7f1c2f1e-8a51-4b0e-9b7b-2d0c7c1f0a11";
    const MTS_ID: &str = "2b1f7d0e-9c5e-4c7a-9d0e-0f1a2b3c4d5e";
    const YOTA_ID: &str = "0c3e64c4-70a5-4f47-8d8e-5f27f2a0b6a2";

    async fn mock_place(server: &mut ServerGuard) {
        server
            .mock("GET", format!("/api/places/{}", PLACE_ID).as_str())
            .with_status(200)
            .with_body(
                json!({"id": PLACE_ID, "name": "Пятёрочка", "category": "Магазины",
                       "promoCode": "SAVE10", "promoUrl": "", "hasLogo": false,
                       "createdAt": "2025-01-01T00:00:00",
                       "lastActionAt": "2025-02-01T10:00:00"})
                .to_string(),
            )
            .create_async()
            .await;
        server
            .mock("GET", format!("/api/places/{}/usage", PLACE_ID).as_str())
            .with_status(200)
            .with_body(
                json!({
                    "used": [{"id": MTS_ID, "phone": "+7 900 000 00 01", "operatorKey": "mts",
                              "usedAt": "2025-02-01T10:00:00"}],
                    "unused": [{"id": YOTA_ID, "phone": "+7 900 000 00 02", "operatorKey": "yota"}]
                })
                .to_string(),
            )
            .create_async()
            .await;
    }

    fn id(s: &str) -> Uuid {
        Uuid::parse_str(s).unwrap()
    }

    #[tokio::test]
    async fn test_untoggle_posts_used_false() {
        let mut server = mockito::Server::new_async().await;
        mock_place(&mut server).await;
        let post = server
            .mock("POST", "/api/usage")
            .match_body(Matcher::Json(
                json!({"numberId": MTS_ID, "placeId": PLACE_ID, "used": false}),
            ))
            .with_status(200)
            .with_body(r#"{"ok": true}"#)
            .expect(1)
            .create_async()
            .await;

        let api = Arc::new(ApiClient::new(&server.url()).unwrap());
        let mut page = PlaceDetailPage::new(api, id(PLACE_ID));
        page.load().await.unwrap();

        let dialogs = ScriptedDialogs::new(&[true]);
        assert!(page.set_usage(id(MTS_ID), false, &dialogs).await);
        assert!(!page.board().unwrap().is_used(id(MTS_ID)));
        assert!(!page.board().unwrap().has_any_usage());
        post.assert_async().await;
    }

    #[tokio::test]
    async fn test_operator_filter_and_promo() {
        let mut server = mockito::Server::new_async().await;
        mock_place(&mut server).await;

        let api = Arc::new(ApiClient::new(&server.url()).unwrap());
        let mut page = PlaceDetailPage::new(api, id(PLACE_ID));
        page.load().await.unwrap();

        assert_eq!(page.visible().len(), 2);
        page.toggle_operator(OperatorKey::Mts);
        let phones: Vec<&str> = page.visible().iter().map(|n| n.phone.as_str()).collect();
        assert_eq!(phones, vec!["+7 900 000 00 02"]);
        assert!(!page.operator_enabled(OperatorKey::Mts));
        page.select_all_operators();
        assert_eq!(page.visible()[0].phone, "+7 900 000 00 01");

        let promo = page.promo().unwrap();
        assert_eq!(promo.code, Some("SAVE10"));
        assert_eq!(promo.url, None);
        assert_eq!(page.last_action_at(), page.place().unwrap().last_action_at);
        assert!(page.logo().await.is_none());
    }

    #[tokio::test]
    async fn test_staged_changes_save_on_leave() {
        let mut server = mockito::Server::new_async().await;
        mock_place(&mut server).await;
        let post = server
            .mock("POST", "/api/usage")
            .match_body(Matcher::Json(
                json!({"numberId": YOTA_ID, "placeId": PLACE_ID, "used": true}),
            ))
            .with_status(200)
            .with_body(r#"{"ok": true}"#)
            .expect(1)
            .create_async()
            .await;

        let api = Arc::new(ApiClient::new(&server.url()).unwrap());
        let mut page = PlaceDetailPage::new(api, id(PLACE_ID));
        page.load().await.unwrap();

        // Declined marks stage nothing
        assert!(!page.stage_usage(id(YOTA_ID), true, &ScriptedDialogs::new(&[false])).await);
        assert!(!page.has_unsaved_changes());
        assert!(page.stage_usage(id(YOTA_ID), true, &ScriptedDialogs::new(&[true])).await);
        assert!(page.has_unsaved_changes());
        page.save_changes().await.unwrap();
        assert!(!page.has_unsaved_changes());
        post.assert_async().await;
    }

    #[tokio::test]
    async fn test_delete_returns_to_places() {
        let mut server = mockito::Server::new_async().await;
        mock_place(&mut server).await;
        server
            .mock("DELETE", format!("/api/places/{}", PLACE_ID).as_str())
            .with_status(200)
            .with_body(r#"{"ok": true}"#)
            .create_async()
            .await;

        let api = Arc::new(ApiClient::new(&server.url()).unwrap());
        let mut page = PlaceDetailPage::new(api, id(PLACE_ID));
        page.load().await.unwrap();

        let dialogs = ScriptedDialogs::new(&[true]);
        assert_eq!(page.delete(&dialogs).await, Some(Route::Places));
    }
}
