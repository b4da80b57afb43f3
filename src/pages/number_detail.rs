use super::{gated_usage_change, gated_usage_stage, messages, Dialogs};
use crate::api::{ApiClient, ApiError, NumberForm, PhoneNumber, Place};
use crate::shell::{Route, UnsavedChanges};
use crate::usage::{UsageBoard, UsageError, UsageFilter, UsageOwner, UsageSort};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

/// A Number with every Place and whether the number was used there.
pub struct NumberDetailPage {
    api: Arc<ApiClient>,
    id: Uuid,
    number: Option<PhoneNumber>,
    board: Option<UsageBoard<Place>>,
    filter: UsageFilter,
    sort: UsageSort,
}

#[async_trait]
impl UnsavedChanges for NumberDetailPage {
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

impl NumberDetailPage {
    pub fn new(api: Arc<ApiClient>, id: Uuid) -> Self {
        Self {
            api,
            id,
            number: None,
            board: None,
            filter: UsageFilter::All,
            sort: UsageSort::RecentUsed,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Fetches the number and its usage together. Every place starts visible.
    pub async fn load(&mut self) -> Result<(), ApiError> {
        let (number, usage) =
            tokio::try_join!(self.api.get_number(self.id), self.api.number_usage(self.id))?;
        let board = UsageBoard::new(UsageOwner::Number(self.id), usage);
        self.filter = board.select_all();
        self.number = Some(number);
        self.board = Some(board);
        Ok(())
    }

    pub fn number(&self) -> Option<&PhoneNumber> {
        self.number.as_ref()
    }

    pub fn board(&self) -> Option<&UsageBoard<Place>> {
        self.board.as_ref()
    }

    pub fn last_action_at(&self) -> Option<DateTime<Utc>> {
        let number = self.number.as_ref()?;
        self.board
            .as_ref()
            .and_then(|b| b.last_event_at())
            .or(number.updated_at)
            .or(number.last_action_at)
            .or(number.created_at)
    }

    pub fn visible(&self) -> Vec<&Place> {
        match &self.board {
            Some(board) => board.view(&self.filter, self.sort),
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

    /// Places for the filter dialog, alphabetically.
    pub fn filter_choices(&self) -> Vec<(&Place, bool)> {
        let Some(board) = &self.board else {
            return Vec::new();
        };
        let mut places: Vec<&Place> = board.items().iter().collect();
        places.sort_by(|a, b| a.name.cmp(&b.name));
        places
            .into_iter()
            .map(|p| (p, self.filter.accepts(p)))
            .collect()
    }

    pub fn set_place_visible(&mut self, place_id: Uuid, visible: bool) {
        let mut ids: HashSet<Uuid> = match &self.filter {
            UsageFilter::Counterparts(ids) => ids.clone(),
            _ => self
                .board
                .as_ref()
                .map(|b| b.items().iter().map(|p| p.id).collect())
                .unwrap_or_default(),
        };
        if visible {
            ids.insert(place_id);
        } else {
            ids.remove(&place_id);
        }
        self.filter = UsageFilter::Counterparts(ids);
    }

    pub fn show_all_places(&mut self) {
        if let Some(board) = &self.board {
            self.filter = board.select_all();
        }
    }

    pub fn hide_all_places(&mut self) {
        self.filter = UsageFilter::Counterparts(HashSet::new());
    }

    /// Checkbox change for a place: confirmed, then written immediately.
    pub async fn set_usage(&mut self, place_id: Uuid, used: bool, dialogs: &dyn Dialogs) -> bool {
        let Some(board) = self.board.as_mut() else {
            return false;
        };
        gated_usage_change(board, self.api.as_ref(), place_id, used, dialogs).await
    }

    /// Confirmed flip that is only staged. It is flushed or dropped when the page
    /// is left.
    pub async fn stage_usage(&mut self, place_id: Uuid, used: bool, dialogs: &dyn Dialogs) -> bool {
        let Some(board) = self.board.as_mut() else {
            return false;
        };
        gated_usage_stage(board, place_id, used, dialogs).await
    }

    pub fn edit_form(&self) -> Option<NumberForm> {
        self.number.as_ref().map(NumberForm::from)
    }

    pub async fn save_edit(&mut self, form: &NumberForm, dialogs: &dyn Dialogs) -> bool {
        if let Err(e) = self.api.update_number(self.id, form).await {
            dialogs
                .alert(&e.user_message(messages::UPDATE_NUMBER_FAILED))
                .await;
            return false;
        }
        if let Err(e) = self.load().await {
            error!(err = %e, id = %self.id, "Failed to reload number");
        }
        true
    }

    /// Deletes after confirmation; returns the list route to go to.
    pub async fn delete(&mut self, dialogs: &dyn Dialogs) -> Option<Route> {
        let phone = self.number.as_ref().map(|n| n.phone.clone()).unwrap_or_default();
        let message = format!(
            "Вы уверены, что хотите удалить номер \"{}\"? Это действие нельзя отменить.",
            phone
        );
        if !dialogs.confirm(messages::DELETE_NUMBER_TITLE, &message).await {
            return None;
        }
        match self.api.delete_number(self.id).await {
            Ok(()) => {
                info!(id = %self.id, "Number deleted");
                Some(Route::Numbers)
            }
            Err(e) => {
                dialogs
                    .alert(&e.user_message(messages::DELETE_NUMBER_FAILED))
                    .await;
                None
            }
        }
    }
}
