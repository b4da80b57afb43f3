//! Number ↔ Place usage reconciliation.
//!
//! A [`UsageBoard`] is owned by a detail page. The owner is either a Number (the
//! board lists Places) or a Place (the board lists Numbers). Every checkbox flip
//! goes through [`UsageBoard::request_toggle`] and must be confirmed before it
//! touches local state. A confirmed flip is written immediately; a failed write
//! restores the last confirmed value.
//!
//! The board still tracks Clean/Dirty against the last loaded server view, so the
//! shell can ask before leaving a page with a write in flight or with changes
//! staged by [`UsageBoard::stage`].

use crate::api::{Ack, ApiClient, ApiError, PhoneNumber, Place, UsageResponse};
use crate::catalog::OperatorKey;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

pub mod view;

pub use view::{UsageFilter, UsageSort};

#[derive(Debug, Error)]
pub enum UsageError {
    #[error("Unknown counterpart: {0}")]
    UnknownCounterpart(Uuid),
    #[error("No toggle is awaiting confirmation")]
    NothingPending,
    #[error("Failed to save usage: {0}")]
    Write(#[from] ApiError),
    #[error("Failed to save {failed} usage change(s): {first}")]
    Flush { failed: usize, first: ApiError },
}

impl UsageError {
    pub fn user_message(&self) -> String {
        const FALLBACK: &str = "Не удалось сохранить изменения. Повторите позже";
        match self {
            UsageError::Write(e) | UsageError::Flush { first: e, .. } => e.user_message(FALLBACK),
            _ => FALLBACK.to_string(),
        }
    }
}

/// The write side of a usage link.
#[async_trait]
pub trait UsageWriter: Send + Sync {
    async fn set_usage(&self, number_id: Uuid, place_id: Uuid, used: bool) -> Result<Ack, ApiError>;
}

#[async_trait]
impl UsageWriter for ApiClient {
    async fn set_usage(&self, number_id: Uuid, place_id: Uuid, used: bool) -> Result<Ack, ApiError> {
        ApiClient::set_usage(self, number_id, place_id, used).await
    }
}

/// Entity listed on the other side of a usage board.
pub trait Counterpart {
    fn id(&self) -> Uuid;
    fn created_at(&self) -> Option<DateTime<Utc>>;
    fn used_at(&self) -> Option<DateTime<Utc>>;
    fn set_used_at(&mut self, at: Option<DateTime<Utc>>);
    fn used_count(&self) -> u32;
    fn operator(&self) -> Option<OperatorKey> {
        None
    }
}

impl Counterpart for Place {
    fn id(&self) -> Uuid {
        self.id
    }
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }
    fn used_at(&self) -> Option<DateTime<Utc>> {
        self.used_at
    }
    fn set_used_at(&mut self, at: Option<DateTime<Utc>>) {
        self.used_at = at;
    }
    fn used_count(&self) -> u32 {
        self.used_count
    }
}

impl Counterpart for PhoneNumber {
    fn id(&self) -> Uuid {
        self.id
    }
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }
    fn used_at(&self) -> Option<DateTime<Utc>> {
        self.used_at
    }
    fn set_used_at(&mut self, at: Option<DateTime<Utc>>) {
        self.used_at = at;
    }
    fn used_count(&self) -> u32 {
        self.used_count
    }
    fn operator(&self) -> Option<OperatorKey> {
        Some(self.operator_key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageOwner {
    Number(Uuid),
    Place(Uuid),
}

impl UsageOwner {
    // (number_id, place_id) for a counterpart of this owner
    pub fn pair(&self, counterpart: Uuid) -> (Uuid, Uuid) {
        match *self {
            UsageOwner::Number(number_id) => (number_id, counterpart),
            UsageOwner::Place(place_id) => (counterpart, place_id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardState {
    Clean,
    Dirty,
}

/// A flip the user asked for, shown in the "are you sure?" dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingToggle {
    pub counterpart: Uuid,
    pub next: bool,
}

pub struct UsageBoard<T> {
    owner: UsageOwner,
    items: Vec<T>,
    confirmed: HashMap<Uuid, bool>,
    local: HashMap<Uuid, bool>,
    pending: Option<PendingToggle>,
    last_event_at: Option<DateTime<Utc>>,
}

impl<T: Counterpart> UsageBoard<T> {
    pub fn new(owner: UsageOwner, response: UsageResponse<T>) -> Self {
        let mut confirmed = HashMap::new();
        for item in &response.used {
            confirmed.insert(item.id(), true);
        }
        for item in &response.unused {
            confirmed.entry(item.id()).or_insert(false);
        }

        let mut items = response.used;
        // An unused counterpart has no usage time, whatever the server sent
        items.extend(response.unused.into_iter().map(|mut item| {
            item.set_used_at(None);
            item
        }));
        // Server lists a counterpart once; guard against overlap anyway
        let mut seen = std::collections::HashSet::new();
        items.retain(|item| seen.insert(item.id()));

        Self {
            owner,
            items,
            local: confirmed.clone(),
            confirmed,
            pending: None,
            last_event_at: response.last_event_at,
        }
    }

    pub fn owner(&self) -> UsageOwner {
        self.owner
    }

    /// Combined used ∪ unused list in server order.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn get(&self, counterpart: Uuid) -> Option<&T> {
        self.items.iter().find(|item| item.id() == counterpart)
    }

    pub fn last_event_at(&self) -> Option<DateTime<Utc>> {
        self.last_event_at
    }

    pub fn has_any_usage(&self) -> bool {
        self.confirmed.values().any(|used| *used)
    }

    pub fn is_used(&self, counterpart: Uuid) -> bool {
        self.local.get(&counterpart).copied().unwrap_or(false)
    }

    pub fn used_count(&self) -> usize {
        self.local.values().filter(|used| **used).count()
    }

    pub fn state(&self) -> BoardState {
        if self.changed_pairs().is_empty() {
            BoardState::Clean
        } else {
            BoardState::Dirty
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.state() == BoardState::Dirty
    }

    pub fn pending(&self) -> Option<PendingToggle> {
        self.pending
    }

    /// Opens the confirmation gate for a flip. Local state is untouched until
    /// [`confirm_toggle`](Self::confirm_toggle).
    pub fn request_toggle(&mut self, counterpart: Uuid, next: bool) -> Result<PendingToggle, UsageError> {
        if !self.local.contains_key(&counterpart) {
            return Err(UsageError::UnknownCounterpart(counterpart));
        }
        let pending = PendingToggle { counterpart, next };
        self.pending = Some(pending);
        Ok(pending)
    }

    pub fn cancel_toggle(&mut self) {
        self.pending = None;
    }

    /// Applies the pending flip and writes it through. On failure the checkbox
    /// returns to its last confirmed value.
    pub async fn confirm_toggle<W>(&mut self, writer: &W) -> Result<(), UsageError>
    where
        W: UsageWriter + ?Sized,
    {
        let pending = self.pending.take().ok_or(UsageError::NothingPending)?;
        let PendingToggle { counterpart, next } = pending;
        self.local.insert(counterpart, next);

        let (number_id, place_id) = self.owner.pair(counterpart);
        match writer.set_usage(number_id, place_id, next).await {
            Ok(_) => {
                self.commit(counterpart, next);
                info!(%number_id, %place_id, used = next, "Usage saved");
                Ok(())
            }
            Err(e) => {
                self.rollback(counterpart);
                error!(%number_id, %place_id, err = %e, "Usage write failed, rolled back");
                Err(UsageError::Write(e))
            }
        }
    }

    /// Buffers a flip without writing it. The board becomes Dirty until
    /// [`save_changes`](Self::save_changes) or [`discard_changes`](Self::discard_changes).
    pub fn stage(&mut self, counterpart: Uuid, used: bool) -> Result<(), UsageError> {
        if !self.local.contains_key(&counterpart) {
            return Err(UsageError::UnknownCounterpart(counterpart));
        }
        self.local.insert(counterpart, used);
        Ok(())
    }

    /// Writes every pair that differs from the last loaded view, one call at a
    /// time. Failed pairs are rolled back; the rest are committed.
    pub async fn save_changes<W>(&mut self, writer: &W) -> Result<(), UsageError>
    where
        W: UsageWriter + ?Sized,
    {
        let changed = self.changed_pairs();
        let mut failed = 0;
        let mut first = None;

        for (counterpart, used) in changed {
            let (number_id, place_id) = self.owner.pair(counterpart);
            match writer.set_usage(number_id, place_id, used).await {
                Ok(_) => self.commit(counterpart, used),
                Err(e) => {
                    warn!(%number_id, %place_id, err = %e, "Usage flush failed for pair");
                    self.rollback(counterpart);
                    failed += 1;
                    first.get_or_insert(e);
                }
            }
        }

        match first {
            None => Ok(()),
            Some(first) => Err(UsageError::Flush { failed, first }),
        }
    }

    pub fn discard_changes(&mut self) {
        self.pending = None;
        self.local = self.confirmed.clone();
    }

    // Pairs whose local value differs from the confirmed one, in list order
    fn changed_pairs(&self) -> Vec<(Uuid, bool)> {
        self.items
            .iter()
            .map(|item| item.id())
            .filter_map(|id| {
                let local = self.local.get(&id).copied().unwrap_or(false);
                let confirmed = self.confirmed.get(&id).copied().unwrap_or(false);
                (local != confirmed).then_some((id, local))
            })
            .collect()
    }

    fn commit(&mut self, counterpart: Uuid, used: bool) {
        let was_used = self.confirmed.insert(counterpart, used).unwrap_or(false);
        self.local.insert(counterpart, used);
        if used != was_used {
            let now = Utc::now();
            self.last_event_at = Some(now);
            if let Some(item) = self.items.iter_mut().find(|item| item.id() == counterpart) {
                item.set_used_at(used.then_some(now));
            }
        }
    }

    fn rollback(&mut self, counterpart: Uuid) {
        let confirmed = self.confirmed.get(&counterpart).copied().unwrap_or(false);
        self.local.insert(counterpart, confirmed);
    }
}
