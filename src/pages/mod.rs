use crate::usage::{Counterpart, UsageBoard, UsageWriter};
use async_trait::async_trait;
use tracing::warn;
use uuid::Uuid;

pub mod number_detail;
pub mod numbers;
pub mod place_detail;
pub mod places;
pub mod search;
pub mod settings;

pub use number_detail::NumberDetailPage;
pub use numbers::NumbersPage;
pub use place_detail::PlaceDetailPage;
pub use places::PlacesPage;
pub use search::SearchPage;
pub use settings::SettingsPage;

/// Answer to the "save changes?" prompt shown when leaving a dirty page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsavedChoice {
    Save,
    Discard,
    Cancel,
}

/// Modal dialogs the pages need from the front-end.
#[async_trait]
pub trait Dialogs: Send + Sync {
    async fn confirm(&self, title: &str, message: &str) -> bool;
    async fn alert(&self, message: &str);
    async fn unsaved_choice(&self) -> UnsavedChoice;
}

/// Runs one checkbox flip through the confirmation dialog and the immediate write.
/// Returns whether the flip was applied.
pub(crate) async fn gated_usage_change<T, W>(
    board: &mut UsageBoard<T>,
    writer: &W,
    counterpart: Uuid,
    next: bool,
    dialogs: &dyn Dialogs,
) -> bool
where
    T: Counterpart + Send,
    W: UsageWriter + ?Sized,
{
    if let Err(e) = board.request_toggle(counterpart, next) {
        warn!(err = %e, "Ignoring toggle");
        return false;
    }
    if !dialogs
        .confirm(messages::USAGE_CONFIRM_TITLE, messages::USAGE_CONFIRM)
        .await
    {
        board.cancel_toggle();
        return false;
    }
    match board.confirm_toggle(writer).await {
        Ok(()) => true,
        Err(e) => {
            dialogs.alert(&e.user_message()).await;
            false
        }
    }
}

/// Same confirmation as [`gated_usage_change`], but the flip is only staged on the
/// board and written when the page saves its changes.
pub(crate) async fn gated_usage_stage<T>(
    board: &mut UsageBoard<T>,
    counterpart: Uuid,
    next: bool,
    dialogs: &dyn Dialogs,
) -> bool
where
    T: Counterpart + Send,
{
    if let Err(e) = board.request_toggle(counterpart, next) {
        warn!(err = %e, "Ignoring mark");
        return false;
    }
    let confirmed = dialogs
        .confirm(messages::USAGE_CONFIRM_TITLE, messages::USAGE_CONFIRM)
        .await;
    board.cancel_toggle();
    confirmed && board.stage(counterpart, next).is_ok()
}

// User-facing strings
pub mod messages {
    pub const USAGE_CONFIRM_TITLE: &str = "Подтверждение";
    pub const USAGE_CONFIRM: &str = "Вы уверены, что хотите изменить статус использования?";
    pub const UNSAVED_TITLE: &str = "Сохранить изменения?";
    pub const UNSAVED: &str =
        "У вас есть несохранённые изменения. Хотите сохранить перед переходом?";
    pub const ADD_NUMBER_FAILED: &str = "Не удалось добавить номер. Повторите позже";
    pub const ADD_PLACE_FAILED: &str = "Не удалось добавить место. Повторите позже";
    pub const UPDATE_NUMBER_FAILED: &str = "Не удалось обновить номер. Повторите позже";
    pub const UPDATE_PLACE_FAILED: &str = "Не удалось обновить место. Повторите позже";
    pub const DELETE_NUMBER_FAILED: &str = "Не удалось удалить номер. Повторите позже";
    pub const DELETE_PLACE_FAILED: &str = "Не удалось удалить место. Повторите позже";
    pub const SAVE_FAILED: &str = "Ошибка сохранения";
    pub const SAVE_OPERATOR_FAILED: &str = "Не удалось сохранить оператора";
    pub const DELETE_NUMBER_TITLE: &str = "Удалить номер";
    pub const DELETE_PLACE_TITLE: &str = "Удалить место";
    pub const ADD_NUMBER_TITLE: &str = "Добавить номер?";
    pub const ADD_PLACE_TITLE: &str = "Добавить место?";
}
