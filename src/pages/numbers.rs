use super::{messages, Dialogs};
use crate::api::{ApiClient, NumberForm, PhoneNumber};
use crate::catalog::OperatorKey;
use crate::shell::UnsavedChanges;
use crate::usage::view::sort_items;
use crate::usage::UsageSort;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

pub struct NumbersPage {
    api: Arc<ApiClient>,
    items: Vec<PhoneNumber>,
    sort: UsageSort,
    operators: HashSet<OperatorKey>,
    default_operator: OperatorKey,
}

impl UnsavedChanges for NumbersPage {}

impl NumbersPage {
    pub fn new(api: Arc<ApiClient>, default_operator: OperatorKey) -> Self {
        Self {
            api,
            items: Vec::new(),
            sort: UsageSort::New,
            operators: OperatorKey::ALL.into_iter().collect(),
            default_operator,
        }
    }

    // List loads fail silently and keep the previous items
    pub async fn load(&mut self) {
        match self.api.list_numbers().await {
            Ok(items) => self.items = items,
            Err(e) => error!(err = %e, "Failed to load numbers"),
        }
    }

    pub fn visible(&self) -> Vec<&PhoneNumber> {
        let mut visible: Vec<&PhoneNumber> = self
            .items
            .iter()
            .filter(|n| self.operators.contains(&n.operator_key))
            .collect();
        sort_items(&mut visible, self.sort);
        visible
    }

    pub fn sort(&self) -> UsageSort {
        self.sort
    }

    /// Only the list keys apply here; others are ignored.
    pub fn set_sort(&mut self, sort: UsageSort) -> bool {
        if !UsageSort::LIST_KEYS.contains(&sort) {
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

    pub fn blank_form(&self) -> NumberForm {
        NumberForm::new("", self.default_operator)
    }

    /// Creates a number (`editing == None`) or updates one, then reloads.
    pub async fn save(&mut self, editing: Option<Uuid>, form: &NumberForm, dialogs: &dyn Dialogs) -> bool {
        let result = match editing {
            Some(id) => self.api.update_number(id, form).await,
            None => self.api.create_number(form).await,
        };
        match result {
            Ok(number) => {
                info!(id = %number.id, "Number saved");
                self.load().await;
                true
            }
            Err(e) => {
                dialogs.alert(&e.user_message(messages::SAVE_FAILED)).await;
                false
            }
        }
    }

    pub async fn delete(&mut self, id: Uuid, dialogs: &dyn Dialogs) -> bool {
        if !dialogs.confirm(messages::DELETE_NUMBER_TITLE, "Удалить номер?").await {
            return false;
        }
        match self.api.delete_number(id).await {
            Ok(()) => {
                self.load().await;
                true
            }
            Err(e) => {
                dialogs
                    .alert(&e.user_message(messages::DELETE_NUMBER_FAILED))
                    .await;
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::testing::ScriptedDialogs;
    use serde_json::json;

    fn numbers_body() -> String {
        json!([
            {"id": Uuid::new_v4(), "phone": "+7 900 000 00 01", "operatorKey": "mts",
             "createdAt": "2025-01-01T00:00:00", "usedCount": 1},
            {"id": Uuid::new_v4(), "phone": "+7 900 000 00 02", "operatorKey": "yota",
             "createdAt": "2025-01-03T00:00:00", "usedCount": 5},
            {"id": Uuid::new_v4(), "phone": "+7 900 000 00 03", "operatorKey": "mts",
             "createdAt": "2025-01-02T00:00:00", "usedCount": 3}
        ])
        .to_string()
    }

    #[tokio::test]
    async fn test_filter_and_sort_are_local() {
        let mut server = mockito::Server::new_async().await;
        let list = server
            .mock("GET", "/api/numbers")
            .with_status(200)
            .with_body(numbers_body())
            .expect(1)
            .create_async()
            .await;

        let api = Arc::new(ApiClient::new(&server.url()).unwrap());
        let mut page = NumbersPage::new(api, OperatorKey::Mts);
        page.load().await;

        let phones = |page: &NumbersPage| -> Vec<String> {
            page.visible().iter().map(|n| n.phone.clone()).collect()
        };
        assert_eq!(
            phones(&page),
            vec!["+7 900 000 00 02", "+7 900 000 00 03", "+7 900 000 00 01"]
        );

        assert!(page.set_sort(UsageSort::UsedLeast));
        assert_eq!(phones(&page)[0], "+7 900 000 00 01");
        assert!(!page.set_sort(UsageSort::RecentUsed));

        page.toggle_operator(OperatorKey::Mts);
        assert_eq!(phones(&page), vec!["+7 900 000 00 02"]);
        page.clear_operators();
        assert!(page.visible().is_empty());
        page.select_all_operators();
        assert_eq!(page.visible().len(), 3);

        list.assert_async().await;
    }

    #[tokio::test]
    async fn test_failed_load_keeps_previous_items() {
        let mut server = mockito::Server::new_async().await;
        let ok = server
            .mock("GET", "/api/numbers")
            .with_status(200)
            .with_body(numbers_body())
            .create_async()
            .await;

        let api = Arc::new(ApiClient::new(&server.url()).unwrap());
        let mut page = NumbersPage::new(api, OperatorKey::Mts);
        page.load().await;
        ok.remove_async().await;

        server
            .mock("GET", "/api/numbers")
            .with_status(500)
            .create_async()
            .await;
        page.load().await;
        assert_eq!(page.visible().len(), 3);
    }

    #[tokio::test]
    async fn test_save_error_alerts_fallback() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/numbers")
            .with_status(500)
            .create_async()
            .await;

        let api = Arc::new(ApiClient::new(&server.url()).unwrap());
        let mut page = NumbersPage::new(api, OperatorKey::Beeline);
        let dialogs = ScriptedDialogs::new(&[]);
        let mut form = page.blank_form();
        form.set_phone("9991234567");

        assert_eq!(form.operator_key, OperatorKey::Beeline);
        assert!(!page.save(None, &form, &dialogs).await);
        assert_eq!(dialogs.alerts(), vec![messages::SAVE_FAILED.to_string()]);
    }
}
