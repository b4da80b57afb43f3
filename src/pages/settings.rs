use super::{messages, Dialogs};
use crate::api::{ApiClient, Operator, OperatorForm};
use crate::catalog::OperatorKey;
use crate::shell::UnsavedChanges;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

/// One row of the operator list. Catalog rows have no server id and cannot be edited.
#[derive(Debug, Clone, PartialEq)]
pub struct OperatorEntry {
    pub id: Option<Uuid>,
    pub name: String,
    pub logo: Option<String>,
}

pub struct SettingsPage {
    api: Arc<ApiClient>,
    operators: Vec<Operator>,
}

impl UnsavedChanges for SettingsPage {}

impl SettingsPage {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            operators: Vec::new(),
        }
    }

    pub async fn load(&mut self) {
        match self.api.list_operators().await {
            Ok(operators) => self.operators = operators,
            Err(e) => error!(err = %e, "Failed to load operators"),
        }
    }

    /// Server operators, or the built-in catalog while the server has none.
    pub fn entries(&self) -> Vec<OperatorEntry> {
        if self.operators.is_empty() {
            return OperatorKey::ALL
                .into_iter()
                .map(|op| OperatorEntry {
                    id: None,
                    name: op.display_name().to_string(),
                    logo: Some(op.icon_path()),
                })
                .collect();
        }
        self.operators
            .iter()
            .map(|op| OperatorEntry {
                id: Some(op.id),
                name: op.name.clone(),
                logo: op.has_logo.then(|| self.api.operator_logo_url(op.id)),
            })
            .collect()
    }

    pub fn form_for(&self, id: Uuid) -> Option<OperatorForm> {
        self.operators
            .iter()
            .find(|op| op.id == id)
            .map(|op| OperatorForm {
                name: op.name.clone(),
                logo: None,
            })
    }

    pub async fn save(&mut self, editing: Option<Uuid>, form: &OperatorForm, dialogs: &dyn Dialogs) -> bool {
        let result = match editing {
            Some(id) => self.api.update_operator(id, form).await,
            None => self.api.create_operator(form).await,
        };
        match result {
            Ok(op) => {
                info!(id = %op.id, name = %op.name, "Operator saved");
                self.load().await;
                true
            }
            Err(e) => {
                dialogs
                    .alert(&e.user_message(messages::SAVE_OPERATOR_FAILED))
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

    #[tokio::test]
    async fn test_falls_back_to_catalog() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/operators")
            .with_status(503)
            .create_async()
            .await;

        let api = Arc::new(ApiClient::new(&server.url()).unwrap());
        let mut page = SettingsPage::new(api);
        page.load().await;

        let entries = page.entries();
        assert_eq!(entries.len(), OperatorKey::ALL.len());
        assert!(entries.iter().all(|e| e.id.is_none()));
        assert_eq!(entries[0].name, "МегаФон");
    }

    #[tokio::test]
    async fn test_create_then_reload() {
        let mut server = mockito::Server::new_async().await;
        let id = Uuid::new_v4();
        server
            .mock("POST", "/api/operators")
            .with_status(200)
            .with_body(json!({"id": id, "name": "Тинькофф", "hasLogo": false}).to_string())
            .expect(1)
            .create_async()
            .await;
        server
            .mock("GET", "/api/operators")
            .with_status(200)
            .with_body(json!([{"id": id, "name": "Тинькофф", "hasLogo": true}]).to_string())
            .create_async()
            .await;

        let api = Arc::new(ApiClient::new(&server.url()).unwrap());
        let mut page = SettingsPage::new(api);
        let dialogs = ScriptedDialogs::new(&[]);
        let form = OperatorForm {
            name: "Тинькофф".to_string(),
            logo: None,
        };

        assert!(page.save(None, &form, &dialogs).await);
        let entries = page.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, Some(id));
        assert!(entries[0].logo.as_deref().unwrap().ends_with(&format!("/api/operators/{}/logo", id)));
        assert_eq!(page.form_for(id).unwrap().name, "Тинькофф");
    }

    #[tokio::test]
    async fn test_blank_name_alerts() {
        let server = mockito::Server::new_async().await;
        let api = Arc::new(ApiClient::new(&server.url()).unwrap());
        let mut page = SettingsPage::new(api);
        let dialogs = ScriptedDialogs::new(&[]);

        assert!(!page.save(None, &OperatorForm::default(), &dialogs).await);
        assert_eq!(dialogs.alerts(), vec!["Укажите название оператора".to_string()]);
    }
}
