use super::super::types::{NumberForm, PhoneNumber, Place, UsageResponse};
use super::ApiClient;
use super::ApiError;
use uuid::Uuid;

impl ApiClient {
    pub async fn list_numbers(&self) -> Result<Vec<PhoneNumber>, ApiError> {
        self.send_json(self.client.get(self.url("/numbers"))).await
    }

    pub async fn get_number(&self, id: Uuid) -> Result<PhoneNumber, ApiError> {
        self.send_json(self.client.get(self.url(&format!("/numbers/{}", id))))
            .await
    }

    pub async fn create_number(&self, form: &NumberForm) -> Result<PhoneNumber, ApiError> {
        self.send_json(self.client.post(self.url("/numbers")).json(form))
            .await
    }

    pub async fn update_number(&self, id: Uuid, form: &NumberForm) -> Result<PhoneNumber, ApiError> {
        self.send_json(
            self.client
                .put(self.url(&format!("/numbers/{}", id)))
                .json(form),
        )
        .await
    }

    pub async fn delete_number(&self, id: Uuid) -> Result<(), ApiError> {
        self.send(self.client.delete(self.url(&format!("/numbers/{}", id))))
            .await?;
        Ok(())
    }

    // Places split by whether this number was used there
    pub async fn number_usage(&self, id: Uuid) -> Result<UsageResponse<Place>, ApiError> {
        self.send_json(self.client.get(self.url(&format!("/numbers/{}/usage", id))))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::OperatorKey;
    use mockito::Matcher;
    use serde_json::json;

    const NUMBER_ID: &str = "2b1f7d0e-9c5e-4c7a-9d0e-0f1a2b3c4d5e";

    #[tokio::test]
    async fn test_create_number_posts_json() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/numbers")
            .match_body(Matcher::Json(
                json!({"phone": "+7 999 123 45 67", "operatorKey": "mts"}),
            ))
            .with_status(200)
            .with_body(
                json!({
                    "id": NUMBER_ID,
                    "phone": "+7 999 123 45 67",
                    "operatorKey": "mts",
                    "createdAt": "2025-04-01T08:00:00.5"
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let form = NumberForm::new("89991234567", OperatorKey::Mts);
        let created = client.create_number(&form).await.unwrap();

        mock.assert_async().await;
        assert_eq!(created.id.to_string(), NUMBER_ID);
    }

    #[tokio::test]
    async fn test_duplicate_number_surfaces_detail() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/numbers")
            .with_status(409)
            .with_body(r#"{"detail": "Phone already exists"}"#)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let err = client
            .create_number(&NumberForm::new("89991234567", OperatorKey::Mts))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(409));
        assert_eq!(err.user_message("fallback"), "Phone already exists");
    }

    #[tokio::test]
    async fn test_delete_number() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("DELETE", format!("/api/numbers/{}", NUMBER_ID).as_str())
            .with_status(200)
            .with_body(r#"{"ok": true}"#)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        client
            .delete_number(Uuid::parse_str(NUMBER_ID).unwrap())
            .await
            .unwrap();
        mock.assert_async().await;
    }
}
