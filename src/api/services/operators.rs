use super::super::types::{Operator, OperatorForm};
use super::ApiClient;
use super::ApiError;
use super::attach_file;
use reqwest::multipart::Form;
use uuid::Uuid;

impl ApiClient {
    pub async fn list_operators(&self) -> Result<Vec<Operator>, ApiError> {
        self.send_json(self.client.get(self.url("/operators"))).await
    }

    pub async fn create_operator(&self, form: &OperatorForm) -> Result<Operator, ApiError> {
        let multipart = operator_multipart(form).await?;
        self.send_json(self.client.post(self.url("/operators")).multipart(multipart))
            .await
    }

    pub async fn update_operator(&self, id: Uuid, form: &OperatorForm) -> Result<Operator, ApiError> {
        let multipart = operator_multipart(form).await?;
        self.send_json(
            self.client
                .put(self.url(&format!("/operators/{}", id)))
                .multipart(multipart),
        )
        .await
    }

    pub async fn operator_logo(&self, id: Uuid) -> Result<Vec<u8>, ApiError> {
        self.send_bytes(self.client.get(self.operator_logo_url(id)))
            .await
    }

    pub fn operator_logo_url(&self, id: Uuid) -> String {
        self.url(&format!("/operators/{}/logo", id))
    }
}

async fn operator_multipart(form: &OperatorForm) -> Result<Form, ApiError> {
    let name = form.name.trim();
    if name.is_empty() {
        return Err(ApiError::Validation("Укажите название оператора".to_string()));
    }
    let multipart = Form::new().text("name", name.to_string());
    match &form.logo {
        Some(logo) => attach_file(multipart, "logo", logo).await,
        None => Ok(multipart),
    }
}
