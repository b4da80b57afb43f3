use super::super::types::{PhoneNumber, Place, PlaceFilter, PlaceForm, UsageResponse};
use super::ApiClient;
use super::ApiError;
use super::attach_file;
use reqwest::multipart::Form;
use uuid::Uuid;

impl ApiClient {
    pub async fn list_places(&self, filter: &PlaceFilter) -> Result<Vec<Place>, ApiError> {
        self.send_json(self.client.get(self.url("/places")).query(&filter.query()))
            .await
    }

    pub async fn get_place(&self, id: Uuid) -> Result<Place, ApiError> {
        self.send_json(self.client.get(self.url(&format!("/places/{}", id))))
            .await
    }

    pub async fn create_place(&self, form: &PlaceForm) -> Result<Place, ApiError> {
        let multipart = place_multipart(form).await?;
        self.send_json(self.client.post(self.url("/places")).multipart(multipart))
            .await
    }

    pub async fn update_place(&self, id: Uuid, form: &PlaceForm) -> Result<Place, ApiError> {
        let mut multipart = place_multipart(form).await?;
        if form.remove_logo {
            multipart = multipart.text("removeLogo", "true");
        }
        self.send_json(
            self.client
                .put(self.url(&format!("/places/{}", id)))
                .multipart(multipart),
        )
        .await
    }

    pub async fn delete_place(&self, id: Uuid) -> Result<(), ApiError> {
        self.send(self.client.delete(self.url(&format!("/places/{}", id))))
            .await?;
        Ok(())
    }

    // Numbers split by whether they were used at this place
    pub async fn place_usage(&self, id: Uuid) -> Result<UsageResponse<PhoneNumber>, ApiError> {
        self.send_json(self.client.get(self.url(&format!("/places/{}/usage", id))))
            .await
    }

    pub async fn place_logo(&self, id: Uuid) -> Result<Vec<u8>, ApiError> {
        self.send_bytes(self.client.get(self.place_logo_url(id)))
            .await
    }

    pub fn place_logo_url(&self, id: Uuid) -> String {
        self.url(&format!("/places/{}/logo", id))
    }
}

async fn place_multipart(form: &PlaceForm) -> Result<Form, ApiError> {
    let name = form.name.trim();
    if name.is_empty() {
        return Err(ApiError::Validation("Укажите название места".to_string()));
    }

    let mut multipart = Form::new()
        .text("name", name.to_string())
        .text("category", form.category.label().to_string())
        .text("promoCode", form.promo_code.clone())
        .text("promoUrl", form.promo_url.clone())
        .text("comment", form.comment.clone());
    if !form.promo_code2.trim().is_empty() {
        multipart = multipart.text("promoCode2", form.promo_code2.clone());
    }
    if let Some(logo) = &form.logo {
        multipart = attach_file(multipart, "logo", logo).await?;
    }
    Ok(multipart)
}
