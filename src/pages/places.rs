use super::{messages, Dialogs};
use crate::api::{ApiClient, Place, PlaceFilter, PlaceForm, PlaceListSort};
use crate::catalog::Category;
use crate::shell::UnsavedChanges;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

pub struct PlacesPage {
    api: Arc<ApiClient>,
    items: Vec<Place>,
    filter: PlaceFilter,
    default_category: Category,
}

impl UnsavedChanges for PlacesPage {}

impl PlacesPage {
    pub fn new(api: Arc<ApiClient>, default_category: Category) -> Self {
        Self {
            api,
            items: Vec::new(),
            filter: PlaceFilter::default(),
            default_category,
        }
    }

    pub async fn load(&mut self) {
        match self.api.list_places(&self.filter).await {
            Ok(items) => self.items = items,
            Err(e) => error!(err = %e, "Failed to load places"),
        }
    }

    pub fn items(&self) -> &[Place] {
        &self.items
    }

    pub fn filter(&self) -> &PlaceFilter {
        &self.filter
    }

    // Category and sort are applied by the server, so both reload
    pub async fn set_category(&mut self, category: Option<Category>) {
        self.filter.category = category;
        self.load().await;
    }

    pub async fn set_sort(&mut self, sort: PlaceListSort) {
        self.filter.sort = sort;
        self.load().await;
    }

    pub fn blank_form(&self) -> PlaceForm {
        PlaceForm::new("", self.default_category)
    }

    pub async fn save(&mut self, editing: Option<Uuid>, form: &PlaceForm, dialogs: &dyn Dialogs) -> bool {
        let result = match editing {
            Some(id) => self.api.update_place(id, form).await,
            None => self.api.create_place(form).await,
        };
        match result {
            Ok(place) => {
                info!(id = %place.id, name = %place.name, "Place saved");
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
        if !dialogs.confirm(messages::DELETE_PLACE_TITLE, "Удалить место?").await {
            return false;
        }
        match self.api.delete_place(id).await {
            Ok(()) => {
                self.load().await;
                true
            }
            Err(e) => {
                dialogs
                    .alert(&e.user_message(messages::DELETE_PLACE_FAILED))
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
    use mockito::Matcher;

    #[tokio::test]
    async fn test_category_change_reloads_with_params() {
        let mut server = mockito::Server::new_async().await;
        let all = server
            .mock("GET", "/api/places")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("category".into(), "".into()),
                Matcher::UrlEncoded("sort".into(), "popular".into()),
            ]))
            .with_status(200)
            .with_body("[]")
            .expect(1)
            .create_async()
            .await;
        let shops = server
            .mock("GET", "/api/places")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("category".into(), "Магазины".into()),
                Matcher::UrlEncoded("sort".into(), "popular".into()),
            ]))
            .with_status(200)
            .with_body(
                serde_json::json!([{"id": Uuid::new_v4(), "name": "Лента", "category": "Магазины"}])
                    .to_string(),
            )
            .expect(1)
            .create_async()
            .await;

        let api = Arc::new(ApiClient::new(&server.url()).unwrap());
        let mut page = PlacesPage::new(api, Category::Shops);
        page.load().await;
        assert!(page.items().is_empty());

        page.set_category(Some(Category::Shops)).await;
        assert_eq!(page.items()[0].name, "Лента");

        all.assert_async().await;
        shops.assert_async().await;
    }

    #[tokio::test]
    async fn test_delete_requires_confirmation() {
        let mut server = mockito::Server::new_async().await;
        let id = Uuid::new_v4();
        let delete = server
            .mock("DELETE", format!("/api/places/{}", id).as_str())
            .expect(0)
            .create_async()
            .await;

        let api = Arc::new(ApiClient::new(&server.url()).unwrap());
        let mut page = PlacesPage::new(api, Category::Shops);
        let dialogs = ScriptedDialogs::new(&[false]);

        assert!(!page.delete(id, &dialogs).await);
        delete.assert_async().await;
    }
}
