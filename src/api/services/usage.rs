use super::super::types::{Ack, UsageSet};
use super::ApiClient;
use super::ApiError;
use tracing::info;
use uuid::Uuid;

impl ApiClient {
    // Upserts the (number, place) link; repeating the same value is a no-op server side
    pub async fn set_usage(&self, number_id: Uuid, place_id: Uuid, used: bool) -> Result<Ack, ApiError> {
        info!(%number_id, %place_id, used, "Setting usage");
        let body = UsageSet {
            number_id,
            place_id,
            used,
        };
        self.send_json(self.client.post(self.url("/usage")).json(&body))
            .await
    }
}
