use super::super::types::SearchResult;
use super::ApiClient;
use super::ApiError;

impl ApiClient {
    pub async fn search(&self, query: &str) -> Result<SearchResult, ApiError> {
        self.send_json(self.client.get(self.url("/search")).query(&[("q", query)]))
            .await
    }
}
