use super::RecordSource;
use super::query::{QueryBody, Sort, account_filter};
use super::types::{Page, QueryResponse};
use crate::config::{Credential, NotionConfig};
use crate::errors::{FeedError, Result};
use crate::metrics_defs::{UPSTREAM_DURATION, UPSTREAM_PAGES};
use async_trait::async_trait;
use shared::{counter, histogram};
use std::time::{Duration, Instant};
use url::Url;

pub struct NotionClient {
    client: reqwest::Client,
    base_url: Url,
    token: Credential,
    version: String,
    page_size: u32,
    max_records: usize,
}

impl NotionClient {
    pub fn new(config: &NotionConfig, token: Credential) -> Result<Self> {
        let mut builder =
            reqwest::Client::builder().user_agent(concat!("feed/", env!("CARGO_PKG_VERSION")));
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(NotionClient {
            client: builder.build()?,
            base_url: config.base_url.clone(),
            token,
            version: config.version.clone(),
            page_size: config.page_size,
            max_records: config.max_records,
        })
    }

    fn query_url(&self, database_id: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| FeedError::Upstream(format!("invalid Notion base URL: {}", self.base_url)))?
            .pop_if_empty()
            .extend(["databases", database_id, "query"]);
        Ok(url)
    }

    /// Pages through the query until Notion reports no more results or the record
    /// cap is reached. The cap truncates silently.
    pub async fn query_database(&self, database_id: &str, comptes: &[String]) -> Result<Vec<Page>> {
        let url = self.query_url(database_id)?;
        let filter = account_filter(comptes);
        let started = Instant::now();

        let mut pages: Vec<Page> = Vec::new();
        let mut cursor: Option<String> = None;
        let mut page_fetches = 0;

        loop {
            let body = QueryBody {
                filter: filter.as_ref(),
                sorts: vec![Sort::newest_first()],
                page_size: self.page_size,
                start_cursor: cursor.as_deref(),
            };
            let response = self.fetch_page(url.clone(), &body).await?;

            page_fetches += 1;
            counter!(UPSTREAM_PAGES).increment(1);
            pages.extend(response.results);

            if !response.has_more {
                break;
            }
            if pages.len() >= self.max_records {
                tracing::info!(
                    database_id,
                    max_records = self.max_records,
                    "record cap reached, remaining pages skipped"
                );
                break;
            }
            match response.next_cursor {
                Some(next) => cursor = Some(next),
                None => {
                    tracing::warn!(database_id, "Notion reported more pages without a cursor");
                    break;
                }
            }
        }

        pages.truncate(self.max_records);
        histogram!(UPSTREAM_DURATION).record(started.elapsed().as_secs_f64());
        tracing::debug!(
            database_id,
            page_fetches,
            records = pages.len(),
            "fetched pages from Notion"
        );

        Ok(pages)
    }

    async fn fetch_page(&self, url: Url, body: &QueryBody<'_>) -> Result<QueryResponse> {
        let response = self
            .client
            .post(url)
            .bearer_auth(self.token.expose())
            .header("Notion-Version", &self.version)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = if text.is_empty() {
                format!("Notion query failed ({})", status.as_u16())
            } else {
                text
            };
            return Err(FeedError::Upstream(message));
        }

        Ok(response.json::<QueryResponse>().await?)
    }
}

#[async_trait]
impl RecordSource for NotionClient {
    async fn query(&self, database_id: &str, comptes: &[String]) -> Result<Vec<Page>> {
        self.query_database(database_id, comptes).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const QUERY_PATH: &str = "/v1/databases/db-1/query";

    fn client_for(server: &MockServer, max_records: usize) -> NotionClient {
        let config = NotionConfig {
            base_url: Url::parse(&format!("{}/v1", server.uri())).unwrap(),
            max_records,
            ..NotionConfig::default()
        };
        NotionClient::new(&config, Credential::new("test-token")).unwrap()
    }

    fn results(ids: std::ops::Range<usize>) -> Vec<Value> {
        ids.map(|i| json!({"object": "page", "id": format!("page-{i}"), "properties": {}}))
            .collect()
    }

    #[tokio::test]
    async fn test_pages_are_concatenated() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(QUERY_PATH))
            .and(body_partial_json(json!({"start_cursor": "cursor-2"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": results(100..137),
                "has_more": false,
                "next_cursor": null
            })))
            .with_priority(1)
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path(QUERY_PATH))
            .and(header("authorization", "Bearer test-token"))
            .and(header("notion-version", "2022-06-28"))
            .and(body_partial_json(json!({
                "sorts": [{"property": "Date de publication", "direction": "descending"}],
                "page_size": 100
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": results(0..100),
                "has_more": true,
                "next_cursor": "cursor-2"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let pages = client_for(&server, 500)
            .query_database("db-1", &[])
            .await
            .unwrap();

        assert_eq!(pages.len(), 137);
        assert_eq!(pages[0].id, "page-0");
        assert_eq!(pages[136].id, "page-136");
    }

    #[tokio::test]
    async fn test_pagination_stops_at_record_cap() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(QUERY_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": results(0..100),
                "has_more": true,
                "next_cursor": "more"
            })))
            .expect(5)
            .mount(&server)
            .await;

        let pages = client_for(&server, 500)
            .query_database("db-1", &[])
            .await
            .unwrap();
        assert_eq!(pages.len(), 500);
    }

    #[tokio::test]
    async fn test_cap_truncates_partial_page() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(QUERY_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": results(0..100),
                "has_more": true,
                "next_cursor": "more"
            })))
            .expect(2)
            .mount(&server)
            .await;

        let pages = client_for(&server, 150)
            .query_database("db-1", &[])
            .await
            .unwrap();
        assert_eq!(pages.len(), 150);
    }

    #[tokio::test]
    async fn test_missing_cursor_ends_pagination() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(QUERY_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": results(0..3),
                "has_more": true,
                "next_cursor": null
            })))
            .expect(1)
            .mount(&server)
            .await;

        let pages = client_for(&server, 500)
            .query_database("db-1", &[])
            .await
            .unwrap();
        assert_eq!(pages.len(), 3);
    }

    #[tokio::test]
    async fn test_account_filter_is_sent() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(QUERY_PATH))
            .and(body_partial_json(json!({
                "filter": {"or": [
                    {"property": "Comptes", "multi_select": {"contains": "X"}},
                    {"property": "Comptes", "multi_select": {"contains": "Y"}},
                    {"property": "Comptes", "select": {"equals": "X"}}
                ]}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": results(0..1),
                "has_more": false
            })))
            .expect(1)
            .mount(&server)
            .await;

        let pages = client_for(&server, 500)
            .query("db-1", &["X".to_string(), "Y".to_string()])
            .await
            .unwrap();
        assert_eq!(pages.len(), 1);
    }

    #[tokio::test]
    async fn test_upstream_error_text_is_passed_through() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(QUERY_PATH))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let err = client_for(&server, 500)
            .query_database("db-1", &[])
            .await
            .unwrap_err();
        assert!(matches!(&err, FeedError::Upstream(message) if message == "forbidden"));
    }

    #[tokio::test]
    async fn test_empty_error_body_names_status() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(QUERY_PATH))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let err = client_for(&server, 500)
            .query_database("db-1", &[])
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Notion query failed (502)");
    }

    #[tokio::test]
    async fn test_failure_on_later_page_aborts_query() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(QUERY_PATH))
            .and(body_partial_json(json!({"start_cursor": "cursor-2"})))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .with_priority(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path(QUERY_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": results(0..100),
                "has_more": true,
                "next_cursor": "cursor-2"
            })))
            .mount(&server)
            .await;

        let result = client_for(&server, 500).query_database("db-1", &[]).await;
        assert_eq!(result.unwrap_err().to_string(), "boom");
    }
}
