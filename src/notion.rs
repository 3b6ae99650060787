//! Upload collaborator: creates a page from converted blocks through the HTTP API.
//!
//! The API caps a `children` array at 100 blocks, so the page is created with
//! the first chunk and the remaining chunks are appended one request at a time.
//! Failures are returned as-is; nothing is retried.

use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::block::Block;
use crate::config::Settings;
use crate::error::NotionError;

/// Most children the API accepts in one request.
pub const MAX_CHILDREN: usize = 100;

/// Where the new page is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parent {
    Page(String),
    Database(String),
}

impl Parent {
    fn to_value(&self) -> Value {
        match self {
            Parent::Page(id) => json!({ "type": "page_id", "page_id": id }),
            Parent::Database(id) => json!({ "type": "database_id", "database_id": id }),
        }
    }
}

#[derive(Deserialize)]
struct Created {
    id: String,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
}

pub struct NotionClient {
    http: Client,
    token: String,
    base_url: String,
    version: String,
}

impl NotionClient {
    pub fn new(settings: &Settings) -> Self {
        Self {
            http: Client::new(),
            token: settings.notion_api_token.clone(),
            base_url: settings.api_base_url.trim_end_matches('/').to_string(),
            version: settings.notion_version.clone(),
        }
    }

    /// Create a page under `parent` holding `blocks`, returning the new page id.
    pub async fn create_page(
        &self,
        parent: &Parent,
        title: &str,
        blocks: &[Block],
    ) -> Result<String, NotionError> {
        let mut chunks = blocks.chunks(MAX_CHILDREN);
        let first = chunks.next().unwrap_or_default();

        let body = page_payload(parent, title, first);
        let url = format!("{}/pages", self.base_url);
        let created: Created = self.send(self.http.post(url), &body).await?;
        info!(page = %created.id, blocks = first.len(), "created page");

        for chunk in chunks {
            self.append_blocks(&created.id, chunk).await?;
        }
        Ok(created.id)
    }

    /// Append `blocks` (at most [`MAX_CHILDREN`]) as children of `block_id`.
    pub async fn append_blocks(&self, block_id: &str, blocks: &[Block]) -> Result<(), NotionError> {
        let url = format!("{}/blocks/{}/children", self.base_url, block_id);
        let body = json!({ "children": blocks });
        let _: Value = self.send(self.http.patch(url), &body).await?;
        info!(parent = block_id, blocks = blocks.len(), "appended blocks");
        Ok(())
    }

    async fn send<T>(
        &self,
        request: reqwest::RequestBuilder,
        body: &Value,
    ) -> Result<T, NotionError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let response = request
            .bearer_auth(&self.token)
            .header("Notion-Version", &self.version)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        debug!(status = status.as_u16(), "api response");

        if !status.is_success() {
            let message = serde_json::from_str::<ApiError>(&text)
                .map(|e| e.message)
                .unwrap_or(text);
            return Err(NotionError::Api {
                status: status.as_u16(),
                message,
            });
        }
        serde_json::from_str(&text).map_err(|e| NotionError::Decode(e.to_string()))
    }
}

/// Request body for page creation. Database pages get their title through the
/// `Name` property, regular pages through `title`.
pub fn page_payload(parent: &Parent, title: &str, blocks: &[Block]) -> Value {
    let title_value = json!([{ "type": "text", "text": { "content": title } }]);
    let properties = match parent {
        Parent::Page(_) => json!({ "title": { "title": title_value } }),
        Parent::Database(_) => json!({ "Name": { "title": title_value } }),
    };
    json!({
        "parent": parent.to_value(),
        "properties": properties,
        "children": blocks,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{Annotations, RichTextRun};

    #[test]
    fn page_parent_payload() {
        let blocks = vec![Block::paragraph(vec![RichTextRun::text("hi", Annotations::default())])];
        let payload = page_payload(&Parent::Page("abc".into()), "Notes", &blocks);
        assert_eq!(payload["parent"], json!({ "type": "page_id", "page_id": "abc" }));
        assert_eq!(payload["properties"]["title"]["title"][0]["text"]["content"], "Notes");
        assert_eq!(payload["children"][0]["type"], "paragraph");
    }

    #[test]
    fn database_parent_uses_name_property() {
        let payload = page_payload(&Parent::Database("db".into()), "Row", &[]);
        assert_eq!(payload["parent"]["database_id"], "db");
        assert_eq!(payload["properties"]["Name"]["title"][0]["text"]["content"], "Row");
        assert_eq!(payload["children"], json!([]));
    }

    #[test]
    fn client_normalises_base_url() {
        let settings = Settings {
            api_base_url: "http://localhost:9000/v1/".into(),
            ..Settings::default()
        };
        assert_eq!(NotionClient::new(&settings).base_url, "http://localhost:9000/v1");
    }
}
