use super::{BackendError, CuratorBackend, QnodeResponse, SavedSchema};
use crate::config::CuratorConfig;
use crate::model::{EventPrimitive, PrimitiveRecommendation, SlotTemplates};
use crate::selector::QnodeOption;
use crate::session::LoadedSchema;
use crate::submit::{SchemaSubmission, SubmissionOutput, SubmitError};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;

#[derive(Deserialize)]
struct PrimitivesResponse {
    #[serde(default)]
    primitives: Vec<PrimitiveRecommendation>,
}

#[derive(Deserialize)]
struct SavedSchemasResponse {
    #[serde(rename = "schemaFiles", default)]
    schema_files: Vec<SavedSchema>,
}

#[derive(Deserialize)]
struct SuggestionsResponse {
    #[serde(default)]
    suggestions: Vec<String>,
}

/// Backend reached over HTTP with JSON bodies
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: &CuratorConfig) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| BackendError::Unavailable(e.to_string()))?;
        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T, BackendError> {
        let response = self
            .client
            .get(self.url(path))
            .query(query)
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;
        decode(response).await
    }

    async fn post<T: DeserializeOwned>(&self, path: &str, body: &(impl Serialize + Sync)) -> Result<T, BackendError> {
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, BackendError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(BackendError::Status {
            status: status.as_u16(),
            body,
        });
    }
    response
        .json()
        .await
        .map_err(|e| BackendError::Decode(e.to_string()))
}

#[async_trait]
impl CuratorBackend for HttpBackend {
    async fn disambiguate_event(&self, event_text: &str) -> Result<Vec<QnodeOption>, BackendError> {
        let response: QnodeResponse = self
            .post("disambiguate_verb_kgtk", &json!({ "event_description": event_text }))
            .await?;
        Ok(response.options)
    }

    async fn disambiguate_refvar(&self, refvar: &str) -> Result<Vec<QnodeOption>, BackendError> {
        let response: QnodeResponse = self
            .post("disambiguate_refvar_kgtk", &json!({ "refvar": refvar }))
            .await?;
        Ok(response.options)
    }

    async fn top_primitives(&self, event_text: &str) -> Result<Vec<PrimitiveRecommendation>, BackendError> {
        self.get("get_top3", &[("event_description", event_text)]).await
    }

    async fn all_primitives(&self) -> Result<Vec<PrimitiveRecommendation>, BackendError> {
        let response: PrimitivesResponse = self.get("get_all_primitives", &[]).await?;
        Ok(response.primitives)
    }

    async fn slots(&self, primitive: &EventPrimitive) -> Result<SlotTemplates, BackendError> {
        let primitive = primitive.to_string();
        self.get("get_slots", &[("event_primitive", primitive.as_str())]).await
    }

    async fn saved_schemas(&self) -> Result<Vec<SavedSchema>, BackendError> {
        let response: SavedSchemasResponse = self.get("get_saved_schemas", &[]).await?;
        Ok(response.schema_files)
    }

    async fn load_schema(&self, file: &str) -> Result<LoadedSchema, BackendError> {
        self.get("get_schema", &[("schemaFile", file)]).await
    }

    async fn event_suggestions(
        &self,
        schema_name: &str,
        schema_dscpt: &str,
        events: &[String],
    ) -> Result<Vec<String>, BackendError> {
        let mut query = vec![("schema_name", schema_name), ("schema_dscpt", schema_dscpt)];
        query.extend(events.iter().map(|e| ("events", e.as_str())));
        let response: SuggestionsResponse = self.get("get_gpt2_suggestions", &query).await?;
        Ok(response.suggestions)
    }

    async fn save_schema(&self, submission: &SchemaSubmission) -> Result<SubmissionOutput, SubmitError> {
        let result: Result<SubmissionOutput, BackendError> = self.post("save_schema", submission).await;
        match result {
            Ok(output) => Ok(output),
            Err(BackendError::Status { status, body }) => Err(SubmitError::from_response(status, &body)),
            Err(e) => Err(SubmitError::Backend(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_join_without_double_slash() {
        let config = CuratorConfig {
            api_url: "http://localhost:5050/".to_string(),
            ..CuratorConfig::default()
        };
        let backend = HttpBackend::new(&config).unwrap();
        assert_eq!(backend.base_url(), "http://localhost:5050");
        assert_eq!(backend.url("get_top3"), "http://localhost:5050/api/get_top3");
    }

    #[test]
    fn schema_listing_reads_camel_case_key() {
        let response: SavedSchemasResponse = serde_json::from_str(
            r#"{"schemaFiles": [{"file": "f", "schema_id": "i", "schema_name": "n"}]}"#,
        )
        .unwrap();
        assert_eq!(response.schema_files[0].file, "f");
        assert!(!response.schema_files[0].augmentation_flag);
    }
}
