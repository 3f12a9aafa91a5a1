pub mod dto;
pub mod memory;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, RequestBuilder, Response, StatusCode};

use crate::error::AppError;
use crate::models::{ActiveTemplate, CloudUserData, NewTemplate, Template, UserSettings};

pub use memory::MemoryRemoteStore;

#[derive(Clone, Debug)]
pub struct RemoteConfig {
    pub base_url: String,
    pub api_token: Option<String>,
}

/// The hosted document database: one document per user plus the shared
/// template collection.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn load_user_data(&self, uid: &str) -> Result<Option<CloudUserData>, AppError>;
    /// Full overwrite of the user's document.
    async fn save_user_data(&self, uid: &str, data: &CloudUserData) -> Result<(), AppError>;
    /// Touches only the active template and the timestamp.
    async fn update_active_template(&self, uid: &str, active: &ActiveTemplate) -> Result<(), AppError>;
    async fn update_settings(&self, uid: &str, settings: &UserSettings) -> Result<(), AppError>;

    async fn create_template(&self, template: &NewTemplate) -> Result<String, AppError>;
    async fn fetch_templates(&self, approved: bool) -> Result<Vec<Template>, AppError>;
    async fn approve_template(&self, id: &str) -> Result<(), AppError>;
    async fn delete_template(&self, id: &str) -> Result<(), AppError>;
}

pub struct HttpRemoteStore {
    client: Client,
    config: RemoteConfig,
}

impl HttpRemoteStore {
    pub fn new(config: RemoteConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build http client: {}", e)))?;
        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.api_token {
            Some(token) => request.header("Authorization", format!("Bearer {}", token)),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder, what: &str) -> Result<Response, AppError> {
        let response = self.authorized(request).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Remote(format!("{} failed: {} {}", what, status, body)));
        }

        Ok(response)
    }
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn load_user_data(&self, uid: &str) -> Result<Option<CloudUserData>, AppError> {
        let response = self
            .authorized(self.client.get(self.url(&format!("users/{}", uid))))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Remote(format!("load user data failed: {} {}", status, body)));
        }

        let body_text = response.text().await?;
        serde_json::from_str::<CloudUserData>(&body_text)
            .map(Some)
            .map_err(|e| {
                tracing::error!("Failed to parse user document: {}", e);
                AppError::Remote(format!("Failed to parse user document: {}", e))
            })
    }

    async fn save_user_data(&self, uid: &str, data: &CloudUserData) -> Result<(), AppError> {
        let request = self.client.put(self.url(&format!("users/{}", uid))).json(data);
        self.send(request, "save user data").await?;
        Ok(())
    }

    async fn update_active_template(&self, uid: &str, active: &ActiveTemplate) -> Result<(), AppError> {
        let patch = dto::ActiveTemplatePatch {
            active_template: active,
            last_updated: Utc::now(),
        };
        let request = self.client.patch(self.url(&format!("users/{}", uid))).json(&patch);
        self.send(request, "update active template").await?;
        Ok(())
    }

    async fn update_settings(&self, uid: &str, settings: &UserSettings) -> Result<(), AppError> {
        let patch = dto::SettingsPatch {
            settings,
            last_updated: Utc::now(),
        };
        let request = self.client.patch(self.url(&format!("users/{}", uid))).json(&patch);
        self.send(request, "update settings").await?;
        Ok(())
    }

    async fn create_template(&self, template: &NewTemplate) -> Result<String, AppError> {
        let request = self.client.post(self.url("templates")).json(template);
        let response = self.send(request, "create template").await?;
        let created: dto::CreatedDocument = response.json().await?;
        tracing::info!("Template stored remotely: {}", created.id);
        Ok(created.id)
    }

    async fn fetch_templates(&self, approved: bool) -> Result<Vec<Template>, AppError> {
        let request = self
            .client
            .get(self.url(&format!("templates?isApproved={}", approved)));
        let response = self.send(request, "fetch templates").await?;
        let mut templates: Vec<Template> = response.json().await?;
        templates.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(templates)
    }

    async fn approve_template(&self, id: &str) -> Result<(), AppError> {
        let request = self
            .client
            .patch(self.url(&format!("templates/{}", id)))
            .json(&dto::ApprovalPatch { is_approved: true });
        self.send(request, "approve template").await?;
        Ok(())
    }

    async fn delete_template(&self, id: &str) -> Result<(), AppError> {
        let request = self.client.delete(self.url(&format!("templates/{}", id)));
        self.send(request, "delete template").await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_join_cleanly() {
        let store = HttpRemoteStore::new(RemoteConfig {
            base_url: "https://docs.example.com/v1/".to_string(),
            api_token: None,
        })
        .unwrap();
        assert_eq!(store.url("users/abc"), "https://docs.example.com/v1/users/abc");
    }
}
