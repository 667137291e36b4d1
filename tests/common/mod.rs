//! Shared fixtures: a temp workspace with credentials, and a mock Drive/OAuth server.

use std::{
    path::Path,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use gdrive_fetch::{CodePrompt, Downloader};
use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::{
    matchers::{header, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

pub const ACCESS_TOKEN: &str = "test-access-token";
pub const FIELDS: &str = "id,kind,size,name,mimeType";
pub const DOCX: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

pub struct Fixture {
    pub server: MockServer,
    pub dir: TempDir,
}

impl Fixture {
    /// Starts the mock server and writes `credentials.json` pointing at it.
    pub async fn new() -> Self {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();

        let credentials = json!({
            "installed": {
                "client_id": "client.apps.googleusercontent.com",
                "client_secret": "secret",
                "redirect_uris": ["urn:ietf:wg:oauth:2.0:oob", "http://localhost"],
                "auth_uri": format!("{}/o/oauth2/auth", server.uri()),
                "token_uri": format!("{}/token", server.uri())
            }
        });
        std::fs::write(
            dir.path().join("credentials.json"),
            serde_json::to_vec(&credentials).unwrap(),
        )
        .unwrap();
        std::fs::create_dir(dir.path().join("files")).unwrap();

        Self { server, dir }
    }

    pub fn token_path(&self) -> std::path::PathBuf {
        self.dir.path().join("token.json")
    }

    pub fn file_dir(&self) -> std::path::PathBuf {
        self.dir.path().join("files")
    }

    /// Persists a token so no consent is needed.
    pub fn with_token(self) -> Self {
        let token = json!({
            "access_token": ACCESS_TOKEN,
            "refresh_token": "refresh",
            "token_type": "Bearer",
            "scope": "https://www.googleapis.com/auth/drive.readonly"
        });
        std::fs::write(self.token_path(), serde_json::to_vec(&token).unwrap()).unwrap();
        self
    }

    pub fn config(&self) -> Value {
        let p = |p: &Path| p.to_string_lossy().to_string();

        json!({
            "scopes": [
                "https://www.googleapis.com/auth/drive.readonly",
                "https://www.googleapis.com/auth/drive.metadata.readonly"
            ],
            "tokenPath": p(&self.token_path()),
            "credentialsPath": p(&self.dir.path().join("credentials.json")),
            "fileDir": p(&self.file_dir()),
            "mimeTypes": {
                "text/plain": { "ext": "txt", "exportType": null },
                "application/vnd.google-apps.spreadsheet": {
                    "ext": "docx",
                    "exportType": DOCX
                }
            },
            "maxFileSize": 1000
        })
    }

    pub fn downloader(&self) -> Downloader {
        Downloader::from_value(&self.config())
            .unwrap()
            .with_api_uri(format!("{}/drive/v3/files", self.server.uri()))
    }

    pub async fn mount_meta(&self, meta: Value) {
        let id = meta["id"].as_str().unwrap().to_string();

        Mock::given(method("GET"))
            .and(path(format!("/drive/v3/files/{id}")))
            .and(query_param("fields", FIELDS))
            .and(header("authorization", format!("Bearer {ACCESS_TOKEN}").as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(meta))
            .expect(1)
            .mount(&self.server)
            .await;
    }

    pub async fn mount_media(&self, id: &str, body: &[u8], times: u64) {
        Mock::given(method("GET"))
            .and(path(format!("/drive/v3/files/{id}")))
            .and(query_param("alt", "media"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
            .expect(times)
            .mount(&self.server)
            .await;
    }

    pub async fn mount_export(&self, id: &str, mime_type: &str, body: &[u8], times: u64) {
        Mock::given(method("GET"))
            .and(path(format!("/drive/v3/files/{id}/export")))
            .and(query_param("mimeType", mime_type))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
            .expect(times)
            .mount(&self.server)
            .await;
    }
}

/// Answers every consent request with a fixed code and remembers the URLs it saw.
#[derive(Clone, Default)]
pub struct RecordingPrompt {
    pub code: String,
    pub urls: Arc<Mutex<Vec<String>>>,
}

impl RecordingPrompt {
    pub fn new(code: &str) -> Self {
        Self {
            code: code.to_string(),
            urls: Arc::default(),
        }
    }

    pub fn calls(&self) -> usize {
        self.urls.lock().unwrap().len()
    }
}

#[async_trait]
impl CodePrompt for RecordingPrompt {
    async fn authorization_code(&self, url: &str) -> std::io::Result<String> {
        self.urls.lock().unwrap().push(url.to_string());
        Ok(self.code.clone())
    }
}
