use serde::Deserialize;

/// `credentials.json` as downloaded from the Google Cloud console.
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub installed: InstalledApp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InstalledApp {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uris: Vec<String>,
    pub auth_uri: Option<String>,
    pub token_uri: Option<String>,
}
