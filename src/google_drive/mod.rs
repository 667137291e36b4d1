mod api;
pub mod oauth;
mod types;
mod utils;

use reqwest::Client;

pub use api::*;
pub use oauth::{CodePrompt, OAuthClient, StdinPrompt};
pub use types::*;

lazy_static::lazy_static! {
    pub static ref HTTP: Client = Client::new();
}
