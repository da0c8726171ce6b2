use std::env;

use crate::error::{Error, Result};

/// Credentials for both upstream APIs, read from the environment (a .env
/// file is honored via dotenv before this runs).
#[derive(Debug, Clone)]
pub struct Config {
    pub reddit_client_id: String,
    pub reddit_client_secret: String,
    pub reddit_user_agent: String,
    pub gemini_api_key: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            reddit_client_id: require("REDDIT_CLIENT_ID")?,
            reddit_client_secret: require("REDDIT_CLIENT_SECRET")?,
            reddit_user_agent: require("REDDIT_USER_AGENT")?,
            gemini_api_key: require("GEMINI_API_KEY")?,
        })
    }
}

fn require(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("{} is not set", name)))
}
