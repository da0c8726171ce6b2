use std::sync::LazyLock;

use regex::Regex;
use reqwest::StatusCode;
use reqwest::header::USER_AGENT;
use serde::Deserialize;

use crate::config::Config;
use crate::error::{Error, Result};

const TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";
const API_BASE: &str = "https://oauth.reddit.com";
// Reddit caps a single listing page at 100 items.
const PAGE_MAX: usize = 100;

/// One post or comment authored by the target user, normalized for
/// prompt construction.
#[derive(Debug, Clone)]
pub struct SourceItem {
    pub text: String,
    pub permalink: String,
    pub kind: ItemKind,
    pub created_utc: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Post,
    Comment,
}

static PROFILE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"reddit\.com/user/([\w-]+)/?").unwrap());

/// Extract the username from a Reddit profile URL.
pub fn extract_username(url: &str) -> Result<String> {
    PROFILE_URL
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| Error::InvalidUrl(url.to_string()))
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    after: Option<String>,
    children: Vec<Thing>,
}

#[derive(Debug, Deserialize)]
struct Thing {
    data: ItemData,
}

#[derive(Debug, Deserialize)]
struct ItemData {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    selftext: Option<String>,
    #[serde(default)]
    body: Option<String>,
    permalink: String,
    created_utc: f64,
}

impl ItemData {
    fn into_source_item(self, kind: ItemKind) -> SourceItem {
        let text = match kind {
            ItemKind::Post => {
                let title = self.title.unwrap_or_default();
                let body = self.selftext.unwrap_or_default();
                if body.is_empty() {
                    title
                } else if title.is_empty() {
                    body
                } else {
                    format!("{} {}", title, body)
                }
            }
            ItemKind::Comment => self.body.unwrap_or_default(),
        };
        SourceItem {
            text,
            permalink: format!("https://www.reddit.com{}", self.permalink),
            kind,
            created_utc: self.created_utc,
        }
    }
}

/// Read-only Reddit API client using application-only OAuth.
pub struct RedditClient {
    http: reqwest::Client,
    user_agent: String,
    token: String,
}

impl RedditClient {
    /// Exchange the client credentials for a bearer token.
    pub async fn connect(config: &Config) -> Result<Self> {
        let http = reqwest::Client::new();
        let response = http
            .post(TOKEN_URL)
            .basic_auth(&config.reddit_client_id, Some(&config.reddit_client_secret))
            .header(USER_AGENT, &config.reddit_user_agent)
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Auth(format!(
                "token request failed with status {}",
                response.status()
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| Error::Upstream(format!("Reddit returned malformed JSON: {}", e)))?;
        match token.access_token {
            Some(token) => Ok(Self {
                http,
                user_agent: config.reddit_user_agent.clone(),
                token,
            }),
            None => Err(Error::Auth(
                token.error.unwrap_or_else(|| "no access token in response".to_string()),
            )),
        }
    }

    /// Fetch the user's latest posts and comments, merged most-recent-first.
    pub async fn collect(
        &self,
        username: &str,
        post_limit: usize,
        comment_limit: usize,
    ) -> Result<Vec<SourceItem>> {
        let posts = self
            .fetch_listing(username, "submitted", ItemKind::Post, post_limit)
            .await?;
        let comments = self
            .fetch_listing(username, "comments", ItemKind::Comment, comment_limit)
            .await?;
        log::info!(
            "Fetched {} posts and {} comments for u/{}",
            posts.len(),
            comments.len(),
            username
        );
        Ok(merge_recent_first(posts, comments))
    }

    /// Page through one listing endpoint, following the `after` cursor
    /// until `limit` items are collected or the stream runs out.
    async fn fetch_listing(
        &self,
        username: &str,
        endpoint: &str,
        kind: ItemKind,
        limit: usize,
    ) -> Result<Vec<SourceItem>> {
        let url = format!("{}/user/{}/{}", API_BASE, username, endpoint);
        let mut items = Vec::new();
        let mut after: Option<String> = None;

        while items.len() < limit {
            let page_size = (limit - items.len()).min(PAGE_MAX);
            let mut request = self
                .http
                .get(&url)
                .bearer_auth(&self.token)
                .header(USER_AGENT, &self.user_agent)
                .query(&[("limit", page_size.to_string()), ("raw_json", "1".to_string())]);
            if let Some(cursor) = &after {
                request = request.query(&[("after", cursor.as_str())]);
            }

            let response = request.send().await?;
            match response.status() {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    return Err(Error::Auth(format!(
                        "listing request rejected with status {}",
                        response.status()
                    )));
                }
                StatusCode::NOT_FOUND => return Err(Error::NotFound(username.to_string())),
                status if !status.is_success() => {
                    return Err(Error::Upstream(format!(
                        "Reddit returned status {} for /user/{}/{}",
                        status, username, endpoint
                    )));
                }
                _ => {}
            }

            let body = response.text().await?;
            let listing = parse_listing(&body)?;
            if listing.data.children.is_empty() {
                break;
            }
            let page: Vec<SourceItem> = listing
                .data
                .children
                .into_iter()
                .map(|thing| thing.data.into_source_item(kind))
                .collect();
            take_up_to(&mut items, page, limit);
            after = listing.data.after;
            if after.is_none() {
                break;
            }
        }

        Ok(items)
    }
}

fn parse_listing(body: &str) -> Result<Listing> {
    serde_json::from_str(body)
        .map_err(|e| Error::Upstream(format!("Reddit returned malformed JSON: {}", e)))
}

/// Append one page of items, clamping the total to the overall limit.
fn take_up_to(items: &mut Vec<SourceItem>, page: Vec<SourceItem>, limit: usize) {
    items.extend(page);
    items.truncate(limit);
}

/// Merge the two streams, most recent creation time first.
fn merge_recent_first(posts: Vec<SourceItem>, comments: Vec<SourceItem>) -> Vec<SourceItem> {
    let mut items = posts;
    items.extend(comments);
    items.sort_by(|a, b| b.created_utc.total_cmp(&a.created_utc));
    items
}
