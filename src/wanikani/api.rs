use reqwest::{
    blocking::Client,
    StatusCode,
};
use serde::de::DeserializeOwned;
use tracing::{
    debug,
    info,
    warn,
};

use super::{
    rate_limit::{
        reset_delay,
        RateLimiter,
    },
    types::{
        Collection,
        Resource,
        Subject,
        User,
    },
};
use crate::core::{
    http::{
        ensure_success,
        http_client,
        send_with_retry,
    },
    WaniAnkiError,
};

const API_REVISION: &str = "20170710";
const VOCABULARY_TYPES: &str = "kana_vocabulary,vocabulary";
const MAX_RATE_LIMITED_RETRIES: usize = 5;

pub struct WaniKaniClient {
    client: Client,
    base_url: String,
    token: String,
    limiter: RateLimiter,
}

impl WaniKaniClient {
    pub fn new(token: &str, base_url: &str) -> Result<Self, WaniAnkiError> {
        Ok(Self {
            client: http_client()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            limiter: RateLimiter::default(),
        })
    }

    /// The underlying client, for requests outside the API such as audio files.
    pub fn http(&self) -> &Client {
        &self.client
    }

    pub fn fetch_user(&mut self) -> Result<User, WaniAnkiError> {
        let url = format!("{}/user", self.base_url);
        let user: Resource<User> = self.get_json(&url, &[])?;
        Ok(user.data)
    }

    /// Every vocabulary and kana vocabulary subject from level 1 up to and
    /// including `max_level`, following the collection's page cursor. Hidden
    /// subjects are requested too so their `hidden_at` replaces stale cache
    /// entries.
    pub fn fetch_vocabulary(&mut self, max_level: u32) -> Result<Vec<Subject>, WaniAnkiError> {
        let levels = (1..=max_level).map(|lvl| lvl.to_string()).collect::<Vec<_>>().join(",");
        let first_url = format!("{}/subjects", self.base_url);
        let query = [
            ("levels", levels),
            ("types", VOCABULARY_TYPES.to_string()),
        ];

        info!("Fetching vocabulary subjects for levels 1-{max_level}");
        let mut page: Collection<Subject> = self.get_json(&first_url, &query)?;
        let mut subjects = Vec::new();

        loop {
            debug!("Received {} subjects", page.data.len());
            subjects.append(&mut page.data);

            match page.pages.next_url.take() {
                Some(next_url) => page = self.get_json(&next_url, &[])?,
                None => break,
            }
        }

        info!("Fetched {} vocabulary subjects", subjects.len());
        Ok(subjects)
    }

    fn get_json<T: DeserializeOwned>(
        &mut self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, WaniAnkiError> {
        let mut rate_limited = 0;
        loop {
            self.limiter.acquire();

            let resp = send_with_retry(|| {
                self.client
                    .get(url)
                    .query(query)
                    .bearer_auth(&self.token)
                    .header("Wanikani-Revision", API_REVISION)
            })?;

            if resp.status() == StatusCode::TOO_MANY_REQUESTS
                && rate_limited < MAX_RATE_LIMITED_RETRIES
            {
                rate_limited += 1;
                let delay =
                    reset_delay(resp.headers().get("RateLimit-Reset"), chrono::Utc::now().timestamp());
                warn!("WaniKani returned 429; retrying in {}s", delay.as_secs());
                std::thread::sleep(delay);
                continue;
            }

            ensure_success(&resp)?;
            return Ok(resp.json()?);
        }
    }
}

/// Highest level whose vocabulary is exported: the last completed level, or
/// the current one when `include_in_progress` is set, never beyond what the
/// subscription grants.
pub fn export_level(user: &User, include_in_progress: bool) -> Result<u32, WaniAnkiError> {
    let level = if include_in_progress { user.level } else { user.level.saturating_sub(1) };
    let level = level.min(user.subscription.max_level_granted);

    if level == 0 {
        return Err(WaniAnkiError::NoCompletedLevels);
    }
    Ok(level)
}
