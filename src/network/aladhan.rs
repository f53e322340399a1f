//! AlAdhan timings client.
//!
//! Fetches the named prayer timings for a fixed address from the AlAdhan
//! `timingsByAddress` endpoint. Pure data fetch; all temporal logic lives
//! in the engine.

use serde::Deserialize;

use crate::types::{Method, MiqatError, Prayer, School, Timings};

/// Production API root.
pub const DEFAULT_BASE_URL: &str = "https://api.aladhan.com/v1";

/// JSON envelope around the timings payload.
#[derive(Debug, Deserialize)]
struct Envelope {
    data: Payload,
}

#[derive(Debug, Deserialize)]
struct Payload {
    timings: Timings,
}

/// HTTP client for the AlAdhan `timingsByAddress` endpoint.
#[derive(Debug, Clone)]
pub struct TimingsClient {
    http: reqwest::Client,
    base_url: String,
    address: String,
}

impl TimingsClient {
    /// Builds a client for a fixed lookup address (e.g. `"Karachi,Pakistan"`).
    ///
    /// # Errors
    /// Returns `Network` if the underlying HTTP client cannot be built.
    pub fn new(address: impl Into<String>) -> Result<Self, MiqatError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("miqat/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| MiqatError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
            address: address.into(),
        })
    }

    /// Overrides the API root. Tests point this at a local mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Fetches a fresh timing set for the configured address.
    ///
    /// The school selector goes on the wire only when it is Hanafi; the
    /// provider treats its absence as the standard school.
    ///
    /// # Errors
    /// `Network` on transport or decode failure; `MissingTiming` when an
    /// otherwise successful response lacks the Fajr key the engine depends
    /// on.
    ///
    /// # Example
    /// ```rust,no_run
    /// use miqat::network::aladhan::TimingsClient;
    /// use miqat::{Method, School};
    ///
    /// #[tokio::main]
    /// async fn main() {
    ///     let client = TimingsClient::new("Karachi,Pakistan").unwrap();
    ///     let timings = client.fetch(Method::Karachi, School::Shafi).await.unwrap();
    ///     println!("Fajr at {:?}", timings.prayer(miqat::Prayer::Fajr));
    /// }
    /// ```
    pub async fn fetch(&self, method: Method, school: School) -> Result<Timings, MiqatError> {
        let mut url = format!(
            "{}/timingsByAddress?address={}&method={}",
            self.base_url,
            self.address,
            method.id()
        );
        if school == School::Hanafi {
            url.push_str("&school=1");
        }

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| MiqatError::Network(format!("timings request failed: {e}")))?;

        let envelope: Envelope = response
            .json()
            .await
            .map_err(|e| MiqatError::Network(format!("failed to decode timings response: {e}")))?;

        let timings = envelope.data.timings;
        if timings.prayer(Prayer::Fajr).is_none() {
            return Err(MiqatError::missing_timing(Prayer::Fajr.key()));
        }

        log::debug!("fetched {} timings for {}", timings.len(), self.address);
        Ok(timings)
    }
}
