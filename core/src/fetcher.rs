//! # Result Fetching
//!
//! [`ResultSource`] is the seam between the worker pool and the outside world.
//! The production implementation, [`HttpResultSource`], posts the search form
//! and hands the page to the protocol parser.

use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, Url};
use thiserror::Error;
use tracing::debug;

use resultsnap_common::config::FetchSettings;
use resultsnap_common::record::ResultRecord;
use resultsnap_protocols::{SearchForm, parse_result_page};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid result page URL '{0}'")]
    InvalidUrl(String),
}

/// Looks up the result of a single hall ticket.
///
/// `Ok(None)` means the endpoint answered but had nothing for this ticket.
#[async_trait]
pub trait ResultSource: Send + Sync {
    async fn lookup(&self, hallticket: &str) -> Result<Option<ResultRecord>, FetchError>;
}

pub struct HttpResultSource {
    client: Client,
    url: Url,
}

impl HttpResultSource {
    pub fn new(settings: &FetchSettings) -> Result<Self, FetchError> {
        let invalid_url = || FetchError::InvalidUrl(settings.url.clone());
        let url = Url::parse(&settings.url).map_err(|_| invalid_url())?;

        let mut headers = HeaderMap::new();
        let referer = HeaderValue::from_str(url.as_str()).map_err(|_| invalid_url())?;
        headers.insert(header::REFERER, referer);

        // The result servers run on expired or self-signed certificates.
        let client = Client::builder()
            .user_agent(settings.user_agent.as_str())
            .default_headers(headers)
            .timeout(settings.timeout)
            .danger_accept_invalid_certs(true)
            .build()?;

        Ok(Self { client, url })
    }

    /// Posts the search form and returns the raw page.
    ///
    /// The status code is not checked, error pages simply fail to parse.
    pub async fn fetch_page(&self, hallticket: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .post(self.url.clone())
            .form(&SearchForm::new(hallticket))
            .send()
            .await?;

        debug!("{hallticket}: HTTP {}", response.status());
        Ok(response.text().await?)
    }
}

#[async_trait]
impl ResultSource for HttpResultSource {
    async fn lookup(&self, hallticket: &str) -> Result<Option<ResultRecord>, FetchError> {
        let body = self.fetch_page(hallticket).await?;
        Ok(parse_result_page(&body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unparseable_url() {
        let settings = FetchSettings {
            url: "not a url".into(),
            ..FetchSettings::default()
        };
        assert!(matches!(
            HttpResultSource::new(&settings),
            Err(FetchError::InvalidUrl(_))
        ));
    }

    #[test]
    fn accepts_https_url() {
        let settings = FetchSettings {
            url: "https://www.example.org/res07/20250686.jsp".into(),
            ..FetchSettings::default()
        };
        assert!(HttpResultSource::new(&settings).is_ok());
    }
}
