use std::time::Duration;

use curl::easy::{Easy, List};
use log::debug;
use serde_json::Value;

use crate::{credentials::Credentials, fault::NetworkFault};

const MAX_REDIRECTIONS: u32 = 5;

/// Something that can be asked for homework status changes since a watermark.
pub(crate) trait StatusSource {
    fn fetch(&mut self, watermark: i64) -> Result<Value, NetworkFault>;
}

pub(crate) struct StatusClient {
    endpoint: String,
    api_token: String,
    timeout: Duration,
}

impl StatusClient {
    pub(crate) fn new(endpoint: String, credentials: &Credentials, timeout: Duration) -> Self {
        Self {
            endpoint,
            api_token: credentials.api_token.clone(),
            timeout,
        }
    }

    fn url(&self, watermark: i64) -> String {
        let separator = if self.endpoint.contains('?') { '&' } else { '?' };
        format!("{}{}from_date={}", self.endpoint, separator, watermark)
    }
}

impl StatusSource for StatusClient {
    fn fetch(&mut self, watermark: i64) -> Result<Value, NetworkFault> {
        let url = self.url(watermark);
        debug!("Requesting {}", url);

        let mut headers = List::new();
        headers.append(&format!("Authorization: OAuth {}", self.api_token))?;

        let mut easy = Easy::new();
        easy.url(&url)?;
        easy.get(true)?;
        easy.http_headers(headers)?;
        easy.follow_location(true)?;
        easy.max_redirections(MAX_REDIRECTIONS)?;
        easy.timeout(self.timeout)?;

        let mut body = Vec::new();
        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        let response_code = easy.response_code()?;
        if response_code != 200 {
            return Err(NetworkFault::Status(response_code));
        }

        Ok(serde_json::from_slice(&body)?)
    }
}
