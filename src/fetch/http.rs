// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! HTTP transport.
//!
//! Master copies are plain files served over HTTP(S). Responses are never
//! cached, because a master copy can change at any time without its URL
//! changing.

use crate::{
    config::FetchSettings,
    fetch::{Result, Transport, TransportError},
};

use async_trait::async_trait;
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::{
    header::{HeaderMap, HeaderValue, CACHE_CONTROL, PRAGMA},
    Response,
};
use std::{io::Write, time::Duration};
use tracing::{debug, instrument, warn};

/// Transport through reqwest.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Construct new HTTP transport from fetch settings.
    ///
    /// # Errors
    ///
    /// - Return [`FetchError::Client`](crate::fetch::FetchError::Client) if
    ///   the HTTP client cannot be built.
    pub fn new(settings: &FetchSettings) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));

        let mut builder = reqwest::Client::builder()
            .user_agent(settings.user_agent.as_str())
            .default_headers(headers);
        if let Some(secs) = settings.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(skip(self, sink), level = "debug")]
    async fn get(&self, url: &str, sink: &mut (dyn Write + Send)) -> Result<u64, TransportError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| transport_error(url, err))?;

        let status = response.status();
        if !status.is_success() {
            warn!("{url} returned status {status}");
            return Err(TransportError::new(
                Some(status.as_u16()),
                status.canonical_reason().unwrap_or("unexpected status"),
            ));
        }

        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.green} {msg} {bytes:.yellow}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(url.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));

        let size = receive(url, response, sink, &bar).await?;
        debug!("received {size} bytes");

        Ok(size)
    }
}

/// Stream response body into sink while ticking progress bar.
///
/// Progress bar is cleared no matter how streaming ends.
async fn receive(
    url: &str,
    response: Response,
    sink: &mut (dyn Write + Send),
    bar: &ProgressBar,
) -> Result<u64, TransportError> {
    let streamed = async {
        let mut size = 0;
        let mut body = response.bytes_stream();
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|err| transport_error(url, err))?;
            sink.write_all(&chunk).map_err(store_error)?;
            size += chunk.len() as u64;
            bar.set_position(size);
        }
        sink.flush().map_err(store_error)?;

        Ok::<u64, TransportError>(size)
    }
    .await;
    bar.finish_and_clear();

    streamed
}

fn store_error(err: std::io::Error) -> TransportError {
    TransportError::new(None, format!("failed to store body: {err}"))
}

fn transport_error(url: &str, err: reqwest::Error) -> TransportError {
    warn!("request to {url} failed: {err}");
    TransportError::new(err.status().map(|status| status.as_u16()), err.to_string())
}
