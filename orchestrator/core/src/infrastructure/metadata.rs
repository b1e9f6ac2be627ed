// Copyright (c) 2026 nodeboot contributors
// SPDX-License-Identifier: AGPL-3.0

//! Instance metadata lookup over HTTP. The endpoint answers with this host's
//! private address as a bare string.

use crate::domain::seed::{AddressLookup, MetadataError};
use async_trait::async_trait;
use std::net::IpAddr;
use std::time::Duration;

pub struct HttpAddressLookup {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpAddressLookup {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, MetadataError> {
        // Link-local metadata answers within milliseconds or not at all
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(2))
            .build()
            .map_err(|e| MetadataError::Request(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl AddressLookup for HttpAddressLookup {
    async fn local_address(&self) -> Result<IpAddr, MetadataError> {
        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| MetadataError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MetadataError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| MetadataError::Request(e.to_string()))?;
        let trimmed = body.trim();

        trimmed
            .parse()
            .map_err(|_| MetadataError::InvalidAddress(trimmed.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PATH: &str = "/latest/meta-data/local-ipv4";

    #[tokio::test]
    async fn test_parses_plain_text_address() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", PATH)
            .with_status(200)
            .with_body("172.31.9.14\n")
            .create_async()
            .await;

        let lookup = HttpAddressLookup::new(format!("{}{}", server.url(), PATH)).unwrap();
        let address = lookup.local_address().await.unwrap();

        assert_eq!(address, "172.31.9.14".parse::<IpAddr>().unwrap());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_http_error_status_is_reported() {
        let mut server = mockito::Server::new_async().await;
        server.mock("GET", PATH).with_status(404).create_async().await;

        let lookup = HttpAddressLookup::new(format!("{}{}", server.url(), PATH)).unwrap();

        assert!(matches!(
            lookup.local_address().await,
            Err(MetadataError::Status(404))
        ));
    }

    #[tokio::test]
    async fn test_garbage_body_is_invalid_address() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", PATH)
            .with_status(200)
            .with_body("<html>captive portal</html>")
            .create_async()
            .await;

        let lookup = HttpAddressLookup::new(format!("{}{}", server.url(), PATH)).unwrap();

        assert!(matches!(
            lookup.local_address().await,
            Err(MetadataError::InvalidAddress(_))
        ));
    }
}
