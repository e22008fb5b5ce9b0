//! Channel transport port and the HTTP gateway implementation.
//!
//! `GatewayTransport` posts deliveries as JSON to a configured gateway,
//! signing the payload with HMAC-SHA256 when a secret is set. When no
//! gateway is configured the service falls back to `LogTransport`, which
//! records the delivery and succeeds.

use crate::models::Channel;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use hmac::{Hmac, Mac};
use log::info;
use reqwest::Client;
use serde::Serialize;
use sha2::Sha256;
use thiserror::Error;

#[cfg(test)]
use mockall::automock;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Request error: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Gateway error: {0}")]
    GatewayError(String),
    #[error("Signing error: {0}")]
    SigningError(String),
}

/// One delivery unit handed to a transport.
#[derive(Debug, Clone, Serialize)]
pub struct ChannelDelivery {
    pub channel: Channel,
    /// Channel-specific address, e.g. an email address.
    pub target: String,
    pub title: String,
    pub message: String,
    pub data: serde_json::Value,
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ChannelTransport: Send + Sync {
    async fn deliver(&self, delivery: ChannelDelivery) -> Result<(), TransportError>;
}

#[derive(Debug, Clone)]
pub struct GatewayTransport {
    client: Client,
    gateway_url: String,
    signing_key: Option<String>,
}

impl GatewayTransport {
    pub fn new(gateway_url: String, signing_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            gateway_url,
            signing_key,
        }
    }

    fn sign_payload(&self, payload: &str, signing_key: &str) -> Result<String, TransportError> {
        let mut mac = HmacSha256::new_from_slice(signing_key.as_bytes())
            .map_err(|e| TransportError::SigningError(e.to_string()))?;
        mac.update(payload.as_bytes());
        let result = mac.finalize();
        let code_bytes = result.into_bytes();
        Ok(STANDARD.encode(code_bytes))
    }
}

#[async_trait]
impl ChannelTransport for GatewayTransport {
    async fn deliver(&self, delivery: ChannelDelivery) -> Result<(), TransportError> {
        let payload = serde_json::to_string(&delivery)?;

        let response = match self.signing_key.as_ref() {
            Some(key) => {
                let signature = self.sign_payload(&payload, key)?;

                self.client
                    .post(&self.gateway_url)
                    .header("X-Signature", signature)
                    .json(&delivery)
                    .send()
                    .await?
            }
            None => {
                self.client
                    .post(&self.gateway_url)
                    .json(&delivery)
                    .send()
                    .await?
            }
        };

        if response.status().is_success() {
            Ok(())
        } else {
            let error_message: String = response.text().await?;
            Err(TransportError::GatewayError(error_message))
        }
    }
}

/// No-gateway fallback: deliveries are logged and treated as sent.
#[derive(Debug, Clone, Default)]
pub struct LogTransport;

#[async_trait]
impl ChannelTransport for LogTransport {
    async fn deliver(&self, delivery: ChannelDelivery) -> Result<(), TransportError> {
        info!(
            "No delivery gateway configured; {} notification for {} logged only: {}",
            delivery.channel, delivery.target, delivery.title
        );
        Ok(())
    }
}
