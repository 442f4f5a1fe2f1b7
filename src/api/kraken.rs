use super::ExchangeTransport;
use crate::models::OrderRequest;
use crate::{BotError, Result};
use async_trait::async_trait;
use base64::Engine;
use chrono::Utc;
use governor::{Quota, RateLimiter};
use hmac::{Hmac, Mac};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::Deserialize;
use sha2::{Digest, Sha256, Sha512};
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

// Kraken REST API
// Docs: https://docs.kraken.com/api/docs/rest-api/get-ohlc-data
const OHLC_PATH: &str = "/0/public/OHLC";
const ADD_ORDER_PATH: &str = "/0/private/AddOrder";
const REQUEST_TIMEOUT_SECS: u64 = 30;

type HmacSha512 = Hmac<Sha512>;

// Type alias for the rate limiter to simplify signatures
type KrakenRateLimiter = RateLimiter<
    governor::state::direct::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Kraken spot REST client
///
/// Cloneable; clones share the rate limiter and nonce counter.
#[derive(Clone)]
pub struct KrakenClient {
    client: Client,
    base_url: String,
    api_key: String,
    secret: Vec<u8>,
    rate_limiter: Arc<KrakenRateLimiter>,
    last_nonce: Arc<AtomicU64>,
}

/// Every Kraken response is wrapped in this envelope
#[derive(Debug, Deserialize)]
struct KrakenResponse {
    #[serde(default)]
    error: Vec<String>,
    #[serde(default)]
    result: Option<serde_json::Value>,
}

impl KrakenResponse {
    fn into_result(self) -> Result<serde_json::Value> {
        if !self.error.is_empty() {
            return Err(BotError::Transport(format!(
                "Kraken error: {}",
                self.error.join("; ")
            )));
        }
        self.result
            .ok_or_else(|| BotError::Transport("Kraken response has no result".into()))
    }
}

impl KrakenClient {
    /// Create a client; `api_secret` is the base64 secret shown by Kraken
    pub fn new(api_key: String, api_secret: &str, base_url: &str) -> Result<Self> {
        let secret = base64::engine::general_purpose::STANDARD
            .decode(api_secret.trim())
            .map_err(|e| BotError::Config(format!("API secret is not valid base64: {}", e)))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        // Public endpoints allow roughly one call per second
        let rate_limiter = Arc::new(RateLimiter::direct(Quota::per_second(NonZeroU32::MIN)));

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            secret,
            rate_limiter,
            last_nonce: Arc::new(AtomicU64::new(0)),
        })
    }

    /// Strictly increasing millisecond nonce
    fn next_nonce(&self) -> u64 {
        let now = Utc::now().timestamp_millis().max(0) as u64;
        let prev = self
            .last_nonce
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |prev| {
                Some(now.max(prev + 1))
            })
            .unwrap_or_else(|prev| prev);
        now.max(prev + 1)
    }

    async fn read_envelope(response: reqwest::Response) -> Result<serde_json::Value> {
        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(BotError::Transport(format!(
                "Kraken HTTP {}: {}",
                status, error_text
            )));
        }

        let envelope: KrakenResponse = response.json().await?;
        envelope.into_result()
    }
}

#[async_trait]
impl ExchangeTransport for KrakenClient {
    async fn fetch_ohlc(&self, pair: &str, interval_minutes: u32) -> Result<serde_json::Value> {
        let url = format!(
            "{}{}?pair={}&interval={}",
            self.base_url, OHLC_PATH, pair, interval_minutes
        );
        tracing::debug!("GET {}", url);

        self.rate_limiter.until_ready().await;
        let response = self.client.get(&url).send().await?;
        Self::read_envelope(response).await
    }

    async fn submit_order(&self, order: &OrderRequest) -> Result<serde_json::Value> {
        let nonce = self.next_nonce().to_string();
        let body = order_body(&nonce, order)?;
        let signature = sign_request(&self.secret, ADD_ORDER_PATH, &nonce, &body)?;

        self.rate_limiter.until_ready().await;
        let response = self
            .client
            .post(format!("{}{}", self.base_url, ADD_ORDER_PATH))
            .header("API-Key", &self.api_key)
            .header("API-Sign", signature)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await?;
        Self::read_envelope(response).await
    }
}

/// Urlencoded AddOrder form; the signature must cover this exact string
fn order_body(nonce: &str, order: &OrderRequest) -> Result<String> {
    let volume = order.volume.to_string();
    let fields = [
        ("nonce", nonce),
        ("ordertype", order.order_type.as_str()),
        ("pair", order.pair.as_str()),
        ("type", order.side.as_str()),
        ("volume", volume.as_str()),
    ];
    serde_urlencoded::to_string(fields)
        .map_err(|e| BotError::Transport(format!("cannot encode order: {}", e)))
}

/// Kraken `API-Sign`: HMAC-SHA512 over `path || SHA256(nonce || body)`
pub fn sign_request(secret: &[u8], path: &str, nonce: &str, body: &str) -> Result<String> {
    let mut sha = Sha256::new();
    sha.update(nonce.as_bytes());
    sha.update(body.as_bytes());
    let digest = sha.finalize();

    let mut mac = HmacSha512::new_from_slice(secret)
        .map_err(|e| BotError::Config(format!("unusable API secret: {}", e)))?;
    mac.update(path.as_bytes());
    mac.update(&digest);

    Ok(base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OrderSide;
    use mockito::Matcher;

    const SECRET: &str =
        "kQH5HW/8p1uGOVjbgWA7FunAmGO8lsSUXNsu3eow76sz84Q18fWxnyRzBHCd3pd5nE9qa99HAZtuZuj6F1huXg==";

    #[test]
    fn test_sign_matches_documented_example() {
        let secret = base64::engine::general_purpose::STANDARD
            .decode(SECRET)
            .unwrap();
        let body = "nonce=1616492376594&ordertype=limit&pair=XBTUSD&price=37500&type=buy&volume=1.25";

        let signature = sign_request(&secret, ADD_ORDER_PATH, "1616492376594", body).unwrap();
        assert_eq!(
            signature,
            "4/dpxb3iT4tp/ZCVEwSnEsLxx0bqyhLpdfOpc6fn7OR8+UClSV5n9E6aSS8MPtnRfp32bAb0nmbRn6H8ndwLUQ=="
        );
    }

    #[test]
    fn test_order_body_is_urlencoded() {
        let order = OrderRequest::market("XBT+USD&x=1", OrderSide::Buy, 1.25);
        let body = order_body("1616492376594", &order).unwrap();

        assert_eq!(
            body,
            "nonce=1616492376594&ordertype=market&pair=XBT%2BUSD%26x%3D1&type=buy&volume=1.25"
        );
    }

    #[test]
    fn test_invalid_secret_rejected() {
        let result = KrakenClient::new("key".into(), "not base64!!", "http://localhost");
        assert!(matches!(result, Err(BotError::Config(_))));
    }

    #[test]
    fn test_nonce_strictly_increases() {
        let client = KrakenClient::new("key".into(), SECRET, "http://localhost").unwrap();
        let first = client.next_nonce();
        let second = client.next_nonce();
        let third = client.clone().next_nonce();
        assert!(second > first);
        assert!(third > second);
    }

    #[tokio::test]
    async fn test_fetch_ohlc_unwraps_result() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", OHLC_PATH)
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("pair".into(), "XBTUSD".into()),
                Matcher::UrlEncoded("interval".into(), "1".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"error":[],"result":{"XXBTZUSD":[[1688671200,"30306.1","30306.2","30305.7","30305.7","30306.1","3.39243896",23]],"last":1688671200}}"#,
            )
            .create_async()
            .await;

        let client = KrakenClient::new("key".into(), SECRET, &server.url()).unwrap();
        let result = client.fetch_ohlc("XBTUSD", 1).await.unwrap();

        assert!(result["XXBTZUSD"].is_array());
        assert_eq!(result["last"], 1688671200);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_exchange_error_surfaces() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", OHLC_PATH)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"error":["EQuery:Unknown asset pair"]}"#)
            .create_async()
            .await;

        let client = KrakenClient::new("key".into(), SECRET, &server.url()).unwrap();
        let err = client.fetch_ohlc("NOPE", 1).await.unwrap_err();

        assert!(err.to_string().contains("EQuery:Unknown asset pair"));
    }

    #[tokio::test]
    async fn test_http_failure_surfaces() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", OHLC_PATH)
            .match_query(Matcher::Any)
            .with_status(503)
            .with_body("unavailable")
            .create_async()
            .await;

        let client = KrakenClient::new("key".into(), SECRET, &server.url()).unwrap();
        let err = client.fetch_ohlc("XBTUSD", 1).await.unwrap_err();

        assert!(matches!(err, BotError::Transport(_)));
    }

    #[tokio::test]
    async fn test_submit_order_is_signed() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", ADD_ORDER_PATH)
            .match_header("API-Key", "key")
            .match_header("API-Sign", Matcher::Regex(r"^[A-Za-z0-9+/]+=*$".into()))
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex("ordertype=market".into()),
                Matcher::Regex("pair=XBTUSD".into()),
                Matcher::Regex("type=buy".into()),
                Matcher::Regex("volume=0.01".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"error":[],"result":{"descr":{"order":"buy 0.01 XBTUSD @ market"},"txid":["OUF4EM-FRGI2-MQMWZD"]}}"#)
            .create_async()
            .await;

        let client = KrakenClient::new("key".into(), SECRET, &server.url()).unwrap();
        let order = OrderRequest::market("XBTUSD", OrderSide::Buy, 0.01);
        let result = client.submit_order(&order).await.unwrap();

        assert_eq!(result["txid"][0], "OUF4EM-FRGI2-MQMWZD");
        mock.assert_async().await;
    }
}
