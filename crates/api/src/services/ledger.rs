//! Campus coin ledger client.
//!
//! The ledger is an external custodial service that records coin movements
//! on the campus blockchain. This module talks to its HTTP gateway: transfers
//! credit a wallet address, debits charge one, and balance queries read the
//! settled amount. Requests are HMAC-signed with a shared secret and carry an
//! idempotency key so a retried call cannot move coins twice.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use rand::Rng;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use sha2::Sha256;
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

use crate::config::LedgerConfig;

/// Header carrying the HMAC-SHA256 signature of the request body.
pub const SIGNATURE_HEADER: &str = "X-Ledger-Signature";

/// Header carrying the caller-chosen idempotency key.
pub const IDEMPOTENCY_KEY_HEADER: &str = "X-Idempotency-Key";

/// Errors that can occur when talking to the ledger.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Ledger rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Ledger unavailable (status {status})")]
    Unavailable { status: u16 },

    #[error("Invalid response from ledger: {0}")]
    MalformedResponse(String),

    #[error("HMAC signing error: {0}")]
    Signing(String),
}

impl LedgerError {
    /// Whether retrying the same request could succeed.
    ///
    /// Rejections are authoritative (insufficient funds, unknown address)
    /// and must not be retried. Network failures and 5xx responses may be
    /// transient.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LedgerError::Http(_) | LedgerError::Unavailable { .. }
        )
    }
}

/// Interface to the campus coin ledger.
///
/// `idempotency_key` deduplicates retries on the ledger side: two calls with
/// the same key settle at most one coin movement.
#[async_trait]
pub trait LedgerService: Send + Sync {
    /// Credit `amount` coins to a wallet address. Returns the transaction hash.
    async fn transfer(
        &self,
        to_address: &str,
        amount: i64,
        idempotency_key: Uuid,
    ) -> Result<String, LedgerError>;

    /// Charge `amount` coins from a wallet address. Returns the transaction hash.
    async fn debit(
        &self,
        from_address: &str,
        amount: i64,
        idempotency_key: Uuid,
    ) -> Result<String, LedgerError>;

    /// Read the settled balance of a wallet address.
    async fn balance_of(&self, address: &str) -> Result<i64, LedgerError>;
}

#[derive(Debug, Deserialize)]
struct TxResponse {
    tx_hash: String,
}

#[derive(Debug, Deserialize)]
struct BalanceResponse {
    balance: i64,
}

/// HTTP client for the ledger gateway.
pub struct HttpLedgerService {
    base_url: String,
    hmac_secret: String,
    max_retries: u32,
    retry_backoff_ms: u64,
    client: Client,
}

impl HttpLedgerService {
    /// Create a new ledger client from configuration.
    pub fn new(config: &LedgerConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: config.url.trim_end_matches('/').to_string(),
            hmac_secret: config.hmac_secret.clone(),
            max_retries: config.max_retries,
            retry_backoff_ms: config.retry_backoff_ms,
            client,
        }
    }

    /// Sign the payload with HMAC-SHA256.
    fn sign_payload(&self, payload: &str) -> Result<String, LedgerError> {
        type HmacSha256 = Hmac<Sha256>;

        let mut mac = HmacSha256::new_from_slice(self.hmac_secret.as_bytes())
            .map_err(|e| LedgerError::Signing(e.to_string()))?;

        mac.update(payload.as_bytes());
        let result = mac.finalize();
        let signature = hex::encode(result.into_bytes());

        Ok(format!("sha256={}", signature))
    }

    /// Exponential backoff with jitter for the given retry attempt (1-based).
    fn backoff_delay(&self, attempt: u32) -> Duration {
        let base = self
            .retry_backoff_ms
            .saturating_mul(1u64 << (attempt - 1).min(6));
        let jitter = rand::thread_rng().gen_range(0..=self.retry_backoff_ms / 2);
        Duration::from_millis(base.saturating_add(jitter))
    }

    /// Send one signed request and parse the response.
    async fn send_once<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        payload: &str,
        idempotency_key: Option<Uuid>,
    ) -> Result<T, LedgerError> {
        let url = format!("{}{}", self.base_url, path);
        let signature = self.sign_payload(payload)?;

        let mut request = self
            .client
            .request(method, &url)
            .header("Content-Type", "application/json")
            .header(SIGNATURE_HEADER, signature);

        if let Some(key) = idempotency_key {
            request = request.header(IDEMPOTENCY_KEY_HEADER, key.to_string());
        }
        if !payload.is_empty() {
            request = request.body(payload.to_string());
        }

        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            let body = response.text().await?;
            serde_json::from_str(&body).map_err(|e| LedgerError::MalformedResponse(e.to_string()))
        } else if status.is_client_error() {
            let message = Self::rejection_message(response).await;
            Err(LedgerError::Rejected {
                status: status.as_u16(),
                message,
            })
        } else {
            Err(LedgerError::Unavailable {
                status: status.as_u16(),
            })
        }
    }

    /// Extract the rejection message from an error response body.
    async fn rejection_message(response: reqwest::Response) -> String {
        #[derive(Deserialize)]
        struct ErrorBody {
            message: String,
        }

        match response.text().await {
            Ok(body) => serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.message)
                .unwrap_or_else(|_| "Request rejected by ledger".to_string()),
            Err(_) => "Request rejected by ledger".to_string(),
        }
    }

    /// Send a request, retrying transient failures with backoff.
    async fn send_with_retries<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        payload: &str,
        idempotency_key: Option<Uuid>,
    ) -> Result<T, LedgerError> {
        let mut attempt = 0u32;

        loop {
            match self
                .send_once(method.clone(), path, payload, idempotency_key)
                .await
            {
                Ok(parsed) => return Ok(parsed),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    let delay = self.backoff_delay(attempt);
                    warn!(
                        path = path,
                        attempt = attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Ledger request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[async_trait]
impl LedgerService for HttpLedgerService {
    async fn transfer(
        &self,
        to_address: &str,
        amount: i64,
        idempotency_key: Uuid,
    ) -> Result<String, LedgerError> {
        let payload = json!({ "to_address": to_address, "amount": amount }).to_string();
        let response: TxResponse = self
            .send_with_retries(
                Method::POST,
                "/api/v1/transfers",
                &payload,
                Some(idempotency_key),
            )
            .await?;
        Ok(response.tx_hash)
    }

    async fn debit(
        &self,
        from_address: &str,
        amount: i64,
        idempotency_key: Uuid,
    ) -> Result<String, LedgerError> {
        let payload = json!({ "from_address": from_address, "amount": amount }).to_string();
        let response: TxResponse = self
            .send_with_retries(
                Method::POST,
                "/api/v1/debits",
                &payload,
                Some(idempotency_key),
            )
            .await?;
        Ok(response.tx_hash)
    }

    async fn balance_of(&self, address: &str) -> Result<i64, LedgerError> {
        let path = format!("/api/v1/balances/{}", address);
        let response: BalanceResponse = self
            .send_with_retries(Method::GET, &path, "", None)
            .await?;
        Ok(response.balance)
    }
}

/// In-memory ledger used when no gateway URL is configured.
///
/// Keeps balances in a process-local map so local development and tests can
/// exercise the full reward and checkout flows without a running ledger.
/// Transfers mint coins to an address; debits charge it.
pub struct InMemoryLedger {
    balances: Mutex<HashMap<String, i64>>,
    applied: Mutex<HashMap<Uuid, String>>,
    transfer_count: AtomicU64,
    debit_count: AtomicU64,
    fail_transfers: AtomicBool,
    fail_debits: AtomicBool,
    fail_balance_reads: AtomicBool,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self {
            balances: Mutex::new(HashMap::new()),
            applied: Mutex::new(HashMap::new()),
            transfer_count: AtomicU64::new(0),
            debit_count: AtomicU64::new(0),
            fail_transfers: AtomicBool::new(false),
            fail_debits: AtomicBool::new(false),
            fail_balance_reads: AtomicBool::new(false),
        }
    }

    /// Seed an address with coins. Test and local-dev helper.
    pub fn fund(&self, address: &str, amount: i64) {
        let mut balances = self.balances.lock().unwrap();
        *balances.entry(address.to_string()).or_insert(0) += amount;
    }

    /// Current balance of an address, zero if never seen.
    pub fn balance(&self, address: &str) -> i64 {
        let balances = self.balances.lock().unwrap();
        balances.get(address).copied().unwrap_or(0)
    }

    /// Number of settled transfers.
    pub fn transfer_count(&self) -> u64 {
        self.transfer_count.load(Ordering::Relaxed)
    }

    /// Number of settled debits.
    pub fn debit_count(&self) -> u64 {
        self.debit_count.load(Ordering::Relaxed)
    }

    /// Make subsequent transfers fail as if the ledger were down.
    pub fn set_fail_transfers(&self, fail: bool) {
        self.fail_transfers.store(fail, Ordering::Relaxed);
    }

    /// Make subsequent debits fail as if the ledger were down.
    pub fn set_fail_debits(&self, fail: bool) {
        self.fail_debits.store(fail, Ordering::Relaxed);
    }

    /// Make subsequent balance reads fail as if the ledger were down.
    pub fn set_fail_balance_reads(&self, fail: bool) {
        self.fail_balance_reads.store(fail, Ordering::Relaxed);
    }

    fn next_tx_hash(counter: &AtomicU64) -> String {
        let seq = counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("0x{:064x}", seq)
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerService for InMemoryLedger {
    async fn transfer(
        &self,
        to_address: &str,
        amount: i64,
        idempotency_key: Uuid,
    ) -> Result<String, LedgerError> {
        if self.fail_transfers.load(Ordering::Relaxed) {
            return Err(LedgerError::Unavailable { status: 503 });
        }

        // A replayed key returns the original hash without moving coins again
        let mut applied = self.applied.lock().unwrap();
        if let Some(tx_hash) = applied.get(&idempotency_key) {
            return Ok(tx_hash.clone());
        }

        let mut balances = self.balances.lock().unwrap();
        *balances.entry(to_address.to_string()).or_insert(0) += amount;

        let tx_hash = Self::next_tx_hash(&self.transfer_count);
        applied.insert(idempotency_key, tx_hash.clone());
        Ok(tx_hash)
    }

    async fn debit(
        &self,
        from_address: &str,
        amount: i64,
        idempotency_key: Uuid,
    ) -> Result<String, LedgerError> {
        if self.fail_debits.load(Ordering::Relaxed) {
            return Err(LedgerError::Unavailable { status: 503 });
        }

        let mut applied = self.applied.lock().unwrap();
        if let Some(tx_hash) = applied.get(&idempotency_key) {
            return Ok(tx_hash.clone());
        }

        let mut balances = self.balances.lock().unwrap();
        let balance = balances.entry(from_address.to_string()).or_insert(0);
        if *balance < amount {
            return Err(LedgerError::Rejected {
                status: 422,
                message: "Insufficient funds".to_string(),
            });
        }
        *balance -= amount;

        let tx_hash = Self::next_tx_hash(&self.debit_count);
        applied.insert(idempotency_key, tx_hash.clone());
        Ok(tx_hash)
    }

    async fn balance_of(&self, address: &str) -> Result<i64, LedgerError> {
        if self.fail_balance_reads.load(Ordering::Relaxed) {
            return Err(LedgerError::Unavailable { status: 503 });
        }
        Ok(self.balance(address))
    }
}
