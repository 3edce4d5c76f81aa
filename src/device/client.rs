use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, Method};
use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;

use crate::{
    config::DeviceConfig,
    device::DeviceApi,
    state::bank::{CoinSnapshot, GameHistoryEntry},
};

use super::{
    error::{NetworkError, NetworkResult},
    models::{
        DenominationDispenseBody, ExactDispenseBody, HistoryPayload, LockBody, local_date_string,
    },
};

const BANK_VALUES_PATH: &str = "api/bankvalues";
const GAME_HISTORY_PATH: &str = "api/gamehistory";
const EXACT_DISPENSE_PATH: &str = "api/exactdispense";
const DENOMINATION_DISPENSE_PATH: &str = "api/denominationdispense";
const EMPTY_BANK_PATH: &str = "api/emptybank";
const LOCK_PATH: &str = "api/lock";

/// [`DeviceApi`] backed by the device's HTTP server.
#[derive(Clone)]
pub struct HttpDeviceClient {
    client: Client,
    base_url: Arc<str>,
}

impl HttpDeviceClient {
    /// Build a client for the device described by `config`.
    pub fn new(config: &DeviceConfig) -> NetworkResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|source| NetworkError::ClientBuilder { source })?;

        Ok(Self {
            client,
            base_url: Arc::<str>::from(config.base_url.trim_end_matches('/')),
        })
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{}", self.base_url, path);
        self.client.request(method, url)
    }

    async fn get_json<T>(&self, path: &str) -> NetworkResult<T>
    where
        T: DeserializeOwned,
    {
        let response = self
            .request(Method::GET, path)
            .send()
            .await
            .map_err(|source| NetworkError::Unreachable {
                path: path.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(NetworkError::Status {
                path: path.to_string(),
                status: response.status(),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|source| NetworkError::Unreachable {
                path: path.to_string(),
                source,
            })
    }

    async fn send_command<B>(&self, method: Method, path: &str, body: Option<&B>) -> NetworkResult<()>
    where
        B: ?Sized + Serialize,
    {
        let mut builder = self.request(method, path);
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|source| NetworkError::Unreachable {
                path: path.to_string(),
                source,
            })?;

        if response.status().is_success() {
            debug!(path, status = %response.status(), "device accepted command");
            Ok(())
        } else {
            Err(NetworkError::Status {
                path: path.to_string(),
                status: response.status(),
            })
        }
    }
}

impl DeviceApi for HttpDeviceClient {
    fn fetch_coin_snapshot(&self) -> BoxFuture<'static, NetworkResult<CoinSnapshot>> {
        let client = self.clone();
        Box::pin(async move { client.get_json::<CoinSnapshot>(BANK_VALUES_PATH).await })
    }

    fn fetch_game_history(&self) -> BoxFuture<'static, NetworkResult<Vec<GameHistoryEntry>>> {
        let client = self.clone();
        Box::pin(async move {
            let payload = client.get_json::<HistoryPayload>(GAME_HISTORY_PATH).await?;
            Ok(payload.normalize(&local_date_string()))
        })
    }

    fn dispense_exact(&self, amount: u32) -> BoxFuture<'static, NetworkResult<()>> {
        let client = self.clone();
        Box::pin(async move {
            client
                .send_command(
                    Method::POST,
                    EXACT_DISPENSE_PATH,
                    Some(&ExactDispenseBody { amount }),
                )
                .await
        })
    }

    fn dispense_denomination(
        &self,
        denomination: u32,
        count: u32,
    ) -> BoxFuture<'static, NetworkResult<()>> {
        let client = self.clone();
        Box::pin(async move {
            client
                .send_command(
                    Method::POST,
                    DENOMINATION_DISPENSE_PATH,
                    Some(&DenominationDispenseBody {
                        denomination,
                        count,
                    }),
                )
                .await
        })
    }

    fn empty_bank(&self) -> BoxFuture<'static, NetworkResult<()>> {
        let client = self.clone();
        Box::pin(async move {
            client
                .send_command::<()>(Method::DELETE, EMPTY_BANK_PATH, None)
                .await
        })
    }

    fn update_lock_status(&self, locked: bool) -> BoxFuture<'static, NetworkResult<()>> {
        let client = self.clone();
        Box::pin(async move {
            client
                .send_command(Method::POST, LOCK_PATH, Some(&LockBody { locked }))
                .await
        })
    }
}
