//! Client for the cart collection API.
//!
//! The backend exposes two plain CRUD collections:
//!
//! | Method   | Path          | Body                              |
//! |----------|---------------|-----------------------------------|
//! | `GET`    | `/cats`       |                                   |
//! | `GET`    | `/cart`       |                                   |
//! | `POST`   | `/cart`       | `{id, name, price, quantity}`     |
//! | `PATCH`  | `/cart/{id}`  | `{quantity}`                      |
//! | `DELETE` | `/cart/{id}`  |                                   |
//!
//! Requests are sent once. There is no retry, timeout or backoff; a hung
//! server delays the calling cart operation indefinitely.

use crate::cart::models::{CartLine, CatId, CatalogItem, QuantityPatch};
use crate::catalog::CatalogSource;
use crate::error::{CatalogError, RemoteError};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

/// Remote half of the cart. One call per line-level change.
#[async_trait]
pub trait CartRemote: Send + Sync {
    /// `GET /cart`
    async fn list_cart(&self) -> Result<Vec<CartLine>, RemoteError>;

    /// `POST /cart`
    async fn create_line(&self, line: &CartLine) -> Result<(), RemoteError>;

    /// `PATCH /cart/{id}`
    async fn update_quantity(&self, id: &CatId, quantity: u32) -> Result<(), RemoteError>;

    /// `DELETE /cart/{id}`
    async fn delete_line(&self, id: &CatId) -> Result<(), RemoteError>;
}

/// reqwest-backed client for the collection API.
#[derive(Debug, Clone)]
pub struct HttpCartApi {
    /// HTTP client.
    client: Client,
    /// Base URL without trailing slash.
    base_url: String,
}

impl HttpCartApi {
    /// Create a new client for the API rooted at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: Client::new(),
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /cats`
    ///
    /// # Errors
    ///
    /// Returns error if the request fails, the status is not 2xx or the body
    /// is not a list of cats.
    #[instrument(skip(self))]
    pub async fn list_cats(&self) -> Result<Vec<CatalogItem>, RemoteError> {
        self.get_json("/cats").await
    }

    /// Path of a single cart line. Text ids are percent-encoded.
    fn line_path(id: &CatId) -> String {
        format!("/cart/{}", urlencoding::encode(&id.to_string()))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, RemoteError> {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .map_err(|e| RemoteError::Request(e.to_string()))?;

        check_status("GET", path, response)
            .await?
            .json()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))
    }
}

/// Turns a non-2xx response into [`RemoteError::Status`].
async fn check_status(
    method: &'static str,
    path: &str,
    response: Response,
) -> Result<Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    Err(RemoteError::Status {
        method,
        path: path.to_string(),
        status: status.as_u16(),
    })
}

#[async_trait]
impl CartRemote for HttpCartApi {
    #[instrument(skip(self))]
    async fn list_cart(&self) -> Result<Vec<CartLine>, RemoteError> {
        self.get_json("/cart").await
    }

    #[instrument(skip(self, line), fields(cat_id = %line.id))]
    async fn create_line(&self, line: &CartLine) -> Result<(), RemoteError> {
        let response = self
            .client
            .post(self.url("/cart"))
            .json(line)
            .send()
            .await
            .map_err(|e| RemoteError::Request(e.to_string()))?;
        check_status("POST", "/cart", response).await?;
        debug!("Cart line created remotely");
        Ok(())
    }

    #[instrument(skip(self), fields(cat_id = %id))]
    async fn update_quantity(&self, id: &CatId, quantity: u32) -> Result<(), RemoteError> {
        let path = Self::line_path(id);
        let response = self
            .client
            .patch(self.url(&path))
            .json(&QuantityPatch { quantity })
            .send()
            .await
            .map_err(|e| RemoteError::Request(e.to_string()))?;
        check_status("PATCH", &path, response).await?;
        debug!(quantity, "Cart line quantity updated remotely");
        Ok(())
    }

    #[instrument(skip(self), fields(cat_id = %id))]
    async fn delete_line(&self, id: &CatId) -> Result<(), RemoteError> {
        let path = Self::line_path(id);
        let response = self
            .client
            .delete(self.url(&path))
            .send()
            .await
            .map_err(|e| RemoteError::Request(e.to_string()))?;
        check_status("DELETE", &path, response).await?;
        debug!("Cart line deleted remotely");
        Ok(())
    }
}

#[async_trait]
impl CatalogSource for HttpCartApi {
    async fn fetch_catalog(&self) -> Result<Vec<CatalogItem>, CatalogError> {
        Ok(self.list_cats().await?)
    }
}
