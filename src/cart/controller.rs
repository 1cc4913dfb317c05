//! Cart controller
//!
//! Owns the in-memory catalog and cart, exposes the cart operations, keeps
//! the local store in step with memory and, when a remote store is
//! configured, mirrors each change to it.
//!
//! Remote synchronization is optimistic: the local cart is mutated first,
//! the remote call is awaited, and on failure the matching [`Rollback`] is
//! applied. Nothing here serializes concurrent operations; two overlapping
//! calls for the same id may each see the cart as it was before the other.

use super::helpers::{self, LineChange};
use super::models::{CartLine, CatId, CatalogItem, LoadCartOutcome, MutationOutcome};
use super::rollback::Rollback;
use crate::catalog::{CatalogSource, StaticCatalog};
use crate::config::CartConfig;
use crate::confirm::ConfirmGate;
use crate::error::RemoteError;
use crate::remote::{CartRemote, HttpCartApi};
use crate::storage::{CartStore, JsonFileStore};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

/// Shown to the user when the catalog cannot be fetched.
pub const CATALOG_ERROR_MESSAGE: &str =
    "Unable to load the cats right now. Please check your network connection.";

/// Prompt for the clear-cart confirmation gate.
pub const CLEAR_CART_PROMPT: &str = "Remove every cat from your adoption list?";

#[derive(Debug, Default)]
struct CartState {
    lines: Vec<CartLine>,
    catalog: Vec<CatalogItem>,
    /// Number of `load_catalog` calls in flight
    catalog_loads: usize,
    error_message: String,
}

/// Client-side cart state manager.
///
/// Cloning is cheap and every clone shares the same state.
#[derive(Clone)]
pub struct CartController {
    state: Arc<RwLock<CartState>>,
    store: Arc<dyn CartStore>,
    storage_key: Arc<str>,
    catalog_source: Arc<dyn CatalogSource>,
    remote: Option<Arc<dyn CartRemote>>,
    confirm: Arc<dyn ConfirmGate>,
}

impl CartController {
    /// Creates a local-only controller, reading the persisted cart stored
    /// under `storage_key`.
    ///
    /// A missing or unreadable stored cart starts the controller empty.
    pub fn new(
        store: Arc<dyn CartStore>,
        storage_key: impl Into<String>,
        catalog_source: Arc<dyn CatalogSource>,
        confirm: Arc<dyn ConfirmGate>,
    ) -> Self {
        let storage_key: Arc<str> = Arc::from(storage_key.into());

        let lines = match store.load(&storage_key) {
            Ok(Some(lines)) => helpers::normalize_lines(lines),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, key = %storage_key, "Ignoring unreadable stored cart");
                Vec::new()
            }
        };
        debug!(lines = lines.len(), "Cart restored from local storage");

        Self {
            state: Arc::new(RwLock::new(CartState {
                lines,
                ..CartState::default()
            })),
            store,
            storage_key,
            catalog_source,
            remote: None,
            confirm,
        }
    }

    /// Mirrors every cart mutation to `remote`.
    pub fn with_remote(mut self, remote: Arc<dyn CartRemote>) -> Self {
        self.remote = Some(remote);
        self
    }

    /// Wires a controller from configuration: a [`JsonFileStore`], an
    /// [`HttpCartApi`] and, when `catalog_file` is set, a [`StaticCatalog`].
    pub fn from_config(config: &CartConfig, confirm: Arc<dyn ConfirmGate>) -> Self {
        let api = Arc::new(HttpCartApi::new(config.api_base_url.clone()));
        let catalog_source: Arc<dyn CatalogSource> = match &config.catalog_file {
            Some(path) => Arc::new(StaticCatalog::new(path.clone())),
            None => api.clone(),
        };
        let store = Arc::new(JsonFileStore::new(config.storage_dir.clone()));

        let controller = Self::new(store, config.storage_key.clone(), catalog_source, confirm);
        if config.sync {
            controller.with_remote(api)
        } else {
            controller
        }
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Starts [`load_catalog`](Self::load_catalog) and
    /// [`load_cart`](Self::load_cart) concurrently on the tokio runtime and
    /// returns without waiting for either.
    ///
    /// Cart operations issued before the catalog arrives see an empty
    /// catalog, so `add_item` reports `NotFound`. Await
    /// [`Initialization::wait`] when that matters.
    pub fn initialize(&self) -> Initialization {
        let catalog = {
            let controller = self.clone();
            tokio::spawn(async move { controller.load_catalog().await })
        };
        let cart = {
            let controller = self.clone();
            tokio::spawn(async move { controller.load_cart().await })
        };
        Initialization { catalog, cart }
    }

    /// Fetches the catalog.
    ///
    /// While the call runs [`is_loading`](Self::is_loading) is true. On
    /// failure the user-facing error message is set and the previous catalog
    /// is kept. Returns whether the fetch succeeded.
    #[instrument(skip(self))]
    pub async fn load_catalog(&self) -> bool {
        {
            let mut state = self.state.write().await;
            state.catalog_loads += 1;
            state.error_message.clear();
        }

        let result = self.catalog_source.fetch_catalog().await;

        let mut state = self.state.write().await;
        state.catalog_loads -= 1;
        match result {
            Ok(items) => {
                info!(count = items.len(), "Catalog loaded");
                state.catalog = items;
                true
            }
            Err(e) => {
                warn!(error = %e, "Catalog load failed");
                state.error_message = CATALOG_ERROR_MESSAGE.to_string();
                false
            }
        }
    }

    /// Reconciles the local cart with the remote snapshot.
    ///
    /// A non-empty remote cart replaces the local one and is persisted
    /// straight away. An empty or failed fetch keeps the local cart.
    #[instrument(skip(self))]
    pub async fn load_cart(&self) -> LoadCartOutcome {
        let Some(remote) = &self.remote else {
            return LoadCartOutcome::LocalOnly;
        };

        match remote.list_cart().await {
            Ok(lines) => {
                let lines = helpers::normalize_lines(lines);
                if lines.is_empty() {
                    debug!("Remote cart is empty, keeping local cart");
                    return LoadCartOutcome::KeptLocal;
                }
                let count = lines.len();
                info!(summary = %helpers::format_item_summary(&lines), "Cart loaded from remote");
                self.state.write().await.lines = lines;
                self.persist().await;
                LoadCartOutcome::Replaced(count)
            }
            Err(e) => {
                warn!(error = %e, "Remote cart load failed, using local cart");
                LoadCartOutcome::Failed
            }
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Adds one unit of catalog item `id` to the cart.
    ///
    /// Existing lines are incremented (remote `PATCH`), new ones appended
    /// with quantity 1 (remote `POST`). Unknown ids are a no-op.
    #[instrument(skip(self), fields(cat_id = %id))]
    pub async fn add_item(&self, id: CatId) -> MutationOutcome {
        let change = {
            let mut state = self.state.write().await;
            let Some(item) = state.catalog.iter().find(|c| c.id == id).cloned() else {
                debug!("Not in catalog");
                return MutationOutcome::NotFound;
            };
            helpers::increment_or_append(&mut state.lines, &item)
        };

        let rollback = change.rollback();
        self.commit("add", rollback, move |remote| async move {
            match change {
                LineChange::Incremented { id, quantity } => {
                    remote.update_quantity(&id, quantity).await
                }
                LineChange::Appended(line) => remote.create_line(&line).await,
            }
        })
        .await
    }

    /// Removes the line for `id`. Absent ids are a no-op.
    ///
    /// If the remote delete fails the line goes back to its original index.
    #[instrument(skip(self), fields(cat_id = %id))]
    pub async fn remove_item(&self, id: CatId) -> MutationOutcome {
        let rollback = {
            let mut state = self.state.write().await;
            match helpers::remove_line(&mut state.lines, &id) {
                Some(rollback) => rollback,
                None => {
                    debug!("Not in cart");
                    return MutationOutcome::NotFound;
                }
            }
        };

        self.commit("remove", rollback, move |remote| async move {
            remote.delete_line(&id).await
        })
        .await
    }

    /// Empties the cart after the user confirms.
    ///
    /// Declining leaves both memory and storage untouched. When synchronized,
    /// every line is deleted remotely one after another; the first failure
    /// stops the loop and restores the whole pre-clear cart.
    #[instrument(skip(self))]
    pub async fn clear_cart(&self) -> MutationOutcome {
        if !self.confirm.confirm(CLEAR_CART_PROMPT).await {
            info!("Cart clear declined");
            return MutationOutcome::Declined;
        }

        let (rollback, ids) = {
            let mut state = self.state.write().await;
            let ids: Vec<CatId> = state.lines.iter().map(|l| l.id.clone()).collect();
            (helpers::take_all(&mut state.lines), ids)
        };

        self.commit("clear", rollback, move |remote| async move {
            for id in &ids {
                remote.delete_line(id).await?;
            }
            Ok(())
        })
        .await
    }

    /// Replaces the quantity of line `id` with the sanitized `raw` value.
    ///
    /// `raw` is the value as edited by the user: `None` for an empty field,
    /// possibly NaN, negative or fractional. The cart is persisted whether
    /// or not anything changed. Returns the stored quantity, or `None` when
    /// there is no such line.
    #[instrument(skip(self), fields(cat_id = %id))]
    pub async fn update_quantity(&self, id: CatId, raw: Option<f64>) -> Option<u32> {
        let quantity = helpers::sanitize_quantity(raw);
        let applied = {
            let mut state = self.state.write().await;
            state.lines.iter_mut().find(|l| l.id == id).map(|line| {
                line.quantity = quantity;
                quantity
            })
        };
        self.persist().await;
        applied
    }

    /// Writes the current cart to the local store under the storage key.
    pub async fn persist(&self) {
        let state = self.state.read().await;
        if let Err(e) = self.store.save(&self.storage_key, &state.lines) {
            warn!(error = %e, key = %self.storage_key, "Failed to persist cart");
        }
    }

    /// Runs the remote half of a mutation that has already been applied
    /// locally, undoing it with `rollback` if the remote rejects it.
    /// Persists the final state either way.
    async fn commit<F, Fut>(
        &self,
        action: &'static str,
        rollback: Rollback,
        effect: F,
    ) -> MutationOutcome
    where
        F: FnOnce(Arc<dyn CartRemote>) -> Fut,
        Fut: Future<Output = Result<(), RemoteError>>,
    {
        let Some(remote) = self.remote.clone() else {
            self.persist().await;
            return MutationOutcome::Applied;
        };

        let outcome = match effect(remote).await {
            Ok(()) => {
                debug!(action, "Remote cart updated");
                MutationOutcome::Synced
            }
            Err(e) => {
                warn!(action, error = %e, "Remote cart update failed, rolling back");
                rollback.apply(&mut self.state.write().await.lines);
                MutationOutcome::RolledBack
            }
        };
        self.persist().await;
        outcome
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Sum of `price * quantity` over the cart, with two decimals.
    pub async fn total_price(&self) -> String {
        helpers::total_price(&self.state.read().await.lines)
    }

    /// Snapshot of the cart lines in insertion order.
    pub async fn cart(&self) -> Vec<CartLine> {
        self.state.read().await.lines.clone()
    }

    /// Snapshot of the last successfully loaded catalog.
    pub async fn catalog(&self) -> Vec<CatalogItem> {
        self.state.read().await.catalog.clone()
    }

    /// True while a catalog fetch is in flight.
    pub async fn is_loading(&self) -> bool {
        self.state.read().await.catalog_loads > 0
    }

    /// User-facing error from the last catalog fetch; empty when none.
    pub async fn error_message(&self) -> String {
        self.state.read().await.error_message.clone()
    }

    /// Whether mutations are mirrored to a remote store.
    pub fn is_synchronized(&self) -> bool {
        self.remote.is_some()
    }
}

/// Handles for the two loads started by [`CartController::initialize`].
#[derive(Debug)]
pub struct Initialization {
    catalog: JoinHandle<bool>,
    cart: JoinHandle<LoadCartOutcome>,
}

impl Initialization {
    /// Waits for both loads. A load task that panicked counts as failed.
    pub async fn wait(self) -> (bool, LoadCartOutcome) {
        let (catalog, cart) = futures_util::future::join(self.catalog, self.cart).await;
        (
            catalog.unwrap_or(false),
            cart.unwrap_or(LoadCartOutcome::Failed),
        )
    }
}
