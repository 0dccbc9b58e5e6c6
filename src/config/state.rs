// Application state module
// Shared state handed to every connection

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{watch, Notify};

use super::types::Config;
use crate::domain::{DirectoryError, PriceTicker, ProfileStore, UserDirectory};

/// Application state
pub struct AppState {
    pub config: Config,
    /// Users searched by `POST /search`
    pub directory: UserDirectory,
    /// Profiles edited by `GET /user/{id}/edit` and `PUT /user/{id}`
    pub profiles: ProfileStore,
    /// Price advanced by `GET /get-price`
    pub price: Mutex<PriceTicker>,
    /// Open connections, used for `max_connections`
    pub active_connections: AtomicUsize,
    /// Fired once to stop accepting connections
    pub shutdown: Arc<Notify>,
    /// Set to `true` once open connections should finish and close
    pub draining: watch::Sender<bool>,
    /// Woken when the last open connection is released
    connections_closed: Notify,
}

impl AppState {
    /// Build state from configuration, loading the user list
    pub fn new(config: &Config) -> Result<Self, DirectoryError> {
        let directory = UserDirectory::load(config.search.users_file.as_deref())?;
        Ok(Self::with_directory(config, directory))
    }

    pub fn with_directory(config: &Config, directory: UserDirectory) -> Self {
        Self {
            config: config.clone(),
            directory,
            profiles: ProfileStore::new(),
            price: Mutex::new(PriceTicker::new(config.price.initial)),
            active_connections: AtomicUsize::new(0),
            shutdown: Arc::new(Notify::new()),
            draining: watch::Sender::new(false),
            connections_closed: Notify::new(),
        }
    }

    pub fn connection_count(&self) -> usize {
        self.active_connections.load(Ordering::SeqCst)
    }

    /// Release a connection slot taken in `accept_connection`
    pub fn release_connection(&self) {
        if self.active_connections.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.connections_closed.notify_one();
        }
    }

    /// Ask open connections to finish their current request and close,
    /// then wait up to `grace` for them to do so.
    ///
    /// Returns the number of connections still open when the wait ended.
    pub async fn drain(&self, grace: Duration) -> usize {
        self.draining.send_replace(true);

        let closed = async {
            while self.connection_count() > 0 {
                self.connections_closed.notified().await;
            }
        };
        if tokio::time::timeout(grace, closed).await.is_err() {
            return self.connection_count();
        }
        0
    }
}
