//! Lazily connected client handle.
//!
//! `Uninitialized → Connected` on first use; the connection is then reused for
//! every later command. Only [`ClientHandle::reset`], which needs exclusive
//! access, drops it again.

use crate::command::{Command, Reply};
use crate::config::{ClientOptions, ConnectionConfig};
use crate::error::{Error, Result};
use crate::store::{ConnectionFactory, StoreConnection};
use tokio::sync::{Mutex, MutexGuard};

/// Owns the factory and, once connected, the single store connection.
pub struct ClientHandle<F: ConnectionFactory> {
    factory: F,
    connection: Mutex<Option<F::Connection>>,
}

impl<F: ConnectionFactory> ClientHandle<F> {
    /// Create an unconnected handle. Nothing touches the network yet.
    pub fn new(factory: F) -> Self {
        ClientHandle {
            factory,
            connection: Mutex::new(None),
        }
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// True once the first command has opened the connection.
    pub async fn is_connected(&self) -> bool {
        self.connection.lock().await.is_some()
    }

    /// Exclusive access to the connection, connecting first if needed.
    ///
    /// Commands run through the returned guard are not interleaved with other
    /// callers' commands until it is dropped.
    ///
    /// # Errors
    /// Whatever the factory returns when connecting fails. A failed connect
    /// leaves the handle uninitialized, so the next call tries again.
    pub async fn acquire(
        &self,
        config: &ConnectionConfig,
        options: &ClientOptions,
    ) -> Result<ConnectionGuard<'_, F::Connection>> {
        let mut slot = self.connection.lock().await;

        if slot.is_none() {
            debug!("Opening store connection to {}", config.display_addr());
            *slot = Some(self.factory.connect(config, options).await?);
        }

        Ok(ConnectionGuard { slot })
    }

    /// Drop the connection; the next command reconnects with fresh configuration.
    pub fn reset(&mut self) {
        if self.connection.get_mut().take().is_some() {
            debug!("Client handle reset, connection dropped");
        }
    }
}

/// Locked access to a connected handle.
pub struct ConnectionGuard<'a, C> {
    slot: MutexGuard<'a, Option<C>>,
}

impl<C: StoreConnection> ConnectionGuard<'_, C> {
    pub async fn execute(&mut self, command: &Command<'_>) -> Result<Reply> {
        let Some(connection) = self.slot.as_mut() else {
            return Err(Error::ConnectionError(
                "client handle is not connected".to_string(),
            ));
        };

        trace!("→ {}", command);
        connection.execute(command).await
    }
}
