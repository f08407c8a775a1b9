//! TCP client component with a pooled connection cache.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpStream;
use tracing::Level;

use crate::component::{Component, Dependency, Initializer, Role};
use crate::components::{LoggerSlot, LOGGER};
use crate::config::ClientConfig;
use crate::error::{BoxError, ComponentError};
use crate::lifecycle::Context;
use crate::pool::{ConnectionPool, PoolError, PooledConnection};

const NAME: &str = "tcp";

/// Leases TCP connections from a per-address pool.
pub struct TcpClient {
    lifecycle: Arc<ClientLifecycle>,
}

struct ClientLifecycle {
    pool: ConnectionPool<TcpStream>,
    logger: LoggerSlot,
}

impl TcpClient {
    pub fn new(config: &ClientConfig) -> Self {
        let connect_timeout = Duration::from_secs(config.connect_timeout_secs);

        let mut builder = ConnectionPool::builder(move |address: String| async move {
            let stream = tokio::time::timeout(connect_timeout, TcpStream::connect(&address))
                .await
                .map_err(|_| -> BoxError {
                    format!("connect to {address} timed out after {connect_timeout:?}").into()
                })??;
            stream.set_nodelay(true)?;
            Ok::<_, BoxError>(stream)
        })
        .capacity(config.pool_capacity)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs));

        if let Some(max_open) = config.max_open {
            builder = builder.max_open(max_open);
        }

        Self {
            lifecycle: Arc::new(ClientLifecycle {
                pool: builder.build(),
                logger: LoggerSlot::default(),
            }),
        }
    }

    /// Lease a connection to `address`, reusing an idle one when available.
    pub async fn dial(&self, address: &str) -> Result<PooledConnection<TcpStream>, PoolError> {
        let conn = self.lifecycle.pool.get(address).await;
        if let Err(e) = &conn {
            self.lifecycle
                .logger
                .log(Level::WARN, NAME, &format!("dial {address} failed: {e}"));
        }
        conn
    }

    pub fn pool(&self) -> &ConnectionPool<TcpStream> {
        &self.lifecycle.pool
    }
}

impl Component for TcpClient {
    fn initializer(&self) -> Option<Arc<dyn Initializer>> {
        Some(self.lifecycle.clone())
    }

    fn dependency(self: Arc<Self>) -> Dependency {
        Dependency::Component {
            role: Role::Client,
            component: self,
        }
    }
}

#[async_trait]
impl Initializer for ClientLifecycle {
    fn dependencies(&self) -> Vec<String> {
        vec![LOGGER.to_string()]
    }

    fn add_dependency(&self, dependency: Dependency) -> Result<(), ComponentError> {
        self.logger.inject(dependency)
    }

    fn can_stop(&self) -> bool {
        true
    }

    async fn stop(&self, _ctx: Context) -> Result<(), ComponentError> {
        match self.pool.close() {
            Ok(()) | Err(PoolError::Closed) => {
                self.logger.log(Level::INFO, NAME, "connection pool closed");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tokio::net::TcpListener;
    use tokio_util::sync::CancellationToken;

    async fn counting_listener() -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        let accepted = Arc::new(AtomicUsize::new(0));

        let counter = accepted.clone();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((stream, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                held.push(stream);
            }
        });

        (address, accepted)
    }

    #[tokio::test]
    async fn released_connection_is_reused() {
        let (address, accepted) = counting_listener().await;
        let client = TcpClient::new(&ClientConfig::default());

        let conn = client.dial(&address).await.unwrap();
        conn.close().unwrap();
        assert_eq!(client.pool().idle_count(&address), 1);

        let conn = client.dial(&address).await.unwrap();
        assert_eq!(conn.address(), address);
        drop(conn);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(accepted.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn stop_closes_the_pool() {
        let client = TcpClient::new(&ClientConfig::default());
        let lifecycle = client.initializer().unwrap();
        let ctx = Context::new(CancellationToken::new());

        lifecycle.stop(ctx.clone()).await.unwrap();
        assert!(client.pool().is_closed());
        assert!(matches!(
            client.dial("127.0.0.1:1").await,
            Err(PoolError::Closed)
        ));

        // A second stop is harmless.
        lifecycle.stop(ctx).await.unwrap();
    }

    #[tokio::test]
    async fn refused_connection_is_a_factory_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        drop(listener);

        let client = TcpClient::new(&ClientConfig::default());
        assert!(matches!(
            client.dial(&address).await,
            Err(PoolError::Factory { .. })
        ));
    }
}
