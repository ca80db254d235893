use std::future::{self, Future};
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::{Identity, Server as TonicServer, ServerTlsConfig};
use tracing::info;

use crate::config::{Config, TlsConfig};
use crate::error::Result;
use crate::proto::clerk_service_server::ClerkServiceServer;
use crate::store::Store;

pub mod auth;
pub mod service;

pub use auth::{AuthToken, CallContext, RequestValidator, ValidatorChain};
pub use service::KvService;

/// gRPC server hosting the clerk service
pub struct Server {
  listener: TcpListener,
  local_addr: SocketAddr,
  store: Arc<Store>,
  config: Config,
}

impl Server {
  /// Bind the listening socket described by `config`
  pub async fn bind(config: Config) -> Result<Self> {
    let listener = TcpListener::bind(&config.listen_addr).await?;
    let local_addr = listener.local_addr()?;
    info!("gRPC server bound to {}", local_addr);

    Ok(Self {
      listener,
      local_addr,
      store: Arc::new(Store::new()),
      config,
    })
  }

  /// Get local listening address
  pub fn local_addr(&self) -> SocketAddr {
    self.local_addr
  }

  /// The store served by this server
  pub fn store(&self) -> Arc<Store> {
    Arc::clone(&self.store)
  }

  /// Serve until the process is killed
  pub async fn run(self) -> Result<()> {
    self.run_until(future::pending()).await
  }

  /// Serve until `signal` resolves, then drain in-flight calls
  pub async fn run_until<F>(self, signal: F) -> Result<()>
  where
    F: Future<Output = ()>,
  {
    let chain = ValidatorChain::for_auth(self.config.auth.enabled);
    info!(
      "authorization {}",
      if chain.is_empty() { "disabled" } else { "required" }
    );
    let service = ClerkServiceServer::with_interceptor(KvService::new(self.store()), chain);

    let mut builder = TonicServer::builder();
    match &self.config.tls {
      Some(tls) => {
        builder = builder.tls_config(load_tls(tls).await?)?;
        info!("TLS enabled with certificate {}", tls.cert.display());
      }
      None => info!("TLS disabled, serving plaintext"),
    }

    info!("Server started, listening on {}", self.local_addr);
    builder
      .add_service(service)
      .serve_with_incoming_shutdown(TcpListenerStream::new(self.listener), signal)
      .await?;

    info!("Server on {} shut down", self.local_addr);
    Ok(())
  }
}

async fn load_tls(tls: &TlsConfig) -> Result<ServerTlsConfig> {
  let cert = tokio::fs::read(&tls.cert).await?;
  let key = tokio::fs::read(&tls.key).await?;
  Ok(ServerTlsConfig::new().identity(Identity::from_pem(cert, key)))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_bind_ephemeral_port() {
    let config = Config {
      listen_addr: "127.0.0.1:0".to_string(),
      ..Config::default()
    };
    let server = Server::bind(config).await.unwrap();
    assert_ne!(server.local_addr().port(), 0);
    assert!(server.store().is_empty().unwrap());
  }

  #[tokio::test]
  async fn test_missing_tls_files() {
    let config = Config {
      listen_addr: "127.0.0.1:0".to_string(),
      tls: Some(TlsConfig {
        cert: "/nonexistent/cert.pem".into(),
        key: "/nonexistent/key.pem".into(),
      }),
      ..Config::default()
    };
    let server = Server::bind(config).await.unwrap();
    assert!(server.run_until(async {}).await.is_err());
  }
}
