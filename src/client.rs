//! Typed client for the clerk service

use std::path::PathBuf;

use tonic::metadata::{Ascii, MetadataValue};
use tonic::service::Interceptor;
use tonic::service::interceptor::InterceptedService;
use tonic::transport::{Certificate, Channel, ClientTlsConfig};
use tonic::{Request, Status};
use tracing::debug;

use crate::error::{Error, Result};
use crate::proto::clerk_service_client::ClerkServiceClient;
use crate::proto::{AppendRequest, GetRequest, PutRequest};
use crate::server::auth::AUTHORIZATION;

pub const DEFAULT_ADDR: &str = "http://127.0.0.1:4000";

/// Attaches the `authorization` entry to every outgoing call
#[derive(Clone, Default)]
pub struct TokenInjector {
  token: Option<MetadataValue<Ascii>>,
}

impl TokenInjector {
  pub fn new(token: Option<&str>) -> Result<Self> {
    let token = token
      .map(|t| t.parse::<MetadataValue<Ascii>>())
      .transpose()
      .map_err(|_| Error::InvalidToken)?;
    Ok(Self { token })
  }
}

impl Interceptor for TokenInjector {
  fn call(&mut self, mut request: Request<()>) -> std::result::Result<Request<()>, Status> {
    if let Some(token) = &self.token {
      request.metadata_mut().insert(AUTHORIZATION, token.clone());
    }
    Ok(request)
  }
}

/// Connection settings for [`Client::connect`]
#[derive(Debug, Clone)]
pub struct ClientOptions {
  /// Server URL, `https://` when `ca` is set
  pub addr: String,
  /// CA certificate (PEM) used to verify the server
  pub ca: Option<PathBuf>,
  /// Name checked against the server certificate
  pub domain: Option<String>,
  pub token: Option<String>,
}

impl Default for ClientOptions {
  fn default() -> Self {
    Self {
      addr: DEFAULT_ADDR.to_string(),
      ca: None,
      domain: None,
      token: None,
    }
  }
}

pub struct Client {
  inner: ClerkServiceClient<InterceptedService<Channel, TokenInjector>>,
}

impl Client {
  pub async fn connect(options: ClientOptions) -> Result<Self> {
    let mut endpoint = Channel::from_shared(options.addr.clone())
      .map_err(|_| Error::InvalidEndpoint(options.addr.clone()))?;

    if let Some(ca) = &options.ca {
      let pem = tokio::fs::read(ca).await?;
      let mut tls = ClientTlsConfig::new().ca_certificate(Certificate::from_pem(pem));
      if let Some(domain) = &options.domain {
        tls = tls.domain_name(domain.clone());
      }
      endpoint = endpoint.tls_config(tls)?;
    }

    let injector = TokenInjector::new(options.token.as_deref())?;
    let channel = endpoint.connect().await?;
    debug!("connected to {}", options.addr);

    Ok(Self {
      inner: ClerkServiceClient::with_interceptor(channel, injector),
    })
  }

  pub async fn put(&mut self, key: &str, value: &str) -> std::result::Result<(), Status> {
    self
      .inner
      .put(PutRequest {
        key: key.to_string(),
        value: value.to_string(),
      })
      .await?;
    Ok(())
  }

  pub async fn get(&mut self, key: &str) -> std::result::Result<String, Status> {
    let resp = self
      .inner
      .get(GetRequest {
        key: key.to_string(),
      })
      .await?;
    Ok(resp.into_inner().value)
  }

  /// Returns the value present before the append
  pub async fn append(&mut self, key: &str, arg: &str) -> std::result::Result<String, Status> {
    let resp = self
      .inner
      .append(AppendRequest {
        key: key.to_string(),
        arg: arg.to_string(),
      })
      .await?;
    Ok(resp.into_inner().old_value)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_injector_sets_authorization() {
    let mut injector = TokenInjector::new(Some("abc")).unwrap();
    let req = injector.call(Request::new(())).unwrap();
    assert_eq!(req.metadata().get(AUTHORIZATION).unwrap(), "abc");
  }

  #[test]
  fn test_injector_without_token() {
    let mut injector = TokenInjector::new(None).unwrap();
    let req = injector.call(Request::new(())).unwrap();
    assert!(req.metadata().get(AUTHORIZATION).is_none());
  }

  #[test]
  fn test_injector_rejects_non_ascii_token() {
    assert!(matches!(
      TokenInjector::new(Some("tök\n")),
      Err(Error::InvalidToken)
    ));
  }

  #[tokio::test]
  async fn test_invalid_endpoint() {
    let options = ClientOptions {
      addr: "not a uri".to_string(),
      ..ClientOptions::default()
    };
    assert!(matches!(
      Client::connect(options).await,
      Err(Error::InvalidEndpoint(_))
    ));
  }
}
