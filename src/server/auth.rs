//! Request validators run before dispatch.
//!
//! A [`ValidatorChain`] is installed as the tonic interceptor of the clerk
//! service. Validators run in order; the first one to fail ends the call with
//! its status, otherwise the filled [`CallContext`] is attached to the request
//! extensions for the handlers to read.

use std::fmt;
use std::sync::Arc;

use tonic::metadata::MetadataMap;
use tonic::service::Interceptor;
use tonic::{Request, Status};
use tracing::warn;

/// Metadata key carrying the caller's token
pub const AUTHORIZATION: &str = "authorization";

/// Token taken from the `authorization` metadata entry
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
  pub fn new(token: impl Into<String>) -> Self {
    Self(token.into())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Debug for AuthToken {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "AuthToken(<{} bytes>)", self.0.len())
  }
}

/// Per-call context filled by the validators
#[derive(Debug, Clone, Default)]
pub struct CallContext {
  pub auth_token: Option<AuthToken>,
}

/// A single stage of the pre-dispatch pipeline
pub trait RequestValidator: Send + Sync + 'static {
  /// Name used in logs
  fn name(&self) -> &'static str;

  /// Pass the call through (possibly filling `ctx`) or reject it
  fn validate(&self, metadata: &MetadataMap, ctx: &mut CallContext) -> Result<(), Status>;
}

/// Requires exactly one well-formed `authorization` entry
///
/// The token is only extracted, never checked against credentials.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthorizationValidator;

impl RequestValidator for AuthorizationValidator {
  fn name(&self) -> &'static str {
    "authorization"
  }

  fn validate(&self, metadata: &MetadataMap, ctx: &mut CallContext) -> Result<(), Status> {
    let mut values = metadata.get_all(AUTHORIZATION).iter();

    let value = values
      .next()
      .ok_or_else(|| Status::unauthenticated("missing authorization token"))?;
    if values.next().is_some() {
      return Err(Status::unauthenticated("multiple authorization tokens"));
    }

    let token = value
      .to_str()
      .ok()
      .filter(|t| !t.is_empty())
      .ok_or_else(|| Status::unauthenticated("malformed authorization token"))?;

    ctx.auth_token = Some(AuthToken::new(token));
    Ok(())
  }
}

/// Ordered list of validators, usable as a tonic interceptor
#[derive(Clone, Default)]
pub struct ValidatorChain {
  validators: Arc<Vec<Box<dyn RequestValidator>>>,
}

impl ValidatorChain {
  pub fn new(validators: Vec<Box<dyn RequestValidator>>) -> Self {
    Self {
      validators: Arc::new(validators),
    }
  }

  /// The chain used by the server: empty unless auth is enabled
  pub fn for_auth(enabled: bool) -> Self {
    let mut validators: Vec<Box<dyn RequestValidator>> = Vec::new();
    if enabled {
      validators.push(Box::new(AuthorizationValidator));
    }
    Self::new(validators)
  }

  pub fn len(&self) -> usize {
    self.validators.len()
  }

  pub fn is_empty(&self) -> bool {
    self.validators.is_empty()
  }

  /// Run every validator against `metadata`
  pub fn run(&self, metadata: &MetadataMap) -> Result<CallContext, Status> {
    let mut ctx = CallContext::default();
    for validator in self.validators.iter() {
      if let Err(status) = validator.validate(metadata, &mut ctx) {
        warn!(
          validator = validator.name(),
          code = ?status.code(),
          "rejected call: {}",
          status.message()
        );
        return Err(status);
      }
    }
    Ok(ctx)
  }
}

impl Interceptor for ValidatorChain {
  fn call(&mut self, mut request: Request<()>) -> Result<Request<()>, Status> {
    let ctx = self.run(request.metadata())?;
    request.extensions_mut().insert(ctx);
    Ok(request)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tonic::Code;
  use tonic::metadata::MetadataValue;

  fn request_with_tokens(tokens: &[&'static str]) -> Request<()> {
    let mut req = Request::new(());
    for token in tokens {
      req
        .metadata_mut()
        .append(AUTHORIZATION, MetadataValue::from_static(*token));
    }
    req
  }

  #[test]
  fn test_missing_token_is_rejected() {
    let mut chain = ValidatorChain::for_auth(true);
    let status = chain.call(request_with_tokens(&[])).unwrap_err();
    assert_eq!(status.code(), Code::Unauthenticated);
    assert_eq!(status.message(), "missing authorization token");
  }

  #[test]
  fn test_single_token_is_admitted() {
    let mut chain = ValidatorChain::for_auth(true);
    let req = chain.call(request_with_tokens(&["Bearer abc"])).unwrap();
    let ctx = req.extensions().get::<CallContext>().unwrap();
    assert_eq!(ctx.auth_token, Some(AuthToken::new("Bearer abc")));
  }

  #[test]
  fn test_multiple_tokens_are_rejected() {
    let mut chain = ValidatorChain::for_auth(true);
    let status = chain.call(request_with_tokens(&["a", "b"])).unwrap_err();
    assert_eq!(status.code(), Code::Unauthenticated);
    assert_eq!(status.message(), "multiple authorization tokens");
  }

  #[test]
  fn test_empty_token_is_rejected() {
    let mut chain = ValidatorChain::for_auth(true);
    let status = chain.call(request_with_tokens(&[""])).unwrap_err();
    assert_eq!(status.code(), Code::Unauthenticated);
    assert_eq!(status.message(), "malformed authorization token");
  }

  #[test]
  fn test_disabled_chain_passes_everything() {
    let mut chain = ValidatorChain::for_auth(false);
    assert!(chain.is_empty());
    let req = chain.call(request_with_tokens(&["a", "b"])).unwrap();
    let ctx = req.extensions().get::<CallContext>().unwrap();
    assert!(ctx.auth_token.is_none());
  }

  struct Deny;

  impl RequestValidator for Deny {
    fn name(&self) -> &'static str {
      "deny"
    }

    fn validate(&self, _: &MetadataMap, _: &mut CallContext) -> Result<(), Status> {
      Err(Status::permission_denied("denied"))
    }
  }

  #[test]
  fn test_validators_run_in_order() {
    let validators: Vec<Box<dyn RequestValidator>> =
      vec![Box::new(AuthorizationValidator), Box::new(Deny)];
    let chain = ValidatorChain::new(validators);
    assert_eq!(chain.len(), 2);

    // the first failure wins
    let status = chain.run(&MetadataMap::new()).unwrap_err();
    assert_eq!(status.code(), Code::Unauthenticated);

    let status = chain
      .run(request_with_tokens(&["t"]).metadata())
      .unwrap_err();
    assert_eq!(status.code(), Code::PermissionDenied);
  }

  #[test]
  fn test_token_debug_is_redacted() {
    let token = AuthToken::new("secret");
    assert_eq!(format!("{:?}", token), "AuthToken(<6 bytes>)");
  }
}
