use std::sync::Arc;

use async_trait::async_trait;
use tonic::{Request, Response, Status};
use tracing::{debug, error};

use crate::proto::clerk_service_server::ClerkService;
use crate::proto::{
  AppendRequest, AppendResponse, GetRequest, GetResponse, PutRequest, PutResponse,
};
use crate::server::auth::CallContext;
use crate::store::{Store, StoreError};

impl From<StoreError> for Status {
  fn from(err: StoreError) -> Self {
    match err {
      StoreError::InvalidArgument(msg) => Status::invalid_argument(msg),
      StoreError::Poisoned => {
        error!("store lock poisoned");
        Status::internal(StoreError::Poisoned.to_string())
      }
    }
  }
}

/// Dispatches decoded clerk calls to the store
#[derive(Clone)]
pub struct KvService {
  store: Arc<Store>,
}

impl KvService {
  pub fn new(store: Arc<Store>) -> Self {
    Self { store }
  }

  pub fn store(&self) -> &Arc<Store> {
    &self.store
  }
}

/// Context attached by the validator chain; empty when the service is called
/// without the interceptor
fn call_context<T>(request: &Request<T>) -> CallContext {
  request
    .extensions()
    .get::<CallContext>()
    .cloned()
    .unwrap_or_default()
}

#[async_trait]
impl ClerkService for KvService {
  async fn put(&self, request: Request<PutRequest>) -> Result<Response<PutResponse>, Status> {
    let ctx = call_context(&request);
    let req = request.into_inner();
    debug!(key = %req.key, token = ?ctx.auth_token, "put");

    self.store.put(&req.key, req.value)?;
    Ok(Response::new(PutResponse {}))
  }

  async fn get(&self, request: Request<GetRequest>) -> Result<Response<GetResponse>, Status> {
    let ctx = call_context(&request);
    let req = request.into_inner();
    debug!(key = %req.key, token = ?ctx.auth_token, "get");

    let value = self.store.get(&req.key)?;
    Ok(Response::new(GetResponse { value }))
  }

  async fn append(
    &self,
    request: Request<AppendRequest>,
  ) -> Result<Response<AppendResponse>, Status> {
    let ctx = call_context(&request);
    let req = request.into_inner();
    debug!(key = %req.key, token = ?ctx.auth_token, "append");

    let old_value = self.store.append(&req.key, &req.arg)?;
    Ok(Response::new(AppendResponse { old_value }))
  }
}
