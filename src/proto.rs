//! Wire types for the `clerk.ClerkService` gRPC service.
//!
//! Messages are declared with prost derives; the service stubs are generated
//! by `build.rs` and included below.

/// Put request: store `value` under `key`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PutRequest {
  #[prost(string, tag = "1")]
  pub key: String,
  #[prost(string, tag = "2")]
  pub value: String,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct PutResponse {}

/// Get request: read the value stored under `key`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetRequest {
  #[prost(string, tag = "1")]
  pub key: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetResponse {
  #[prost(string, tag = "1")]
  pub value: String,
}

/// Append request: concatenate `arg` to the value under `key`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AppendRequest {
  #[prost(string, tag = "1")]
  pub key: String,
  #[prost(string, tag = "2")]
  pub arg: String,
}

/// Carries the value that was present before the append.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AppendResponse {
  #[prost(string, tag = "1")]
  pub old_value: String,
}

include!(concat!(env!("OUT_DIR"), "/clerk.ClerkService.rs"));
