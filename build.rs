//! Generates the `clerk.ClerkService` server and client stubs.
//!
//! The messages live in `src/proto.rs` as prost derives, so only the service
//! glue is generated here and no `protoc` is needed at build time.

use tonic_build::manual::{Builder, Method, Service};

fn method(name: &str, route_name: &str, message: &str) -> Method {
  Method::builder()
    .name(name)
    .route_name(route_name)
    .input_type(format!("crate::proto::{}Request", message))
    .output_type(format!("crate::proto::{}Response", message))
    .codec_path("tonic::codec::ProstCodec")
    .build()
}

fn main() {
  println!("cargo:rerun-if-changed=build.rs");

  let service = Service::builder()
    .name("ClerkService")
    .package("clerk")
    .method(method("put", "Put", "Put"))
    .method(method("get", "Get", "Get"))
    .method(method("append", "Append", "Append"))
    .build();

  Builder::new().compile(&[service]);
}
