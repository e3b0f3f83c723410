//! Strata REST - resource resolution over the entity framework
//!
//! Maps request paths onto typed entity operations:
//! - Paths are split into segments and instantiated as [`Resource`]s
//! - Adjacent resources fold through a [`CombinationRules`] table into one
//!   executable resource (`/Person/123/owns/f1/ui`)
//! - The resolved resource checks the verb and runs it against a
//!   per-request [`Session`](strata_core::Session)
//! - Lists are searched, sorted and paged with [`PageRequest`]
//!
//! # Example
//!
//! ```rust
//! use strata_rest::{Request, RestService, StrataConfig, StrataFixture};
//!
//! let fixture = StrataFixture::from_json(r#"{
//!     "schema": { "types": [{ "name": "Company" }] },
//!     "graph": { "nodes": [{ "id": "acme", "type": "Company", "properties": { "name": "Acme" } }] }
//! }"#).unwrap();
//! let session = fixture.into_session().unwrap();
//!
//! let service = RestService::new(StrataConfig::default());
//! let response = service.handle(&session, &Request::get("/companies").unwrap()).unwrap();
//! assert_eq!(response.status, 200);
//! assert_eq!(response.body.unwrap().result_count, Some(1));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod config;
pub mod error;
pub mod fixture;
pub mod paging;
pub mod path;
pub mod request;
pub mod resolver;
pub mod resource;
pub mod service;

pub use config::StrataConfig;
pub use error::RestError;
pub use fixture::StrataFixture;
pub use paging::PageRequest;
pub use path::{PathError, ResourcePath};
pub use request::{Method, Request, Response, ResultBody};
pub use resolver::ChainResolver;
pub use resource::{CombinationRules, Combiner, Resource, ResourceKind, SCHEMA_SEGMENT};
pub use service::RestService;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
