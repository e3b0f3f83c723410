//! Request handling
//!
//! [`RestService`] is the aggregation boundary between requests and the
//! entity framework: it resolves the path, checks the verb and runs it
//! against a per-request [`Session`].

use crate::config::StrataConfig;
use crate::request::{Request, Response};
use crate::resolver::ChainResolver;
use crate::resource::RequestContext;
use strata_core::{FrameworkError, SchemaIntrospector, Session};

/// Resolves and executes requests
#[derive(Debug, Clone, Default)]
pub struct RestService {
    config: StrataConfig,
    resolver: ChainResolver,
    introspector: SchemaIntrospector,
}

impl RestService {
    /// Service with the standard combination rules
    #[must_use]
    pub fn new(config: StrataConfig) -> Self {
        Self {
            config,
            resolver: ChainResolver::new(),
            introspector: SchemaIntrospector::default(),
        }
    }

    /// With a custom resolver
    #[inline]
    #[must_use]
    pub fn with_resolver(mut self, resolver: ChainResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Service configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &StrataConfig {
        &self.config
    }

    /// Path resolver
    #[inline]
    #[must_use]
    pub fn resolver(&self) -> &ChainResolver {
        &self.resolver
    }

    /// Handle one request
    ///
    /// # Errors
    /// Returns the request-level [`FrameworkError`]; its
    /// [`status`](FrameworkError::status) is the response status
    pub fn handle(&self, session: &Session, request: &Request) -> Result<Response, FrameworkError> {
        let resource = self.resolver.resolve(session, &request.path)?;
        let ctx = RequestContext {
            session,
            config: &self.config,
            introspector: &self.introspector,
            request,
        };

        let result = resource.execute(&ctx);
        let (method, path) = (request.method, &request.path);
        match &result {
            Ok(response) => {
                tracing::debug!(%method, %path, status = response.status, "handled request");
            }
            Err(error) if error.is_client_error() => {
                tracing::debug!(%method, %path, %error, "rejected request");
            }
            Err(error) => tracing::warn!(%method, %path, %error, "request failed"),
        }
        result
    }
}
