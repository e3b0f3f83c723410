//! Resource chain resolution
//!
//! Turns a [`ResourcePath`] into one executable [`Resource`]:
//! 1. Instantiate one resource per segment
//! 2. Fold adjacent pairs left to right through the [`CombinationRules`];
//!    a merge replaces the pair and is retried against the next neighbor
//! 3. Repeat full passes until a pass merges nothing
//!
//! Every merge shrinks the chain by one, so there are at most `len - 1`
//! merges and the fold always terminates. A chain that does not fold down
//! to a single executable resource is an illegal path.

use crate::path::ResourcePath;
use crate::resource::{CombinationRules, Resource};
use strata_core::{FrameworkError, RegistrySnapshot, Session};

/// Resolves request paths through a combination rule table
#[derive(Debug, Clone)]
pub struct ChainResolver {
    rules: CombinationRules,
}

impl ChainResolver {
    /// Resolver with the standard rules
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_rules(CombinationRules::standard())
    }

    /// Resolver with a custom rule table
    #[inline]
    #[must_use]
    pub fn with_rules(rules: CombinationRules) -> Self {
        Self { rules }
    }

    /// The rule table
    #[inline]
    #[must_use]
    pub fn rules(&self) -> &CombinationRules {
        &self.rules
    }

    /// Resolve a path into a single resource
    ///
    /// # Errors
    /// - [`FrameworkError::UnknownType`] if the first segment names nothing
    /// - [`FrameworkError::IllegalPath`] if the path is empty or does not
    ///   fold into one executable resource
    pub fn resolve(
        &self,
        session: &Session,
        path: &ResourcePath,
    ) -> Result<Resource, FrameworkError> {
        if path.is_empty() {
            return Err(FrameworkError::IllegalPath(path.to_string()));
        }

        let chain = Self::instantiate(session, path)?;
        let registry = session.registry().snapshot();
        let mut folded = self.fold(&registry, chain);

        match folded.len() {
            1 => {
                let resource = folded.remove(0);
                if !resource.is_executable() {
                    return Err(FrameworkError::IllegalPath(path.to_string()));
                }
                tracing::debug!(%path, %resource, "resolved path");
                Ok(resource)
            }
            links => {
                tracing::debug!(%path, links, "path did not fold into one resource");
                Err(FrameworkError::IllegalPath(path.to_string()))
            }
        }
    }

    /// One resource per path segment
    ///
    /// # Errors
    /// Returns [`FrameworkError::UnknownType`] if the first segment names
    /// nothing
    pub fn instantiate(
        session: &Session,
        path: &ResourcePath,
    ) -> Result<Vec<Resource>, FrameworkError> {
        path.iter()
            .enumerate()
            .map(|(position, segment)| Resource::instantiate(session, position, segment))
            .collect()
    }

    /// Fold a chain until no adjacent pair combines
    #[must_use]
    pub fn fold(&self, registry: &RegistrySnapshot, mut chain: Vec<Resource>) -> Vec<Resource> {
        loop {
            let mut merged_any = false;
            let mut i = 0;
            while i + 1 < chain.len() {
                match self.rules.combine(registry, &chain[i], &chain[i + 1]) {
                    Some(merged) => {
                        chain[i] = merged;
                        chain.remove(i + 1);
                        merged_any = true;
                    }
                    None => i += 1,
                }
            }
            if !merged_any {
                return chain;
            }
        }
    }
}

impl Default for ChainResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_graph::NodeId;
    use strata_test_utils::{seeded_session, ALICE};

    fn resolve(path: &str) -> Result<Resource, FrameworkError> {
        let session = seeded_session();
        ChainResolver::new().resolve(&session, &path.parse().unwrap())
    }

    #[test]
    fn single_type() {
        assert_eq!(
            resolve("/Person").unwrap(),
            Resource::Type {
                raw: "Person".into(),
                type_name: "Person".into()
            }
        );
    }

    #[test]
    fn typed_relationship_chain() {
        let resource = resolve(&format!("/people/{ALICE}/owns/f1/ui")).unwrap();
        let Resource::ViewFilter { inner, view } = resource else {
            panic!("expected a view filter");
        };
        assert_eq!(view, "ui");
        assert_eq!(
            *inner,
            Resource::RelatedId {
                source_type: "Person".into(),
                source: NodeId::from(ALICE),
                property: "owns".into(),
                related_type: "File".into(),
                id: NodeId::from("f1"),
            }
        );
    }

    #[test]
    fn nested_relationship_from_related_entity() {
        let resource = resolve(&format!("/Person/{ALICE}/owns/f1/owner")).unwrap();
        assert!(matches!(
            resource,
            Resource::Relationship { ref source_type, ref property, .. }
                if source_type == "File" && property == "owner"
        ));
    }

    #[test]
    fn schema_paths() {
        assert_eq!(resolve("/_schema").unwrap(), Resource::Schema);
        assert_eq!(
            resolve("/_schema/person").unwrap(),
            Resource::SchemaType {
                type_name: "Person".into()
            }
        );
    }

    #[test]
    fn unknown_first_segment() {
        assert!(matches!(resolve("/Planet"), Err(FrameworkError::UnknownType(_))));
    }

    #[test]
    fn unfoldable_paths() {
        assert!(matches!(resolve("/"), Err(FrameworkError::IllegalPath(_))));
        assert!(matches!(
            resolve(&format!("/Person/{ALICE}/age")),
            Err(FrameworkError::IllegalPath(_))
        ));
        assert!(matches!(resolve("/public"), Err(FrameworkError::IllegalPath(_))));
        assert!(matches!(resolve("/Person/File"), Err(FrameworkError::IllegalPath(_))));
    }
}
