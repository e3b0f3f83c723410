//! Verb execution per resource kind
//!
//! | kind | GET/HEAD | POST | PUT | DELETE |
//! |---|---|---|---|---|
//! | `Type` | paged list | create | - | delete matches |
//! | `Id`, `TypedId` | entity | - | update | delete |
//! | `Relationship` | paged list | create and link | - | - |
//! | `RelatedId` | entity | - | update | unlink |
//! | `ViewFilter` | as inner | as inner | as inner | as inner |
//! | `Schema`, `SchemaType` | description | - | - | - |
//!
//! `OPTIONS` is answered for every kind; `PATCH` never is.

use super::Resource;
use crate::config::StrataConfig;
use crate::paging::PageRequest;
use crate::request::{Method, Request, Response, ResultBody};
use serde_json::{Map, Value};
use strata_core::{
    naming, Entity, FrameworkError, PropertyRef, SchemaIntrospector, SearchAttribute,
    Session,
};

/// Everything a verb needs besides the resource
#[derive(Debug, Clone, Copy)]
pub(crate) struct RequestContext<'a> {
    pub(crate) session: &'a Session,
    pub(crate) config: &'a StrataConfig,
    pub(crate) introspector: &'a SchemaIntrospector,
    pub(crate) request: &'a Request,
}

impl RequestContext<'_> {
    /// View requested by query parameter or configuration
    fn view<'v>(&'v self, explicit: Option<&'v str>) -> &'v str {
        explicit
            .or_else(|| self.request.param("view"))
            .unwrap_or(&self.config.default_view)
    }

    fn loose(&self) -> bool {
        self.request
            .param(&self.config.loose_search_param)
            .is_some_and(|v| matches!(v, "1" | "true" | "yes"))
    }

    fn body(&self) -> Map<String, Value> {
        self.request.body.clone().unwrap_or_default()
    }
}

impl Resource {
    /// Verbs this resource accepts
    #[must_use]
    pub fn allowed_methods(&self) -> Vec<Method> {
        use Method::{Delete, Get, Head, Options, Post, Put};
        match self {
            Self::Type { .. } => vec![Get, Head, Options, Post, Delete],
            Self::Id { .. } | Self::TypedId { .. } | Self::RelatedId { .. } => {
                vec![Get, Head, Options, Put, Delete]
            }
            Self::Relationship { .. } => vec![Get, Head, Options, Post],
            Self::ViewFilter { inner, .. } => inner.allowed_methods(),
            Self::Schema | Self::SchemaType { .. } => vec![Get, Head, Options],
            Self::View { .. } => vec![Options],
        }
    }

    /// Execute a verb
    pub(crate) fn execute(&self, ctx: &RequestContext<'_>) -> Result<Response, FrameworkError> {
        let method = ctx.request.method;
        if !self.allowed_methods().contains(&method) {
            return Err(FrameworkError::unsupported(method.as_str(), self.to_string()));
        }
        match method {
            Method::Get => self.read(ctx, None).map(Response::ok),
            Method::Head => self.read(ctx, None).map(|_| Response::empty()),
            Method::Options => {
                let allow: Vec<&str> = self
                    .allowed_methods()
                    .into_iter()
                    .map(Method::as_str)
                    .collect();
                Ok(Response::empty().with_header("Allow", allow.join(", ")))
            }
            Method::Post => self.create(ctx),
            Method::Put => self.update(ctx).map(|()| Response::empty()),
            Method::Delete => self.delete(ctx).map(|()| Response::empty()),
            Method::Patch => Err(FrameworkError::unsupported(method.as_str(), self.to_string())),
        }
    }

    fn read(
        &self,
        ctx: &RequestContext<'_>,
        view: Option<&str>,
    ) -> Result<ResultBody, FrameworkError> {
        let session = ctx.session;
        match self {
            Self::Type { type_name, .. } => {
                let entities = session.entities_of_type(type_name);
                list(ctx, type_name, entities, view)
            }
            Self::Relationship { related_type, .. } => {
                let (source, key) = self.source_and_key(session)?;
                let related = relation_targets(session, &key, &source)?;
                list(ctx, related_type, related, view)
            }
            Self::Id { .. } | Self::TypedId { .. } | Self::RelatedId { .. } => {
                let entity = self.single_entity(session)?;
                let view = ctx.view(view);
                Ok(ResultBody::single(Value::Object(session.read_view(&entity, view)?)))
            }
            Self::ViewFilter { inner, view } => inner.read(ctx, Some(view)),
            Self::Schema => {
                let summaries = ctx.introspector.summaries(session);
                let count = summaries.len();
                Ok(ResultBody {
                    result: to_value("_schema", &summaries)?,
                    result_count: Some(count),
                    ..ResultBody::default()
                })
            }
            Self::SchemaType { type_name } => {
                let snapshot = ctx.introspector.snapshot(session, type_name)?;
                Ok(ResultBody::single(to_value(type_name, &snapshot)?))
            }
            Self::View { .. } => Err(FrameworkError::IllegalPath(self.to_string())),
        }
    }

    fn create(&self, ctx: &RequestContext<'_>) -> Result<Response, FrameworkError> {
        let session = ctx.session;
        match self {
            Self::Type { type_name, .. } => {
                let entity = session.create_entity(type_name, &ctx.body())?;
                Ok(Response::created(location(&entity)))
            }
            Self::Relationship { related_type, .. } => {
                let (source, key) = self.source_and_key(session)?;
                let mut body = ctx.body();
                let type_name = concrete_type(session, related_type, &body)?;
                body.remove("type");
                let target = session.create_related(&source, key.as_ref(), &type_name, &body)?;
                Ok(Response::created(location(&target)))
            }
            Self::ViewFilter { inner, .. } => inner.create(ctx),
            _ => Err(FrameworkError::unsupported(Method::Post.as_str(), self.to_string())),
        }
    }

    fn update(&self, ctx: &RequestContext<'_>) -> Result<(), FrameworkError> {
        match self {
            Self::Id { .. } | Self::TypedId { .. } | Self::RelatedId { .. } => {
                let entity = self.single_entity(ctx.session)?;
                ctx.session.set_properties(&entity, &ctx.body())
            }
            Self::ViewFilter { inner, .. } => inner.update(ctx),
            _ => Err(FrameworkError::unsupported(Method::Put.as_str(), self.to_string())),
        }
    }

    fn delete(&self, ctx: &RequestContext<'_>) -> Result<(), FrameworkError> {
        let session = ctx.session;
        match self {
            Self::Type { type_name, .. } => {
                let matches = search(ctx, type_name, session.entities_of_type(type_name))?;
                tracing::info!(type_name, count = matches.len(), "deleting matching entities");
                for entity in &matches {
                    session.delete_entity(entity)?;
                }
                Ok(())
            }
            Self::Id { .. } | Self::TypedId { .. } => {
                let entity = self.single_entity(session)?;
                session.delete_entity(&entity)
            }
            Self::RelatedId { id, .. } => {
                let (source, key) = self.source_and_key(session)?;
                let related = relation_targets(session, &key, &source)?;
                if !related.iter().any(|e| e.id() == id) {
                    return Err(FrameworkError::NotFound(self.to_string()));
                }
                let remaining = related
                    .into_iter()
                    .filter(|e| e.id() != id)
                    .map(|e| e.id().clone())
                    .collect();
                session.link(&source, key.as_ref(), remaining)
            }
            Self::ViewFilter { inner, .. } => inner.delete(ctx),
            _ => Err(FrameworkError::unsupported(Method::Delete.as_str(), self.to_string())),
        }
    }

    /// The entity addressed by a single-entity resource
    fn single_entity(&self, session: &Session) -> Result<Entity, FrameworkError> {
        match self {
            Self::Id { id } => session.entity(id),
            Self::TypedId { type_name, id } => session.entity_of_type(id, type_name),
            Self::RelatedId { id, .. } => {
                let (source, key) = self.source_and_key(session)?;
                relation_targets(session, &key, &source)?
                    .into_iter()
                    .find(|e| e.id() == id)
                    .ok_or_else(|| FrameworkError::NotFound(self.to_string()))
            }
            Self::ViewFilter { inner, .. } => inner.single_entity(session),
            _ => Err(FrameworkError::IllegalPath(self.to_string())),
        }
    }

    /// Source entity and relationship property of a relationship resource
    fn source_and_key(&self, session: &Session) -> Result<(Entity, PropertyRef), FrameworkError> {
        let (source_type, source, property) = match self {
            Self::Relationship {
                source_type,
                source,
                property,
                ..
            }
            | Self::RelatedId {
                source_type,
                source,
                property,
                ..
            } => (source_type, source, property),
            _ => return Err(FrameworkError::IllegalPath(self.to_string())),
        };
        let entity = session.entity_of_type(source, source_type)?;
        let key = session.property(source_type, property)?;
        Ok((entity, key))
    }
}

/// Filter, sort, page and project a list of entities
fn list(
    ctx: &RequestContext<'_>,
    type_name: &str,
    entities: Vec<Entity>,
    view: Option<&str>,
) -> Result<ResultBody, FrameworkError> {
    let session = ctx.session;
    let page = PageRequest::from_request(ctx.request, ctx.config)?;
    let mut matches = search(ctx, type_name, entities)?;
    page.sort(session, type_name, &mut matches);
    let (items, mut body) = page.paginate(matches);

    let view = ctx.view(view);
    let rows = items
        .iter()
        .map(|entity| session.read_view(entity, view).map(Value::Object))
        .collect::<Result<Vec<_>, _>>()?;
    tracing::debug!(type_name, view, count = rows.len(), "read page");

    body.result = Value::Array(rows);
    Ok(body)
}

/// Entities matching the request's search parameters
fn search(
    ctx: &RequestContext<'_>,
    type_name: &str,
    entities: Vec<Entity>,
) -> Result<Vec<Entity>, FrameworkError> {
    let loose_param = ctx.config.loose_search_param.as_str();
    let params = ctx
        .request
        .params
        .iter()
        .filter(|(name, _)| name.as_str() != loose_param);
    let attributes = SearchAttribute::extract(ctx.session, type_name, params, ctx.loose())?;
    if attributes.is_empty() {
        return Ok(entities);
    }
    Ok(entities
        .into_iter()
        .filter(|e| SearchAttribute::matches_all(&attributes, ctx.session, e))
        .collect())
}

/// Entities currently reached through a relationship property
fn relation_targets(
    session: &Session,
    key: &PropertyRef,
    source: &Entity,
) -> Result<Vec<Entity>, FrameworkError> {
    let relation = key.relation().ok_or_else(|| {
        FrameworkError::IllegalPath(format!(
            "{}.{} is not a relationship",
            source.type_name(),
            key.external_name()
        ))
    })?;
    let mut related = relation.related(session, source)?;
    if !key.is_collection() {
        related.truncate(1);
    }
    Ok(related)
}

/// Concrete type to instantiate for a relationship target
///
/// A body `type` naming a subtype of `related_type` wins.
fn concrete_type(
    session: &Session,
    related_type: &str,
    body: &Map<String, Value>,
) -> Result<String, FrameworkError> {
    let Some(requested) = body.get("type").and_then(Value::as_str) else {
        return Ok(related_type.to_string());
    };
    let registry = session.registry();
    match registry.resolve_type_name(requested) {
        Some(type_name) if registry.is_subtype(&type_name, related_type) => Ok(type_name),
        Some(type_name) => Err(FrameworkError::IllegalPath(format!(
            "{type_name} is not a {related_type}"
        ))),
        None => Err(FrameworkError::UnknownType(requested.to_string())),
    }
}

fn location(entity: &Entity) -> String {
    format!("{}/{}", naming::type_url(entity.type_name()), entity.id())
}

fn to_value<T: serde::Serialize>(context: &str, value: &T) -> Result<Value, FrameworkError> {
    serde_json::to_value(value)
        .map_err(|e| FrameworkError::data_integrity(context, "schema", e.to_string()))
}
