//! Sorting and paging of list results
//!
//! - `sort`: external property name; `order`: `asc` (default) or `desc`
//! - `pageSize`: clamped by [`StrataConfig`]; 0 means unpaged
//! - `page`: 1-based
//! - `offsetId`: selects the page containing that entity, overriding `page`

use crate::config::StrataConfig;
use crate::request::{Request, ResultBody};
use serde_json::Value;
use std::cmp::Ordering;
use strata_core::{
    compare_values, Entity, ErrorBuffer, FrameworkError, PropertyKey, Session, ValidationError,
    ValidationKind,
};
use strata_graph::NodeId;

/// Paging and sorting parameters of one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Property to sort by
    pub sort: Option<String>,
    /// Descending order
    pub descending: bool,
    /// Effective page size (0 = unpaged)
    pub page_size: usize,
    /// Requested page (1-based)
    pub page: usize,
    /// Entity whose page is requested
    pub offset_id: Option<NodeId>,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            sort: None,
            descending: false,
            page_size: 0,
            page: 1,
            offset_id: None,
        }
    }
}

impl PageRequest {
    /// Read paging parameters from a request
    ///
    /// # Errors
    /// Returns [`FrameworkError::Validation`] for non-numeric or zero page
    /// numbers and unknown sort orders
    pub fn from_request(request: &Request, config: &StrataConfig) -> Result<Self, FrameworkError> {
        let mut errors = ErrorBuffer::new();
        let mut invalid = |name: &str, message: String| {
            errors.add(ValidationError::new(
                "request",
                name,
                ValidationKind::InvalidInput(message),
            ));
        };

        let requested_size = match request.param("pageSize").map(str::parse::<usize>) {
            None => None,
            Some(Ok(size)) => Some(size),
            Some(Err(e)) => {
                invalid("pageSize", e.to_string());
                None
            }
        };
        let page = match request.param("page").map(str::parse::<usize>) {
            None => 1,
            Some(Ok(page)) if page >= 1 => page,
            Some(Ok(_)) => {
                invalid("page", "pages are numbered from 1".to_string());
                1
            }
            Some(Err(e)) => {
                invalid("page", e.to_string());
                1
            }
        };
        let descending = match request.param("order").map(str::to_ascii_lowercase).as_deref() {
            None | Some("asc") => false,
            Some("desc") => true,
            Some(other) => {
                invalid("order", format!("unknown sort order '{other}'"));
                false
            }
        };
        errors.into_result()?;

        Ok(Self {
            sort: request.param("sort").map(str::to_string),
            descending,
            page_size: config.clamp_page_size(requested_size),
            page,
            offset_id: request.param("offsetId").map(NodeId::from),
        })
    }

    /// Check if the result is split into pages
    #[inline]
    #[must_use]
    pub fn is_paged(&self) -> bool {
        self.page_size > 0
    }

    /// Sort entities in place by the `sort` property of `type_name`
    ///
    /// Unknown sort properties leave the order unchanged. Sorting is stable;
    /// values that cannot be compared keep their relative order.
    pub fn sort(&self, session: &Session, type_name: &str, entities: &mut [Entity]) {
        let Some(name) = self.sort.as_deref() else {
            return;
        };
        let Some(key) = session.registry().property(type_name, name) else {
            tracing::debug!(sort = name, type_name, "ignoring unknown sort property");
            return;
        };

        let mut keyed: Vec<(Value, Entity)> = entities
            .iter()
            .map(|e| (key.get(session, e).unwrap_or(Value::Null), e.clone()))
            .collect();
        keyed.sort_by(|(a, _), (b, _)| {
            let ordering = compare_values(a, b).unwrap_or(Ordering::Equal);
            if self.descending {
                ordering.reverse()
            } else {
                ordering
            }
        });
        for (slot, (_, entity)) in entities.iter_mut().zip(keyed) {
            *slot = entity;
        }
    }

    /// Cut one page out of sorted entities
    ///
    /// Returns the page's entities and the envelope without `result`.
    #[must_use]
    pub fn paginate(&self, entities: Vec<Entity>) -> (Vec<Entity>, ResultBody) {
        let count = entities.len();
        if !self.is_paged() {
            return (
                entities,
                ResultBody {
                    result: Value::Null,
                    result_count: Some(count),
                    page_count: Some(usize::from(count > 0)),
                    page_size: Some(0),
                    page: Some(1),
                },
            );
        }

        let page = self
            .offset_id
            .as_ref()
            .and_then(|id| entities.iter().position(|e| e.id() == id))
            .map_or(self.page, |index| index / self.page_size + 1);
        let page_count = count.div_ceil(self.page_size);
        let items = entities
            .into_iter()
            .skip((page - 1).saturating_mul(self.page_size))
            .take(self.page_size)
            .collect();

        (
            items,
            ResultBody {
                result: Value::Null,
                result_count: Some(count),
                page_count: Some(page_count),
                page_size: Some(self.page_size),
                page: Some(page),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entities(n: usize) -> Vec<Entity> {
        (0..n)
            .map(|i| Entity::new(NodeId::from(format!("n{i}")), "Thing"))
            .collect()
    }

    fn request(params: &[(&str, &str)]) -> Request {
        params
            .iter()
            .fold(Request::get("/Thing").unwrap(), |r, (k, v)| r.with_param(*k, *v))
    }

    #[test]
    fn defaults_from_config() {
        let page = PageRequest::from_request(&request(&[]), &StrataConfig::default()).unwrap();
        assert_eq!(page.page_size, 20);
        assert_eq!(page.page, 1);
        assert!(!page.descending);
    }

    #[test]
    fn invalid_parameters_collected() {
        let err = PageRequest::from_request(
            &request(&[("pageSize", "x"), ("page", "0"), ("order", "sideways")]),
            &StrataConfig::default(),
        )
        .unwrap_err();
        assert_eq!(err.validation_errors().len(), 3);
    }

    #[test]
    fn paginate_pages() {
        let page = PageRequest {
            page_size: 2,
            page: 2,
            ..PageRequest::default()
        };
        let (items, body) = page.paginate(entities(5));
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id().as_str(), "n2");
        assert_eq!(body.result_count, Some(5));
        assert_eq!(body.page_count, Some(3));
        assert_eq!(body.page, Some(2));
    }

    #[test]
    fn paginate_past_end_is_empty() {
        let page = PageRequest {
            page_size: 2,
            page: 9,
            ..PageRequest::default()
        };
        let (items, body) = page.paginate(entities(3));
        assert!(items.is_empty());
        assert_eq!(body.page_count, Some(2));
    }

    #[test]
    fn offset_id_selects_page() {
        let page = PageRequest {
            page_size: 2,
            offset_id: Some(NodeId::from("n3")),
            ..PageRequest::default()
        };
        let (items, body) = page.paginate(entities(5));
        assert_eq!(body.page, Some(2));
        assert_eq!(items[1].id().as_str(), "n3");
    }

    #[test]
    fn unpaged_returns_everything() {
        let (items, body) = PageRequest::default().paginate(entities(4));
        assert_eq!(items.len(), 4);
        assert_eq!(body.page_count, Some(1));
        assert_eq!(body.page_size, Some(0));
    }
}
