//! Capabilities an endpoint client can have.
//!
//! # Design
//! Each capability is a trait with a default implementation on top of the
//! request executor. A concrete client only says where its resource lives
//! (`Endpoint`), what it decodes into (`EntityEndpoint`), and which
//! capabilities it implements; the empty `impl` blocks are the whole
//! declaration. Every capability goes through `RequestExecutor::expand` and
//! serde, so the expand-depth and discriminator rules hold for all of them.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::client::ApiClient;
use crate::error::{Error, Result};
use crate::request::{validate_expand, RequestExecutor};
use crate::responses::{AttributeMetadata, ListEntity};

/// A resource collection of the API.
pub trait Endpoint {
    fn api(&self) -> &ApiClient;

    /// Resource path with a trailing slash, e.g. `/entity/contract/`.
    fn path(&self) -> &'static str;
}

/// An endpoint whose rows are `Entity`.
pub trait EntityEndpoint: Endpoint {
    type Entity: Serialize + DeserializeOwned;

    /// First segments of the expand paths the resource supports. Empty means
    /// the resource does not restrict them.
    fn expandable(&self) -> &'static [&'static str] {
        &[]
    }

    /// Validates depth and, when `expandable` is set, the root field of every path.
    fn check_expand<S: AsRef<str>>(&self, paths: &[S]) -> Result<()> {
        let allowed = self.expandable();
        for path in paths {
            let path = path.as_ref().trim();
            validate_expand(path)?;
            let root = path.split('.').next().unwrap_or_default();
            if !allowed.is_empty() && !allowed.contains(&root) {
                return Err(Error::ExpandNotAllowed {
                    path: path.to_string(),
                    endpoint: self.path().to_string(),
                });
            }
        }
        Ok(())
    }
}

/// `GET {path}`: one page of entities.
pub trait GetListEndpoint: EntityEndpoint {
    fn list(&self, params: &ListParams) -> Result<ListEntity<Self::Entity>> {
        self.check_expand(params.expand.as_slice())?;
        params.apply(self.api().path(self.path()))?.list()
    }
}

/// `GET {path}{id}`.
pub trait GetByIdEndpoint: EntityEndpoint {
    fn get(&self, id: Uuid, expand: &[&str]) -> Result<Self::Entity> {
        self.check_expand(expand)?;
        self.api()
            .path(&format!("{}{id}", self.path()))
            .expand(expand)?
            .get_as()
    }
}

/// `POST {path}`: creates an entity and returns it as stored.
pub trait PostEndpoint: EntityEndpoint {
    fn post(&self, entity: &Self::Entity) -> Result<Self::Entity> {
        self.api().path(self.path()).body(entity)?.post_as()
    }
}

/// `PUT {path}{id}`: updates the fields present in `entity`.
pub trait PutByIdEndpoint: EntityEndpoint {
    fn put(&self, id: Uuid, entity: &Self::Entity) -> Result<Self::Entity> {
        self.api()
            .path(&format!("{}{id}", self.path()))
            .body(entity)?
            .put_as()
    }
}

/// `DELETE {path}{id}`.
pub trait DeleteByIdEndpoint: Endpoint {
    fn delete(&self, id: Uuid) -> Result<()> {
        self.api().path(&format!("{}{id}", self.path())).delete()
    }
}

/// `GET {path}metadata`.
pub trait MetadataEndpoint: Endpoint {
    type Metadata: DeserializeOwned;

    fn metadata(&self) -> Result<Self::Metadata> {
        self.api()
            .path(&format!("{}metadata", self.path()))
            .get_as()
    }
}

/// `GET {path}metadata/attributes/{id}`.
pub trait MetadataAttributeEndpoint: Endpoint {
    fn metadata_attribute(&self, id: Uuid) -> Result<AttributeMetadata> {
        self.api()
            .path(&format!("{}metadata/attributes/{id}", self.path()))
            .get_as()
    }
}

/// Comparison in a `filter` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    /// Substring match.
    Like,
}

impl FilterOp {
    fn as_str(self) -> &'static str {
        match self {
            FilterOp::Eq => "=",
            FilterOp::Ne => "!=",
            FilterOp::Gt => ">",
            FilterOp::Ge => ">=",
            FilterOp::Lt => "<",
            FilterOp::Le => "<=",
            FilterOp::Like => "~",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
    pub value: String,
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.field, self.op.as_str(), self.value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

/// Paging, filtering, sorting and expansion of a list request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListParams {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub search: Option<String>,
    pub filters: Vec<Filter>,
    pub order: Vec<(String, Direction)>,
    pub expand: Vec<String>,
}

impl ListParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    pub fn filter(mut self, field: impl Into<String>, op: FilterOp, value: impl ToString) -> Self {
        self.filters.push(Filter {
            field: field.into(),
            op,
            value: value.to_string(),
        });
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order.push((field.into(), direction));
        self
    }

    pub fn expand(mut self, path: impl Into<String>) -> Self {
        self.expand.push(path.into());
        self
    }

    /// Writes the parameters into `request`.
    pub fn apply<'a>(&self, mut request: RequestExecutor<'a>) -> Result<RequestExecutor<'a>> {
        if let Some(limit) = self.limit {
            request = request.query("limit", limit);
        }
        if let Some(offset) = self.offset {
            request = request.query("offset", offset);
        }
        if let Some(search) = &self.search {
            request = request.query("search", search);
        }
        if !self.filters.is_empty() {
            let filter: Vec<String> = self.filters.iter().map(Filter::to_string).collect();
            request = request.query("filter", filter.join(";"));
        }
        if !self.order.is_empty() {
            let order: Vec<String> = self
                .order
                .iter()
                .map(|(field, direction)| match direction {
                    Direction::Asc => field.clone(),
                    Direction::Desc => format!("{field},desc"),
                })
                .collect();
            request = request.query("order", order.join(";"));
        }
        request.expand(&self.expand)
    }
}
