//! Response envelopes: lists, errors and entity metadata.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{Meta, MetaEntity};

/// A page of entities in the server's order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListEntity<T> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Context>,
    pub meta: Meta,
    #[serde(default = "Vec::new")]
    pub rows: Vec<T>,
}

impl<T> ListEntity<T> {
    /// Total number of entities matching the request, across all pages.
    pub fn size(&self) -> Option<u64> {
        self.meta.size
    }

    pub fn limit(&self) -> Option<u64> {
        self.meta.limit
    }

    pub fn offset(&self) -> Option<u64> {
        self.meta.offset
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.rows.iter()
    }
}

impl<T> IntoIterator for ListEntity<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a ListEntity<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Who made the request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee: Option<MetaEntity>,
}

/// Body of every non-success response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub errors: Vec<ApiErrorDetail>,
}

/// One error reported by the API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorDetail {
    /// Human-readable message; some descriptors carry only a code.
    #[serde(default)]
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub more_info: Option<String>,
    /// Request parameter or field the error refers to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<i32>,
}

/// Metadata of an entity kind with additional fields, shared flag and states.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataAttributeSharedStatesResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
    #[serde(default)]
    pub attributes: Vec<AttributeMetadata>,
    #[serde(default)]
    pub states: Vec<StateMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_shared: Option<bool>,
}

/// Description of one additional field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub attribute_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A workflow state of documents of one kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Country;

    #[test]
    fn list_keeps_server_order_and_paging() {
        let list: ListEntity<Country> = serde_json::from_str(
            r#"{
                "context": {"employee": {"meta": {"href": "https://host/context/employee", "type": "employee"}}},
                "meta": {"href": "https://host/entity/country", "type": "country", "size": 250, "limit": 2, "offset": 10},
                "rows": [{"name": "Россия"}, {"name": "Австралия"}]
            }"#,
        )
        .unwrap();
        assert_eq!(list.size(), Some(250));
        assert_eq!(list.limit(), Some(2));
        assert_eq!(list.offset(), Some(10));
        let names: Vec<_> = list.iter().map(|c| c.name.as_deref().unwrap()).collect();
        assert_eq!(names, vec!["Россия", "Австралия"]);
    }

    #[test]
    fn error_envelope_parses_all_fields() {
        let response: ErrorResponse = serde_json::from_str(
            r#"{"errors":[{"error":"Ошибка сохранения","code":3000,"moreInfo":"https://dev/errors","parameter":"name","line":1,"column":10}]}"#,
        )
        .unwrap();
        let detail = &response.errors[0];
        assert_eq!(detail.code, Some(3000));
        assert_eq!(detail.parameter.as_deref(), Some("name"));
        assert_eq!(detail.column, Some(10));
    }

    #[test]
    fn descriptor_without_message_still_parses() {
        let response: ErrorResponse =
            serde_json::from_str(r#"{"errors":[{"code":1021,"parameter":"id"}]}"#).unwrap();
        assert_eq!(response.errors.len(), 1);
        assert_eq!(response.errors[0].error, "");
        assert_eq!(response.errors[0].code, Some(1021));
        assert_eq!(response.errors[0].parameter.as_deref(), Some("id"));
    }

    #[test]
    fn metadata_defaults_to_empty_collections() {
        let metadata: MetadataAttributeSharedStatesResponse =
            serde_json::from_str(r#"{"createShared": true}"#).unwrap();
        assert!(metadata.attributes.is_empty());
        assert!(metadata.states.is_empty());
        assert_eq!(metadata.create_shared, Some(true));
    }
}
