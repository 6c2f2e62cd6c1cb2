use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Contract, Meta, MetaEntity, Organization, Timestamp};

/// Заказ покупателя.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerOrder {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<MetaEntity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<MetaEntity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moment: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applicable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vat_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vat_included: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sum: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<Organization>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<MetaEntity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract: Option<Contract>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<MetaEntity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store: Option<MetaEntity>,
    /// Collection reference; `meta.size` holds the number of positions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub positions: Option<MetaEntity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_planned_moment: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payed_sum: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipped_sum: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reserved_sum: Option<i64>,
}

crate::entity!(CustomerOrder, "customerorder");

/// Розничная смена.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetailShift {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<MetaEntity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<MetaEntity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moment: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close_date: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proceeds_cash: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proceeds_no_cash: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub received_cash: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub received_no_cash: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retail_store: Option<MetaEntity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<Organization>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store: Option<MetaEntity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acquire: Option<MetaEntity>,
}

crate::entity!(RetailShift, "retailshift");
