use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Meta, MetaEntity, Organization, Timestamp};

/// Договор.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
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
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moment: Option<Timestamp>,
    /// Amount in kopecks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sum: Option<i64>,
    /// `Commission` or `Sales`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reward_percent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reward_type: Option<String>,
    /// The account's own legal entity; embedded when `ownAgent` is expanded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub own_agent: Option<Organization>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<MetaEntity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<MetaEntity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_account: Option<MetaEntity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_account: Option<MetaEntity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate: Option<MetaEntity>,
}

crate::entity!(Contract, "contract");
