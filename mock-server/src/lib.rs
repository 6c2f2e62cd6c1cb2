//! In-memory stand-in for the `/api/remap/1.1` JSON API.
//!
//! Entities are kept as JSON objects per entity kind. The server checks Basic
//! credentials, pages lists, inlines expanded references it can resolve, and
//! answers failures with the same `{"errors": [...]}` envelope as the real API.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const API_PATH: &str = "/api/remap/1.1";
pub const LOGIN: &str = "admin@mock";
pub const PASSWORD: &str = "secret";
pub const ACCOUNT_ID: Uuid = Uuid::from_u128(0x1f3e_4d2a_0000_4000_8000_0000_0000_0001);
pub const ORGANIZATION_ID: Uuid = Uuid::from_u128(0x1f3e_4d2a_0000_4000_8000_0000_0000_0002);
pub const CONTRACT_ID: Uuid = Uuid::from_u128(0x1f3e_4d2a_0000_4000_8000_0000_0000_0003);
pub const BONUS_PROGRAM_ID: Uuid = Uuid::from_u128(0x1f3e_4d2a_0000_4000_8000_0000_0000_0004);
pub const ATTRIBUTE_ID: Uuid = Uuid::from_u128(0x1f3e_4d2a_0000_4000_8000_0000_0000_0005);

const MEDIA_TYPE: &str = "application/json";
const UPDATED: &str = "2026-01-15 10:00:00.000";

/// Entity kinds the server knows about.
pub const KINDS: [&str; 6] = [
    "country",
    "contract",
    "customerorder",
    "retailshift",
    "discount",
    "organization",
];

/// One failure in the error envelope.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetail {
    pub error: String,
    pub code: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter: Option<String>,
}

/// Status plus error envelope.
#[derive(Clone, Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: ErrorDetail,
}

impl ApiError {
    fn new(status: StatusCode, code: i32, error: impl Into<String>) -> Self {
        Self {
            status,
            detail: ErrorDetail {
                error: error.into(),
                code,
                parameter: None,
            },
        }
    }

    fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, 1056, "Ошибка аутентификации")
    }

    fn unknown_kind(kind: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, 1005, format!("Неизвестный тип: '{kind}'"))
    }

    fn not_found(id: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, 1021, format!("Объект с UUID '{id}' не найден"))
    }

    fn empty_field(field: &str) -> Self {
        let mut error = Self::new(
            StatusCode::PRECONDITION_FAILED,
            3000,
            format!("Ошибка сохранения объекта: поле '{field}' не может быть пустым"),
        );
        error.detail.parameter = Some(field.to_string());
        error
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "errors": [self.detail] }))).into_response()
    }
}

/// Entity metadata served under `{kind}/metadata`.
#[derive(Clone, Debug, Default)]
pub struct KindMetadata {
    pub attributes: Vec<Value>,
    pub states: Vec<Value>,
}

#[derive(Debug, Default)]
pub struct Store {
    entities: HashMap<&'static str, Vec<Value>>,
    metadata: HashMap<&'static str, KindMetadata>,
}

impl Store {
    fn rows(&self, kind: &str) -> Result<&Vec<Value>, ApiError> {
        self.entities.get(kind).ok_or_else(|| ApiError::unknown_kind(kind))
    }

    fn rows_mut(&mut self, kind: &str) -> Result<&mut Vec<Value>, ApiError> {
        self.entities
            .get_mut(kind)
            .ok_or_else(|| ApiError::unknown_kind(kind))
    }

    fn by_href(&self, href: &str) -> Option<&Value> {
        self.entities
            .values()
            .flatten()
            .find(|row| row["meta"]["href"].as_str().is_some_and(|h| h.ends_with(href)))
    }
}

pub type Db = Arc<RwLock<Store>>;

fn entity_href(kind: &str, id: Uuid) -> String {
    format!("{API_PATH}/entity/{kind}/{id}")
}

fn meta(kind: &str, id: Uuid) -> Value {
    json!({
        "href": entity_href(kind, id),
        "metadataHref": format!("{API_PATH}/entity/{kind}/metadata"),
        "type": kind,
        "mediaType": MEDIA_TYPE,
    })
}

fn seed() -> Store {
    let mut entities: HashMap<&'static str, Vec<Value>> =
        KINDS.iter().map(|kind| (*kind, Vec::new())).collect();

    let organization = json!({
        "meta": meta("organization", ORGANIZATION_ID),
        "id": ORGANIZATION_ID,
        "accountId": ACCOUNT_ID,
        "updated": UPDATED,
        "name": "ООО \"Ромашка\"",
        "legalTitle": "Общество с ограниченной ответственностью \"Ромашка\"",
        "inn": "7736570901",
    });
    entities.entry("organization").or_default().push(organization);

    entities.entry("contract").or_default().push(json!({
        "meta": meta("contract", CONTRACT_ID),
        "id": CONTRACT_ID,
        "accountId": ACCOUNT_ID,
        "updated": UPDATED,
        "name": "Договор поставки №1",
        "moment": "2026-01-10 09:30:00",
        "sum": 1250000,
        "contractType": "Sales",
        "rewardType": "None",
        "ownAgent": { "meta": meta("organization", ORGANIZATION_ID) },
    }));

    for name in ["Россия", "Беларусь", "Казахстан"] {
        let id = Uuid::new_v4();
        entities.entry("country").or_default().push(json!({
            "meta": meta("country", id),
            "id": id,
            "accountId": ACCOUNT_ID,
            "updated": UPDATED,
            "name": name,
        }));
    }

    let discounts = entities.entry("discount").or_default();
    let mut discount = |kind: &str, id: Uuid, name: &str, extra: Value| {
        let mut row = json!({
            "meta": meta(kind, id),
            "id": id,
            "accountId": ACCOUNT_ID,
            "name": name,
            "active": true,
            "allProducts": true,
            "allAgents": true,
            "agentTags": [],
        });
        if let (Some(row), Value::Object(extra)) = (row.as_object_mut(), extra) {
            row.extend(extra);
        }
        discounts.push(row);
    };
    discount("discount", Uuid::new_v4(), "Округление копеек", json!({}));
    discount(
        "accumulationdiscount",
        Uuid::new_v4(),
        "Накопительная",
        json!({ "levels": [{ "amount": 1000000, "discount": 5.0 }] }),
    );
    discount(
        "bonusprogram",
        BONUS_PROGRAM_ID,
        "Бонусная программа",
        json!({ "earnRateRoublesToPoint": 10, "spendRatePointToRouble": 1, "maxPaidRatePercents": 50 }),
    );
    discount("personaldiscount", Uuid::new_v4(), "Персональная", json!({}));
    discount(
        "specialpricediscount",
        Uuid::new_v4(),
        "Спеццена",
        json!({ "usePriceType": false, "discount": 7.5 }),
    );

    let attribute = json!({
        "meta": {
            "href": format!("{API_PATH}/entity/contract/metadata/attributes/{ATTRIBUTE_ID}"),
            "type": "attributemetadata",
            "mediaType": MEDIA_TYPE,
        },
        "id": ATTRIBUTE_ID,
        "name": "Номер тендера",
        "type": "string",
        "required": false,
    });
    let metadata = HashMap::from([
        (
            "contract",
            KindMetadata {
                attributes: vec![attribute],
                states: Vec::new(),
            },
        ),
        (
            "customerorder",
            KindMetadata {
                attributes: Vec::new(),
                states: vec![json!({
                    "id": Uuid::new_v4(),
                    "accountId": ACCOUNT_ID,
                    "name": "Новый",
                    "color": 15106326,
                    "stateType": "Regular",
                    "entityType": "customerorder",
                })],
            },
        ),
    ]);

    Store { entities, metadata }
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(seed()));
    let entity = Router::new()
        .route("/entity/{kind}/", get(list_entities).post(create_entity))
        .route("/entity/{kind}/metadata", get(get_metadata))
        .route("/entity/{kind}/metadata/attributes/{id}", get(get_attribute))
        .route(
            "/entity/{kind}/{id}",
            get(get_entity).put(update_entity).delete(delete_entity),
        )
        .layer(middleware::from_fn(require_basic_auth))
        .with_state(db);
    Router::new().nest(API_PATH, entity)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn require_basic_auth(request: Request, next: Next) -> Response {
    let expected = format!("Basic {}", STANDARD.encode(format!("{LOGIN}:{PASSWORD}")));
    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == expected);
    if !authorized {
        tracing::warn!(uri = %request.uri(), "rejected request without valid credentials");
        return ApiError::unauthorized().into_response();
    }
    next.run(request).await
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub search: Option<String>,
    pub expand: Option<String>,
}

impl ListQuery {
    fn expand_roots(&self) -> Vec<&str> {
        self.expand
            .as_deref()
            .map(|expand| {
                expand
                    .split(',')
                    .filter_map(|path| path.split('.').next())
                    .filter(|root| !root.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Replaces references named in `roots` with the stored entity they point to.
fn expand(store: &Store, mut row: Value, roots: &[&str]) -> Value {
    for root in roots {
        let Some(href) = row[*root]["meta"]["href"].as_str() else {
            continue;
        };
        if let Some(target) = store.by_href(href).cloned() {
            row[*root] = target;
        }
    }
    row
}

async fn list_entities(
    State(db): State<Db>,
    Path(kind): Path<String>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, ApiError> {
    let store = db.read().await;
    let rows = store.rows(&kind)?;
    let matching: Vec<&Value> = rows
        .iter()
        .filter(|row| match &query.search {
            Some(search) => row["name"]
                .as_str()
                .is_some_and(|name| name.to_lowercase().contains(&search.to_lowercase())),
            None => true,
        })
        .collect();

    let limit = query.limit.unwrap_or(1000);
    let offset = query.offset.unwrap_or(0);
    let roots = query.expand_roots();
    let page: Vec<Value> = matching
        .iter()
        .skip(offset)
        .take(limit)
        .map(|row| expand(&store, (*row).clone(), &roots))
        .collect();

    Ok(Json(json!({
        "context": {
            "employee": {
                "meta": {
                    "href": format!("{API_PATH}/context/employee"),
                    "type": "employee",
                    "mediaType": MEDIA_TYPE,
                }
            }
        },
        "meta": {
            "href": format!("{API_PATH}/entity/{kind}"),
            "type": kind,
            "mediaType": MEDIA_TYPE,
            "size": matching.len(),
            "limit": limit,
            "offset": offset,
        },
        "rows": page,
    })))
}

async fn create_entity(
    State(db): State<Db>,
    Path(kind): Path<String>,
    Json(input): Json<Map<String, Value>>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let mut store = db.write().await;
    let kind = KINDS
        .iter()
        .copied()
        .find(|k| *k == kind)
        .ok_or_else(|| ApiError::unknown_kind(&kind))?;
    let has_name = input
        .get("name")
        .and_then(Value::as_str)
        .is_some_and(|name| !name.trim().is_empty());
    if !has_name {
        return Err(ApiError::empty_field("name"));
    }

    let id = Uuid::new_v4();
    let mut row = input;
    row.insert("meta".into(), meta(kind, id));
    row.insert("id".into(), json!(id));
    row.insert("accountId".into(), json!(ACCOUNT_ID));
    row.insert("updated".into(), json!(UPDATED));
    let row = Value::Object(row);
    store.rows_mut(kind)?.push(row.clone());
    tracing::info!(kind, %id, "created entity");
    Ok((StatusCode::CREATED, Json(row)))
}

fn has_id(row: &Value, id: &str) -> bool {
    row["id"].as_str() == Some(id)
}

#[derive(Debug, Deserialize)]
pub struct EntityPath {
    pub kind: String,
    pub id: String,
}

async fn get_entity(
    State(db): State<Db>,
    Path(EntityPath { kind, id }): Path<EntityPath>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, ApiError> {
    let store = db.read().await;
    let row = store
        .rows(&kind)?
        .iter()
        .find(|row| has_id(row, &id))
        .cloned()
        .ok_or_else(|| ApiError::not_found(&id))?;
    Ok(Json(expand(&store, row, &query.expand_roots())))
}

async fn update_entity(
    State(db): State<Db>,
    Path(EntityPath { kind, id }): Path<EntityPath>,
    Json(input): Json<Map<String, Value>>,
) -> Result<Json<Value>, ApiError> {
    let mut store = db.write().await;
    let row = store
        .rows_mut(&kind)?
        .iter_mut()
        .find(|row| has_id(row, &id))
        .ok_or_else(|| ApiError::not_found(&id))?;
    if let Some(fields) = row.as_object_mut() {
        for (key, value) in input {
            if key != "id" && key != "meta" && key != "accountId" {
                fields.insert(key, value);
            }
        }
    }
    Ok(Json(row.clone()))
}

async fn delete_entity(
    State(db): State<Db>,
    Path(EntityPath { kind, id }): Path<EntityPath>,
) -> Result<StatusCode, ApiError> {
    let mut store = db.write().await;
    let rows = store.rows_mut(&kind)?;
    let position = rows
        .iter()
        .position(|row| has_id(row, &id))
        .ok_or_else(|| ApiError::not_found(&id))?;
    rows.remove(position);
    tracing::info!(kind, id, "deleted entity");
    Ok(StatusCode::NO_CONTENT)
}

async fn get_metadata(
    State(db): State<Db>,
    Path(kind): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let store = db.read().await;
    store.rows(&kind)?;
    let metadata = store.metadata.get(kind.as_str()).cloned().unwrap_or_default();
    Ok(Json(json!({
        "meta": {
            "href": format!("{API_PATH}/entity/{kind}/metadata"),
            "mediaType": MEDIA_TYPE,
        },
        "attributes": metadata.attributes,
        "states": metadata.states,
        "createShared": false,
    })))
}

#[derive(Debug, Deserialize)]
pub struct AttributePath {
    pub kind: String,
    pub id: String,
}

async fn get_attribute(
    State(db): State<Db>,
    Path(AttributePath { kind, id }): Path<AttributePath>,
) -> Result<Json<Value>, ApiError> {
    let store = db.read().await;
    store.rows(&kind)?;
    store
        .metadata
        .get(kind.as_str())
        .and_then(|metadata| metadata.attributes.iter().find(|a| has_id(a, &id)))
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::not_found(&id))
}
