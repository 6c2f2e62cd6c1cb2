//! The request executor: one descriptor, one HTTP round trip.
//!
//! # Design
//! `RequestExecutor` is a consuming builder over a `RequestDescriptor`.
//! Every builder method takes `self` and hands back the updated value, so no
//! state is shared between calls and a descriptor cannot be sent twice.
//! Building the wire request (`build`) and classifying the response
//! (`classify`) are pure functions; `execute` is the only step that goes
//! through the client's `Transport`.
//!
//! Validation happens as early as possible: an expand path deeper than
//! `MAX_EXPAND_DEPTH` fails inside `expand`, a query value the configured
//! charset cannot represent fails inside `build`. Neither sends anything.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};
use url::form_urlencoded;

use crate::client::ApiClient;
use crate::config::QueryCharset;
use crate::entities::with_timestamp_precision;
use crate::error::{ApiFailure, Error, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::responses::{ErrorResponse, ListEntity};

/// Deepest expand path the API accepts, in dot-separated segments.
pub const MAX_EXPAND_DEPTH: usize = 3;

pub const AUTHORIZATION: &str = "authorization";
pub const CONTENT_TYPE: &str = "content-type";
pub const FORMAT_MILLISECOND: &str = "x-lognex-format-millisecond";

const JSON: &str = "application/json";

/// Checks that `path` has between one and `MAX_EXPAND_DEPTH` non-empty segments.
pub fn validate_expand(path: &str) -> Result<()> {
    let depth = path.split('.').count();
    if depth > MAX_EXPAND_DEPTH || path.split('.').any(|segment| segment.trim().is_empty()) {
        return Err(Error::InvalidExpandPath {
            path: path.to_string(),
            depth,
        });
    }
    Ok(())
}

/// Accumulated state of one call.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    method: HttpMethod,
    url: String,
    query: BTreeMap<String, String>,
    expand: Vec<String>,
    headers: BTreeMap<String, String>,
    body: Option<Value>,
}

impl RequestDescriptor {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            query: BTreeMap::new(),
            expand: Vec::new(),
            headers: BTreeMap::new(),
            body: None,
        }
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// Absolute URL without the query string.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn query(&self) -> &BTreeMap<String, String> {
        &self.query
    }

    /// Expand paths in registration order, without duplicates.
    pub fn expand(&self) -> &[String] {
        &self.expand
    }

    /// Headers keyed by lowercase name.
    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// Serializes the descriptor into a wire request.
    pub fn to_http(&self, charset: QueryCharset) -> Result<HttpRequest> {
        let mut query = self.query.clone();
        if !self.expand.is_empty() {
            // A raw `expand` query value keeps its paths, listed first.
            let mut paths: Vec<&str> = query
                .get("expand")
                .map(|raw| raw.split(',').map(str::trim).filter(|p| !p.is_empty()).collect())
                .unwrap_or_default();
            for path in &self.expand {
                if !paths.contains(&path.as_str()) {
                    paths.push(path.as_str());
                }
            }
            let joined = paths.join(",");
            query.insert("expand".to_string(), joined);
        }

        let mut url = self.url.clone();
        if !query.is_empty() {
            let pairs = query
                .iter()
                .map(|(key, value)| {
                    Ok(format!(
                        "{}={}",
                        encode_component(key, key, charset)?,
                        encode_component(key, value, charset)?
                    ))
                })
                .collect::<Result<Vec<_>>>()?;
            url.push(if url.contains('?') { '&' } else { '?' });
            url.push_str(&pairs.join("&"));
        }

        let mut headers: Vec<(String, String)> = self
            .headers
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        let body = match &self.body {
            Some(payload) => {
                headers.retain(|(key, _)| key != CONTENT_TYPE);
                headers.push((CONTENT_TYPE.to_string(), JSON.to_string()));
                Some(serde_json::to_string(payload).map_err(Error::Serialization)?)
            }
            None => None,
        };

        Ok(HttpRequest {
            method: self.method,
            url,
            headers,
            body,
        })
    }
}

fn encode_component(key: &str, text: &str, charset: QueryCharset) -> Result<String> {
    let bytes = charset.encode(text).ok_or_else(|| Error::QueryEncoding {
        key: key.to_string(),
        charset,
    })?;
    Ok(form_urlencoded::byte_serialize(&bytes).collect())
}

/// A successful response: 200 or 201 with a body, or 204 without one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Decodes the body as `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body).map_err(Error::Decode)
    }
}

/// Maps an HTTP response to the success body or an `Error::Api`.
pub fn classify(method: HttpMethod, url: &str, response: HttpResponse) -> Result<RawResponse> {
    match response.status {
        200 | 201 => Ok(RawResponse {
            status: response.status,
            body: response.body,
        }),
        204 => Ok(RawResponse {
            status: 204,
            body: String::new(),
        }),
        status => {
            let envelope = if response.body.trim().is_empty() {
                ErrorResponse::default()
            } else {
                serde_json::from_str(&response.body).unwrap_or_else(|e| {
                    warn!(%method, url, status, error = %e, "unparseable error envelope");
                    ErrorResponse::default()
                })
            };
            Err(Error::Api(Box::new(ApiFailure {
                method,
                url: url.to_string(),
                status,
                reason: response.reason,
                response: envelope,
            })))
        }
    }
}

/// Builder for one call against the API.
///
/// ```ignore
/// let list: ListEntity<Contract> = api
///     .path("/entity/contract/")
///     .query("limit", 10)
///     .expand(["owner.group"])?
///     .list()?;
/// ```
#[derive(Debug)]
#[must_use = "a request does nothing until it is executed"]
pub struct RequestExecutor<'a> {
    api: &'a ApiClient,
    descriptor: RequestDescriptor,
}

impl<'a> RequestExecutor<'a> {
    /// Starts a request to an absolute URL with the client's credentials.
    pub(crate) fn new(api: &'a ApiClient, url: String) -> Self {
        let mut executor = Self {
            api,
            descriptor: RequestDescriptor::new(url),
        }
        .header(AUTHORIZATION, api.authorization());
        if api.config().time_with_milliseconds {
            executor = executor.header(FORMAT_MILLISECOND, "true");
        }
        executor
    }

    pub fn descriptor(&self) -> &RequestDescriptor {
        &self.descriptor
    }

    pub fn method(mut self, method: HttpMethod) -> Self {
        self.descriptor.method = method;
        self
    }

    /// Sets a query parameter; a later value for the same key replaces it.
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.descriptor.query.insert(key.into(), value.to_string());
        self
    }

    /// Sets a header; names are case-insensitive and the last value wins.
    pub fn header(mut self, key: impl AsRef<str>, value: impl ToString) -> Self {
        self.descriptor
            .headers
            .insert(key.as_ref().to_ascii_lowercase(), value.to_string());
        self
    }

    /// Adds fields to embed in the response; duplicates are ignored.
    pub fn expand<I, S>(mut self, paths: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let paths: Vec<String> = paths
            .into_iter()
            .map(|path| path.as_ref().trim().to_string())
            .collect();
        for path in &paths {
            validate_expand(path)?;
        }
        for path in paths {
            if !self.descriptor.expand.contains(&path) {
                self.descriptor.expand.push(path);
            }
        }
        Ok(self)
    }

    /// Attaches a JSON body.
    ///
    /// Timestamps are written in the precision `time_with_milliseconds`
    /// announces to the server.
    pub fn body<T: Serialize + ?Sized>(mut self, payload: &T) -> Result<Self> {
        let milliseconds = self.api.config().time_with_milliseconds;
        let value = with_timestamp_precision(milliseconds, || serde_json::to_value(payload))
            .map_err(Error::Serialization)?;
        self.descriptor.body = Some(value);
        Ok(self)
    }

    /// The wire request `execute` would send.
    pub fn build(&self) -> Result<HttpRequest> {
        self.descriptor.to_http(self.api.config().query_charset)
    }

    /// Sends the request and classifies the response.
    pub fn execute(self) -> Result<RawResponse> {
        let request = self.build()?;
        debug!(method = %request.method, url = %request.url, "sending request");
        if let Some(body) = &request.body {
            debug!(method = %request.method, url = %request.url, body = %body, "request body");
        }

        let response = self.api.transport().send(&request)?;
        debug!(
            method = %request.method,
            url = %request.url,
            status = response.status,
            body = %response.body,
            "received response"
        );
        classify(request.method, &request.url, response)
    }

    pub fn get(self) -> Result<RawResponse> {
        self.method(HttpMethod::Get).execute()
    }

    pub fn post(self) -> Result<RawResponse> {
        self.method(HttpMethod::Post).execute()
    }

    pub fn put(self) -> Result<RawResponse> {
        self.method(HttpMethod::Put).execute()
    }

    /// DELETE; any success status is accepted and the body is ignored.
    pub fn delete(self) -> Result<()> {
        self.method(HttpMethod::Delete).execute().map(|_| ())
    }

    pub fn get_as<T: DeserializeOwned>(self) -> Result<T> {
        self.get()?.json()
    }

    /// GET decoded as a list envelope of `T`.
    pub fn list<T: DeserializeOwned>(self) -> Result<ListEntity<T>> {
        self.get()?.json()
    }

    pub fn post_as<T: DeserializeOwned>(self) -> Result<T> {
        self.post()?.json()
    }

    pub fn put_as<T: DeserializeOwned>(self) -> Result<T> {
        self.put()?.json()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use serde_json::json;

    use super::*;
    use crate::config::ApiConfig;
    use crate::entities::{Contract, Country, Timestamp};
    use crate::http::Transport;

    /// Records every request and answers with a canned response.
    #[derive(Clone)]
    struct Recorder {
        sent: Arc<Mutex<Vec<HttpRequest>>>,
        response: HttpResponse,
    }

    impl Recorder {
        fn answering(status: u16, body: &str) -> Self {
            Self {
                sent: Arc::new(Mutex::new(Vec::new())),
                response: HttpResponse {
                    status,
                    reason: String::new(),
                    headers: Vec::new(),
                    body: body.to_string(),
                },
            }
        }

        fn sent(&self) -> Vec<HttpRequest> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl Transport for Recorder {
        fn send(&self, request: &HttpRequest) -> Result<HttpResponse> {
            self.sent.lock().unwrap().push(request.clone());
            Ok(self.response.clone())
        }
    }

    fn config() -> ApiConfig {
        ApiConfig::new("admin@test", "secret").with_host("http://localhost:3000")
    }

    fn api(recorder: &Recorder) -> ApiClient {
        ApiClient::with_transport(config(), recorder.clone()).unwrap()
    }

    const BASE: &str = "http://localhost:3000/api/remap/1.1";

    #[test]
    fn expand_up_to_three_segments_is_accepted() {
        let recorder = Recorder::answering(200, "{}");
        let api = api(&recorder);
        let request = api.path("/entity/contract/").expand(["owner.group.id"]).unwrap();
        assert_eq!(request.descriptor().expand(), ["owner.group.id".to_string()]);
    }

    #[test]
    fn deeper_expand_fails_before_anything_is_sent() {
        let recorder = Recorder::answering(200, "{}");
        let api = api(&recorder);
        let err = api
            .path("/entity/contract/")
            .expand(["owner.group.id"])
            .and_then(|request| request.expand(["owner.group.id.extra"]))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidExpandPath { ref path, depth: 4 } if path == "owner.group.id.extra"
        ));
        assert!(recorder.sent().is_empty());
    }

    #[test]
    fn expand_rejects_empty_segments() {
        assert!(validate_expand("owner..id").is_err());
        assert!(validate_expand("").is_err());
        assert!(validate_expand(".owner").is_err());
        assert!(validate_expand("owner").is_ok());
    }

    #[test]
    fn expand_paths_merge_into_one_parameter() {
        let recorder = Recorder::answering(200, "{}");
        let api = api(&recorder);
        let request = api
            .path("/entity/customerorder/")
            .expand(["agent", "organization"])
            .unwrap()
            .expand(["agent", "positions.assortment"])
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(
            request.url,
            format!("{BASE}/entity/customerorder/?expand=agent%2Corganization%2Cpositions.assortment")
        );
    }

    #[test]
    fn raw_expand_query_is_merged_with_expand_paths() {
        let recorder = Recorder::answering(200, "{}");
        let api = api(&recorder);
        let request = api
            .path("/entity/contract/")
            .query("expand", "agent, state")
            .expand(["owner", "agent"])
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(
            request.url,
            format!("{BASE}/entity/contract/?expand=agent%2Cstate%2Cowner")
        );

        let raw_only = api.path("/entity/contract/").query("expand", "agent").build().unwrap();
        assert_eq!(raw_only.url, format!("{BASE}/entity/contract/?expand=agent"));
    }

    #[test]
    fn query_is_encoded_sorted_and_last_write_wins() {
        let recorder = Recorder::answering(200, "{}");
        let api = api(&recorder);
        let request = api
            .path("/entity/country/")
            .query("search", "Россия и мир")
            .query("limit", 10)
            .query("limit", 25)
            .build()
            .unwrap();
        assert_eq!(
            request.url,
            format!("{BASE}/entity/country/?limit=25&search=%D0%A0%D0%BE%D1%81%D1%81%D0%B8%D1%8F+%D0%B8+%D0%BC%D0%B8%D1%80")
        );
    }

    #[test]
    fn query_appends_to_an_existing_query_string() {
        let recorder = Recorder::answering(200, "{}");
        let api = api(&recorder);
        let request = api
            .url("https://host/api/remap/1.1/entity/country?offset=100")
            .query("limit", 100)
            .build()
            .unwrap();
        assert_eq!(request.url, "https://host/api/remap/1.1/entity/country?offset=100&limit=100");
    }

    #[test]
    fn unencodable_query_value_fails() {
        let recorder = Recorder::answering(200, "{}");
        let api = ApiClient::with_transport(
            config().with_query_charset(QueryCharset::Iso8859_1),
            recorder.clone(),
        )
        .unwrap();
        let err = api
            .path("/entity/country/")
            .query("search", "Россия")
            .get()
            .unwrap_err();
        assert!(matches!(
            err,
            Error::QueryEncoding { ref key, charset: QueryCharset::Iso8859_1 } if key == "search"
        ));
        assert!(recorder.sent().is_empty());

        let request = api.path("/entity/country/").query("search", "café").build().unwrap();
        assert!(request.url.ends_with("?search=caf%E9"));
    }

    #[test]
    fn authorization_is_always_attached() {
        let recorder = Recorder::answering(200, "{}");
        let api = api(&recorder);
        let request = api.path("/entity/country/").build().unwrap();
        assert_eq!(request.header("Authorization"), Some("Basic YWRtaW5AdGVzdDpzZWNyZXQ="));
        assert_eq!(request.header(FORMAT_MILLISECOND), None);
        assert_eq!(request.header(CONTENT_TYPE), None);
        assert!(request.body.is_none());
    }

    #[test]
    fn millisecond_header_follows_config() {
        let recorder = Recorder::answering(200, "{}");
        let api =
            ApiClient::with_transport(config().with_time_with_milliseconds(true), recorder.clone())
                .unwrap();
        let request = api.path("/entity/country/").build().unwrap();
        assert_eq!(request.header("X-Lognex-Format-Millisecond"), Some("true"));
    }

    #[test]
    fn headers_are_case_insensitive() {
        let recorder = Recorder::answering(200, "{}");
        let api = api(&recorder);
        let request = api
            .path("/entity/country/")
            .header("X-Trace", "1")
            .header("x-trace", "2")
            .build()
            .unwrap();
        assert_eq!(request.header("X-TRACE"), Some("2"));
        assert_eq!(request.headers.iter().filter(|(k, _)| k == "x-trace").count(), 1);
    }

    #[test]
    fn body_is_sent_as_json() {
        let recorder = Recorder::answering(201, r#"{"name":"Narnia"}"#);
        let api = api(&recorder);
        let created: Country = api
            .path("/entity/country/")
            .body(&Country::named("Narnia"))
            .unwrap()
            .post_as()
            .unwrap();
        assert_eq!(created.name.as_deref(), Some("Narnia"));

        let sent = recorder.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].method, HttpMethod::Post);
        assert_eq!(sent[0].header(CONTENT_TYPE), Some("application/json"));
        let body: Value = serde_json::from_str(sent[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"name": "Narnia"}));
    }

    #[test]
    fn body_timestamps_follow_the_millisecond_setting() {
        let contract = Contract {
            moment: Some(Timestamp::parse("2018-03-12 15:04:05.123").unwrap()),
            updated: Some(Timestamp::parse("2018-03-12 15:04:05").unwrap()),
            ..Contract::default()
        };

        let recorder = Recorder::answering(200, "{}");
        let request = api(&recorder)
            .path("/entity/contract/")
            .body(&contract)
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(request.header(FORMAT_MILLISECOND), None);
        let body: Value = serde_json::from_str(request.body.as_deref().unwrap()).unwrap();
        assert_eq!(
            body,
            json!({"moment": "2018-03-12 15:04:05", "updated": "2018-03-12 15:04:05"})
        );

        let api =
            ApiClient::with_transport(config().with_time_with_milliseconds(true), recorder.clone())
                .unwrap();
        let request = api.path("/entity/contract/").body(&contract).unwrap().build().unwrap();
        assert_eq!(request.header(FORMAT_MILLISECOND), Some("true"));
        let body: Value = serde_json::from_str(request.body.as_deref().unwrap()).unwrap();
        assert_eq!(
            body,
            json!({"moment": "2018-03-12 15:04:05.123", "updated": "2018-03-12 15:04:05.000"})
        );
    }

    #[test]
    fn verbs_map_one_to_one() {
        let recorder = Recorder::answering(200, "{}");
        let api = api(&recorder);
        api.path("/a/").get().unwrap();
        api.path("/a/").post().unwrap();
        api.path("/a/").put().unwrap();
        api.path("/a/").delete().unwrap();
        let methods: Vec<_> = recorder.sent().iter().map(|r| r.method).collect();
        assert_eq!(
            methods,
            vec![HttpMethod::Get, HttpMethod::Post, HttpMethod::Put, HttpMethod::Delete]
        );
    }

    #[test]
    fn not_found_becomes_api_error_with_envelope() {
        let recorder =
            Recorder::answering(404, r#"{"errors":[{"error":"Not found","code":404}]}"#);
        let api = api(&recorder);
        let err = api.path("/entity/country/").get_as::<Country>().unwrap_err();
        match err {
            Error::Api(failure) => {
                assert_eq!(failure.status, 404);
                assert_eq!(failure.method, HttpMethod::Get);
                assert_eq!(failure.url, format!("{BASE}/entity/country/"));
                assert_eq!(failure.response.errors.len(), 1);
                assert_eq!(failure.response.errors[0].error, "Not found");
                assert_eq!(failure.response.errors[0].code, Some(404));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn no_content_is_empty_success() {
        let raw = classify(
            HttpMethod::Delete,
            "http://x",
            HttpResponse {
                status: 204,
                reason: "No Content".to_string(),
                headers: Vec::new(),
                body: "ignored".to_string(),
            },
        )
        .unwrap();
        assert_eq!(raw.status, 204);
        assert!(raw.is_empty());
    }

    #[test]
    fn unparseable_error_body_keeps_status() {
        let err = classify(
            HttpMethod::Get,
            "http://x",
            HttpResponse {
                status: 502,
                reason: "Bad Gateway".to_string(),
                headers: Vec::new(),
                body: "<html>gateway</html>".to_string(),
            },
        )
        .unwrap_err();
        assert_eq!(err.api_status(), Some(502));
        assert!(err.to_string().contains("502 Bad Gateway"));
    }

    #[test]
    fn created_is_success() {
        let raw = classify(
            HttpMethod::Post,
            "http://x",
            HttpResponse {
                status: 201,
                reason: "Created".to_string(),
                headers: Vec::new(),
                body: "{}".to_string(),
            },
        )
        .unwrap();
        assert_eq!(raw.status, 201);
        assert_eq!(raw.body, "{}");
    }

    #[test]
    fn wrong_shape_is_a_decode_error() {
        let recorder = Recorder::answering(200, r#"{"name": 42}"#);
        let api = api(&recorder);
        let err = api.path("/entity/country/").get_as::<Country>().unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }
}
