// HTTP client for described ARI operations.
//
// Binds caller arguments to an operation's declared parameters (path,
// query, body, header), sends the request with Basic auth, and hands the
// raw status + body back. Status interpretation is left to the caller:
// a 404 from `channels.get` is data, not a transport failure.

use std::collections::HashMap;

use serde_json::{Map, Value};
use tracing::{debug, info};
use url::Url;

use crate::auth::Credentials;
use crate::description::{
    ApiDeclaration, ApiDescription, Operation, ParamType, ResourceListing,
    resource_name_from_path,
};
use crate::error::Error;
use crate::transport::{TlsMode, TransportConfig};

/// Keyword arguments for an operation call.
pub type Params = Map<String, Value>;

// ── RawResponse ─────────────────────────────────────────────────────

/// Unprocessed result of an operation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    /// `None` when the server sent no body at all.
    pub body: Option<String>,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// `204 No Content`, or a success with an empty body.
    pub fn is_no_content(&self) -> bool {
        self.status == 204 || self.body.as_deref().is_none_or(|b| b.trim().is_empty())
    }
}

// ── AriHttp ─────────────────────────────────────────────────────────

/// Async client for the REST half of ARI.
///
/// All paths resolve against the API root, `{base}/ari/`.
#[derive(Debug, Clone)]
pub struct AriHttp {
    http: reqwest::Client,
    api_root: Url,
    credentials: Option<Credentials>,
    tls: TlsMode,
}

impl AriHttp {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from a server URL, credentials, and transport config.
    ///
    /// `base_url` may be the server root (`http://pbx:8088`) or the API
    /// root itself (`http://pbx:8088/ari`).
    pub fn new(
        base_url: &Url,
        credentials: Credentials,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            api_root: Self::normalize_api_root(base_url)?,
            credentials: Some(credentials),
            tls: transport.tls.clone(),
        })
    }

    /// Wrap an existing `reqwest::Client`. The event WebSocket uses the
    /// system roots.
    pub fn with_client(
        http: reqwest::Client,
        base_url: &Url,
        credentials: Option<Credentials>,
    ) -> Result<Self, Error> {
        Ok(Self {
            http,
            api_root: Self::normalize_api_root(base_url)?,
            credentials,
            tls: TlsMode::System,
        })
    }

    /// Ensure the API root ends with `/ari/` so relative joins work.
    fn normalize_api_root(raw: &Url) -> Result<Url, Error> {
        let mut url = raw.clone();
        let path = url.path().trim_end_matches('/').to_owned();

        if path.ends_with("/ari") {
            url.set_path(&format!("{path}/"));
        } else {
            url.set_path(&format!("{path}/ari/"));
        }
        url.set_query(None);

        Ok(url)
    }

    pub fn api_root(&self) -> &Url {
        &self.api_root
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    /// TLS mode the event WebSocket should connect with.
    pub fn tls(&self) -> &TlsMode {
        &self.tls
    }

    // ── Description loading ──────────────────────────────────────────

    /// Fetch `resources.json` and every declaration it lists.
    pub async fn load_description(&self) -> Result<ApiDescription, Error> {
        let listing_url = self.api_root.join("api-docs/resources.json")?;
        let listing_text = self.get_text(&listing_url).await?;
        let listing = ResourceListing::from_json(listing_url.as_str(), &listing_text)?;

        let mut declarations = Vec::with_capacity(listing.apis.len());
        for entry in &listing.apis {
            let relative = entry.path.replace("{format}", "json");
            let url = self.api_root.join(relative.trim_start_matches('/'))?;
            let text = self.get_text(&url).await?;
            let declaration = ApiDeclaration::from_json(url.as_str(), &text)?;
            let name = declaration
                .resource_name()
                .unwrap_or_else(|| resource_name_from_path(&entry.path));
            debug!(resource = %name, url = %url, "loaded API declaration");
            declarations.push((name, declaration));
        }

        info!(resources = declarations.len(), "API description loaded");
        Ok(ApiDescription::from_declarations(declarations))
    }

    async fn get_text(&self, url: &Url) -> Result<String, Error> {
        debug!("GET {url}");
        let mut builder = self.http.get(url.clone());
        if let Some(creds) = &self.credentials {
            builder = creds.apply(builder);
        }

        let resp = builder.send().await?;
        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Authentication {
                message: format!("credentials rejected by {url}"),
            });
        }
        if !status.is_success() {
            return Err(Error::DescriptionUnavailable {
                location: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(resp.text().await?)
    }

    // ── Operation invocation ─────────────────────────────────────────

    /// Invoke a described operation with keyword arguments.
    ///
    /// Non-success statuses are returned as-is in the [`RawResponse`].
    pub async fn invoke(&self, operation: &Operation, params: &Params) -> Result<RawResponse, Error> {
        let bound = bind(operation, params)?;
        let url = self.operation_url(operation, &bound)?;
        let method = reqwest::Method::from_bytes(operation.http_method.as_bytes()).map_err(|e| {
            Error::Description {
                location: operation.path.clone(),
                message: format!("invalid HTTP method '{}': {e}", operation.http_method),
            }
        })?;

        debug!(operation = %operation.nickname, "{method} {url}");

        let mut builder = self.http.request(method, url);
        if let Some(creds) = &self.credentials {
            builder = creds.apply(builder);
        }
        for (name, value) in &bound.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &bound.body {
            builder = builder.json(body);
        }

        let resp = builder.send().await?;
        let status = resp.status().as_u16();
        let text = resp.text().await?;
        debug!(operation = %operation.nickname, status, bytes = text.len(), "operation response");

        Ok(RawResponse {
            status,
            body: (!text.is_empty()).then_some(text),
        })
    }

    /// URL for the event WebSocket described by `operation`.
    ///
    /// Uses the same parameter binding as REST calls, swaps the scheme to
    /// `ws`/`wss`, and appends `api_key=user:password` for authentication.
    pub fn websocket_url(&self, operation: &Operation, params: &Params) -> Result<Url, Error> {
        let bound = bind(operation, params)?;
        let mut url = self.operation_url(operation, &bound)?;

        let scheme = if url.scheme() == "https" { "wss" } else { "ws" };
        url.set_scheme(scheme)
            .map_err(|()| Error::WebSocketConnect(format!("cannot use {scheme} for {url}")))?;

        if let Some(creds) = &self.credentials {
            url.query_pairs_mut().append_pair("api_key", &creds.api_key());
        }
        Ok(url)
    }

    fn operation_url(&self, operation: &Operation, bound: &BoundParams) -> Result<Url, Error> {
        let mut url = self.api_root.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|()| Error::Description {
                location: self.api_root.to_string(),
                message: "API root cannot carry a path".into(),
            })?;
            segments.pop_if_empty();

            for segment in operation.path.split('/').filter(|s| !s.is_empty()) {
                match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                    Some(name) => {
                        let value = bound.path.get(name).ok_or_else(|| Error::MissingParameter {
                            operation: operation.nickname.clone(),
                            parameter: name.to_owned(),
                        })?;
                        segments.push(value);
                    }
                    None => {
                        segments.push(segment);
                    }
                }
            }
        }

        if !bound.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in &bound.query {
                pairs.append_pair(name, value);
            }
        }
        Ok(url)
    }
}

// ── Parameter binding ───────────────────────────────────────────────

#[derive(Debug, Default)]
struct BoundParams {
    path: HashMap<String, String>,
    query: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    body: Option<Value>,
}

/// Sort caller arguments into request locations.
///
/// `null` arguments count as absent. Body parameters are collected into a
/// single JSON object keyed by parameter name (`{"variables": {...}}`).
fn bind(operation: &Operation, params: &Params) -> Result<BoundParams, Error> {
    let mut bound = BoundParams::default();
    let mut body = Map::new();

    for (name, value) in params {
        let declared = operation.parameter(name).ok_or_else(|| Error::UnknownParameter {
            operation: operation.nickname.clone(),
            parameter: name.clone(),
        })?;
        if value.is_null() {
            continue;
        }

        match declared.param_type {
            ParamType::Path => {
                let rendered = render_scalar(operation, name, value)?;
                bound.path.insert(name.clone(), rendered);
            }
            ParamType::Query | ParamType::Form => {
                let rendered = if declared.allow_multiple {
                    render_multiple(operation, name, value)?
                } else {
                    render_scalar(operation, name, value)?
                };
                bound.query.push((name.clone(), rendered));
            }
            ParamType::Header => {
                let rendered = render_scalar(operation, name, value)?;
                bound.headers.push((name.clone(), rendered));
            }
            ParamType::Body => {
                body.insert(name.clone(), value.clone());
            }
        }
    }

    if let Some(missing) = operation
        .parameters
        .iter()
        .find(|p| p.required && params.get(&p.name).is_none_or(Value::is_null))
    {
        return Err(Error::MissingParameter {
            operation: operation.nickname.clone(),
            parameter: missing.name.clone(),
        });
    }

    if !body.is_empty() {
        bound.body = Some(Value::Object(body));
    }
    Ok(bound)
}

fn render_scalar(operation: &Operation, name: &str, value: &Value) -> Result<String, Error> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(Error::InvalidParameter {
            operation: operation.nickname.clone(),
            parameter: name.to_owned(),
            reason: format!("expected a scalar, got {other}"),
        }),
    }
}

/// `allowMultiple` parameters accept a scalar or an array, sent comma-joined.
fn render_multiple(operation: &Operation, name: &str, value: &Value) -> Result<String, Error> {
    match value {
        Value::Array(items) => {
            let rendered = items
                .iter()
                .map(|item| render_scalar(operation, name, item))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rendered.join(","))
        }
        scalar => render_scalar(operation, name, scalar),
    }
}
