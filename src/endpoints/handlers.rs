use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    Json,
};
use serde_json::{json, Map, Value};

use crate::endpoints::EndpointState;
use crate::health::{CompositeHealth, HealthStatus};
use crate::httptrace::HttpTraces;
use crate::logfile::{LogSlice, LogfileError};

/// Endpoint names advertised by the index, relative to the prefix.
const LINKS: [(&str, &str); 5] = [
    ("health", "/health"),
    ("info", "/info"),
    ("httptrace", "/httptrace"),
    ("logfile", "/logfile"),
    ("self", ""),
];

pub async fn get_index(State(state): State<EndpointState>) -> Json<Value> {
    let links: Map<String, Value> = LINKS
        .iter()
        .map(|(name, path)| {
            let href = format!("{}{}", state.management_url, path);
            (name.to_string(), json!({ "href": href, "templated": false }))
        })
        .collect();

    Json(json!({ "_links": links }))
}

pub async fn get_health(State(state): State<EndpointState>) -> (StatusCode, Json<CompositeHealth>) {
    let health = state.health.aggregate();
    let status = match health.status {
        HealthStatus::Down => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::OK,
    };
    (status, Json(health))
}

pub async fn get_info(State(state): State<EndpointState>) -> Json<Value> {
    let mut info = Map::new();
    info.insert(
        "app".to_string(),
        json!({
            "name": state.app.name,
            "description": state.app.description,
        }),
    );
    for (key, value) in state.info.iter() {
        info.insert(key.clone(), Value::String(value.clone()));
    }
    Json(Value::Object(info))
}

pub async fn get_httptrace(State(state): State<EndpointState>) -> Json<HttpTraces> {
    Json(HttpTraces {
        traces: state.traces.snapshot(),
    })
}

pub async fn get_logfile(
    State(state): State<EndpointState>,
    headers: HeaderMap,
) -> Result<LogSlice, LogfileError> {
    // A non-ASCII Range header cannot parse and is rejected like any malformed one.
    let range = headers
        .get(header::RANGE)
        .map(|value| value.to_str().unwrap_or_default());

    state.logs.resolve_range(range)
}
