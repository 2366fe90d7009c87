use axum::{
    Router,
    routing::get,
    extract::{ConnectInfo, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use crate::aggregation::{Aggregator, ComparisonResult, SnapshotResult, WatchOutcome};
use crate::error::{Error, Result};
use crate::observability::metrics::gather_metrics;
use crate::record::ValidationError;

pub fn create_router(aggregator: Arc<Aggregator>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .route("/api/stock-prices", get(stock_prices))
        .with_state(aggregator)
}

async fn health_check() -> &'static str {
    "OK"
}

async fn metrics() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        gather_metrics(),
    )
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StockPriceResponse<T> {
    stock_data: T,
}

#[derive(Debug, PartialEq, Serialize)]
struct StockLikes {
    stock: String,
    price: Option<f64>,
    likes: usize,
}

#[derive(Debug, PartialEq, Serialize)]
struct RelativeLikes {
    stock: String,
    price: Option<f64>,
    rel_likes: i64,
}

async fn stock_prices(
    State(aggregator): State<Arc<Aggregator>>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Response> {
    let stocks: Vec<&str> = params
        .iter()
        .filter(|(key, _)| key == "stock")
        .map(|(_, value)| value.as_str())
        .collect();
    let like = params
        .iter()
        .any(|(key, value)| key == "like" && matches!(value.to_ascii_lowercase().as_str(), "true" | "1"));

    if stocks.is_empty() {
        return Err(ValidationError::single("StockPriceQuery", "stock", "at least one stock is required").into());
    }

    if like {
        let address = requester_address(&headers, peer.map(|ConnectInfo(addr)| addr))?;
        return match aggregator.watch(&stocks, &address).await? {
            WatchOutcome::Snapshot(snapshot) => Ok(single_response(&snapshot)),
            WatchOutcome::Comparison(result) => pair_response(&result),
        };
    }

    if stocks.len() == 1 {
        let snapshot = aggregator.read(stocks[0]).await?;
        Ok(single_response(&snapshot))
    } else {
        let result = aggregator.compare(&stocks).await?;
        pair_response(&result)
    }
}

fn single_response(snapshot: &SnapshotResult) -> Response {
    let quote = snapshot.quote();
    Json(StockPriceResponse {
        stock_data: StockLikes {
            stock: quote.map(|q| q.symbol().to_string()).unwrap_or_default(),
            price: quote.and_then(|q| q.latest_price()),
            likes: snapshot.watcher_count(),
        },
    })
    .into_response()
}

fn pair_response(result: &ComparisonResult) -> Result<Response> {
    let comparison = result.comparison()?;
    let stock_data: Vec<RelativeLikes> = result
        .entries()
        .iter()
        .map(|(name, snapshot)| RelativeLikes {
            stock: name.clone(),
            price: snapshot.quote().and_then(|q| q.latest_price()),
            rel_likes: comparison.watchers.get(name).copied().unwrap_or(0),
        })
        .collect();

    Ok(Json(StockPriceResponse { stock_data }).into_response())
}

/// First `X-Forwarded-For` hop, else the peer IP.
fn requester_address(headers: &HeaderMap, peer: Option<SocketAddr>) -> Result<String> {
    let forwarded = headers
        .get("X-Forwarded-For")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    forwarded
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .ok_or_else(|| ValidationError::single("WatchRequest", "address", "requester address unavailable").into())
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::Validation(_) | Error::DuplicateSymbol(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Connection(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::warn!(kind = self.kind(), "Request failed: {}", self);
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
