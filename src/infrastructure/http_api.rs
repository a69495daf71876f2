//! REST side of the mock backend: top picks, stock snapshot and pattern
//! history, all synthetic.

use crate::application::market_data::QuoteGenerator;
use crate::domain::errors::MarketDataError;
use crate::domain::market::{PatternEvent, StockPick, StockSnapshot};
use axum::extract::{Path, Query, Request, State};
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use rand::rngs::StdRng;
use serde::Deserialize;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tracing::{debug, info};

#[derive(Clone)]
pub struct ApiState {
    rng: Arc<Mutex<StdRng>>,
}

impl ApiState {
    pub fn new(rng: StdRng) -> Self {
        Self {
            rng: Arc::new(Mutex::new(rng)),
        }
    }
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/api/picks/top/{count}", get(top_picks))
        .route("/api/stock/{symbol}", get(stock_details))
        .route("/api/patterns/{symbol}", get(patterns))
        .fallback(fallback)
        .layer(middleware::from_fn(cors))
        .with_state(state)
}

/// Serves until `shutdown` resolves, then lets in-flight requests finish.
pub async fn serve<F>(listener: TcpListener, state: ApiState, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    info!("HTTP API listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

/// Every rejection the API produces is a 404 with a JSON body.
struct NotFound(MarketDataError);

impl IntoResponse for NotFound {
    fn into_response(self) -> Response {
        debug!("HTTP API: {}", self.0);
        (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": "Not found" })),
        )
            .into_response()
    }
}

/// Upper-case ASCII letters only, at least one.
pub fn is_valid_symbol(symbol: &str) -> bool {
    !symbol.is_empty() && symbol.bytes().all(|b| b.is_ascii_uppercase())
}

fn validate_symbol(symbol: String) -> Result<String, NotFound> {
    if is_valid_symbol(&symbol) {
        Ok(symbol)
    } else {
        Err(NotFound(MarketDataError::InvalidSymbol { symbol }))
    }
}

async fn top_picks(
    State(state): State<ApiState>,
    Path(count): Path<String>,
) -> Result<Json<Vec<StockPick>>, NotFound> {
    if count.is_empty() || !count.bytes().all(|b| b.is_ascii_digit()) {
        return Err(NotFound(MarketDataError::RouteNotFound {
            path: format!("/api/picks/top/{}", count),
        }));
    }
    // All-digit but too large for usize still means "everything".
    let count = count.parse::<usize>().unwrap_or(usize::MAX);

    let mut rng = state.rng.lock().await;
    Ok(Json(QuoteGenerator::top_picks(count, &mut *rng)))
}

async fn stock_details(
    State(state): State<ApiState>,
    Path(symbol): Path<String>,
) -> Result<Json<StockSnapshot>, NotFound> {
    let symbol = validate_symbol(symbol)?;
    let mut rng = state.rng.lock().await;
    Ok(Json(QuoteGenerator::stock_snapshot(&symbol, &mut *rng)))
}

/// `timeframe` and `days` are accepted for client compatibility; the batch
/// shape does not depend on them.
#[derive(Debug, Deserialize)]
struct PatternQuery {
    timeframe: Option<String>,
    days: Option<String>,
}

async fn patterns(
    State(state): State<ApiState>,
    Path(symbol): Path<String>,
    Query(query): Query<PatternQuery>,
) -> Result<Json<Vec<PatternEvent>>, NotFound> {
    let symbol = validate_symbol(symbol)?;
    debug!(
        "HTTP API: patterns for {} (timeframe={:?}, days={:?})",
        symbol, query.timeframe, query.days
    );
    let mut rng = state.rng.lock().await;
    Ok(Json(QuoteGenerator::pattern_batch(Utc::now(), &mut *rng)))
}

async fn fallback(request: Request) -> NotFound {
    NotFound(MarketDataError::RouteNotFound {
        path: request.uri().path().to_string(),
    })
}

/// Permissive CORS on every response; preflight requests short-circuit with 200.
async fn cors(request: Request, next: Next) -> Response {
    let mut response = if request.method() == Method::OPTIONS {
        StatusCode::OK.into_response()
    } else {
        next.run(request).await
    };

    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
    response
}
