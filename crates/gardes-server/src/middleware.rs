//! Request middleware: request ids, bearer auth, per-client rate limiting.

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{Request, State},
    http::{
        header::{self, AUTHORIZATION},
        HeaderValue, StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use gardes_core::Environment;
use serde_json::json;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Request ID carried through handlers as an extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Bearer-token auth settings.
///
/// Keys come from `GARDES_API_KEYS` (comma-separated). Outside production a
/// missing key set disables auth so local iteration and tests need no setup;
/// production refuses to start without keys.
#[derive(Debug, Clone)]
pub struct AuthState {
    api_keys: Arc<HashSet<String>>,
}

impl AuthState {
    /// # Errors
    ///
    /// Fails in production when `GARDES_API_KEYS` lists no tokens.
    pub fn from_env(env: &Environment) -> anyhow::Result<Self> {
        let raw = std::env::var("GARDES_API_KEYS").unwrap_or_default();
        let api_keys: HashSet<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToOwned::to_owned)
            .collect();

        if api_keys.is_empty() {
            if *env == Environment::Production {
                anyhow::bail!(
                    "GARDES_API_KEYS must list at least one bearer token in production"
                );
            }
            tracing::warn!(%env, "GARDES_API_KEYS not set; bearer auth disabled");
        }

        Ok(Self {
            api_keys: Arc::new(api_keys),
        })
    }

    fn enabled(&self) -> bool {
        !self.api_keys.is_empty()
    }

    fn allows(&self, token: &str) -> bool {
        self.api_keys.contains(token)
    }
}

#[derive(Debug)]
struct ClientWindow {
    started_at: Instant,
    count: usize,
}

/// Fixed-window limiter with one window per client.
///
/// Clients are keyed by the bearer token they present; requests without one
/// share the anonymous bucket. Expired windows are pruned on each check, so
/// the map stays bounded by the number of clients active within one window.
#[derive(Debug, Clone)]
pub struct RateLimitState {
    max_requests: usize,
    window: Duration,
    clients: Arc<Mutex<HashMap<String, ClientWindow>>>,
}

impl RateLimitState {
    #[must_use]
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            clients: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Record a hit for `client`; false once the client's window is full.
    async fn check(&self, client: &str) -> bool {
        let mut clients = self.clients.lock().await;
        let now = Instant::now();
        clients.retain(|_, w| now.duration_since(w.started_at) < self.window);

        let window = clients.entry(client.to_owned()).or_insert(ClientWindow {
            started_at: now,
            count: 0,
        });
        if window.count >= self.max_requests {
            return false;
        }
        window.count += 1;
        true
    }
}

/// Extract or generate a request ID.
///
/// An incoming non-empty `x-request-id` header wins; otherwise a fresh
/// `UUIDv4` is minted. The ID rides through handlers as a [`RequestId`]
/// extension and is echoed on the response header.
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = match req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
    {
        Some(id) if !id.is_empty() => id.to_owned(),
        _ => Uuid::new_v4().to_string(),
    };

    req.extensions_mut().insert(RequestId(id.clone()));
    let mut res = next.run(req).await;
    if let Ok(value) = HeaderValue::from_str(&id) {
        res.headers_mut().insert("x-request-id", value);
    }
    res
}

/// Reject requests without a recognized bearer token, when auth is enabled.
pub async fn require_bearer_auth(
    State(auth): State<AuthState>,
    req: Request,
    next: Next,
) -> Response {
    if !auth.enabled() {
        return next.run(req).await;
    }

    let token = bearer_token(&req);
    match token {
        Some(token) if auth.allows(token) => next.run(req).await,
        _ => reject(
            &req,
            StatusCode::UNAUTHORIZED,
            "unauthorized",
            "missing or invalid bearer token",
        ),
    }
}

/// Reject requests from clients that exhausted their window, with a
/// `Retry-After` hint.
pub async fn enforce_rate_limit(
    State(limiter): State<RateLimitState>,
    req: Request,
    next: Next,
) -> Response {
    let client = bearer_token(&req).unwrap_or("anonymous").to_owned();
    if limiter.check(&client).await {
        return next.run(req).await;
    }

    let mut res = reject(
        &req,
        StatusCode::TOO_MANY_REQUESTS,
        "rate_limited",
        "rate limit exceeded",
    );
    if let Ok(value) = HeaderValue::from_str(&limiter.window.as_secs().to_string()) {
        res.headers_mut().insert(header::RETRY_AFTER, value);
    }
    res
}

/// Error body in the API envelope shape, with the request id when the
/// request-id layer already ran.
fn reject(req: &Request, status: StatusCode, code: &str, message: &str) -> Response {
    let request_id = req
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_default();

    (
        status,
        Json(json!({
            "error": { "code": code, "message": message },
            "meta": { "request_id": request_id },
        })),
    )
        .into_response()
}

fn bearer_token(req: &Request) -> Option<&str> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
