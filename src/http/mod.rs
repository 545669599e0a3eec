// HTTP surface of the basket
// axum router, session cookie handling and error mapping

pub mod cookie;
pub mod handlers;
pub mod payload;

use crate::basket::UnresolvedPolicy;
use crate::catalog::Catalog;
use crate::config::{BasketConfig, SessionConfig};
use crate::error::{BasketError, Result};
use crate::observability;
use crate::session::{Session, SessionStore};
use axum::{
    body::Body,
    http::{header, HeaderMap, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

/// Shared state of the basket endpoints
pub struct AppState {
    pub catalog: Arc<dyn Catalog>,
    pub sessions: Arc<dyn SessionStore>,
    pub session: SessionConfig,
    pub basket: BasketConfig,
}

/// Session loaded for the duration of one request
pub struct RequestSession {
    pub session: Session,
    /// No stored session matched the request cookie
    pub fresh: bool,
}

impl AppState {
    pub fn policy(&self) -> UnresolvedPolicy {
        self.basket.unresolved_policy()
    }

    /// Load the session named by the request cookie or start a new one
    pub async fn open_session(&self, headers: &HeaderMap) -> Result<RequestSession> {
        if let Some(id) = cookie::find(headers, &self.session.cookie_name) {
            if let Some(session) = self.sessions.load(&id).await? {
                if !session.is_expired(self.session.timeout_secs) {
                    return Ok(RequestSession {
                        session,
                        fresh: false,
                    });
                }
                debug!(session_id = %id, "Discarding expired session");
                self.sessions.delete(&id).await?;
            }
        }

        Ok(RequestSession {
            session: Session::generate(),
            fresh: true,
        })
    }

    /// Persist a modified session and attach the cookie for new ones
    pub async fn commit(&self, request: RequestSession, mut response: Response) -> Result<Response> {
        let RequestSession { mut session, fresh } = request;
        if !session.is_modified() {
            return Ok(response);
        }

        session.update_activity();
        self.sessions.save(&session).await?;

        if fresh {
            if let Some(value) = cookie::issue(
                &self.session.cookie_name,
                &session.session_id,
                self.session.timeout_secs,
            ) {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
        }

        Ok(response)
    }
}

impl IntoResponse for BasketError {
    fn into_response(self) -> Response {
        let status = match &self {
            BasketError::ProductNotInBasket(_) | BasketError::ProductNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            BasketError::MissingTotal | BasketError::TotalOutOfRange => StatusCode::BAD_REQUEST,
            BasketError::CorruptBasket(_) => {
                error!(error = %self, "Basket request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

/// Build the basket router
pub fn router(state: Arc<AppState>) -> Router {
    let basket = get(handlers::summary)
        .post(handlers::add)
        .patch(handlers::adjust)
        .delete(handlers::remove);

    Router::new()
        .route("/basket", basket.clone())
        .route("/basket/", basket)
        .route("/basket/add", post(handlers::add))
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
            observability::request_span(req.method().as_str(), req.uri().path())
        }))
        .with_state(state)
}

/// Serve the basket endpoints until `shutdown` resolves
pub async fn serve(
    addr: SocketAddr,
    state: Arc<AppState>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Basket server listening on http://{}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
