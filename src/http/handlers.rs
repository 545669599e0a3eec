// Basket endpoint handlers

use super::payload::{AddForm, AdjustRequest, RemoveRequest, RemoveResponse, SummaryResponse};
use super::AppState;
use crate::basket::pricing::{self, TotalSource};
use crate::basket::Basket;
use crate::error::{BasketError, Result};
use axum::{
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
    Form, Json,
};
use std::sync::Arc;
use tracing::{debug, info};

/// List the reconciled basket with its grand total
pub async fn summary(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response> {
    let mut request = state.open_session(&headers).await?;

    let view = {
        let mut basket = Basket::open(&mut request.session)?.with_policy(state.policy());
        basket.iterate(state.catalog.as_ref()).await?
    };
    debug!(lines = view.lines.len(), total = %view.grand_total(), "Basket listed");

    state
        .commit(request, Json(SummaryResponse::from(view)).into_response())
        .await
}

/// Add one unit of a product
pub async fn add(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<AddForm>,
) -> Result<Response> {
    let mut request = state.open_session(&headers).await?;

    Basket::open(&mut request.session)?.add(form.productid.clone())?;
    info!(product_id = %form.productid, "Product added to basket");

    state.commit(request, "1".into_response()).await
}

/// Change the quantity of a product already in the basket
pub async fn adjust(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<AdjustRequest>,
) -> Result<Response> {
    let mut request = state.open_session(&headers).await?;
    let id = req.product_id;

    let outcome = {
        let mut basket = Basket::open(&mut request.session)?.with_policy(state.policy());
        if !basket.contains(&id) {
            return Err(BasketError::ProductNotInBasket(id));
        }

        let (current, product, running_total) = match state.basket.total_source {
            TotalSource::Server => {
                let view = basket.iterate(state.catalog.as_ref()).await?;
                let line = view
                    .line(&id)
                    .ok_or_else(|| BasketError::ProductNotFound(id.clone()))?;
                (line.amount, line.product.clone(), view.grand_total())
            }
            TotalSource::Client => {
                let running_total = req.total_price.ok_or(BasketError::MissingTotal)?;
                let current = basket.amount(&id).unwrap_or(0);
                let product = state
                    .catalog
                    .get(&id)
                    .await?
                    .ok_or_else(|| BasketError::ProductNotFound(id.clone()))?;
                (current, product, running_total)
            }
        };

        let outcome = pricing::adjust(
            current,
            req.product_amount,
            product.stock_amount,
            product.price,
            running_total,
        )?;
        if outcome.accepted() {
            basket.update_item(&id, req.product_amount)?;
        }
        outcome
    };

    info!(
        product_id = %id,
        required = req.product_amount,
        agreement = ?outcome.agreement,
        "Basket quantity adjustment"
    );

    state.commit(request, Json(outcome).into_response()).await
}

/// Remove a product and report the grand total without it
pub async fn remove(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<RemoveRequest>,
) -> Result<Response> {
    let mut request = state.open_session(&headers).await?;
    let id = req.product_id;

    let total = {
        let mut basket = Basket::open(&mut request.session)?.with_policy(state.policy());
        if !basket.contains(&id) {
            return Err(BasketError::ProductNotInBasket(id));
        }

        let total = match state.basket.total_source {
            TotalSource::Server => {
                let view = basket.iterate(state.catalog.as_ref()).await?;
                match view.line(&id) {
                    Some(line) => {
                        pricing::removal_total(view.grand_total(), line.product.price, line.amount)?
                    }
                    // Vanished products contribute nothing to the total
                    None => view.grand_total(),
                }
            }
            TotalSource::Client => {
                let running_total = req.total_price.ok_or(BasketError::MissingTotal)?;
                let current = basket.amount(&id).unwrap_or(0);
                let product = state
                    .catalog
                    .get(&id)
                    .await?
                    .ok_or_else(|| BasketError::ProductNotFound(id.clone()))?;
                pricing::removal_total(running_total, product.price, current)?
            }
        };

        // Pruning may already have dropped the key
        if basket.contains(&id) {
            basket.delete_product(&id)?;
        }
        total
    };

    info!(product_id = %id, total = %total, "Product removed from basket");

    let body = RemoveResponse {
        total: total.to_string(),
    };
    state.commit(request, Json(body).into_response()).await
}

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
