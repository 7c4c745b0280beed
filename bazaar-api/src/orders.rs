use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use bazaar_shared::{CartRequest, Order, OrderId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{error::AppError, state::AppState};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateOrderResponse {
    pub message: String,
    pub order_id: OrderId,
    pub total_amount: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/orders", post(create_order))
        .route("/api/orders/{id}", get(get_order))
        .route("/api/orders/user/{user_id}", get(list_user_orders))
        .route("/api/orders/{id}/status", patch(update_order_status))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/orders
/// Validate the cart, persist the order and decrement stock
pub async fn create_order(
    State(state): State<AppState>,
    payload: Result<Json<CartRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateOrderResponse>), AppError> {
    let Json(cart) = payload?;

    let summary = state.orchestrator.create_order(&cart).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateOrderResponse {
            message: "Order created successfully".to_string(),
            order_id: summary.order_id,
            total_amount: summary.total_amount,
        }),
    ))
}

/// GET /api/orders/{id}
pub async fn get_order(
    State(state): State<AppState>,
    id: Result<Path<OrderId>, PathRejection>,
) -> Result<Json<Order>, AppError> {
    let Path(order_id) = id?;
    Ok(Json(state.orders.get_order(order_id).await?))
}

/// GET /api/orders/user/{user_id}
/// Order headers, newest first
pub async fn list_user_orders(
    State(state): State<AppState>,
    user_id: Result<Path<UserId>, PathRejection>,
) -> Result<Json<Vec<Order>>, AppError> {
    let Path(user_id) = user_id?;
    Ok(Json(state.orders.list_user_orders(user_id).await?))
}

/// PATCH /api/orders/{id}/status
pub async fn update_order_status(
    State(state): State<AppState>,
    id: Result<Path<OrderId>, PathRejection>,
    payload: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Path(order_id) = id?;
    let Json(req) = payload?;

    state.orders.update_status(order_id, &req.status).await?;

    Ok(Json(MessageResponse {
        message: "Order status updated successfully".to_string(),
    }))
}
