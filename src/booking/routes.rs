//! Booking session API route handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch, post, put},
    Json, Router,
};
use uuid::Uuid;

use crate::error::Result;
use crate::AppState;

use super::models::FieldUpdate;
use super::requests::{CreateSessionRequest, DiscountRequest, PaymentRequest, SetChildrenRequest};
use super::responses::SessionView;
use super::session::{self, BookingSession};

/// Booking session routes, mounted under `/api`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sessions", post(create_session))
        .route("/sessions/:id", get(get_session))
        .route("/sessions/:id/fields", patch(update_field))
        .route("/sessions/:id/children", put(set_children))
        .route("/sessions/:id/discount", post(apply_discount).delete(clear_discount))
        .route("/sessions/:id/checkout", post(checkout))
        .route("/sessions/:id/payment", post(pay))
        .route("/sessions/:id/cancel", post(cancel))
        .route("/sessions/:id/retry", post(retry))
        .route("/sessions/:id/resume", post(resume))
}

/// Start a booking for the selected plan
async fn create_session(
    State(state): State<AppState>,
    Json(req): Json<CreateSessionRequest>,
) -> (StatusCode, Json<SessionView>) {
    let session = BookingSession::new(
        req.plan,
        req.location,
        req.camp_type,
        state.gateway.clone(),
        state.bookings.clone(),
        state.season,
    );
    let view = SessionView::from(&session);
    tracing::info!("Session {} opened", session.id());
    state.sessions.insert(session).await;

    (StatusCode::CREATED, Json(view))
}

async fn get_session(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<SessionView>> {
    let entry = state.sessions.get(id).await?;
    let session = entry.lock().await;
    Ok(Json(SessionView::from(&*session)))
}

/// Apply one form edit; real-time validation runs for the edited field
async fn update_field(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(update): Json<FieldUpdate>,
) -> Result<Json<SessionView>> {
    let entry = state.sessions.get(id).await?;
    let mut session = entry.lock().await;
    session.update_field(update)?;
    Ok(Json(SessionView::from(&*session)))
}

async fn set_children(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SetChildrenRequest>,
) -> Result<Json<SessionView>> {
    let entry = state.sessions.get(id).await?;
    let mut session = entry.lock().await;
    session.set_number_of_children(req.count)?;
    Ok(Json(SessionView::from(&*session)))
}

async fn apply_discount(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<DiscountRequest>,
) -> Result<Json<SessionView>> {
    let entry = state.sessions.get(id).await?;
    let mut session = entry.lock().await;
    session.apply_discount(&req.code)?;
    Ok(Json(SessionView::from(&*session)))
}

async fn clear_discount(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<SessionView>> {
    let entry = state.sessions.get(id).await?;
    let mut session = entry.lock().await;
    session.clear_discount()?;
    Ok(Json(SessionView::from(&*session)))
}

/// Validate the form, freeze the price and open a payment intent
async fn checkout(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<SessionView>> {
    let entry = state.sessions.get(id).await?;
    let mut session = entry.lock().await;
    session.submit().await?;
    Ok(Json(SessionView::from(&*session)))
}

/// Confirm the payment and save the booking
async fn pay(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<PaymentRequest>,
) -> Result<Json<SessionView>> {
    let entry = state.sessions.get(id).await?;
    session::confirm_shared(&entry, &req.payment_method).await?;
    let session = entry.lock().await;
    Ok(Json(SessionView::from(&*session)))
}

async fn cancel(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<SessionView>> {
    let entry = state.sessions.get(id).await?;
    let mut session = entry.lock().await;
    session.cancel()?;
    Ok(Json(SessionView::from(&*session)))
}

async fn retry(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<SessionView>> {
    let entry = state.sessions.get(id).await?;
    let mut session = entry.lock().await;
    session.retry_payment().await?;
    Ok(Json(SessionView::from(&*session)))
}

async fn resume(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<SessionView>> {
    let entry = state.sessions.get(id).await?;
    let mut session = entry.lock().await;
    session.resume_editing()?;
    Ok(Json(SessionView::from(&*session)))
}
