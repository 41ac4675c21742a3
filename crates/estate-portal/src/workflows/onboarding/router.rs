use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use super::domain::{AccountId, BulkAction, RegistrationRequest, ReviewedStatus};
use super::export::roster_csv;
use super::repository::{DirectoryError, Mailer, PartnerDirectory};
use super::service::{OnboardingError, OnboardingService};

const DEFAULT_PENDING_LIMIT: usize = 50;

/// Router builder exposing the onboarding HTTP surface.
pub fn onboarding_router<D, M>(service: Arc<OnboardingService<D, M>>) -> Router
where
    D: PartnerDirectory + 'static,
    M: Mailer + 'static,
{
    Router::new()
        .route("/api/v1/partners/register", post(register_handler::<D, M>))
        .route("/api/v1/partners/verify-otp", post(verify_otp_handler::<D, M>))
        .route(
            "/api/v1/partners/:account_id/status",
            put(status_handler::<D, M>),
        )
        .route(
            "/api/v1/partners/status/bulk",
            post(bulk_status_handler::<D, M>),
        )
        .route("/api/v1/partners/pending", get(pending_handler::<D, M>))
        .route("/api/v1/partners/export", get(export_handler::<D, M>))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpRequest {
    pub user_id: String,
    pub otp: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct BulkStatusRequest {
    pub ids: Vec<String>,
    pub action: String,
}

#[derive(Debug, Deserialize)]
pub struct PendingQuery {
    pub limit: Option<usize>,
}

pub(crate) async fn register_handler<D, M>(
    State(service): State<Arc<OnboardingService<D, M>>>,
    axum::Json(request): axum::Json<RegistrationRequest>,
) -> Response
where
    D: PartnerDirectory + 'static,
    M: Mailer + 'static,
{
    match service.register(request, Utc::now()) {
        Ok(receipt) => {
            let payload = json!({
                "message": receipt.message,
                "userId": receipt.account_id.0,
            });
            (StatusCode::CREATED, axum::Json(payload)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn verify_otp_handler<D, M>(
    State(service): State<Arc<OnboardingService<D, M>>>,
    axum::Json(request): axum::Json<VerifyOtpRequest>,
) -> Response
where
    D: PartnerDirectory + 'static,
    M: Mailer + 'static,
{
    let id = AccountId(request.user_id);
    match service.verify_email(&id, &request.otp, Utc::now()) {
        Ok(_) => {
            let payload = json!({ "message": "Email verified successfully" });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn status_handler<D, M>(
    State(service): State<Arc<OnboardingService<D, M>>>,
    Path(account_id): Path<String>,
    axum::Json(request): axum::Json<StatusUpdateRequest>,
) -> Response
where
    D: PartnerDirectory + 'static,
    M: Mailer + 'static,
{
    let Some(target) = ReviewedStatus::parse(&request.status) else {
        return error_response(OnboardingError::UnknownAction(request.status));
    };

    let id = AccountId(account_id);
    match service.review(&id, target, Utc::now()) {
        Ok(record) => (StatusCode::OK, axum::Json(record.partner_view())).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn bulk_status_handler<D, M>(
    State(service): State<Arc<OnboardingService<D, M>>>,
    axum::Json(request): axum::Json<BulkStatusRequest>,
) -> Response
where
    D: PartnerDirectory + 'static,
    M: Mailer + 'static,
{
    let Some(action) = BulkAction::parse(&request.action) else {
        return error_response(OnboardingError::UnknownAction(request.action));
    };

    let ids: Vec<AccountId> = request.ids.into_iter().map(AccountId).collect();
    match service.review_many(&ids, action, Utc::now()) {
        Ok(count) => {
            let payload = json!({
                "message": "Status updated",
                "count": count,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn pending_handler<D, M>(
    State(service): State<Arc<OnboardingService<D, M>>>,
    Query(query): Query<PendingQuery>,
) -> Response
where
    D: PartnerDirectory + 'static,
    M: Mailer + 'static,
{
    let limit = query.limit.unwrap_or(DEFAULT_PENDING_LIMIT);
    match service.pending(limit) {
        Ok(records) => {
            let views: Vec<_> = records
                .iter()
                .map(|record| record.partner_view())
                .collect();
            (StatusCode::OK, axum::Json(views)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn export_handler<D, M>(
    State(service): State<Arc<OnboardingService<D, M>>>,
) -> Response
where
    D: PartnerDirectory + 'static,
    M: Mailer + 'static,
{
    let records = match service.roster() {
        Ok(records) => records,
        Err(err) => return error_response(err),
    };

    match roster_csv(&records) {
        Ok(document) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/csv")],
            document,
        )
            .into_response(),
        Err(err) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

/// Map workflow failures onto the HTTP contract: validation and conflict
/// problems are 400, unknown accounts 404, everything else surfaces as 500
/// with the underlying message.
fn error_response(err: OnboardingError) -> Response {
    let status = match &err {
        OnboardingError::MissingField(_)
        | OnboardingError::DuplicateEmail
        | OnboardingError::InvalidOtp
        | OnboardingError::OtpExpired
        | OnboardingError::EmptyBatch
        | OnboardingError::UnknownAction(_) => StatusCode::BAD_REQUEST,
        OnboardingError::Directory(DirectoryError::NotFound) => StatusCode::NOT_FOUND,
        OnboardingError::Credential(_) | OnboardingError::Directory(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({ "error": err.to_string() });
    (status, axum::Json(payload)).into_response()
}
