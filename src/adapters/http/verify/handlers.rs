//! HTTP handlers for the verification endpoints.
//!
//! These handlers connect axum routes to the application layer. Auth and
//! field validation happen here so the handlers behind them only ever see
//! well-formed commands.

use std::sync::Arc;

use axum::extract::{Json, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;

use crate::application::handlers::{
    ReconcileOutcome, ReconcilePairHandler, SyncEntitlementHandler, VerifyPurchaseCommand,
    VerifyPurchaseError, VerifyPurchaseHandler, VerifyPurchaseOutcome,
};
use crate::domain::entitlement::Platform;
use crate::domain::foundation::{AuthError, PairId};
use crate::ports::{AppStoreClient, DocumentStore, PlayStoreClient, SessionValidator};

use super::dto::{
    ErrorResponse, PairWriteRequest, PairWriteResponse, RejectedResponse, VerifyPurchaseRequest,
    VerifyPurchaseResponse,
};

/// Shared application state for the verification routes.
///
/// Cloned per request; all dependencies are Arc-wrapped. Storefront clients
/// are optional so a deployment can serve one platform only, with the other
/// failing at request time as an operator error.
#[derive(Clone)]
pub struct VerifyAppState {
    pub session_validator: Arc<dyn SessionValidator>,
    pub store: Arc<dyn DocumentStore>,
    pub app_store: Option<Arc<dyn AppStoreClient>>,
    pub play_store: Option<Arc<dyn PlayStoreClient>>,
}

impl VerifyAppState {
    pub fn verify_purchase_handler(&self) -> VerifyPurchaseHandler {
        VerifyPurchaseHandler::new(
            self.app_store.clone(),
            self.play_store.clone(),
            SyncEntitlementHandler::new(self.store.clone()),
        )
    }

    pub fn reconcile_pair_handler(&self) -> ReconcilePairHandler {
        ReconcilePairHandler::new(self.store.clone())
    }
}

/// POST /verifyPurchase - verify a storefront receipt and sync entitlement.
///
/// The body is optional at the extractor level; an absent or malformed body
/// is treated as an empty request so it fails the field check with the same
/// 400 a partial body gets.
pub async fn verify_purchase(
    State(state): State<VerifyAppState>,
    headers: HeaderMap,
    body: Option<Json<VerifyPurchaseRequest>>,
) -> Result<impl IntoResponse, VerifyApiError> {
    let request = body.map(|Json(body)| body).unwrap_or_default();
    let token = bearer_token(&headers).ok_or(VerifyApiError::AuthRequired)?;
    let uid = state
        .session_validator
        .verify_token(token)
        .await
        .map_err(|err| {
            // A provider outage is not the caller's fault; only token
            // problems get the 401 that makes clients drop their session.
            if err.is_transient() {
                VerifyApiError::AuthUnavailable(err)
            } else {
                tracing::warn!(error = %err, "token verification failed");
                VerifyApiError::AuthRequired
            }
        })?;

    let (platform, product_id, verification_data) = match (
        request.platform,
        request.product_id,
        request.verification_data,
    ) {
        (Some(p), Some(id), Some(data)) if !p.is_empty() && !id.is_empty() && !data.is_empty() => {
            (p, id, data)
        }
        _ => return Err(VerifyApiError::MissingFields),
    };

    let platform = Platform::parse(&platform).ok_or(VerifyApiError::UnsupportedPlatform)?;

    let cmd = VerifyPurchaseCommand {
        uid,
        platform,
        product_id,
        verification_data,
        verification_source: request.verification_source,
    };

    let outcome = state.verify_purchase_handler().handle(cmd).await?;

    let response = match outcome {
        VerifyPurchaseOutcome::Rejected { status } => {
            Json(RejectedResponse::new(status)).into_response()
        }
        VerifyPurchaseOutcome::Verified {
            entitlement,
            status,
            verification_source,
        } => Json(VerifyPurchaseResponse::from_entitlement(
            entitlement,
            status,
            verification_source,
        ))
        .into_response(),
    };

    Ok(response)
}

/// POST /internal/pairWrite - reconcile a pair after its record changed.
///
/// Fired by the document-store trigger plumbing on every pair write.
/// Deletions are acknowledged without reconciling.
pub async fn pair_write(
    State(state): State<VerifyAppState>,
    Json(request): Json<PairWriteRequest>,
) -> Result<impl IntoResponse, VerifyApiError> {
    if request.deleted {
        return Ok(Json(PairWriteResponse { status: "skipped" }));
    }

    let pair_id = request
        .pair_id
        .as_deref()
        .and_then(|id| PairId::new(id).ok())
        .ok_or(VerifyApiError::MissingFields)?;

    let outcome = state
        .reconcile_pair_handler()
        .handle(&pair_id)
        .await
        .map_err(VerifyPurchaseError::Persistence)?;

    let status = match outcome {
        ReconcileOutcome::PairMissing => "missing",
        ReconcileOutcome::Unchanged => "unchanged",
        ReconcileOutcome::Updated(_) => "updated",
    };

    Ok(Json(PairWriteResponse { status }))
}

/// GET fallback for the verify route: anything but POST is a 405.
pub async fn method_not_allowed() -> VerifyApiError {
    VerifyApiError::MethodNotAllowed
}

/// Extract a bearer token from the Authorization header.
///
/// Tolerates surrounding whitespace, rejects empty tokens and schemes
/// other than `Bearer`.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(axum::http::header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.trim().strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token)
}

/// API error type mapping failures to the wire error contract.
#[derive(Debug)]
pub enum VerifyApiError {
    AuthRequired,
    AuthUnavailable(AuthError),
    MissingFields,
    UnsupportedPlatform,
    MethodNotAllowed,
    Internal(VerifyPurchaseError),
}

impl From<VerifyPurchaseError> for VerifyApiError {
    fn from(err: VerifyPurchaseError) -> Self {
        Self::Internal(err)
    }
}

impl IntoResponse for VerifyApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match &self {
            Self::AuthRequired => (StatusCode::UNAUTHORIZED, "Auth token required"),
            Self::AuthUnavailable(err) => {
                tracing::error!(error = %err, "token verification unavailable");
                (StatusCode::SERVICE_UNAVAILABLE, "Internal error")
            }
            Self::MissingFields => (StatusCode::BAD_REQUEST, "Missing required fields"),
            Self::UnsupportedPlatform => (StatusCode::BAD_REQUEST, "Unsupported platform"),
            Self::MethodNotAllowed => (StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed"),
            Self::Internal(err) => {
                // The caller only ever sees a generic message; the cause is
                // logged for operators.
                tracing::error!(error = %err, "verifyPurchase failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
            }
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}
