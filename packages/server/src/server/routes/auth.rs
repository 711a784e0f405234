//! HTTP endpoints for the auth flows.
//!
//! These are thin adapters: deserialize the form payload, run the flow,
//! translate the outcome into a JSON body plus session cookies.

use axum::extract::Extension;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::common::auth::AuthErrorKind;
use crate::domains::auth::flows::{self, FlowError, FlowOutcome, SignupInput};
use crate::domains::auth::session::append_session_cookies;
use crate::server::app::AppState;
use crate::server::context::RequestContext;

/// A failed flow, as seen by the frontend form.
pub struct FlowFailure(FlowError);

impl From<FlowError> for FlowFailure {
    fn from(err: FlowError) -> Self {
        Self(err)
    }
}

impl IntoResponse for FlowFailure {
    fn into_response(self) -> Response {
        match self.0 {
            FlowError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "success": false, "errors": errors })),
            )
                .into_response(),
            FlowError::Auth(err) => {
                let status = match err.kind {
                    AuthErrorKind::UnknownError => StatusCode::INTERNAL_SERVER_ERROR,
                    _ => StatusCode::BAD_REQUEST,
                };
                (
                    status,
                    Json(json!({
                        "success": false,
                        "error": { "kind": err.kind, "message": err.message },
                    })),
                )
                    .into_response()
            }
        }
    }
}

fn flow_response(state: &AppState, outcome: &FlowOutcome) -> Response {
    let mut response = Json(json!({
        "success": true,
        "data": { "needsConfirmEmail": outcome.needs_confirm_email },
    }))
    .into_response();
    if let Some(session) = &outcome.session {
        append_session_cookies(response.headers_mut(), session, &state.cookie_policy);
    }
    response
}

#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    pub email: String,
    pub password: String,
}

pub async fn login_handler(
    Extension(state): Extension<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<Response, FlowFailure> {
    let outcome = flows::login(state.auth.as_ref(), &payload.email, &payload.password).await?;
    Ok(flow_response(&state, &outcome))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupPayload {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

pub async fn signup_handler(
    Extension(state): Extension<AppState>,
    Json(payload): Json<SignupPayload>,
) -> Result<Response, FlowFailure> {
    let input = SignupInput {
        name: payload.name,
        email: payload.email,
        password: payload.password,
        confirm_password: payload.confirm_password,
    };
    let outcome =
        flows::signup(state.auth.as_ref(), &input, &state.config.admin_base_url).await?;
    Ok(flow_response(&state, &outcome))
}

#[derive(Debug, Deserialize)]
pub struct EmailPayload {
    pub email: String,
}

/// Request a password recovery email. Always reports success for
/// well-formed addresses, known or not.
pub async fn reset_handler(
    Extension(state): Extension<AppState>,
    Json(payload): Json<EmailPayload>,
) -> Result<Response, FlowFailure> {
    flows::request_password_reset(
        state.auth.as_ref(),
        &payload.email,
        &state.config.admin_base_url,
    )
    .await?;
    Ok(Json(json!({ "success": true, "data": {} })).into_response())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordPayload {
    pub password: String,
    pub confirm_password: String,
}

pub async fn update_password_handler(
    Extension(state): Extension<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Json(payload): Json<UpdatePasswordPayload>,
) -> Response {
    let Some(user) = &ctx.auth_user else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "success": false,
                "error": {
                    "kind": "UNAUTHORIZED",
                    "message": "You must be logged in to update your password",
                },
            })),
        )
            .into_response();
    };

    match flows::update_password(
        state.auth.as_ref(),
        &user.access_token,
        user.refresh_token.as_deref(),
        &payload.password,
        &payload.confirm_password,
    )
    .await
    {
        Ok(session) => {
            let mut response =
                Json(json!({ "success": true, "data": {} })).into_response();
            if let Some(session) = session {
                append_session_cookies(response.headers_mut(), &session, &state.cookie_policy);
            }
            response
        }
        Err(err) => FlowFailure(err).into_response(),
    }
}

pub async fn resend_handler(
    Extension(state): Extension<AppState>,
    Json(payload): Json<EmailPayload>,
) -> Result<Response, FlowFailure> {
    flows::resend_confirmation(state.auth.as_ref(), &payload.email).await?;
    Ok(Json(json!({ "success": true, "data": {} })).into_response())
}
