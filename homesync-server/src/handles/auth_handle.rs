use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use homesync_core::auth::{AuthMode, Credentials, Locale, describe};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Clone, Serialize, Deserialize)]
pub struct CredentialsBody {
    pub mode: AuthMode,
    #[serde(flatten)]
    pub credentials: Credentials,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderErrorBody {
    pub code: Option<String>,
    pub message: Option<String>,
}

#[derive(Clone)]
pub struct AuthState {
    pub locale: Locale,
}

/// Checks a sign-in or sign-up form before it is handed to the auth provider.
pub async fn check_credentials(
    State(state): State<AuthState>,
    Json(body): Json<CredentialsBody>,
) -> impl IntoResponse {
    match body.credentials.validate(body.mode) {
        Ok(email) => (StatusCode::OK, Json(json!({ "email": email }))),
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": {
                    "code": StatusCode::BAD_REQUEST.as_u16(),
                    "message": e.message(state.locale),
                }
            })),
        ),
    }
}

/// Turns an auth provider failure into the message shown to the user.
pub async fn describe_auth_error(
    State(state): State<AuthState>,
    Json(body): Json<ProviderErrorBody>,
) -> impl IntoResponse {
    Json(json!({
        "message": describe(body.code.as_deref(), body.message.as_deref(), state.locale),
    }))
}
