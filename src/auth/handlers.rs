use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    middleware,
    routing::{get, post},
    Extension, Json, Router,
};
use tracing::{instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, RegisterRequest, UserProfile},
        middleware::{require_bearer, AuthUser},
        services::AuthService,
        validation::{normalize_email, validate_registration, FieldViolation},
    },
    error::{AppError, Result},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

pub fn profile_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/auth/profile", get(profile))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_bearer))
}

fn body_error(rejection: JsonRejection) -> AppError {
    warn!(error = %rejection, "unreadable request body");
    AppError::Validation(vec![FieldViolation {
        field: "body".into(),
        message: rejection.body_text(),
    }])
}

#[instrument(skip(auth, payload))]
pub async fn register(
    State(auth): State<AuthService>,
    payload: std::result::Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserProfile>)> {
    let Json(mut payload) = payload.map_err(body_error)?;
    payload.email = normalize_email(&payload.email);

    if let Err(errors) = validate_registration(&payload) {
        warn!(email = %payload.email, violations = errors.len(), "registration rejected");
        return Err(AppError::Validation(errors));
    }

    let profile = auth.register(payload).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

#[instrument(skip(auth, payload))]
pub async fn login(
    State(auth): State<AuthService>,
    payload: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<UserProfile>> {
    // Any unusable login body is just a failed login.
    let Ok(Json(payload)) = payload else {
        return Err(AppError::InvalidCredentials);
    };
    let email = normalize_email(&payload.email);

    let profile = auth.login(&email, &payload.password).await?;
    Ok(Json(profile))
}

#[instrument(skip(auth, user), fields(email = %user.email))]
pub async fn profile(
    State(auth): State<AuthService>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<UserProfile>> {
    let profile = auth.get_profile(&user.email).await?;
    Ok(Json(profile))
}
