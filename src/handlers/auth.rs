// Authentication handlers: login, public sign-up, profile and password change

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use axum_extra::{headers::UserAgent, TypedHeader};
use validator::Validate;

use crate::{
    app::AppState,
    middleware::auth::AuthenticatedUser,
    models::{
        auth::{AuthResponse, CambiarPasswordRequest, LoginRequest, LoginResponse, RegistroRequest},
        user::{Usuario, UsuarioResponse},
    },
    services::UserService,
    utils::{log_auth_failure, normalize_email, AuditAction, AuditLogger, AuthError},
};

/// POST /api/auth/login - Authenticate and return a bearer token
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    operation_id = "login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = LoginResponse),
        (status = 401, description = "Invalid credentials or inactive account")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    user_agent: Option<TypedHeader<UserAgent>>,
    Json(login_req): Json<LoginRequest>,
) -> impl IntoResponse {
    let user_agent = user_agent.map(|TypedHeader(ua)| ua.to_string());

    let email = normalize_email(&login_req.email);
    if email.is_empty() || !email.contains('@') || login_req.password.is_empty() {
        log_auth_failure(&email, &AuthError::InvalidCredentials, user_agent.as_deref());
        return AuthError::InvalidCredentials.into_response();
    }

    let usuario = match UserService::new(&state)
        .authenticate(&email, &login_req.password)
        .await
    {
        Ok(usuario) => usuario,
        Err(e) => {
            log_auth_failure(&email, &e, user_agent.as_deref());
            AuditLogger::log(AuditAction::LoginFailed, None, "usuario", None, Some(email));
            return e.into_response();
        },
    };

    let token = match state.jwt_service.generate_token(usuario.id, usuario.rol) {
        Ok(token) => token,
        Err(e) => return AuthError::from(e).into_response(),
    };

    tracing::info!(user_id = %usuario.id, rol = %usuario.rol, "Login successful");
    AuditLogger::log(
        AuditAction::LoginSucceeded,
        Some(usuario.id),
        "usuario",
        Some(usuario.id.to_string()),
        user_agent,
    );

    let response = LoginResponse {
        token,
        usuario: UsuarioResponse::from(usuario),
    };
    (StatusCode::OK, Json(AuthResponse::ok(response))).into_response()
}

/// POST /api/auth/registro - Public sign-up, always with role `cliente`
#[utoipa::path(
    post,
    path = "/api/auth/registro",
    tag = "Auth",
    operation_id = "registro",
    request_body = RegistroRequest,
    responses(
        (status = 201, description = "Account created", body = LoginResponse),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn registro(
    State(state): State<AppState>,
    Json(request): Json<RegistroRequest>,
) -> impl IntoResponse {
    if let Err(e) = request.validate() {
        return AuthError::ValidationError(e.to_string()).into_response();
    }

    let usuario: Usuario = match UserService::new(&state).register(request).await {
        Ok(usuario) => usuario,
        Err(e) => return AuthError::from(e).into_response(),
    };

    let token = match state.jwt_service.generate_token(usuario.id, usuario.rol) {
        Ok(token) => token,
        Err(e) => return AuthError::from(e).into_response(),
    };

    let response = LoginResponse {
        token,
        usuario: UsuarioResponse::from(usuario),
    };
    (StatusCode::CREATED, Json(AuthResponse::ok(response))).into_response()
}

/// GET /api/auth/perfil - The authenticated user
#[utoipa::path(
    get,
    path = "/api/auth/perfil",
    tag = "Auth",
    operation_id = "perfil",
    responses(
        (status = 200, description = "Current user", body = UsuarioResponse),
        (status = 401, description = "Missing or invalid token")
    ),
    security(
        ("bearerAuth" = [])
    )
)]
pub async fn perfil(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
) -> impl IntoResponse {
    match UserService::new(&state).get(auth_user.id).await {
        Ok(usuario) => {
            Json(AuthResponse::ok(UsuarioResponse::from(usuario))).into_response()
        },
        Err(e) => AuthError::from(e).into_response(),
    }
}

/// PUT /api/auth/password - Change own password
#[utoipa::path(
    put,
    path = "/api/auth/password",
    tag = "Auth",
    operation_id = "cambiarPassword",
    request_body = CambiarPasswordRequest,
    responses(
        (status = 200, description = "Password changed"),
        (status = 400, description = "New password too weak"),
        (status = 401, description = "Current password wrong or token invalid")
    ),
    security(
        ("bearerAuth" = [])
    )
)]
pub async fn cambiar_password(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Json(request): Json<CambiarPasswordRequest>,
) -> impl IntoResponse {
    match UserService::new(&state)
        .change_password(&auth_user, request)
        .await
    {
        Ok(()) => Json(AuthResponse::<()>::message("Contraseña actualizada")).into_response(),
        Err(e) => {
            log_auth_failure(&auth_user.email, &e, None);
            e.into_response()
        },
    }
}
