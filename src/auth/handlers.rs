use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Map};
use tracing::{info, instrument};

use crate::{
    auth::{
        dto::{AuthCheckResponse, LoginForm, TokenResponse},
        extractors::CurrentUser,
        jwt::JwtKeys,
        services::authenticate,
    },
    error::AppError,
    extract::ValidForm,
    state::AppState,
    users::dto::normalize_email,
};

pub fn login_routes() -> Router<AppState> {
    Router::new()
        .route("/login/token", post(login_for_access_token))
        .route("/login/test_auth_endpoint", get(test_auth_endpoint))
}

#[instrument(skip(state, keys, form))]
pub async fn login_for_access_token(
    State(state): State<AppState>,
    State(keys): State<JwtKeys>,
    ValidForm(form): ValidForm<LoginForm>,
) -> Result<Json<TokenResponse>, AppError> {
    let email = normalize_email(&form.username);

    let user = authenticate(state.store.as_ref(), &email, &form.password)
        .await?
        .ok_or_else(|| AppError::InvalidCredentials("Incorrect username or password".into()))?;

    let mut extra = Map::new();
    extra.insert("other_custom_data".into(), json!([1, 2, 3, 4]));
    let access_token = keys.issue_access(&user.email, extra)?;

    info!(user_id = %user.user_id, "user logged in");
    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".into(),
    }))
}

#[instrument(skip_all)]
pub async fn test_auth_endpoint(CurrentUser(user): CurrentUser) -> Json<AuthCheckResponse> {
    Json(AuthCheckResponse {
        success: true,
        current_user: user,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::hash_password;
    use crate::users::repo_types::NewUser;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::Response,
    };
    use serde_json::Value;
    use tower::ServiceExt;

    async fn seeded_app() -> (Router, AppState) {
        let state = AppState::for_tests();
        state
            .store
            .create(NewUser {
                name: "Lenny".into(),
                surname: "Kravec".into(),
                email: "kravec@example.com".into(),
                hashed_password: hash_password("12345").expect("hash"),
            })
            .await
            .expect("seed user");
        (login_routes().with_state(state.clone()), state)
    }

    async fn login(app: &Router, username: &str, password: &str) -> Response {
        let req = Request::builder()
            .method("POST")
            .uri("/login/token")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(format!("username={username}&password={password}")))
            .unwrap();
        app.clone().oneshot(req).await.unwrap()
    }

    async fn auth_check(app: &Router, authorization: Option<&str>) -> Response {
        let mut req = Request::builder().uri("/login/test_auth_endpoint");
        if let Some(value) = authorization {
            req = req.header(header::AUTHORIZATION, value);
        }
        app.clone()
            .oneshot(req.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn json_body(res: Response) -> Value {
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn login_then_call_protected_endpoint() {
        let (app, state) = seeded_app().await;

        let res = login(&app, "kravec@example.com", "12345").await;
        assert_eq!(res.status(), StatusCode::OK);
        let token: TokenResponse = serde_json::from_value(json_body(res).await).unwrap();
        assert_eq!(token.token_type, "bearer");

        let claims = state.keys.validate(&token.access_token).expect("valid token");
        assert_eq!(claims.sub, "kravec@example.com");
        assert_eq!(claims.extra["other_custom_data"], json!([1, 2, 3, 4]));

        let res = auth_check(&app, Some(&format!("Bearer {}", token.access_token))).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body = json_body(res).await;
        assert_eq!(body["Success"], true);
        assert_eq!(body["current_user"]["email"], "kravec@example.com");
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_get_same_response() {
        let (app, _) = seeded_app().await;

        let wrong_password = login(&app, "kravec@example.com", "nope").await;
        let unknown_email = login(&app, "nobody@example.com", "12345").await;

        assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(wrong_password).await, json_body(unknown_email).await);
    }

    #[tokio::test]
    async fn protected_endpoint_requires_token() {
        let (app, _) = seeded_app().await;
        let res = auth_check(&app, None).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn protected_endpoint_rejects_bad_token() {
        let (app, _) = seeded_app().await;
        let res = auth_check(&app, Some("Bearer not.a.token")).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(res).await["detail"], "Could not validate credentials");
    }

    #[tokio::test]
    async fn token_for_unknown_subject_is_rejected() {
        let (app, state) = seeded_app().await;
        let token = state
            .keys
            .issue_access("ghost@example.com", Map::new())
            .expect("sign");
        let res = auth_check(&app, Some(&format!("Bearer {token}"))).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(res).await["detail"], "Could not validate credentials");
    }

    #[tokio::test]
    async fn login_without_password_is_unprocessable() {
        let (app, _) = seeded_app().await;
        let req = Request::builder()
            .method("POST")
            .uri("/login/token")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("username=kravec@example.com"))
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(json_body(res).await["detail"].is_string());
    }
}
