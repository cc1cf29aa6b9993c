use serde::{Deserialize, Serialize};

use crate::users::dto::ShowUser;

/// OAuth2 password-flow form for `POST /login/token`. `username` holds the email.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Response returned after a successful login.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

#[derive(Debug, Serialize)]
pub struct AuthCheckResponse {
    #[serde(rename = "Success")]
    pub success: bool,
    pub current_user: ShowUser,
}
