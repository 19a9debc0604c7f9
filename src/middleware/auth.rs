use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use tonerdesk_auth::{Claims, verify_token};
use tonerdesk_core::{Actor, AppError};

use crate::state::AppState;

/// Extractor that validates the bearer JWT and exposes the caller's claims.
///
/// The claims carry the full [`Actor`] permission record; handlers pass it
/// explicitly to the access checks below.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    pub fn actor(&self) -> &Actor {
        &self.0.actor
    }

    pub fn user_id(&self) -> &str {
        &self.0.sub
    }

    /// Fails with 403 unless the actor may open `page`.
    pub fn require_page(&self, page: &str) -> Result<(), AppError> {
        if self.actor().can_access_page(page) {
            Ok(())
        } else {
            Err(AppError::forbidden(format!(
                "Access denied. Missing page permission: {}",
                page
            )))
        }
    }

    /// Fails with 403 unless the actor was granted write access to `module`.
    pub fn require_write(&self, module: &str) -> Result<(), AppError> {
        if self.actor().can_write(module) {
            Ok(())
        } else {
            Err(AppError::forbidden(format!(
                "Access denied. Missing write permission: {}",
                module
            )))
        }
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("Missing authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::unauthorized("Invalid authorization header format"))?;

        let claims = verify_token(token, &state.jwt_config)?;

        Ok(AuthUser(claims))
    }
}

/// Declares an extractor that authenticates and then checks one page.
#[macro_export]
macro_rules! require_page {
    ($name:ident, $page:expr) => {
        #[derive(Debug, Clone)]
        pub struct $name(pub $crate::middleware::auth::AuthUser);

        impl axum::extract::FromRequestParts<$crate::state::AppState> for $name {
            type Rejection = tonerdesk_core::AppError;

            async fn from_request_parts(
                parts: &mut axum::http::request::Parts,
                state: &$crate::state::AppState,
            ) -> Result<Self, Self::Rejection> {
                let auth_user =
                    $crate::middleware::auth::AuthUser::from_request_parts(parts, state).await?;
                auth_user.require_page($page)?;
                Ok($name(auth_user))
            }
        }
    };
}

/// Declares an extractor that authenticates and then checks one write module.
#[macro_export]
macro_rules! require_write {
    ($name:ident, $module:expr) => {
        #[derive(Debug, Clone)]
        pub struct $name(pub $crate::middleware::auth::AuthUser);

        impl axum::extract::FromRequestParts<$crate::state::AppState> for $name {
            type Rejection = tonerdesk_core::AppError;

            async fn from_request_parts(
                parts: &mut axum::http::request::Parts,
                state: &$crate::state::AppState,
            ) -> Result<Self, Self::Rejection> {
                let auth_user =
                    $crate::middleware::auth::AuthUser::from_request_parts(parts, state).await?;
                auth_user.require_write($module)?;
                Ok($name(auth_user))
            }
        }
    };
}

require_page!(RequireConfigPage, tonerdesk_core::permissions::PAGE_CONFIG);
require_write!(RequireConfigWrite, tonerdesk_core::permissions::MODULE_CONFIG);
