use crate::db::{FolderInfo, FolderResolver};
use crate::error::SyncError;
use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tracing::{error, warn};

/// Credentials checker shared with every request through an extension
#[derive(Clone)]
pub struct AuthExtractor {
    resolver: Arc<dyn FolderResolver>,
    admin_token: Option<Arc<str>>,
}

/// Extractor for folder clients
///
/// Resolves the bearer token to the folder it grants access to; returns 401
/// for a missing, unknown or rotated token.
#[derive(Debug, Clone)]
pub struct FolderAuth(pub FolderInfo);

/// Extractor for administrator endpoints
///
/// Returns 401 without a bearer token, 403 when the token is not the
/// configured admin token or no admin token is configured.
#[derive(Debug, Clone, Copy)]
pub struct RequireAdmin;

impl AuthExtractor {
    pub fn new(resolver: Arc<dyn FolderResolver>, admin_token: Option<String>) -> Self {
        Self {
            resolver,
            admin_token: admin_token.map(Arc::from),
        }
    }

    /// Resolve a folder token
    pub fn folder_for_token(&self, token: &str) -> Result<FolderInfo, SyncError> {
        match self.resolver.find_by_token(token)? {
            Some(folder) => Ok(folder),
            None => {
                warn!("Rejected request with unknown folder token");
                Err(SyncError::Unauthorized)
            }
        }
    }

    /// Check a token against the admin token
    pub fn check_admin(&self, token: &str) -> Result<(), SyncError> {
        let Some(expected) = &self.admin_token else {
            warn!("Admin request rejected: ADMIN_TOKEN is not configured");
            return Err(SyncError::Forbidden);
        };

        if bool::from(token.as_bytes().ct_eq(expected.as_bytes())) {
            Ok(())
        } else {
            warn!("Admin request rejected: wrong token");
            Err(SyncError::Forbidden)
        }
    }
}

async fn bearer_token<S: Send + Sync>(parts: &mut Parts, state: &S) -> Result<String, SyncError> {
    TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
        .await
        .map(|TypedHeader(auth)| auth.token().to_string())
        .map_err(|_| SyncError::Unauthorized)
}

fn extractor(parts: &Parts) -> Result<AuthExtractor, SyncError> {
    parts.extensions.get::<AuthExtractor>().cloned().ok_or_else(|| {
        error!("AuthExtractor extension is missing from the router");
        SyncError::Internal("auth not configured")
    })
}

impl<S> FromRequestParts<S> for FolderAuth
where
    S: Send + Sync,
{
    type Rejection = SyncError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let extractor = extractor(parts)?;
        let token = bearer_token(parts, state).await?;
        extractor.folder_for_token(&token).map(FolderAuth)
    }
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = SyncError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let extractor = extractor(parts)?;
        let token = bearer_token(parts, state).await?;
        extractor.check_admin(&token).map(|()| RequireAdmin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{SyncRepo, init_database};
    use axum::{Router, body::Body, http::Request, http::StatusCode, routing::get};
    use http_body_util::BodyExt;
    use rusqlite::Connection;
    use tower::ServiceExt;

    fn setup(admin_token: Option<&str>) -> (Arc<SyncRepo>, AuthExtractor) {
        let conn = Connection::open_in_memory().unwrap();
        init_database(&conn).unwrap();
        let repo = Arc::new(SyncRepo::new(conn));
        let auth = AuthExtractor::new(repo.clone(), admin_token.map(str::to_string));
        (repo, auth)
    }

    #[test]
    fn test_folder_token_resolution() {
        let (repo, auth) = setup(None);
        let folder = repo.create_folder("Docs").unwrap();

        assert_eq!(auth.folder_for_token(&folder.access_token).unwrap().id, folder.id);
        assert!(matches!(
            auth.folder_for_token("bogus"),
            Err(SyncError::Unauthorized)
        ));
    }

    #[test]
    fn test_admin_check() {
        let (_repo, auth) = setup(Some("s3cret"));
        assert!(auth.check_admin("s3cret").is_ok());
        assert!(matches!(auth.check_admin("s3cre"), Err(SyncError::Forbidden)));
        assert!(matches!(auth.check_admin(""), Err(SyncError::Forbidden)));
    }

    #[test]
    fn test_admin_disabled_without_token() {
        let (_repo, auth) = setup(None);
        assert!(matches!(auth.check_admin("anything"), Err(SyncError::Forbidden)));
    }

    #[tokio::test]
    async fn test_missing_extension_uses_error_envelope() {
        async fn folder_name(FolderAuth(folder): FolderAuth) -> String {
            folder.name
        }
        let app = Router::new().route("/folder", get(folder_name));

        let request = Request::builder()
            .uri("/folder")
            .header("authorization", "Bearer anything")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "internal_error");
    }
}
