//! Session handling: the logged-in user, flash messages and the access filter.
//!
//! Sessions are managed by `tower-sessions`; the store is chosen by the
//! binary (`SQLite` in production, in-memory in tests).

use axum::extract::{FromRequestParts, OriginalUri, Request};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use serde::{Deserialize, Serialize};
use tower_sessions::cookie::SameSite;
use tower_sessions::cookie::time::Duration;
use tower_sessions::{Expiry, Session, SessionManagerLayer, SessionStore};

use minishop_domain::id::UserId;
use minishop_domain::user::User;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "minishop_session";

/// Session key of the logged-in [`CurrentUser`].
pub const CURRENT_USER_KEY: &str = "current_user";

const FLASH_KEY: &str = "flash";

const PENDING_EMAIL_KEY: &str = "pending_email";

/// Page users are sent to when they must log in.
pub const LOGIN_PATH: &str = "/login";

/// Page logged-in users land on.
pub const HOME_PATH: &str = "/dashboard";

/// Build the session layer around `store`.
///
/// Sessions expire after `inactivity` without requests.
#[must_use]
pub fn layer<S>(store: S, secure: bool, inactivity: Duration) -> SessionManagerLayer<S>
where
    S: SessionStore,
{
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(inactivity))
        .with_secure(secure)
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

/// The account attached to a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub username: String,
    pub full_name: String,
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            full_name: user.full_name(),
        }
    }
}

/// Severity of a flash message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlashLevel {
    Success,
    Error,
}

/// A message shown once, on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Error,
            message: message.into(),
        }
    }

    /// CSS class used by the page layout.
    #[must_use]
    pub fn css_class(&self) -> &'static str {
        match self.level {
            FlashLevel::Success => "flash success",
            FlashLevel::Error => "flash error",
        }
    }
}

/// Store a flash message for the next page.
pub async fn set_flash(session: &Session, flash: Flash) {
    if let Err(err) = session.insert(FLASH_KEY, flash).await {
        tracing::warn!(%err, "failed to store flash message");
    }
}

/// Take the pending flash message, if any.
pub async fn take_flash(session: &Session) -> Option<Flash> {
    session.remove::<Flash>(FLASH_KEY).await.ok().flatten()
}

/// Remember the email a code was just sent to, to prefill the code form.
pub async fn set_pending_email(session: &Session, email: &str) {
    if let Err(err) = session.insert(PENDING_EMAIL_KEY, email).await {
        tracing::warn!(%err, "failed to store pending email");
    }
}

/// The email a code was last sent to, or an empty string.
pub async fn pending_email(session: &Session) -> String {
    session
        .get::<String>(PENDING_EMAIL_KEY)
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}

/// The logged-in user, if any.
pub async fn current_user(session: &Session) -> Option<CurrentUser> {
    session
        .get::<CurrentUser>(CURRENT_USER_KEY)
        .await
        .ok()
        .flatten()
}

/// Attach `user` to the session under a fresh session id.
///
/// # Errors
///
/// Returns the session store error if the session cannot be written.
pub async fn log_in(session: &Session, user: &User) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session
        .insert(CURRENT_USER_KEY, CurrentUser::from(user))
        .await
}

/// Drop all session data.
///
/// # Errors
///
/// Returns the session store error if the session cannot be deleted.
pub async fn log_out(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}

/// Who may request a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Anyone.
    Public,
    /// Only visitors without a session; logged-in users go home.
    GuestOnly,
    /// Only logged-in users.
    Protected,
}

/// Classify a request path.
#[must_use]
pub fn classify(path: &str) -> Access {
    match path {
        "/health" | "/api/auth/register" | "/api/auth/verify" | "/api/auth/login"
        | "/api/auth/recover" | "/api/auth/reset" => Access::Public,
        "/login" | "/register" | "/verify" | "/recover" | "/reset" => Access::GuestOnly,
        _ => Access::Protected,
    }
}

fn is_api(path: &str) -> bool {
    path == "/api" || path.starts_with("/api/")
}

/// Middleware guarding every route according to [`classify`].
///
/// Anonymous requests to protected pages are redirected to the login page,
/// and to protected API routes answered with `401`. Logged-in users asking
/// for a guest-only page are redirected to the dashboard.
pub async fn access_filter(session: Session, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_owned();
    let logged_in = current_user(&session).await.is_some();

    match classify(&path) {
        Access::Public => {}
        Access::GuestOnly if logged_in => return Redirect::to(HOME_PATH).into_response(),
        Access::GuestOnly => {}
        Access::Protected if !logged_in => {
            tracing::debug!(%path, "anonymous request to protected route");
            return if is_api(&path) {
                AuthRejection::Unauthorized.into_response()
            } else {
                AuthRejection::RedirectToLogin.into_response()
            };
        }
        Access::Protected => {}
    }

    next.run(request).await
}

/// Extractor that requires a logged-in user.
pub struct RequireAuth(pub CurrentUser);

/// Error returned when authentication is required but the user is not logged in.
#[derive(Debug)]
pub enum AuthRejection {
    /// Redirect to login page (for HTML requests).
    RedirectToLogin,
    /// Unauthorized response (for API requests).
    Unauthorized,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to(LOGIN_PATH).into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or(AuthRejection::Unauthorized)?;
        // Nested routers see a stripped URI.
        let path = parts
            .extensions
            .get::<OriginalUri>()
            .map_or_else(|| parts.uri.path().to_owned(), |uri| uri.path().to_owned());

        current_user(&session).await.map(Self).ok_or_else(|| {
            if is_api(&path) {
                AuthRejection::Unauthorized
            } else {
                AuthRejection::RedirectToLogin
            }
        })
    }
}
