//! Server-side rendered back-office pages (no JavaScript).
//!
//! Every page is complete HTML rendered with askama. Forms POST to a handler
//! that redirects afterwards (PRG pattern); the outcome travels to the next
//! page as a flash message stored in the session.

#[allow(clippy::missing_errors_doc)]
pub mod auth;
#[allow(clippy::missing_errors_doc)]
pub mod customers;
pub mod home;
#[allow(clippy::missing_errors_doc)]
pub mod orders;
#[allow(clippy::missing_errors_doc)]
pub mod products;

use std::str::FromStr;

use askama::Template;
use axum::Router;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use tower_sessions::Session;

use minishop_app::ports::{
    CustomerRepository, Mailer, OrderRepository, ProductRepository, UserRepository,
};
use minishop_domain::error::{MiniShopError, ValidationError};

use crate::session::{CurrentUser, Flash, current_user, set_flash, take_flash};
use crate::state::AppState;

/// Data every page layout needs.
pub struct Layout {
    pub flash: Option<Flash>,
    pub user: Option<CurrentUser>,
}

impl Layout {
    /// Read the logged-in user and consume the pending flash message.
    pub async fn load(session: &Session) -> Self {
        Self {
            flash: take_flash(session).await,
            user: current_user(session).await,
        }
    }
}

/// Full-page error shown when a page cannot be loaded.
#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    layout: Layout,
    status: u16,
    message: String,
}

pub(crate) fn render<T: Template>(template: &T) -> Response {
    render_with_status(StatusCode::OK, template)
}

pub(crate) fn render_with_status<T: Template>(status: StatusCode, template: &T) -> Response {
    match template.render() {
        Ok(html) => (status, Html(html)).into_response(),
        Err(err) => {
            tracing::error!(%err, "template render error");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}

/// Render the error page for `err`.
pub(crate) async fn error_page(session: &Session, err: &MiniShopError) -> Response {
    let (status, message) = crate::error::classify(err);
    let template = ErrorTemplate {
        layout: Layout::load(session).await,
        status: status.as_u16(),
        message,
    };
    render_with_status(status, &template)
}

/// Flash `message` and redirect to `to`.
pub(crate) async fn succeed(session: &Session, message: impl Into<String>, to: &str) -> Response {
    set_flash(session, Flash::success(message)).await;
    Redirect::to(to).into_response()
}

/// Flash the user-facing description of `err` and redirect to `to`.
pub(crate) async fn fail(session: &Session, err: &MiniShopError, to: &str) -> Response {
    let (_, message) = crate::error::classify(err);
    set_flash(session, Flash::error(message)).await;
    Redirect::to(to).into_response()
}

/// Parse a numeric form field. A blank field is zero.
pub(crate) fn parse_number<T>(field: &'static str, value: &str) -> Result<T, ValidationError>
where
    T: FromStr + Default,
{
    let value = value.trim();
    if value.is_empty() {
        return Ok(T::default());
    }
    value
        .parse()
        .map_err(|_| ValidationError::InvalidNumber { field })
}

/// Build the sub-router for the HTML pages.
pub fn routes<CR, PR, OR, UR, M>() -> Router<AppState<CR, PR, OR, UR, M>>
where
    CR: CustomerRepository + Send + Sync + 'static,
    PR: ProductRepository + Send + Sync + 'static,
    OR: OrderRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(home::root))
        .route("/dashboard", get(home::index::<CR, PR, OR, UR, M>))
        // Account
        .route(
            "/login",
            get(auth::login_page).post(auth::login::<CR, PR, OR, UR, M>),
        )
        .route(
            "/register",
            get(auth::register_page).post(auth::register::<CR, PR, OR, UR, M>),
        )
        .route(
            "/verify",
            get(auth::verify_page).post(auth::verify::<CR, PR, OR, UR, M>),
        )
        .route(
            "/recover",
            get(auth::recover_page).post(auth::recover::<CR, PR, OR, UR, M>),
        )
        .route(
            "/reset",
            get(auth::reset_page).post(auth::reset::<CR, PR, OR, UR, M>),
        )
        .route("/logout", get(auth::logout).post(auth::logout))
        // Customers
        .route(
            "/customers",
            get(customers::list::<CR, PR, OR, UR, M>).post(customers::create::<CR, PR, OR, UR, M>),
        )
        .route("/customers/new", get(customers::new))
        .route(
            "/customers/{id}",
            get(customers::detail::<CR, PR, OR, UR, M>)
                .post(customers::update::<CR, PR, OR, UR, M>),
        )
        .route(
            "/customers/{id}/edit",
            get(customers::edit::<CR, PR, OR, UR, M>),
        )
        .route(
            "/customers/{id}/delete",
            post(customers::delete::<CR, PR, OR, UR, M>),
        )
        // Products
        .route("/laptops", get(products::laptops::<CR, PR, OR, UR, M>))
        .route("/laptops/new", get(products::new_laptop))
        .route("/phones", get(products::phones::<CR, PR, OR, UR, M>))
        .route("/phones/new", get(products::new_phone))
        .route("/products", post(products::create::<CR, PR, OR, UR, M>))
        .route(
            "/products/{id}",
            post(products::update::<CR, PR, OR, UR, M>),
        )
        .route(
            "/products/{id}/edit",
            get(products::edit::<CR, PR, OR, UR, M>),
        )
        .route(
            "/products/{id}/restock",
            post(products::restock::<CR, PR, OR, UR, M>),
        )
        .route(
            "/products/{id}/delete",
            post(products::delete::<CR, PR, OR, UR, M>),
        )
        // Orders
        .route(
            "/orders",
            get(orders::list::<CR, PR, OR, UR, M>).post(orders::place::<CR, PR, OR, UR, M>),
        )
        .route("/orders/new", get(orders::new::<CR, PR, OR, UR, M>))
        .route(
            "/orders/{id}/delete",
            post(orders::delete::<CR, PR, OR, UR, M>),
        )
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn should_parse_number_when_field_is_valid() {
        assert_eq!(parse_number::<u32>("weight", " 1200 "), Ok(1200));
        assert_eq!(
            parse_number::<Decimal>("price", "999.90"),
            Ok(Decimal::new(99990, 2))
        );
    }

    #[test]
    fn should_default_to_zero_when_field_is_blank() {
        assert_eq!(parse_number::<u32>("stock", "  "), Ok(0));
    }

    #[test]
    fn should_reject_number_when_field_is_negative() {
        assert_eq!(
            parse_number::<u32>("stock", "-3"),
            Err(ValidationError::InvalidNumber { field: "stock" })
        );
        assert_eq!(
            parse_number::<f64>("display size", "large"),
            Err(ValidationError::InvalidNumber {
                field: "display size"
            })
        );
    }
}
