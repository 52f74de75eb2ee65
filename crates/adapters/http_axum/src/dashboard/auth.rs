//! Account pages: login, registration, email verification, password recovery.

use askama::Template;
use axum::extract::{Form, State};
use axum::response::{IntoResponse, Redirect, Response};
use serde::Deserialize;
use tower_sessions::Session;

use minishop_app::ports::{
    CustomerRepository, Mailer, OrderRepository, ProductRepository, UserRepository,
};
use minishop_domain::error::MiniShopError;
use minishop_domain::user::Registration;

use super::{Layout, error_page, fail, render, render_with_status, succeed};
use crate::session::{self, Flash, HOME_PATH, LOGIN_PATH};
use crate::state::AppState;

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    layout: Layout,
    login: String,
}

#[derive(Template)]
#[template(path = "register.html")]
pub struct RegisterTemplate {
    layout: Layout,
    form: RegisterForm,
}

#[derive(Template)]
#[template(path = "verify.html")]
pub struct VerifyTemplate {
    layout: Layout,
    email: String,
}

#[derive(Template)]
#[template(path = "recover.html")]
pub struct RecoverTemplate {
    layout: Layout,
}

#[derive(Template)]
#[template(path = "reset.html")]
pub struct ResetTemplate {
    layout: Layout,
    email: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub login: String,
    pub password: String,
}

/// Registration form; the password is never echoed back.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct VerifyForm {
    pub email: String,
    pub code: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RecoverForm {
    pub email: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ResetForm {
    pub email: String,
    pub code: String,
    pub password: String,
}

/// `GET /login`
pub async fn login_page(session: Session) -> Response {
    render(&LoginTemplate {
        layout: Layout::load(&session).await,
        login: String::new(),
    })
}

/// `POST /login`: on success the session id is renewed and the user lands
/// on the dashboard.
pub async fn login<CR, PR, OR, UR, M>(
    State(state): State<AppState<CR, PR, OR, UR, M>>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response
where
    CR: CustomerRepository + Send + Sync + 'static,
    PR: ProductRepository + Send + Sync + 'static,
    OR: OrderRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let user = match state.auth_service.login(&form.login, &form.password).await {
        Ok(user) => user,
        Err(err) => {
            tracing::debug!(login = %form.login, %err, "login rejected");
            let (status, message) = crate::error::classify(&err);
            session::set_flash(&session, Flash::error(message)).await;
            return render_with_status(
                status,
                &LoginTemplate {
                    layout: Layout::load(&session).await,
                    login: form.login,
                },
            );
        }
    };
    if let Err(err) = session::log_in(&session, &user).await {
        return error_page(&session, &MiniShopError::Storage(Box::new(err))).await;
    }
    succeed(
        &session,
        format!("Welcome back, {}", user.first_name),
        HOME_PATH,
    )
    .await
}

/// `GET /register`
pub async fn register_page(session: Session) -> Response {
    render(&RegisterTemplate {
        layout: Layout::load(&session).await,
        form: RegisterForm::default(),
    })
}

/// `POST /register`: creates the account and sends the user to the
/// verification page.
pub async fn register<CR, PR, OR, UR, M>(
    State(state): State<AppState<CR, PR, OR, UR, M>>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Response
where
    CR: CustomerRepository + Send + Sync + 'static,
    PR: ProductRepository + Send + Sync + 'static,
    OR: OrderRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let RegisterForm {
        first_name,
        last_name,
        email,
        username,
        password,
    } = form;
    let registration = Registration {
        first_name: first_name.clone(),
        last_name: last_name.clone(),
        email: email.clone(),
        username: username.clone(),
        password,
    };
    match state.auth_service.register(registration).await {
        Ok(user) => {
            session::set_pending_email(&session, &user.email).await;
            succeed(
                &session,
                format!("A verification code was sent to {}", user.email),
                "/verify",
            )
            .await
        }
        Err(err) => {
            let (status, message) = crate::error::classify(&err);
            session::set_flash(&session, Flash::error(message)).await;
            render_with_status(
                status,
                &RegisterTemplate {
                    layout: Layout::load(&session).await,
                    form: RegisterForm {
                        first_name,
                        last_name,
                        email,
                        username,
                        password: String::new(),
                    },
                },
            )
        }
    }
}

/// `GET /verify`
pub async fn verify_page(session: Session) -> Response {
    let email = session::pending_email(&session).await;
    render(&VerifyTemplate {
        layout: Layout::load(&session).await,
        email,
    })
}

/// `POST /verify`
pub async fn verify<CR, PR, OR, UR, M>(
    State(state): State<AppState<CR, PR, OR, UR, M>>,
    session: Session,
    Form(form): Form<VerifyForm>,
) -> Response
where
    CR: CustomerRepository + Send + Sync + 'static,
    PR: ProductRepository + Send + Sync + 'static,
    OR: OrderRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    match state.auth_service.verify_email(&form.email, form.code.trim()).await {
        Ok(_) => succeed(&session, "Email verified, you can now log in", LOGIN_PATH).await,
        Err(err) => {
            session::set_pending_email(&session, &form.email).await;
            fail(&session, &err, "/verify").await
        }
    }
}

/// `GET /recover`
pub async fn recover_page(session: Session) -> Response {
    render(&RecoverTemplate {
        layout: Layout::load(&session).await,
    })
}

/// `POST /recover`: the same answer is given whether or not the account
/// exists.
pub async fn recover<CR, PR, OR, UR, M>(
    State(state): State<AppState<CR, PR, OR, UR, M>>,
    session: Session,
    Form(form): Form<RecoverForm>,
) -> Response
where
    CR: CustomerRepository + Send + Sync + 'static,
    PR: ProductRepository + Send + Sync + 'static,
    OR: OrderRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    if let Err(err) = state.auth_service.start_recovery(&form.email).await {
        return fail(&session, &err, "/recover").await;
    }
    session::set_pending_email(&session, form.email.trim()).await;
    succeed(
        &session,
        "If an account exists for this email, a recovery code was sent to it",
        "/reset",
    )
    .await
}

/// `GET /reset`
pub async fn reset_page(session: Session) -> Response {
    let email = session::pending_email(&session).await;
    render(&ResetTemplate {
        layout: Layout::load(&session).await,
        email,
    })
}

/// `POST /reset`
pub async fn reset<CR, PR, OR, UR, M>(
    State(state): State<AppState<CR, PR, OR, UR, M>>,
    session: Session,
    Form(form): Form<ResetForm>,
) -> Response
where
    CR: CustomerRepository + Send + Sync + 'static,
    PR: ProductRepository + Send + Sync + 'static,
    OR: OrderRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    match state
        .auth_service
        .reset_password(&form.email, form.code.trim(), &form.password)
        .await
    {
        Ok(()) => succeed(&session, "Password changed, you can now log in", LOGIN_PATH).await,
        Err(err) => {
            session::set_pending_email(&session, &form.email).await;
            fail(&session, &err, "/reset").await
        }
    }
}

/// `GET|POST /logout`: ends the session.
pub async fn logout(session: Session) -> Response {
    if let Err(err) = session::log_out(&session).await {
        tracing::warn!(%err, "failed to clear session");
    }
    session::set_flash(&session, Flash::success("You have been logged out")).await;
    Redirect::to(LOGIN_PATH).into_response()
}
