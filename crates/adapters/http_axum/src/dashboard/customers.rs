//! Customer pages: list, name search, create, detail with orders, edit, delete.

use askama::Template;
use axum::extract::{Form, Path, Query, State};
use axum::response::Response;
use serde::Deserialize;
use tower_sessions::Session;

use minishop_app::ports::{
    CustomerRepository, Mailer, OrderRepository, ProductRepository, UserRepository,
};
use minishop_domain::customer::Customer;
use minishop_domain::error::MiniShopError;
use minishop_domain::id::CustomerId;
use minishop_domain::order::Order;

use super::orders::OrderRow;
use super::{Layout, error_page, fail, render, render_with_status, succeed};
use crate::api::SearchParams;
use crate::session::{self, Flash};
use crate::state::AppState;

#[derive(Template)]
#[template(path = "customers.html")]
pub struct CustomerListTemplate {
    layout: Layout,
    query: String,
    searching: bool,
    customers: Vec<Customer>,
}

#[derive(Template)]
#[template(path = "customer_detail.html")]
pub struct CustomerDetailTemplate {
    layout: Layout,
    customer: Customer,
    orders: Vec<OrderRow>,
}

#[derive(Template)]
#[template(path = "customer_form.html")]
pub struct CustomerFormTemplate {
    layout: Layout,
    title: String,
    action: String,
    form: CustomerForm,
}

/// Customer create/edit form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CustomerForm {
    pub name: String,
    pub address: String,
    pub phone_number: String,
    pub email: String,
}

impl CustomerForm {
    fn into_customer(self, id: Option<CustomerId>) -> Result<Customer, MiniShopError> {
        let mut builder = Customer::builder()
            .name(self.name)
            .address(self.address)
            .phone_number(self.phone_number)
            .email(self.email);
        if let Some(id) = id {
            builder = builder.id(id);
        }
        builder.build()
    }
}

impl From<&Customer> for CustomerForm {
    fn from(customer: &Customer) -> Self {
        Self {
            name: customer.name.clone(),
            address: customer.address.clone(),
            phone_number: customer.phone_number.clone(),
            email: customer.email.clone(),
        }
    }
}

/// `GET /customers?q=`: every customer, or those whose name contains `q`.
pub async fn list<CR, PR, OR, UR, M>(
    State(state): State<AppState<CR, PR, OR, UR, M>>,
    session: Session,
    Query(params): Query<SearchParams>,
) -> Response
where
    CR: CustomerRepository + Send + Sync + 'static,
    PR: ProductRepository + Send + Sync + 'static,
    OR: OrderRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let customers = match params.q.as_deref() {
        Some(q) => state.customer_service.search_customers(Some(q)).await,
        None => state.customer_service.list_customers().await,
    };
    match customers {
        Ok(customers) => render(&CustomerListTemplate {
            layout: Layout::load(&session).await,
            searching: params.q.is_some(),
            query: params.q.unwrap_or_default(),
            customers,
        }),
        Err(err) => error_page(&session, &err).await,
    }
}

/// `GET /customers/new`
pub async fn new(session: Session) -> Response {
    render(&CustomerFormTemplate {
        layout: Layout::load(&session).await,
        title: "New customer".to_string(),
        action: "/customers".to_string(),
        form: CustomerForm::default(),
    })
}

/// `POST /customers`: redisplays the form on invalid input.
pub async fn create<CR, PR, OR, UR, M>(
    State(state): State<AppState<CR, PR, OR, UR, M>>,
    session: Session,
    Form(form): Form<CustomerForm>,
) -> Response
where
    CR: CustomerRepository + Send + Sync + 'static,
    PR: ProductRepository + Send + Sync + 'static,
    OR: OrderRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let result = match form.clone().into_customer(None) {
        Ok(customer) => state.customer_service.create_customer(customer).await,
        Err(err) => Err(err),
    };
    match result {
        Ok(customer) => {
            let to = format!("/customers/{}", customer.id);
            succeed(&session, format!("Customer {} created", customer.name), &to).await
        }
        Err(err) => {
            redisplay(
                &session,
                &err,
                "New customer".to_string(),
                "/customers".to_string(),
                form,
            )
            .await
        }
    }
}

/// `GET /customers/{id}`: contact details and order history.
pub async fn detail<CR, PR, OR, UR, M>(
    State(state): State<AppState<CR, PR, OR, UR, M>>,
    session: Session,
    Path(id): Path<String>,
) -> Response
where
    CR: CustomerRepository + Send + Sync + 'static,
    PR: ProductRepository + Send + Sync + 'static,
    OR: OrderRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    match load_detail(&state, &id).await {
        Ok((customer, orders)) => {
            let orders = OrderRow::build(&orders, std::slice::from_ref(&customer));
            render(&CustomerDetailTemplate {
                layout: Layout::load(&session).await,
                customer,
                orders,
            })
        }
        Err(err) => error_page(&session, &err).await,
    }
}

async fn load_detail<CR, PR, OR, UR, M>(
    state: &AppState<CR, PR, OR, UR, M>,
    id: &str,
) -> Result<(Customer, Vec<Order>), MiniShopError>
where
    CR: CustomerRepository + Send + Sync + 'static,
    PR: ProductRepository + Send + Sync + 'static,
    OR: OrderRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let id = CustomerId::parse(id)?;
    let customer = state.customer_service.get_customer(id).await?;
    let orders = state.order_service.list_customer_orders(id).await?;
    Ok((customer, orders))
}

/// `GET /customers/{id}/edit`
pub async fn edit<CR, PR, OR, UR, M>(
    State(state): State<AppState<CR, PR, OR, UR, M>>,
    session: Session,
    Path(id): Path<String>,
) -> Response
where
    CR: CustomerRepository + Send + Sync + 'static,
    PR: ProductRepository + Send + Sync + 'static,
    OR: OrderRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let customer = match CustomerId::parse(&id) {
        Ok(id) => state.customer_service.get_customer(id).await,
        Err(err) => Err(err.into()),
    };
    match customer {
        Ok(customer) => render(&CustomerFormTemplate {
            layout: Layout::load(&session).await,
            title: format!("Edit {}", customer.name),
            action: format!("/customers/{}", customer.id),
            form: CustomerForm::from(&customer),
        }),
        Err(err) => error_page(&session, &err).await,
    }
}

/// `POST /customers/{id}`: save the edit form.
pub async fn update<CR, PR, OR, UR, M>(
    State(state): State<AppState<CR, PR, OR, UR, M>>,
    session: Session,
    Path(id): Path<String>,
    Form(form): Form<CustomerForm>,
) -> Response
where
    CR: CustomerRepository + Send + Sync + 'static,
    PR: ProductRepository + Send + Sync + 'static,
    OR: OrderRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let id = match CustomerId::parse(&id) {
        Ok(id) => id,
        Err(err) => return error_page(&session, &err.into()).await,
    };
    let result = match form.clone().into_customer(Some(id)) {
        Ok(customer) => state.customer_service.update_customer(customer).await,
        Err(err) => Err(err),
    };
    match result {
        Ok(customer) => {
            let to = format!("/customers/{}", customer.id);
            succeed(&session, format!("Customer {} updated", customer.name), &to).await
        }
        Err(err @ MiniShopError::NotFound(_)) => error_page(&session, &err).await,
        Err(err) => {
            redisplay(
                &session,
                &err,
                "Edit customer".to_string(),
                format!("/customers/{id}"),
                form,
            )
            .await
        }
    }
}

/// `POST /customers/{id}/delete`: the customer's orders go with it.
pub async fn delete<CR, PR, OR, UR, M>(
    State(state): State<AppState<CR, PR, OR, UR, M>>,
    session: Session,
    Path(id): Path<String>,
) -> Response
where
    CR: CustomerRepository + Send + Sync + 'static,
    PR: ProductRepository + Send + Sync + 'static,
    OR: OrderRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let result = match CustomerId::parse(&id) {
        Ok(id) => state.customer_service.delete_customer(id).await,
        Err(err) => Err(err.into()),
    };
    match result {
        Ok(()) => succeed(&session, "Customer deleted", "/customers").await,
        Err(err) => fail(&session, &err, "/customers").await,
    }
}

async fn redisplay(
    session: &Session,
    err: &MiniShopError,
    title: String,
    action: String,
    form: CustomerForm,
) -> Response {
    let (status, message) = crate::error::classify(err);
    session::set_flash(session, Flash::error(message)).await;
    render_with_status(
        status,
        &CustomerFormTemplate {
            layout: Layout::load(session).await,
            title,
            action,
            form,
        },
    )
}
