//! Catalog pages: laptop and phone stock lists, search, create, edit,
//! restock and delete.

use askama::Template;
use axum::extract::{Form, Path, Query, State};
use axum::response::Response;
use rust_decimal::Decimal;
use serde::Deserialize;
use tower_sessions::Session;

use minishop_app::ports::{
    CustomerRepository, Mailer, OrderRepository, ProductRepository, UserRepository,
};
use minishop_domain::error::MiniShopError;
use minishop_domain::id::ProductId;
use minishop_domain::product::{Category, LaptopSpec, PhoneSpec, Product, ProductKind};

use super::{Layout, error_page, fail, parse_number, render, render_with_status, succeed};
use crate::api::SearchParams;
use crate::session::{self, Flash};
use crate::state::AppState;

/// One line of a stock table.
pub struct ProductRow {
    pub id: String,
    pub brand: String,
    pub model: String,
    pub operating_system: String,
    pub price: String,
    pub stock_number: u32,
    /// Category-specific summary, e.g. the hard drive of a laptop.
    pub details: String,
}

impl From<&Product> for ProductRow {
    fn from(product: &Product) -> Self {
        let details = match &product.kind {
            ProductKind::Laptop(spec) => {
                join_non_empty(&[spec.hard_drive.as_str(), spec.ports.as_str()])
            }
            ProductKind::Phone(spec) => join_non_empty(&[
                spec.sim_type.as_str(),
                spec.cellular_connectivity.as_str(),
            ]),
        };
        Self {
            id: product.id.to_string(),
            brand: product.brand.clone(),
            model: product.model.clone(),
            operating_system: product.operating_system.clone(),
            price: product.price.to_string(),
            stock_number: product.stock_number,
            details,
        }
    }
}

fn join_non_empty(parts: &[&str]) -> String {
    parts
        .iter()
        .filter(|part| !part.trim().is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Template)]
#[template(path = "products.html")]
pub struct ProductListTemplate {
    layout: Layout,
    title: &'static str,
    list_path: &'static str,
    new_path: &'static str,
    query: String,
    products: Vec<ProductRow>,
}

#[derive(Template)]
#[template(path = "product_form.html")]
pub struct ProductFormTemplate {
    layout: Layout,
    title: String,
    action: String,
    is_laptop: bool,
    creating: bool,
    form: ProductForm,
}

/// Product create/edit form. Numbers are kept as typed so invalid input can
/// be shown back. `stock_number` is only read on create; an edit never
/// touches the stock.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductForm {
    pub category: Category,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub display_size: String,
    #[serde(default)]
    pub weight: String,
    #[serde(default)]
    pub operating_system: String,
    #[serde(default)]
    pub camera: String,
    #[serde(default)]
    pub wifi: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub stock_number: String,
    #[serde(default)]
    pub network_interface: String,
    #[serde(default)]
    pub hard_drive: String,
    #[serde(default)]
    pub ports: String,
    #[serde(default)]
    pub sim_type: String,
    #[serde(default)]
    pub cellular_connectivity: String,
    #[serde(default)]
    pub location_features: String,
}

impl ProductForm {
    fn empty(category: Category) -> Self {
        Self {
            category,
            brand: String::new(),
            model: String::new(),
            display_size: String::new(),
            weight: String::new(),
            operating_system: String::new(),
            camera: String::new(),
            wifi: String::new(),
            price: String::new(),
            description: String::new(),
            stock_number: String::new(),
            network_interface: String::new(),
            hard_drive: String::new(),
            ports: String::new(),
            sim_type: String::new(),
            cellular_connectivity: String::new(),
            location_features: String::new(),
        }
    }

    fn into_product(self, id: Option<ProductId>) -> Result<Product, MiniShopError> {
        let display_size: f64 = parse_number("display size", &self.display_size)?;
        let weight: u32 = parse_number("weight", &self.weight)?;
        let price: Decimal = parse_number("price", &self.price)?;
        let stock_number: u32 = parse_number("stock", &self.stock_number)?;

        let builder = match self.category {
            Category::Laptop => Product::laptop(LaptopSpec {
                network_interface: self.network_interface,
                hard_drive: self.hard_drive,
                ports: self.ports,
            }),
            Category::Phone => Product::phone(PhoneSpec {
                sim_type: self.sim_type,
                cellular_connectivity: self.cellular_connectivity,
                location_features: self.location_features,
            }),
        };
        let mut builder = builder
            .brand(self.brand)
            .model(self.model)
            .display_size(display_size)
            .weight(weight)
            .operating_system(self.operating_system)
            .camera(self.camera)
            .wifi(self.wifi)
            .price(price)
            .description(self.description)
            .stock_number(stock_number);
        if let Some(id) = id {
            builder = builder.id(id);
        }
        builder.build()
    }
}

impl From<&Product> for ProductForm {
    fn from(product: &Product) -> Self {
        let mut form = Self {
            brand: product.brand.clone(),
            model: product.model.clone(),
            display_size: product.display_size.to_string(),
            weight: product.weight.to_string(),
            operating_system: product.operating_system.clone(),
            camera: product.camera.clone(),
            wifi: product.wifi.clone(),
            price: product.price.to_string(),
            description: product.description.clone(),
            stock_number: product.stock_number.to_string(),
            ..Self::empty(product.category())
        };
        match &product.kind {
            ProductKind::Laptop(spec) => {
                form.network_interface.clone_from(&spec.network_interface);
                form.hard_drive.clone_from(&spec.hard_drive);
                form.ports.clone_from(&spec.ports);
            }
            ProductKind::Phone(spec) => {
                form.sim_type.clone_from(&spec.sim_type);
                form.cellular_connectivity
                    .clone_from(&spec.cellular_connectivity);
                form.location_features.clone_from(&spec.location_features);
            }
        }
        form
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RestockForm {
    pub amount: String,
}

fn list_path(category: Category) -> &'static str {
    match category {
        Category::Laptop => "/laptops",
        Category::Phone => "/phones",
    }
}

async fn stock_page<CR, PR, OR, UR, M>(
    state: &AppState<CR, PR, OR, UR, M>,
    session: &Session,
    category: Category,
    params: SearchParams,
) -> Response
where
    CR: CustomerRepository + Send + Sync + 'static,
    PR: ProductRepository + Send + Sync + 'static,
    OR: OrderRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let products = match state
        .product_service
        .search_category(category, params.q.as_deref())
        .await
    {
        Ok(products) => products,
        Err(err) => return error_page(session, &err).await,
    };
    let (title, new_path) = match category {
        Category::Laptop => ("Laptops", "/laptops/new"),
        Category::Phone => ("Phones", "/phones/new"),
    };
    render(&ProductListTemplate {
        layout: Layout::load(session).await,
        title,
        list_path: list_path(category),
        new_path,
        query: params.q.unwrap_or_default(),
        products: products.iter().map(ProductRow::from).collect(),
    })
}

/// `GET /laptops?q=`: laptop stock, filtered by model when `q` is given.
pub async fn laptops<CR, PR, OR, UR, M>(
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
    stock_page(&state, &session, Category::Laptop, params).await
}

/// `GET /phones?q=`: phone stock, filtered by model when `q` is given.
pub async fn phones<CR, PR, OR, UR, M>(
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
    stock_page(&state, &session, Category::Phone, params).await
}

async fn new_form(session: &Session, category: Category) -> Response {
    let title = match category {
        Category::Laptop => "New laptop",
        Category::Phone => "New phone",
    };
    render(&ProductFormTemplate {
        layout: Layout::load(session).await,
        title: title.to_string(),
        action: "/products".to_string(),
        is_laptop: category == Category::Laptop,
        creating: true,
        form: ProductForm::empty(category),
    })
}

/// `GET /laptops/new`
pub async fn new_laptop(session: Session) -> Response {
    new_form(&session, Category::Laptop).await
}

/// `GET /phones/new`
pub async fn new_phone(session: Session) -> Response {
    new_form(&session, Category::Phone).await
}

/// `POST /products`: redisplays the form on invalid input.
pub async fn create<CR, PR, OR, UR, M>(
    State(state): State<AppState<CR, PR, OR, UR, M>>,
    session: Session,
    Form(form): Form<ProductForm>,
) -> Response
where
    CR: CustomerRepository + Send + Sync + 'static,
    PR: ProductRepository + Send + Sync + 'static,
    OR: OrderRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let result = match form.clone().into_product(None) {
        Ok(product) => state.product_service.create_product(product).await,
        Err(err) => Err(err),
    };
    match result {
        Ok(product) => {
            let message = format!("{} {} added", product.brand, product.model);
            succeed(&session, message.trim(), list_path(product.category())).await
        }
        Err(err) => {
            let title = format!("New {}", form.category);
            redisplay(&session, &err, title, None, form).await
        }
    }
}

/// `GET /products/{id}/edit`
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
    let product = match ProductId::parse(&id) {
        Ok(id) => state.product_service.get_product(id).await,
        Err(err) => Err(err.into()),
    };
    match product {
        Ok(product) => render(&ProductFormTemplate {
            layout: Layout::load(&session).await,
            title: format!("Edit {}", product.model),
            action: format!("/products/{}", product.id),
            is_laptop: product.category() == Category::Laptop,
            creating: false,
            form: ProductForm::from(&product),
        }),
        Err(err) => error_page(&session, &err).await,
    }
}

/// `POST /products/{id}`: save the edit form. The category and the stock
/// level are left as stored.
pub async fn update<CR, PR, OR, UR, M>(
    State(state): State<AppState<CR, PR, OR, UR, M>>,
    session: Session,
    Path(id): Path<String>,
    Form(form): Form<ProductForm>,
) -> Response
where
    CR: CustomerRepository + Send + Sync + 'static,
    PR: ProductRepository + Send + Sync + 'static,
    OR: OrderRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let id = match ProductId::parse(&id) {
        Ok(id) => id,
        Err(err) => return error_page(&session, &err.into()).await,
    };
    let result = match form.clone().into_product(Some(id)) {
        Ok(product) => state.product_service.update_product(product).await,
        Err(err) => Err(err),
    };
    match result {
        Ok(product) => {
            let message = format!("{} updated", product.model);
            succeed(&session, message, list_path(product.category())).await
        }
        Err(err @ MiniShopError::NotFound(_)) => error_page(&session, &err).await,
        Err(err) => {
            let title = format!("Edit {}", form.model);
            redisplay(&session, &err, title, Some(id), form).await
        }
    }
}

/// `POST /products/{id}/restock`: add units to the stock.
pub async fn restock<CR, PR, OR, UR, M>(
    State(state): State<AppState<CR, PR, OR, UR, M>>,
    session: Session,
    Path(id): Path<String>,
    Form(form): Form<RestockForm>,
) -> Response
where
    CR: CustomerRepository + Send + Sync + 'static,
    PR: ProductRepository + Send + Sync + 'static,
    OR: OrderRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    match restock_product(&state, &id, &form).await {
        Ok(product) => {
            let message = format!("{} now has {} in stock", product.model, product.stock_number);
            succeed(&session, message, list_path(product.category())).await
        }
        Err(err) => fail(&session, &err, "/dashboard").await,
    }
}

async fn restock_product<CR, PR, OR, UR, M>(
    state: &AppState<CR, PR, OR, UR, M>,
    id: &str,
    form: &RestockForm,
) -> Result<Product, MiniShopError>
where
    CR: CustomerRepository + Send + Sync + 'static,
    PR: ProductRepository + Send + Sync + 'static,
    OR: OrderRepository + Send + Sync + 'static,
    UR: UserRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let id = ProductId::parse(id)?;
    let amount = parse_number("amount", &form.amount)?;
    state.product_service.restock(id, amount).await
}

/// `POST /products/{id}/delete`: refused while orders reference the product.
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
    let product = match ProductId::parse(&id) {
        Ok(id) => state.product_service.get_product(id).await,
        Err(err) => Err(err.into()),
    };
    let product = match product {
        Ok(product) => product,
        Err(err) => return fail(&session, &err, "/dashboard").await,
    };
    let back = list_path(product.category());
    match state.product_service.delete_product(product.id).await {
        Ok(()) => succeed(&session, format!("{} deleted", product.model), back).await,
        Err(err) => fail(&session, &err, back).await,
    }
}

async fn redisplay(
    session: &Session,
    err: &MiniShopError,
    title: String,
    editing: Option<ProductId>,
    form: ProductForm,
) -> Response {
    let action = editing.map_or_else(|| "/products".to_string(), |id| format!("/products/{id}"));
    let (status, message) = crate::error::classify(err);
    session::set_flash(session, Flash::error(message)).await;
    render_with_status(
        status,
        &ProductFormTemplate {
            layout: Layout::load(session).await,
            title,
            action,
            is_laptop: form.category == Category::Laptop,
            creating: editing.is_none(),
            form,
        },
    )
}
