use axum::{
    extract::{rejection::PathRejection, Path, Query, State},
    response::{Html, Redirect},
    Json,
};
use serde::Deserialize;

use crate::database::models::Product;
use crate::error::{ApiError, PageError};
use crate::middleware::AuthUser;
use crate::state::AppState;
use crate::views;

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub name: Option<String>,
}

impl SearchQuery {
    /// The search term, or `None` when absent or blank.
    fn term(&self) -> Option<&str> {
        self.name.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }
}

/// GET /
pub async fn home() -> Redirect {
    Redirect::to("/user/index")
}

/// GET /user/index
pub async fn index(State(state): State<AppState>, auth_user: AuthUser) -> Result<Html<String>, PageError> {
    let products = state.products.find_all().await?;
    Ok(views::products_page(&auth_user.principal, &products, None))
}

/// GET /user/search?name=
pub async fn search(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(query): Query<SearchQuery>,
) -> Result<Html<String>, PageError> {
    let products = match query.term() {
        Some(term) => state.products.find_by_name_containing(term).await?,
        None => state.products.find_all().await?,
    };
    Ok(views::products_page(&auth_user.principal, &products, query.name.as_deref()))
}

/// GET /api/products?name=
pub async fn api_list_products(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let products = match query.term() {
        Some(term) => state.products.find_by_name_containing(term).await?,
        None => state.products.find_all().await?,
    };
    Ok(Json(products))
}

/// GET /api/products/:id
pub async fn api_get_product(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Product>, ApiError> {
    let Path(id) = id.map_err(ApiError::invalid_product_id)?;
    Ok(Json(state.products.find_by_id(id).await?))
}
