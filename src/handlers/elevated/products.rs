use axum::{
    extract::{
        rejection::{FormRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;

use crate::database::models::ProductForm;
use crate::database::repository;
use crate::error::{ApiError, FieldErrors, PageError};
use crate::middleware::AuthUser;
use crate::state::AppState;
use crate::views;

#[derive(Debug, Deserialize)]
pub struct DeleteForm {
    pub id: i64,
}

/// GET /admin/newProduct - empty create form
pub async fn new_product(auth_user: AuthUser) -> Html<String> {
    views::product_form_page(&auth_user.principal, &ProductForm::default(), &FieldErrors::new())
}

/// GET /admin/products/edit/:id - form pre-filled from the stored row
pub async fn edit_product(
    State(state): State<AppState>,
    auth_user: AuthUser,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Html<String>, PageError> {
    let Path(id) = id.map_err(ApiError::invalid_product_id)?;
    let product = state.products.find_by_id(id).await?;
    Ok(views::product_form_page(
        &auth_user.principal,
        &ProductForm::from(&product),
        &FieldErrors::new(),
    ))
}

/// POST /admin/saveProduct - creates without an id, updates with one.
/// Invalid input re-renders the form with the submitted values and nothing is stored.
pub async fn save_product(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Form(form): Form<ProductForm>,
) -> Result<Response, PageError> {
    let draft = match form.validate() {
        Ok(draft) => draft,
        Err(errors) => {
            tracing::debug!("Rejected product form: {:?}", errors);
            let page = views::product_form_page(&auth_user.principal, &form, &errors);
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response());
        }
    };

    let product = repository::save(state.products.as_ref(), draft).await?;
    tracing::info!(
        "Product {} '{}' saved by '{}'",
        product.id,
        product.name,
        auth_user.principal.username
    );

    Ok(Redirect::to("/admin/newProduct").into_response())
}

/// POST /admin/deleteProduct
pub async fn delete_product(
    State(state): State<AppState>,
    auth_user: AuthUser,
    form: Result<Form<DeleteForm>, FormRejection>,
) -> Result<Redirect, PageError> {
    let Form(form) = form.map_err(ApiError::invalid_product_id)?;
    state.products.delete_by_id(form.id).await?;
    tracing::info!("Product {} deleted by '{}'", form.id, auth_user.principal.username);
    Ok(Redirect::to("/user/index"))
}
