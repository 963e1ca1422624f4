//! Server-rendered pages.
//!
//! Every value that originates from a user or the store goes through [`escape`].

use axum::{http::StatusCode, response::Html};
use std::fmt::Write;

use crate::auth::Principal;
use crate::database::models::{Product, ProductForm};
use crate::error::FieldErrors;

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, principal: Option<&Principal>, body: &str) -> Html<String> {
    let nav = match principal {
        Some(p) => {
            let roles: Vec<&str> = p.roles.iter().map(|r| r.as_str()).collect();
            let admin_link = if p.is_admin() {
                r#" | <a href="/admin/newProduct">New product</a>"#
            } else {
                ""
            };
            format!(
                r#"<nav><a href="/user/index">Products</a>{} | <span class="user">{} [{}]</span> | <form method="post" action="/logout" class="logout"><button type="submit">Logout</button></form></nav>"#,
                admin_link,
                escape(&p.username),
                roles.join(", ")
            )
        }
        None => String::new(),
    };

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>{title}</title></head>
<body>
{nav}
<main>
<h1>{title}</h1>
{body}
</main>
</body>
</html>"#,
        title = escape(title),
        nav = nav,
        body = body
    ))
}

pub fn products_page(principal: &Principal, products: &[Product], query: Option<&str>) -> Html<String> {
    let mut body = format!(
        r#"<form method="get" action="/user/search">
<input type="text" name="name" value="{}" placeholder="Search by name">
<button type="submit">Search</button>
</form>
"#,
        escape(query.unwrap_or_default())
    );

    if products.is_empty() {
        body.push_str(r#"<p class="empty">No products found.</p>"#);
        return layout("Products", Some(principal), &body);
    }

    let admin = principal.is_admin();
    body.push_str("<table>\n<thead><tr><th>ID</th><th>Name</th><th>Price</th><th>Quantity</th>");
    if admin {
        body.push_str("<th></th>");
    }
    body.push_str("</tr></thead>\n<tbody>\n");

    for product in products {
        let _ = write!(
            body,
            "<tr><td>{}</td><td>{}</td><td>{:.2}</td><td>{}</td>",
            product.id,
            escape(&product.name),
            product.price,
            product.quantity
        );
        if admin {
            let _ = write!(
                body,
                r#"<td><a href="/admin/products/edit/{id}">Edit</a>
<form method="post" action="/admin/deleteProduct"><input type="hidden" name="id" value="{id}"><button type="submit">Delete</button></form></td>"#,
                id = product.id
            );
        }
        body.push_str("</tr>\n");
    }
    body.push_str("</tbody>\n</table>");

    layout("Products", Some(principal), &body)
}

pub fn product_form_page(principal: &Principal, form: &ProductForm, errors: &FieldErrors) -> Html<String> {
    let editing = form.id.as_deref().is_some_and(|id| !id.trim().is_empty());
    let title = if editing { "Edit product" } else { "New product" };

    let field_error = |field: &str| {
        errors
            .get(field)
            .map(|msg| format!(r#"<span class="error" data-field="{}">{}</span>"#, field, escape(msg)))
            .unwrap_or_default()
    };

    let body = format!(
        r#"<form method="post" action="/admin/saveProduct">
<input type="hidden" name="id" value="{id}">{id_error}
<label>Name <input type="text" name="name" value="{name}"></label>{name_error}
<label>Price <input type="text" name="price" value="{price}"></label>{price_error}
<label>Quantity <input type="text" name="quantity" value="{quantity}"></label>{quantity_error}
<button type="submit">Save</button>
</form>"#,
        id = escape(form.id.as_deref().unwrap_or_default()),
        id_error = field_error("id"),
        name = escape(&form.name),
        name_error = field_error("name"),
        price = escape(&form.price),
        price_error = field_error("price"),
        quantity = escape(&form.quantity),
        quantity_error = field_error("quantity"),
    );

    layout(title, Some(principal), &body)
}

pub fn login_page(error: bool, logged_out: bool, next: Option<&str>) -> Html<String> {
    let mut body = String::new();
    if error {
        body.push_str(r#"<p class="error">Invalid username or password.</p>"#);
    }
    if logged_out {
        body.push_str(r#"<p class="notice">You have been logged out.</p>"#);
    }
    let next_field = next
        .map(|target| format!(r#"<input type="hidden" name="next" value="{}">"#, escape(target)))
        .unwrap_or_default();
    let _ = write!(
        body,
        r#"<form method="post" action="/login">
{}<label>Username <input type="text" name="username" autocomplete="username"></label>
<label>Password <input type="password" name="password" autocomplete="current-password"></label>
<button type="submit">Sign in</button>
</form>"#,
        next_field
    );

    layout("Login", None, &body)
}

/// Confirmation step for `GET /logout`; the session ends only on the POST.
pub fn logout_page(principal: Option<&Principal>) -> Html<String> {
    layout(
        "Logout",
        principal,
        r#"<p>Are you sure you want to log out?</p>
<form method="post" action="/logout"><button type="submit">Log out</button></form>"#,
    )
}

pub fn not_authorized_page(principal: Option<&Principal>) -> Html<String> {
    layout(
        "Not authorized",
        principal,
        r#"<p>You do not have permission to access this page.</p><p><a href="/user/index">Back to products</a></p>"#,
    )
}

pub fn error_page(status: StatusCode, message: &str) -> Html<String> {
    let title = status.canonical_reason().unwrap_or("Error");
    layout(
        title,
        None,
        &format!(
            r#"<p class="error">{}</p><p><a href="/user/index">Back to products</a></p>"#,
            escape(message)
        ),
    )
}
