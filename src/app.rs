use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    middleware,
    response::Html,
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::SecurityConfig;
use crate::handlers::{elevated, protected, public};
use crate::middleware::access_control_middleware;
use crate::state::AppState;
use crate::views;

/// Full application router: every route sits behind the access-control middleware.
pub fn app(state: AppState) -> Router {
    let mut router = Router::new()
        .merge(public_routes())
        .merge(user_routes())
        .merge(admin_routes())
        .merge(api_routes())
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(state.clone(), access_control_middleware));

    if state.config.security.enable_cors {
        router = router.layer(cors_layer(&state.config.security));
    }
    if state.config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router.with_state(state)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(public::login_page).post(public::login_submit))
        .route("/logout", get(public::logout_page).post(public::logout))
        .route("/notAuthorized", get(public::not_authorized))
        .route("/health", get(public::health))
        .route("/api/auth/login", post(public::api_login))
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(protected::home))
        .route("/user/index", get(protected::index))
        .route("/user/search", get(protected::search))
}

fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/newProduct", get(elevated::new_product))
        .route("/admin/products/edit/:id", get(elevated::edit_product))
        .route("/admin/saveProduct", post(elevated::save_product))
        .route("/admin/deleteProduct", post(elevated::delete_product))
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/whoami", get(protected::session_whoami))
        .route("/api/auth/session", delete(protected::session_logout))
        .route("/api/products", get(protected::api_list_products))
        .route("/api/products/:id", get(protected::api_get_product))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if security.cors_origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}

async fn not_found() -> (StatusCode, Html<String>) {
    (
        StatusCode::NOT_FOUND,
        views::error_page(StatusCode::NOT_FOUND, "Page not found"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use axum::response::Response;
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::bootstrap;
    use crate::config::AppConfig;

    async fn seeded_state(config: AppConfig) -> AppState {
        let state = AppState::in_memory(config).unwrap();
        bootstrap::seed_products(state.products.as_ref()).await.unwrap();
        state
    }

    async fn send(state: &AppState, request: Request<Body>) -> Response {
        app(state.clone()).oneshot(request).await.unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn location(response: &Response) -> &str {
        response.headers()[header::LOCATION].to_str().unwrap()
    }

    /// Logs in through the form and returns the session cookie pair.
    async fn login(state: &AppState, username: &str) -> String {
        let request = Request::post("/login")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(format!("username={}&password=1234", username)))
            .unwrap();
        let response = send(state, request).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/");

        let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        set_cookie.split(';').next().unwrap().to_string()
    }

    fn get_with_cookie(uri: &str, cookie: &str) -> Request<Body> {
        Request::get(uri).header(header::COOKIE, cookie).body(Body::empty()).unwrap()
    }

    fn post_form(uri: &str, cookie: &str, body: &str) -> Request<Body> {
        Request::post(uri)
            .header(header::COOKIE, cookie)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn anonymous_page_request_redirects_to_login() {
        let state = seeded_state(AppConfig::development()).await;
        for (uri, expected) in [
            ("/", "/login"),
            ("/user/index", "/login?next=%2Fuser%2Findex"),
            ("/admin/newProduct", "/login?next=%2Fadmin%2FnewProduct"),
        ] {
            let response = send(&state, Request::get(uri).body(Body::empty()).unwrap()).await;
            assert_eq!(response.status(), StatusCode::SEE_OTHER, "{}", uri);
            assert_eq!(location(&response), expected);
        }
    }

    #[tokio::test]
    async fn login_returns_to_requested_page() {
        let state = seeded_state(AppConfig::development()).await;

        let request = Request::get("/login?next=%2Fuser%2Fsearch%3Fname%3Dlap").body(Body::empty()).unwrap();
        let response = send(&state, request).await;
        assert!(body_text(response).await.contains(r#"name="next" value="/user/search?name=lap""#));

        let request = Request::post("/login")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("username=user1&password=1234&next=%2Fuser%2Fsearch%3Fname%3Dlap"))
            .unwrap();
        let response = send(&state, request).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/user/search?name=lap");
    }

    #[tokio::test]
    async fn offsite_next_falls_back_to_home() {
        let state = seeded_state(AppConfig::development()).await;
        let request = Request::post("/login")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("username=user1&password=1234&next=%2F%2Fevil.example"))
            .unwrap();
        let response = send(&state, request).await;
        assert_eq!(location(&response), "/");
    }

    #[tokio::test]
    async fn failed_login_keeps_next() {
        let state = seeded_state(AppConfig::development()).await;
        let request = Request::post("/login")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("username=user1&password=wrong&next=%2Fuser%2Findex"))
            .unwrap();
        let response = send(&state, request).await;
        assert_eq!(location(&response), "/login?error&next=%2Fuser%2Findex");
    }

    #[tokio::test]
    async fn anonymous_api_request_gets_json_401() {
        let state = seeded_state(AppConfig::development()).await;
        let response = send(&state, Request::get("/api/products").body(Body::empty()).unwrap()).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn login_page_and_health_are_public() {
        let state = seeded_state(AppConfig::development()).await;
        let response = send(&state, Request::get("/login").body(Body::empty()).unwrap()).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = send(&state, Request::get("/health").body(Body::empty()).unwrap()).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn bad_password_redirects_back_with_error() {
        let state = seeded_state(AppConfig::development()).await;
        let request = Request::post("/login")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("username=user1&password=wrong"))
            .unwrap();
        let response = send(&state, request).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login?error");
        assert!(response.headers().get(header::SET_COOKIE).is_none());
    }

    #[tokio::test]
    async fn user_sees_products_but_no_admin_controls() {
        let state = seeded_state(AppConfig::development()).await;
        let cookie = login(&state, "user1").await;

        let response = send(&state, get_with_cookie("/user/index", &cookie)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Laptop") && html.contains("Phone") && html.contains("Tablet"));
        assert!(!html.contains("/admin/deleteProduct"));

        let response = send(&state, get_with_cookie("/admin/newProduct", &cookie)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/notAuthorized");
    }

    #[tokio::test]
    async fn user_cannot_delete_even_by_direct_post() {
        let state = seeded_state(AppConfig::development()).await;
        let cookie = login(&state, "user2").await;

        let response = send(&state, post_form("/admin/deleteProduct", &cookie, "id=1")).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/notAuthorized");
        assert_eq!(state.products.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn search_filters_case_insensitively() {
        let state = seeded_state(AppConfig::development()).await;
        let cookie = login(&state, "user1").await;

        let response = send(&state, get_with_cookie("/user/search?name=LAP", &cookie)).await;
        let html = body_text(response).await;
        assert!(html.contains("Laptop"));
        assert!(!html.contains("Tablet"));
    }

    #[tokio::test]
    async fn admin_creates_updates_and_deletes() {
        let state = seeded_state(AppConfig::development()).await;
        let cookie = login(&state, "admin").await;

        let response = send(
            &state,
            post_form("/admin/saveProduct", &cookie, "name=Monitor&price=199.5&quantity=4"),
        )
        .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/admin/newProduct");
        let created = state.products.find_by_name_containing("monitor").await.unwrap();
        assert_eq!(created.len(), 1);
        let id = created[0].id;

        let response = send(
            &state,
            post_form(
                "/admin/saveProduct",
                &cookie,
                &format!("id={}&name=Monitor+XL&price=249&quantity=2", id),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let updated = state.products.find_by_id(id).await.unwrap();
        assert_eq!(updated.name, "Monitor XL");
        assert_eq!(updated.quantity, 2);
        assert_eq!(state.products.count().await.unwrap(), 4);

        let response = send(&state, post_form("/admin/deleteProduct", &cookie, &format!("id={}", id))).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/user/index");
        assert_eq!(state.products.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn invalid_form_is_rerendered_and_nothing_stored() {
        let state = seeded_state(AppConfig::development()).await;
        let cookie = login(&state, "admin").await;

        let response = send(
            &state,
            post_form("/admin/saveProduct", &cookie, "name=abc&price=-1&quantity=2"),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let html = body_text(response).await;
        assert!(html.contains("Name must be between 4 and 20 characters"));
        assert!(html.contains("Price must be at least 0"));
        assert!(html.contains("value=\"abc\""));
        assert_eq!(state.products.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn edit_form_is_prefilled_and_missing_id_is_404() {
        let state = seeded_state(AppConfig::development()).await;
        let cookie = login(&state, "admin").await;

        let response = send(&state, get_with_cookie("/admin/products/edit/2", &cookie)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("value=\"Phone\""));

        let response = send(&state, get_with_cookie("/admin/products/edit/999", &cookie)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn logout_invalidates_session() {
        let state = seeded_state(AppConfig::development()).await;
        let cookie = login(&state, "user1").await;

        let response = send(&state, post_form("/logout", &cookie, "")).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login?logout");

        let response = send(&state, get_with_cookie("/user/index", &cookie)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login?next=%2Fuser%2Findex");
    }

    #[tokio::test]
    async fn get_logout_only_asks_for_confirmation() {
        let state = seeded_state(AppConfig::development()).await;
        let cookie = login(&state, "user1").await;

        let response = send(&state, get_with_cookie("/logout", &cookie)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(header::SET_COOKIE).is_none());
        let html = body_text(response).await;
        assert!(html.contains("Are you sure you want to log out?"));
        assert!(html.contains(r#"<form method="post" action="/logout">"#));

        let response = send(&state, get_with_cookie("/user/index", &cookie)).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn non_numeric_product_id_is_an_html_400() {
        let state = seeded_state(AppConfig::development()).await;
        let cookie = login(&state, "admin").await;

        for response in [
            send(&state, get_with_cookie("/admin/products/edit/abc", &cookie)).await,
            send(&state, post_form("/admin/deleteProduct", &cookie, "id=abc")).await,
        ] {
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
            assert!(content_type.starts_with("text/html"), "{}", content_type);
            assert!(body_text(response).await.contains("Invalid product id"));
        }
        assert_eq!(state.products.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn non_numeric_api_product_id_is_a_json_400() {
        let state = seeded_state(AppConfig::development()).await;
        let cookie = login(&state, "user1").await;

        let response = send(&state, get_with_cookie("/api/products/abc", &cookie)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body["code"], "BAD_REQUEST");
        assert_eq!(body["message"], "Invalid product id");
    }

    #[tokio::test]
    async fn public_products_flag_opens_read_api() {
        let mut config = AppConfig::development();
        config.api.public_products = true;
        let state = seeded_state(config).await;

        let response = send(&state, Request::get("/api/products").body(Body::empty()).unwrap()).await;
        assert_eq!(response.status(), StatusCode::OK);
        let products: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(products.as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn unknown_path_for_logged_in_user_is_404() {
        let state = seeded_state(AppConfig::development()).await;
        let cookie = login(&state, "user1").await;
        let response = send(&state, get_with_cookie("/nowhere", &cookie)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
