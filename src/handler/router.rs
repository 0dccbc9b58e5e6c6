//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: route matching, method
//! validation, body decoding, dispatch and access logging.

use http_body_util::{BodyExt, Limited};
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderValue, CONTENT_LENGTH, CONTENT_TYPE, SERVER, USER_AGENT};
use hyper::{Method, Request, StatusCode};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use super::{endpoints, fragments};
use crate::config::{AppState, HealthConfig};
use crate::http::{self, FormData, HttpResponse};
use crate::logger::{self, AccessLogEntry};

/// A recognised path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Liveness,
    Readiness,
    Calculate,
    Search,
    Email,
    EditProfile(u64),
    UpdateProfile(u64),
    Price,
}

impl Route {
    /// Match `path` against the known routes
    pub fn resolve(path: &str, health: &HealthConfig) -> Option<Self> {
        if health.enabled {
            if path == health.liveness_path {
                return Some(Self::Liveness);
            }
            if path == health.readiness_path {
                return Some(Self::Readiness);
            }
        }

        match path {
            "/calculate" => Some(Self::Calculate),
            "/search" => Some(Self::Search),
            "/email" => Some(Self::Email),
            "/get-price" => Some(Self::Price),
            _ => Self::resolve_user(path),
        }
    }

    /// `/user/{id}/edit` and `/user/{id}`, where `id` is all ASCII digits
    fn resolve_user(path: &str) -> Option<Self> {
        let rest = path.strip_prefix("/user/")?;
        match rest.strip_suffix("/edit") {
            Some(id) => parse_id(id).map(Self::EditProfile),
            None => parse_id(rest).map(Self::UpdateProfile),
        }
    }

    /// The method that serves this route
    pub fn method(self) -> Method {
        match self {
            Self::Liveness | Self::Readiness | Self::EditProfile(_) | Self::Price => Method::GET,
            Self::Calculate | Self::Search | Self::Email => Method::POST,
            Self::UpdateProfile(_) => Method::PUT,
        }
    }

    /// Value of the `Allow` header for this route
    pub const fn allow(self) -> &'static str {
        match self {
            Self::Liveness | Self::Readiness | Self::EditProfile(_) | Self::Price => {
                "GET, OPTIONS"
            }
            Self::Calculate | Self::Search | Self::Email => "POST, OPTIONS",
            Self::UpdateProfile(_) => "PUT, OPTIONS",
        }
    }

    const fn has_body(self) -> bool {
        matches!(
            self,
            Self::Calculate | Self::Search | Self::Email | Self::UpdateProfile(_)
        )
    }
}

/// `u64::from_str` also takes a leading `+`, which is not a valid id
fn parse_id(id: &str) -> Option<u64> {
    if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    id.parse().ok()
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<HttpResponse, Infallible>
where
    B: Body<Data = Bytes>,
    B::Error: std::error::Error + Send + Sync + 'static,
{
    let started = Instant::now();
    let access_log = state.config.logging.access_log;

    let mut entry = access_log.then(|| {
        let mut entry = AccessLogEntry::new(
            peer_addr.ip().to_string(),
            req.method().to_string(),
            req.uri().path().to_string(),
        );
        entry.query = req.uri().query().map(ToString::to_string);
        entry.http_version = format!("{:?}", req.version())
            .trim_start_matches("HTTP/")
            .to_string();
        entry.user_agent = header_str(&req, USER_AGENT.as_str()).map(ToString::to_string);
        entry.hx_target = header_str(&req, "hx-target").map(ToString::to_string);
        entry
    });

    logger::log_headers_count(req.headers().len(), state.config.logging.show_headers);

    let mut response = dispatch(req, &state).await;

    if let Ok(server_name) = HeaderValue::from_str(&state.config.http.server_name) {
        response.headers_mut().insert(SERVER, server_name);
    }

    if let Some(entry) = entry.as_mut() {
        entry.status = response.status().as_u16();
        entry.body_bytes = response
            .body()
            .size_hint()
            .exact()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or_default();
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

async fn dispatch<B>(req: Request<B>, state: &AppState) -> HttpResponse
where
    B: Body<Data = Bytes>,
    B::Error: std::error::Error + Send + Sync + 'static,
{
    let Some(route) = Route::resolve(req.uri().path(), &state.config.health) else {
        return http::build_404_response();
    };

    if *req.method() == Method::OPTIONS {
        return http::build_options_response(route.allow(), state.config.http.enable_cors);
    }
    if *req.method() != route.method() {
        logger::log_warning(&format!(
            "Method not allowed: {} {}",
            req.method(),
            req.uri().path()
        ));
        return http::build_405_response(route.allow());
    }

    let form = if route.has_body() {
        match read_form(req, state.config.http.max_body_size).await {
            Ok(form) => form,
            Err(resp) => return resp,
        }
    } else {
        FormData::default()
    };

    match route {
        Route::Liveness | Route::Readiness => http::build_health_response("ok"),
        Route::Calculate => endpoints::calculate(&form),
        Route::Search => endpoints::search(&form, state),
        Route::Email => endpoints::email(&form),
        Route::EditProfile(id) => endpoints::edit_profile(id, state).await,
        Route::UpdateProfile(id) => endpoints::update_profile(id, &form, state).await,
        Route::Price => endpoints::price(state),
    }
}

/// Collect and decode the request body, enforcing `max_body_size`
async fn read_form<B>(req: Request<B>, max_body_size: u64) -> Result<FormData, HttpResponse>
where
    B: Body<Data = Bytes>,
    B::Error: std::error::Error + Send + Sync + 'static,
{
    if let Some(resp) = check_body_size(&req, max_body_size) {
        return Err(resp);
    }

    let content_type = header_str(&req, CONTENT_TYPE.as_str()).map(ToString::to_string);
    let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);

    let body = match Limited::new(req.into_body(), limit).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) if e.is::<http_body_util::LengthLimitError>() => {
            logger::log_error(&format!(
                "Request body exceeded {max_body_size} bytes while reading"
            ));
            return Err(http::build_413_response());
        }
        Err(e) => {
            logger::log_warning(&format!("Failed to read request body: {e}"));
            return Err(bad_request("Failed to read request body"));
        }
    };

    FormData::parse(content_type.as_deref(), &body).map_err(|e| {
        logger::log_warning(&format!("Rejected request body: {e}"));
        bad_request(&e.to_string())
    })
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size<B>(req: &Request<B>, max_body_size: u64) -> Option<HttpResponse> {
    let size_str = header_str(req, CONTENT_LENGTH.as_str())?;
    match size_str.parse::<u64>() {
        Ok(size) if size > max_body_size => {
            logger::log_error(&format!(
                "Request body too large: {size} bytes (max: {max_body_size})"
            ));
            Some(http::build_413_response())
        }
        Err(_) => {
            logger::log_warning(&format!(
                "Invalid Content-Length value: '{size_str}', skipping size check"
            ));
            None
        }
        _ => None,
    }
}

fn bad_request(message: &str) -> HttpResponse {
    http::build_html_with_status(
        StatusCode::BAD_REQUEST,
        format!(
            "<p class=\"text-danger\">{}</p>\n",
            fragments::escape_html(message)
        ),
    )
}

fn header_str<'a, B>(req: &'a Request<B>, name: &str) -> Option<&'a str> {
    req.headers().get(name).and_then(|v| v.to_str().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use http_body_util::Full;

    fn test_state() -> Arc<AppState> {
        let mut config = Config::load_from("does-not-exist/config").unwrap();
        config.logging.access_log = false;
        config.http.max_body_size = 256;
        Arc::new(AppState::new(&config).unwrap())
    }

    fn peer() -> SocketAddr {
        "127.0.0.1:50000".parse().unwrap()
    }

    fn form_request(method: Method, uri: &str, body: &str) -> Request<Full<Bytes>> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Full::new(Bytes::from(body.to_string())))
            .unwrap()
    }

    async fn send(state: &Arc<AppState>, req: Request<Full<Bytes>>) -> (StatusCode, String) {
        let resp = handle_request(req, Arc::clone(state), peer()).await.unwrap();
        let status = resp.status();
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[test]
    fn test_resolve_routes() {
        let health = HealthConfig::default();
        assert_eq!(Route::resolve("/calculate", &health), Some(Route::Calculate));
        assert_eq!(Route::resolve("/healthz", &health), Some(Route::Liveness));
        assert_eq!(Route::resolve("/readyz", &health), Some(Route::Readiness));
        assert_eq!(Route::resolve("/user/12/edit", &health), Some(Route::EditProfile(12)));
        assert_eq!(Route::resolve("/user/12", &health), Some(Route::UpdateProfile(12)));
        assert_eq!(Route::resolve("/user/abc", &health), None);
        assert_eq!(Route::resolve("/user/abc/edit", &health), None);
        assert_eq!(Route::resolve("/user/", &health), None);
        assert_eq!(Route::resolve("/user/+1", &health), None);
        assert_eq!(Route::resolve("/user/+1/edit", &health), None);
        assert_eq!(Route::resolve("/user/007", &health), Some(Route::UpdateProfile(7)));
        assert_eq!(Route::resolve("/nope", &health), None);
    }

    #[test]
    fn test_disabled_health_paths_are_unknown() {
        let health = HealthConfig {
            enabled: false,
            ..HealthConfig::default()
        };
        assert_eq!(Route::resolve("/healthz", &health), None);
    }

    #[tokio::test]
    async fn test_calculate() {
        let state = test_state();
        let (status, body) = send(
            &state,
            form_request(Method::POST, "/calculate", "height=1.8&weight=70"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("gives a BMI of 21.60kg/m²"));
        assert!(body.contains("Category: Healthy weight"));

        let (status, body) = send(
            &state,
            form_request(Method::POST, "/calculate", "height=1&weight=0"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("gives a BMI of 0.00kg/m²"));
        assert!(body.contains("Category: Underweight"));
    }

    #[tokio::test]
    async fn test_calculate_json_body() {
        let state = test_state();
        let req = Request::builder()
            .method(Method::POST)
            .uri("/calculate")
            .header(CONTENT_TYPE, "application/json")
            .body(Full::new(Bytes::from(r#"{"height": 1.0, "weight": 25}"#)))
            .unwrap();
        let (status, body) = send(&state, req).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Category: Overweight"));
    }

    #[tokio::test]
    async fn test_calculate_rejects_bad_input() {
        let state = test_state();
        let (status, body) = send(
            &state,
            form_request(Method::POST, "/calculate", "height=0&weight=70"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("height must be a finite number above zero"));

        let (status, _) = send(
            &state,
            form_request(Method::POST, "/calculate", "height=tall&weight=70"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&state, form_request(Method::POST, "/calculate", "")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_search() {
        let state = test_state();
        let (status, body) =
            send(&state, form_request(Method::POST, "/search", "search=GRAHAM")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<td>Leanne Graham</td>"));
        assert!(body.contains("<td>Sincere@april.biz</td>"));

        let (_, body) = send(&state, form_request(Method::POST, "/search", "search=")).await;
        assert_eq!(body, "<tr></tr>");

        let (_, body) = send(&state, form_request(Method::POST, "/search", "")).await;
        assert_eq!(body, "<tr></tr>");

        let (status, body) =
            send(&state, form_request(Method::POST, "/search", "search=qqqq")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_email() {
        let state = test_state();
        let (status, body) = send(
            &state,
            form_request(Method::POST, "/email", "email=me%40example.com"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("That email is valid"));

        let (status, body) =
            send(&state, form_request(Method::POST, "/email", "email=nope")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Please enter a valid email address"));
    }

    #[tokio::test]
    async fn test_profile_edit_cycle() {
        let state = test_state();

        let (status, form) = send(&state, form_request(Method::GET, "/user/1/edit", "")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(form.contains(r#"hx-put="/user/1""#));
        assert!(form.contains("Greg Lim"));

        let (status, card) = send(
            &state,
            form_request(Method::PUT, "/user/1", "name=Ada+Lovelace&bio=%3Cb%3Ehi%3C%2Fb%3E"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(card.contains("Ada Lovelace"));
        assert!(card.contains("&lt;b&gt;hi&lt;/b&gt;"));
        assert!(card.contains(r#"hx-get="/user/1/edit""#));

        let (_, form) = send(&state, form_request(Method::GET, "/user/1/edit", "")).await;
        assert!(form.contains(r#"value="Ada Lovelace""#));

        let (_, other) = send(&state, form_request(Method::GET, "/user/2/edit", "")).await;
        assert!(other.contains("Greg Lim"));
    }

    #[tokio::test]
    async fn test_price() {
        let state = test_state();
        let (status, body) = send(&state, form_request(Method::GET, "/get-price", "")).await;
        assert_eq!(status, StatusCode::OK);
        let value: f64 = body.strip_prefix('$').unwrap().parse().unwrap();
        assert!((59.0..=61.0).contains(&value), "unexpected price {value}");
    }

    #[tokio::test]
    async fn test_status_codes() {
        let state = test_state();

        let (status, _) = send(&state, form_request(Method::GET, "/missing", "")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        for path in ["/user/x/edit", "/user/+1/edit", "/user//edit", "/user/-1"] {
            let (status, _) = send(&state, form_request(Method::GET, path, "")).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{path}");
        }

        let resp = handle_request(
            form_request(Method::GET, "/calculate", ""),
            Arc::clone(&state),
            peer(),
        )
        .await
        .unwrap();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(resp.headers()["Allow"], "POST, OPTIONS");

        let resp = handle_request(
            form_request(Method::OPTIONS, "/calculate", ""),
            Arc::clone(&state),
            peer(),
        )
        .await
        .unwrap();
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert_eq!(resp.headers()["Allow"], "POST, OPTIONS");

        let resp = handle_request(
            form_request(Method::OPTIONS, "/user/3", ""),
            Arc::clone(&state),
            peer(),
        )
        .await
        .unwrap();
        assert_eq!(resp.headers()["Allow"], "PUT, OPTIONS");

        let (status, body) = send(&state, form_request(Method::GET, "/healthz", "")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn test_server_header() {
        let state = test_state();
        let resp = handle_request(
            form_request(Method::GET, "/readyz", ""),
            Arc::clone(&state),
            peer(),
        )
        .await
        .unwrap();
        assert_eq!(resp.headers()[SERVER], "Fragment-Server/1.0");
    }

    #[tokio::test]
    async fn test_body_too_large() {
        let state = test_state();
        let big = format!("search={}", "a".repeat(512));

        // streamed body without a Content-Length header
        let (status, _) = send(&state, form_request(Method::POST, "/search", &big)).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);

        let req = Request::builder()
            .method(Method::POST)
            .uri("/search")
            .header(CONTENT_LENGTH, "100000")
            .body(Full::new(Bytes::from("search=a")))
            .unwrap();
        let (status, _) = send(&state, req).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let state = test_state();
        let req = Request::builder()
            .method(Method::POST)
            .uri("/email")
            .header(CONTENT_TYPE, "application/json")
            .body(Full::new(Bytes::from("{not json")))
            .unwrap();
        let (status, body) = send(&state, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("invalid JSON body"));
    }
}
