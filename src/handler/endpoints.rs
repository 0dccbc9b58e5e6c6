//! Fragment endpoints
//!
//! One function per route. Each takes already-decoded input and returns the
//! finished response; none of them can fail the connection.

use hyper::StatusCode;
use std::sync::PoisonError;

use super::fragments;
use crate::config::AppState;
use crate::domain::{classify, is_valid_email, Profile};
use crate::http::{self, FormData, HttpResponse};
use crate::logger;

/// `POST /calculate`
pub fn calculate(form: &FormData) -> HttpResponse {
    let measured = form
        .number("height")
        .and_then(|height| form.number("weight").map(|weight| (height, weight)));

    let (height, weight) = match measured {
        Ok(pair) => pair,
        Err(e) => {
            logger::log_debug(&format!("Rejected BMI form: {e}"));
            return http::build_html_with_status(
                StatusCode::BAD_REQUEST,
                fragments::bmi_error(&e.to_string()),
            );
        }
    };

    match classify(height, weight) {
        Ok(reading) => http::build_html_response(fragments::bmi_result(height, weight, &reading)),
        Err(e) => {
            logger::log_debug(&format!("Rejected BMI input: {e}"));
            http::build_html_with_status(
                StatusCode::BAD_REQUEST,
                fragments::bmi_error(&e.to_string()),
            )
        }
    }
}

/// `POST /search`
pub fn search(form: &FormData, state: &AppState) -> HttpResponse {
    let term = form.text("search").trim();
    if term.is_empty() {
        return http::build_html_response(fragments::EMPTY_ROW.to_string());
    }

    let hits = state.directory.search(term);
    logger::log_debug(&format!("Search '{term}' matched {} user(s)", hits.len()));
    http::build_html_response(fragments::search_rows(&hits))
}

/// `POST /email`
pub fn email(form: &FormData) -> HttpResponse {
    let submitted = form.text("email");
    let valid = is_valid_email(submitted);
    http::build_html_response(fragments::email_field(submitted, valid))
}

/// `GET /user/{id}/edit`
pub async fn edit_profile(id: u64, state: &AppState) -> HttpResponse {
    let profile = state.profiles.get(id).await;
    http::build_html_response(fragments::profile_form(id, &profile))
}

/// `PUT /user/{id}`
pub async fn update_profile(id: u64, form: &FormData, state: &AppState) -> HttpResponse {
    let profile = Profile {
        name: form.text("name").to_string(),
        bio: form.text("bio").to_string(),
    };
    let card = fragments::profile_card(id, &profile);
    state.profiles.put(id, profile).await;
    logger::log_debug(&format!("Profile {id} updated"));
    http::build_html_response(card)
}

/// `GET /get-price`
pub fn price(state: &AppState) -> HttpResponse {
    let value = {
        let mut ticker = state.price.lock().unwrap_or_else(PoisonError::into_inner);
        ticker.tick(&mut rand::rng())
    };
    http::build_text_response(fragments::price(value))
}
