//! Request handlers. Each runs one query pipeline on the blocking pool.

use std::convert::Infallible;

use climate_query::{format, service, ErrorBody, QueryError};
use serde::Serialize;
use warp::http::StatusCode;
use warp::reply::Response;
use warp::{Rejection, Reply};

use crate::AppState;

pub async fn index() -> Result<Response, Infallible> {
    Ok(warp::reply::html(format::index_html()).into_response())
}

pub async fn precipitation(state: AppState) -> Result<Response, Infallible> {
    let result = state.db.run(service::precipitation).await;
    Ok(respond(result))
}

pub async fn stations(state: AppState) -> Result<Response, Infallible> {
    let result = state.db.run(service::station_names).await;
    Ok(respond(result))
}

pub async fn tobs(state: AppState) -> Result<Response, Infallible> {
    let window = state.window.clone();
    let result = state
        .db
        .run(move |session| service::reference_temperatures(session, &window))
        .await;
    Ok(respond(result))
}

pub async fn summary_from(start: String, state: AppState) -> Result<Response, Infallible> {
    let result = state
        .db
        .run(move |session| service::temperature_summary(session, &start, None))
        .await;
    Ok(respond(result))
}

pub async fn summary_between(
    start: String,
    end: String,
    state: AppState,
) -> Result<Response, Infallible> {
    let result = state
        .db
        .run(move |session| service::temperature_summary(session, &start, Some(end.as_str())))
        .await;
    Ok(respond(result))
}

/// JSON body on success; `{"error"}` with 404 for lookup failures, 500 otherwise.
fn respond<T: Serialize>(result: Result<T, QueryError>) -> Response {
    match result {
        Ok(body) => warp::reply::json(&body).into_response(),
        Err(err) => {
            let status = if err.is_not_found() {
                tracing::debug!("Lookup failed: {}", err);
                StatusCode::NOT_FOUND
            } else {
                tracing::error!("Query failed: {}", err);
                StatusCode::INTERNAL_SERVER_ERROR
            };
            error_reply(ErrorBody::from(&err), status)
        }
    }
}

fn error_reply(body: ErrorBody, status: StatusCode) -> Response {
    warp::reply::with_status(warp::reply::json(&body), status).into_response()
}

/// Turn unmatched routes into the same `{"error"}` shape.
pub async fn handle_rejection(err: Rejection) -> Result<Response, Infallible> {
    let (status, message) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Not found")
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
    } else {
        tracing::error!("Unhandled rejection: {:?}", err);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    };

    Ok(error_reply(
        ErrorBody {
            error: message.to_string(),
        },
        status,
    ))
}
