use std::convert::Infallible;

use warp::{Filter, Reply};

use crate::handlers;
use crate::AppState;

/// All routes, with rejection recovery and per-request logging.
///
/// The literal `precipitation`, `stations` and `tobs` paths are tried before
/// the `{start}` parameter route.
pub fn routes(
    state: AppState,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let index = warp::get().and(warp::path::end()).and_then(handlers::index);

    let precipitation = warp::get()
        .and(warp::path!("api" / "v1.0" / "precipitation"))
        .and(with_state(state.clone()))
        .and_then(handlers::precipitation);

    let stations = warp::get()
        .and(warp::path!("api" / "v1.0" / "stations"))
        .and(with_state(state.clone()))
        .and_then(handlers::stations);

    let tobs = warp::get()
        .and(warp::path!("api" / "v1.0" / "tobs"))
        .and(with_state(state.clone()))
        .and_then(handlers::tobs);

    let summary_from = warp::get()
        .and(warp::path!("api" / "v1.0" / String))
        .and(with_state(state.clone()))
        .and_then(handlers::summary_from);

    let summary_between = warp::get()
        .and(warp::path!("api" / "v1.0" / String / String))
        .and(with_state(state))
        .and_then(handlers::summary_between);

    index
        .or(precipitation)
        .or(stations)
        .or(tobs)
        .or(summary_from)
        .or(summary_between)
        .recover(handlers::handle_rejection)
        .with(warp::log::custom(|info| {
            tracing::info!(
                "{} {} -> {} ({:?})",
                info.method(),
                info.path(),
                info.status().as_u16(),
                info.elapsed()
            );
        }))
}

fn with_state(state: AppState) -> impl Filter<Extract = (AppState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}
