//! HTTP surface. Every handler returns a JSON response or a rejection that
//! `handle_rejection` turns into a JSON error body.

mod car_rentals;
mod catalog;
mod currencies;
mod flights;
mod journal;
mod options;
mod snapshots;
mod stops;
mod trips;

use std::convert::Infallible;

use serde::de::DeserializeOwned;
use serde::Serialize;
use warp::filters::BoxedFilter;
use warp::reply::Response;
use warp::{Filter, Reply};

use crate::context::AppContext;
use crate::error::handle_rejection;

const MAX_BODY_BYTES: u64 = 1024 * 1024;

pub type Route = BoxedFilter<(Response,)>;

pub fn api(ctx: AppContext) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    trips::routes(ctx.clone())
        .or(flights::routes(ctx.clone()))
        .unify()
        .or(car_rentals::routes(ctx.clone()))
        .unify()
        .or(stops::routes(ctx.clone()))
        .unify()
        .or(journal::routes(ctx.clone()))
        .unify()
        .or(snapshots::routes(ctx.clone()))
        .unify()
        .or(options::routes(ctx.clone()))
        .unify()
        .or(currencies::routes(ctx.clone()))
        .unify()
        .or(catalog::routes(ctx))
        .unify()
        .with(warp::trace::request())
        .recover(handle_rejection)
}

pub(crate) fn with_ctx(ctx: AppContext) -> impl Filter<Extract = (AppContext,), Error = Infallible> + Clone {
    warp::any().map(move || ctx.clone())
}

pub(crate) fn json_body<T: DeserializeOwned + Send>() -> impl Filter<Extract = (T,), Error = warp::Rejection> + Clone {
    warp::body::content_length_limit(MAX_BODY_BYTES).and(warp::body::json())
}

pub(crate) fn json<T: Serialize>(value: &T) -> Response {
    warp::reply::json(value).into_response()
}

#[derive(Serialize)]
pub(crate) struct Success {
    pub success: bool,
}

pub(crate) fn success() -> Response {
    json(&Success { success: true })
}
