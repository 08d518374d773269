use serde_json::Value;
use warp::reply::Response;
use warp::{Filter, Rejection};

use super::{json, with_ctx, Route};
use crate::context::AppContext;
use crate::db::catalog;
use crate::error::Error;
use crate::types::{Airline, CatalogQuery};

const AIRLINES: &str = include_str!("../../assets/airlines.json");
const ACCOMMODATION_PROVIDERS: &str = include_str!("../../assets/accommodation-providers.json");

pub fn routes(ctx: AppContext) -> Route {
    let car_types = warp::path!("api" / "car-types")
        .and(warp::get())
        .and(with_ctx(ctx.clone()))
        .and(warp::query::<CatalogQuery>())
        .and_then(list_car_types);

    let room_types = warp::path!("api" / "room-types")
        .and(warp::get())
        .and(with_ctx(ctx))
        .and_then(list_room_types);

    static_routes().or(car_types).unify().or(room_types).unify().boxed()
}

/// Catalogs served from bundled data.
pub fn static_routes() -> Route {
    let airlines = warp::path!("api" / "airlines")
        .and(warp::get())
        .and(warp::query::<CatalogQuery>())
        .and_then(list_airlines);

    let providers = warp::path!("api" / "accommodation-providers")
        .and(warp::get())
        .and_then(list_providers);

    airlines.or(providers).unify().boxed()
}

/// Airlines sorted by name, filtered by code or name.
pub fn airlines(query: &CatalogQuery) -> Result<Vec<Airline>, Error> {
    let table: serde_json::Map<String, Value> = serde_json::from_str(AIRLINES)
        .map_err(|e| Error::Internal(format!("airline table is malformed: {e}")))?;

    let mut list: Vec<Airline> = table
        .into_iter()
        .filter_map(|(code, name)| {
            Some(Airline {
                name: name.as_str()?.to_string(),
                code,
            })
        })
        .filter(|airline| query.matches(&[airline.code.as_str(), airline.name.as_str()]))
        .collect();
    list.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    list.truncate(query.limit());
    Ok(list)
}

async fn list_airlines(query: CatalogQuery) -> Result<Response, Rejection> {
    Ok(json(&airlines(&query)?))
}

async fn list_providers() -> Result<Response, Rejection> {
    let providers: Value = serde_json::from_str(ACCOMMODATION_PROVIDERS)
        .map_err(|e| Error::Internal(format!("provider list is malformed: {e}")))?;
    Ok(json(&providers))
}

async fn list_car_types(ctx: AppContext, query: CatalogQuery) -> Result<Response, Rejection> {
    Ok(json(&catalog::car_types(&ctx.pool, &query).await?))
}

async fn list_room_types(ctx: AppContext) -> Result<Response, Rejection> {
    Ok(json(&catalog::room_types(&ctx.pool).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::handle_rejection;
    use warp::http::StatusCode;

    fn query(search: Option<&str>, limit: Option<&str>) -> CatalogQuery {
        CatalogQuery {
            search: search.map(str::to_string),
            limit: limit.map(str::to_string),
        }
    }

    #[test]
    fn airlines_are_sorted_and_searchable() {
        let all = airlines(&query(None, None)).unwrap();
        assert!(all.len() > 10);
        assert!(all.windows(2).all(|w| w[0].name.to_lowercase() <= w[1].name.to_lowercase()));

        let found = airlines(&query(Some("lh"), None)).unwrap();
        assert!(found.iter().any(|a| a.code == "LH" && a.name == "Lufthansa"));

        assert_eq!(airlines(&query(None, Some("3"))).unwrap().len(), 3);
    }

    #[tokio::test]
    async fn airlines_endpoint_applies_query() {
        let filter = static_routes().recover(handle_rejection);
        let response = warp::test::request()
            .method("GET")
            .path("/api/airlines?search=condor&limit=5")
            .reply(&filter)
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: Vec<Airline> = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body, vec![Airline { code: "DE".to_string(), name: "Condor".to_string() }]);
    }

    #[tokio::test]
    async fn providers_endpoint_serves_bundled_list() {
        let filter = static_routes().recover(handle_rejection);
        let response = warp::test::request()
            .method("GET")
            .path("/api/accommodation-providers")
            .reply(&filter)
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = serde_json::from_slice(response.body()).unwrap();
        assert!(body.as_array().is_some_and(|list| !list.is_empty()));
    }

    #[tokio::test]
    async fn unknown_catalog_is_json_404() {
        let filter = static_routes().recover(handle_rejection);
        let response = warp::test::request()
            .method("GET")
            .path("/api/ship-types")
            .reply(&filter)
            .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body: Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["statusCode"], 404);
    }
}
