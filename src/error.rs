use std::convert::Infallible;

use serde::Serialize;
use tracing::error;
use warp::{http::StatusCode, Rejection, Reply};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Exchange rate request failed: {0}")]
    Rates(#[from] reqwest::Error),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("{0}")]
    Internal(String),
}

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) | Error::Database(sqlx::Error::RowNotFound) => StatusCode::NOT_FOUND,
            Error::Database(_) | Error::Rates(_) | Error::Config(_) | Error::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Text sent to the client. Store and upstream failures are not exposed.
    pub fn public_message(&self) -> String {
        match self {
            Error::Database(sqlx::Error::RowNotFound) => "Not found".to_string(),
            Error::Database(_) => "Database error".to_string(),
            Error::Rates(_) => "Failed to fetch exchange rates".to_string(),
            other => other.to_string(),
        }
    }

    pub fn not_found(what: &str) -> Self {
        Error::NotFound(format!("{what} not found"))
    }
}

impl warp::reject::Reject for Error {}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub status_code: u16,
    pub status_message: String,
}

pub async fn handle_rejection(rejection: Rejection) -> Result<impl Reply, Infallible> {
    let (status, message) = if let Some(error) = rejection.find::<Error>() {
        let status = error.status();
        if status.is_server_error() {
            error!("{}", error);
        }
        (status, error.public_message())
    } else if let Some(error) = rejection.find::<warp::filters::body::BodyDeserializeError>() {
        (StatusCode::BAD_REQUEST, format!("Invalid request body: {error}"))
    } else if let Some(error) = rejection.find::<warp::reject::InvalidQuery>() {
        (StatusCode::BAD_REQUEST, error.to_string())
    } else if rejection.find::<warp::reject::PayloadTooLarge>().is_some() {
        (StatusCode::PAYLOAD_TOO_LARGE, "Payload too large".to_string())
    } else if rejection.is_not_found() {
        (StatusCode::NOT_FOUND, "Not found".to_string())
    } else if rejection.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed".to_string())
    } else {
        error!("unhandled rejection: {:?}", rejection);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
    };

    let body = warp::reply::json(&ErrorBody {
        status_code: status.as_u16(),
        status_message: message,
    });
    Ok(warp::reply::with_status(body, status))
}

#[cfg(test)]
mod tests {
    use super::*;
    use warp::Filter;

    async fn reply_for(rejection: Rejection) -> (StatusCode, serde_json::Value) {
        let response = handle_rejection(rejection).await.unwrap().into_response();
        let status = response.status();
        let bytes = warp::hyper::body::to_bytes(response.into_body()).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn maps_variants_to_status() {
        assert_eq!(Error::BadRequest("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(Error::not_found("Trip").status(), StatusCode::NOT_FOUND);
        assert_eq!(Error::Database(sqlx::Error::RowNotFound).status(), StatusCode::NOT_FOUND);
        assert_eq!(Error::Database(sqlx::Error::PoolTimedOut).status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(Error::Config("x".into()).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn custom_errors_become_json() {
        let (status, body) = reply_for(Error::BadRequest("Invalid currency.".into()).into()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["statusCode"], 400);
        assert_eq!(body["statusMessage"], "Invalid currency.");
    }

    #[tokio::test]
    async fn database_details_stay_private() {
        let (status, body) = reply_for(Error::Database(sqlx::Error::PoolTimedOut).into()).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["statusMessage"], "Database error");
    }

    #[tokio::test]
    async fn handler_errors_convert_with_question_mark() {
        fn lookup() -> Result<(), Error> {
            Err(Error::not_found("Trip"))
        }

        async fn handler() -> Result<warp::reply::Response, Rejection> {
            lookup()?;
            Ok(warp::reply().into_response())
        }

        let filter = warp::path!("trips").and_then(handler).recover(handle_rejection);
        let response = warp::test::request().path("/trips").reply(&filter).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["statusMessage"], "Trip not found");
    }

    #[tokio::test]
    async fn unknown_routes_are_404() {
        let (status, body) = reply_for(warp::reject::not_found()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["statusCode"], 404);
    }

    #[tokio::test]
    async fn malformed_bodies_are_400() {
        let filter = warp::post()
            .and(warp::body::json::<serde_json::Value>())
            .map(|_| warp::reply())
            .recover(handle_rejection);

        let response = warp::test::request()
            .method("POST")
            .header("content-type", "application/json")
            .body("{not json")
            .reply(&filter)
            .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["statusCode"], 400);
    }
}
