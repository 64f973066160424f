use serde::Serialize;
use tracing::{Level, event, instrument};
use warp::{
    Rejection, Reply,
    filters::{body::BodyDeserializeError, cors::CorsForbidden},
    http::StatusCode,
    reject::{MethodNotAllowed, Reject},
};

#[derive(Debug)]
pub enum Error {
    ParseError(std::num::ParseIntError),
    InvalidRequest(String),
    NotFound(String),
    DatabaseQueryError(sqlx::Error),
    MigrationError(sqlx::migrate::MigrateError),
}

/// Coarse classification the HTTP layer maps onto status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidRequest,
    NotFound,
    Unavailable,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::ParseError(_) | Error::InvalidRequest(_) => ErrorKind::InvalidRequest,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::DatabaseQueryError(_) | Error::MigrationError(_) => ErrorKind::Unavailable,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::InvalidRequest => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Unavailable => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::ParseError(err) => write!(f, "Cannot parse parameter: {}", err),
            Error::InvalidRequest(reason) => write!(f, "Invalid request: {}", reason),
            Error::NotFound(what) => write!(f, "Not found: {}", what),
            Error::DatabaseQueryError(err) => write!(f, "Query could not be executed: {}", err),
            Error::MigrationError(err) => write!(f, "Cannot migrate data: {}", err),
        }
    }
}

impl Reject for Error {}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: u16,
    message: &'static str,
}

fn message_for(status: StatusCode) -> &'static str {
    match status {
        StatusCode::BAD_REQUEST => "bad request",
        StatusCode::FORBIDDEN => "forbidden",
        StatusCode::NOT_FOUND => "resource not found",
        StatusCode::METHOD_NOT_ALLOWED => "method not allowed",
        StatusCode::UNPROCESSABLE_ENTITY => "unprocessable",
        _ => "internal server error",
    }
}

fn error_reply(status: StatusCode) -> warp::reply::WithStatus<warp::reply::Json> {
    let body = ErrorBody {
        success: false,
        error: status.as_u16(),
        message: message_for(status),
    };
    warp::reply::with_status(warp::reply::json(&body), status)
}

#[instrument]
pub async fn return_error(r: Rejection) -> Result<impl Reply, Rejection> {
    if let Some(error) = r.find::<Error>() {
        match error.kind() {
            ErrorKind::Unavailable => event!(Level::ERROR, "{}", error),
            _ => event!(Level::WARN, "{}", error),
        }
        Ok(error_reply(error.status()))
    } else if let Some(error) = r.find::<CorsForbidden>() {
        event!(Level::WARN, "CORS forbidden error: {}", error);
        Ok(error_reply(StatusCode::FORBIDDEN))
    } else if let Some(error) = r.find::<BodyDeserializeError>() {
        event!(Level::WARN, "Cannot deserialize request body: {}", error);
        Ok(error_reply(StatusCode::UNPROCESSABLE_ENTITY))
    } else if r.find::<MethodNotAllowed>().is_some() {
        event!(Level::WARN, "Route exists but not for this method");
        Ok(error_reply(StatusCode::METHOD_NOT_ALLOWED))
    } else {
        event!(Level::WARN, "Requested route was not found");
        Ok(error_reply(StatusCode::NOT_FOUND))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warp::Filter;

    async fn status_of(rejection: Rejection) -> StatusCode {
        return_error(rejection)
            .await
            .expect("recover never fails")
            .into_response()
            .status()
    }

    #[test]
    fn kinds_follow_the_taxonomy() {
        let parse = "x".parse::<i32>().unwrap_err();
        assert_eq!(Error::ParseError(parse).kind(), ErrorKind::InvalidRequest);
        assert_eq!(
            Error::InvalidRequest("empty search term".into()).kind(),
            ErrorKind::InvalidRequest
        );
        assert_eq!(Error::NotFound("question 7".into()).kind(), ErrorKind::NotFound);
        assert_eq!(
            Error::DatabaseQueryError(sqlx::Error::PoolTimedOut).kind(),
            ErrorKind::Unavailable
        );
    }

    #[tokio::test]
    async fn custom_rejections_map_to_statuses() {
        let not_found = warp::reject::custom(Error::NotFound("question 7".into()));
        assert_eq!(status_of(not_found).await, StatusCode::NOT_FOUND);

        let invalid = warp::reject::custom(Error::InvalidRequest("bad id".into()));
        assert_eq!(status_of(invalid).await, StatusCode::BAD_REQUEST);

        let unavailable = warp::reject::custom(Error::DatabaseQueryError(sqlx::Error::PoolClosed));
        assert_eq!(status_of(unavailable).await, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn wrong_method_is_not_allowed() {
        let filter = warp::post().map(warp::reply);
        let rejection = warp::test::request()
            .method("GET")
            .filter(&filter)
            .await
            .err()
            .expect("GET must not pass a POST filter");
        assert_eq!(status_of(rejection).await, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn unknown_rejections_are_not_found() {
        assert_eq!(status_of(warp::reject::not_found()).await, StatusCode::NOT_FOUND);
    }
}
