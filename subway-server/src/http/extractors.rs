//! Custom Axum extractors
//!
//! Rejections are turned into [`ApiError`] so malformed ids and bodies get
//! the same `{"message": ...}` shape as every other error.

use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::request::Parts;
use axum::Json;
use serde::de::DeserializeOwned;
use subway_core::{LineId, StationId, ValidationError};

use super::error::ApiError;

fn parse_id(field: &'static str, raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>().map_err(|_| {
        ApiError::Validation(ValidationError::InvalidFormat {
            field,
            reason: "must be an integer id",
        })
    })
}

/// Extract a line id from a single-segment path (`/lines/{id}`)
pub struct LineIdPath(pub LineId);

impl<S> FromRequestParts<S> for LineIdPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id): Path<String> = Path::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::Validation(ValidationError::Empty { field: "line id" }))?;

        Ok(Self(LineId(parse_id("line id", &id)?)))
    }
}

/// Extract a station id from a single-segment path (`/stations/{id}`)
pub struct StationIdPath(pub StationId);

impl<S> FromRequestParts<S> for StationIdPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id): Path<String> = Path::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::Validation(ValidationError::Empty { field: "station id" }))?;

        Ok(Self(StationId(parse_id("station id", &id)?)))
    }
}

/// Extract `(line id, station id)` from `/lines/station/{lineId}/{stationId}`
pub struct LineStationPath(pub LineId, pub StationId);

impl<S> FromRequestParts<S> for LineStationPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path((line_id, station_id)): Path<(String, String)> =
            Path::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::Validation(ValidationError::Empty { field: "id" }))?;

        Ok(Self(
            LineId(parse_id("line id", &line_id)?),
            StationId(parse_id("station id", &station_id)?),
        ))
    }
}

/// JSON body whose rejection is reported as a 400 `{"message": ...}`
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::BadRequest {
                message: rejection.body_text(),
            })?;
        Ok(Self(value))
    }
}
