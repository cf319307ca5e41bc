//! Line endpoints, including the station add/remove edits

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use subway_core::{LineId, NewLine, StationName};

use super::StationResponse;
use crate::http::error::ApiError;
use crate::http::extractors::{JsonBody, LineIdPath, LineStationPath};
use crate::http::format::{format_time, lenient_i32, parse_time};
use crate::service::{AddStation, LineDetail};
use crate::state::AppState;

/// Create/update line request
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineRequest {
    pub name: String,
    pub color: String,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub interval_time: Option<i32>,
}

impl LineRequest {
    fn into_new_line(self) -> Result<NewLine, ApiError> {
        let start_time = parse_time("startTime", self.start_time.as_deref())?;
        let end_time = parse_time("endTime", self.end_time.as_deref())?;
        Ok(NewLine::new(&self.name, &self.color)?.with_schedule(
            start_time,
            end_time,
            self.interval_time,
        )?)
    }
}

/// Add station request. `duration` and other extra fields are ignored.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddStationRequest {
    #[serde(default)]
    pub pre_station_name: Option<String>,
    pub station_name: String,
    #[serde(deserialize_with = "lenient_i32")]
    pub distance: i32,
}

impl AddStationRequest {
    fn into_add_station(self) -> Result<AddStation, ApiError> {
        let pre_station = self
            .pre_station_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(StationName::new)
            .transpose()?;
        Ok(AddStation {
            pre_station,
            station: StationName::new(&self.station_name)?,
            distance: self.distance,
        })
    }
}

/// Line response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineResponse {
    pub id: LineId,
    pub name: String,
    pub color: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub interval_time: Option<i32>,
    pub created_at: String,
    pub updated_at: String,
    pub stations: Vec<StationResponse>,
}

impl From<&LineDetail> for LineResponse {
    fn from(detail: &LineDetail) -> Self {
        let line = &detail.line;
        Self {
            id: line.id,
            name: line.name.to_string(),
            color: line.color.as_str().to_string(),
            start_time: format_time(line.start_time),
            end_time: format_time(line.end_time),
            interval_time: line.interval_time,
            created_at: line.created_at.to_rfc3339(),
            updated_at: line.updated_at.to_rfc3339(),
            stations: detail
                .stations()
                .into_iter()
                .map(StationResponse::from)
                .collect(),
        }
    }
}

/// POST /lines - create a line
async fn create_line(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<LineRequest>,
) -> Result<(StatusCode, [(header::HeaderName, String); 1], Json<LineResponse>), ApiError> {
    let detail = state.lines.create(req.into_new_line()?).await?;

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/lines/{}", detail.line.id))],
        Json(LineResponse::from(&detail)),
    ))
}

/// GET /lines - list all lines with their stations
async fn list_lines(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<LineResponse>>, ApiError> {
    let lines = state.lines.list().await?;
    Ok(Json(lines.iter().map(LineResponse::from).collect()))
}

/// GET /lines/{id} - get a single line
async fn get_line(
    State(state): State<Arc<AppState>>,
    LineIdPath(id): LineIdPath,
) -> Result<Json<LineResponse>, ApiError> {
    let detail = state.lines.find(id).await?;
    Ok(Json(LineResponse::from(&detail)))
}

/// PUT /lines/{id} - replace a line's attributes
async fn update_line(
    State(state): State<Arc<AppState>>,
    LineIdPath(id): LineIdPath,
    JsonBody(req): JsonBody<LineRequest>,
) -> Result<StatusCode, ApiError> {
    state.lines.update(id, req.into_new_line()?).await?;
    Ok(StatusCode::OK)
}

/// DELETE /lines/{id} - delete a line and its sections
async fn delete_line(
    State(state): State<Arc<AppState>>,
    LineIdPath(id): LineIdPath,
) -> Result<StatusCode, ApiError> {
    state.lines.delete(id).await?;
    Ok(StatusCode::OK)
}

/// POST /lines/addStation/{id} - put a station on a line
async fn add_station(
    State(state): State<Arc<AppState>>,
    LineIdPath(id): LineIdPath,
    JsonBody(req): JsonBody<AddStationRequest>,
) -> Result<Json<LineResponse>, ApiError> {
    let detail = state.lines.add_station(id, req.into_add_station()?).await?;
    Ok(Json(LineResponse::from(&detail)))
}

/// GET /lines/lineStations/{id} - stations of a line in travel order
async fn line_stations(
    State(state): State<Arc<AppState>>,
    LineIdPath(id): LineIdPath,
) -> Result<Json<Vec<StationResponse>>, ApiError> {
    let stations = state.lines.line_stations(id).await?;
    Ok(Json(stations.iter().map(StationResponse::from).collect()))
}

/// DELETE /lines/station/{lineId}/{stationId} - take a station off a line
async fn remove_station(
    State(state): State<Arc<AppState>>,
    LineStationPath(line_id, station_id): LineStationPath,
) -> Result<StatusCode, ApiError> {
    state.lines.remove_station(line_id, station_id).await?;
    Ok(StatusCode::OK)
}

/// Line routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/lines", get(list_lines).post(create_line))
        .route(
            "/lines/{id}",
            get(get_line).put(update_line).delete(delete_line),
        )
        .route("/lines/addStation/{id}", post(add_station))
        .route("/lines/lineStations/{id}", get(line_stations))
        .route(
            "/lines/station/{line_id}/{station_id}",
            delete(remove_station),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use axum::response::Response;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app() -> Router {
        router().with_state(Arc::new(AppState::in_memory()))
    }

    fn request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
        let builder = Request::builder().method(method).uri(uri);
        match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> Response {
        app.clone()
            .oneshot(request(method, uri, body))
            .await
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn line_json(name: &str) -> Value {
        json!({
            "name": name,
            "color": "bg-green-600",
            "startTime": "05:30",
            "endTime": "23:50",
            "intervalTime": 5
        })
    }

    #[tokio::test]
    async fn create_line_returns_location() {
        let app = app();
        let response = send(&app, "POST", "/lines", Some(line_json("2호선"))).await;

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()[header::LOCATION], "/lines/1");
        let body = json_body(response).await;
        assert_eq!(body["id"], 1);
        assert_eq!(body["name"], "2호선");
        assert_eq!(body["startTime"], "05:30");
        assert_eq!(body["intervalTime"], 5);
        assert_eq!(body["stations"], json!([]));
    }

    #[tokio::test]
    async fn duplicate_line_is_400_with_message() {
        let app = app();
        send(&app, "POST", "/lines", Some(line_json("2호선"))).await;
        let response = send(&app, "POST", "/lines", Some(line_json("2호선"))).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["message"], "line '2호선' already exists");
    }

    #[tokio::test]
    async fn invalid_time_is_400() {
        let mut body = line_json("2호선");
        body["startTime"] = json!("5시");
        let response = send(&app(), "POST", "/lines", Some(body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn line_crud() {
        let app = app();
        send(&app, "POST", "/lines", Some(line_json("2호선"))).await;

        let response = send(&app, "GET", "/lines/1", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["id"], 1);

        let response = send(&app, "PUT", "/lines/1", Some(line_json("신2호선"))).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(send(&app, "GET", "/lines/1", None).await).await;
        assert_eq!(body["name"], "신2호선");

        let response = send(&app, "GET", "/lines", None).await;
        assert_eq!(json_body(response).await.as_array().map(Vec::len), Some(1));

        let response = send(&app, "DELETE", "/lines/1", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let response = send(&app, "GET", "/lines/1", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unknown_pre_station_is_404() {
        let app = app();
        send(&app, "POST", "/lines", Some(line_json("2호선"))).await;

        let response = send(
            &app,
            "POST",
            "/lines/addStation/1",
            Some(json!({"preStationName": "A", "stationName": "B", "distance": 5})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn add_then_remove_interior_station() {
        let app = app_with_station("A").await;
        let response = send(
            &app,
            "POST",
            "/lines/addStation/1",
            Some(json!({"preStationName": "A", "stationName": "B", "distance": 5, "duration": 2})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let response = send(
            &app,
            "POST",
            "/lines/addStation/1",
            Some(json!({"preStationName": "B", "stationName": "C", "distance": "3"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["stations"].as_array().map(Vec::len), Some(3));

        // B is station 2
        let response = send(&app, "DELETE", "/lines/station/1/2", None).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(send(&app, "GET", "/lines/lineStations/1", None).await).await;
        let names: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|s| s["name"].as_str())
            .collect();
        assert_eq!(names, vec!["A", "C"]);
    }

    async fn app_with_station(name: &str) -> Router {
        let state = Arc::new(AppState::in_memory());
        state.stations.create(name).await.unwrap();
        let app = router().with_state(state);
        send(&app, "POST", "/lines", Some(line_json("2호선"))).await;
        app
    }

    #[tokio::test]
    async fn non_positive_distance_is_400() {
        let app = app_with_station("A").await;
        let response = send(
            &app,
            "POST",
            "/lines/addStation/1",
            Some(json!({"preStationName": "A", "stationName": "B", "distance": 0})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(json_body(response).await["message"]
            .as_str()
            .unwrap()
            .contains("greater than 0"));
    }

    #[tokio::test]
    async fn removing_station_not_on_line_is_400() {
        let app = app_with_station("A").await;
        let response = send(&app, "DELETE", "/lines/station/1/1", None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_line_is_404() {
        let response = send(&app(), "GET", "/lines/lineStations/9", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
