//! services/clocker/src/adapters/attendance_api.rs
//!
//! This module contains the attendance API adapter, which is the concrete
//! implementation of the `AttendanceService` port from the `core` crate. It talks
//! to the workforce REST API using `reqwest`.
//!
//! Payloads are parsed into domain types in one explicit step. Coordinates may
//! arrive as JSON numbers or numeric strings; anything that does not parse to a
//! finite number is rejected as `PortError::Malformed`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use clocker_core::domain::{
    AttendanceQuery, AttendanceRecord, ClockInPayload, GeoCoordinate, RangeConfig, ServiceWindow,
};
use clocker_core::ports::{AttendanceService, PortError, PortResult};
use reqwest::{header, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements the `AttendanceService` port over HTTP.
#[derive(Clone, Debug)]
pub struct HttpAttendanceAdapter {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAttendanceAdapter {
    /// Creates a new `HttpAttendanceAdapter`.
    pub fn new(
        base_url: &str,
        api_token: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        if let Some(token) = api_token {
            // A token with characters that cannot go in a header is left off;
            // the API then answers 401 and the caller sees Unauthorized.
            match header::HeaderValue::from_str(&format!("Bearer {}", token)) {
                Ok(value) => {
                    headers.insert(header::AUTHORIZATION, value);
                }
                Err(_) => warn!("ATTENDANCE_API_TOKEN contains invalid header characters; ignoring it"),
            }
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends a request and maps transport and HTTP failures onto `PortError`.
    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        operation: &str,
    ) -> PortResult<reqwest::Response> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                PortError::Unavailable(format!("{operation}: request timed out"))
            } else {
                PortError::Unavailable(format!("{operation}: {e}"))
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        debug!("{operation} failed with HTTP {status}: {body}");
        let message = server_message(&body);

        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => PortError::Unauthorized,
            StatusCode::NOT_FOUND => {
                PortError::NotFound(message.unwrap_or_else(|| format!("{operation}: not found")))
            }
            s if s.is_client_error() => PortError::Rejected { message },
            _ => match message {
                Some(message) => PortError::Rejected {
                    message: Some(message),
                },
                None => PortError::Unavailable(format!("{operation}: HTTP {status}")),
            },
        })
    }

    async fn parse<T: DeserializeOwned>(
        response: reqwest::Response,
        operation: &str,
    ) -> PortResult<T> {
        response
            .json::<T>()
            .await
            .map_err(|e| PortError::Malformed(format!("{operation}: {e}")))
    }
}

/// Pulls the `message` field out of an error body, if there is one.
fn server_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.trim().is_empty())
}

//=========================================================================================
// Wire Records
//=========================================================================================

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// A number the API sometimes sends as a string.
#[derive(Deserialize)]
#[serde(untagged)]
enum LooseNumber {
    Number(f64),
    Text(String),
}

impl LooseNumber {
    fn to_f64(&self, field: &str) -> PortResult<f64> {
        let value = match self {
            LooseNumber::Number(n) => *n,
            LooseNumber::Text(s) => s.trim().parse::<f64>().map_err(|_| {
                PortError::Malformed(format!("{field}: '{s}' is not a number"))
            })?,
        };
        if value.is_finite() {
            Ok(value)
        } else {
            Err(PortError::Malformed(format!("{field}: {value} is not finite")))
        }
    }
}

#[derive(Deserialize)]
struct CoordinatesRecord {
    #[serde(alias = "lat")]
    latitude: LooseNumber,
    #[serde(alias = "long", alias = "lng")]
    longitude: LooseNumber,
}

impl CoordinatesRecord {
    fn to_domain(&self) -> PortResult<GeoCoordinate> {
        let latitude = self.latitude.to_f64("latitude")?;
        let longitude = self.longitude.to_f64("longitude")?;
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(PortError::Malformed(format!(
                "coordinates ({latitude}, {longitude}) are out of bounds"
            )));
        }
        Ok(GeoCoordinate::new(latitude, longitude))
    }
}

#[derive(Serialize)]
struct CoordinatesBody {
    lat: f64,
    long: f64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServiceRecord {
    id: Uuid,
    #[serde(default)]
    name: Option<String>,
    clock_in_start_time: DateTime<Utc>,
    #[serde(rename = "CGWCId", default)]
    cgwc_id: Option<String>,
    coordinates: CoordinatesRecord,
    range_to_clock_in: LooseNumber,
}

impl ServiceRecord {
    fn to_domain(self) -> PortResult<ServiceWindow> {
        let range_to_clock_in = self.range_to_clock_in.to_f64("rangeToClockIn")?;
        if range_to_clock_in < 0.0 {
            return Err(PortError::Malformed(format!(
                "rangeToClockIn: {range_to_clock_in} is negative"
            )));
        }
        Ok(ServiceWindow {
            id: self.id,
            name: self.name.unwrap_or_default(),
            clock_in_start_time: self.clock_in_start_time,
            cgwc_id: self.cgwc_id.filter(|id| !id.is_empty()),
            campus_coordinates: self.coordinates.to_domain()?,
            range: RangeConfig { range_to_clock_in },
        })
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AttendanceRow {
    id: Uuid,
    user_id: Uuid,
    service_id: Uuid,
    #[serde(default)]
    clock_in: Option<DateTime<Utc>>,
    #[serde(default)]
    clock_out: Option<DateTime<Utc>>,
    coordinates: CoordinatesRecord,
}

impl AttendanceRow {
    fn to_domain(self) -> PortResult<AttendanceRecord> {
        Ok(AttendanceRecord {
            id: self.id,
            user_id: self.user_id,
            service_id: self.service_id,
            clock_in: self.clock_in,
            clock_out: self.clock_out,
            coordinates: self.coordinates.to_domain()?,
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ClockInBody {
    user_id: Uuid,
    clock_in: DateTime<Utc>,
    clock_out: Option<DateTime<Utc>>,
    service_id: Uuid,
    coordinates: CoordinatesBody,
    campus_id: Uuid,
    department_id: Uuid,
    role_id: Uuid,
}

impl From<&ClockInPayload> for ClockInBody {
    fn from(payload: &ClockInPayload) -> Self {
        Self {
            user_id: payload.user_id,
            clock_in: payload.clock_in,
            clock_out: payload.clock_out,
            service_id: payload.service_id,
            coordinates: CoordinatesBody {
                lat: payload.coordinates.latitude,
                long: payload.coordinates.longitude,
            },
            campus_id: payload.campus_id,
            department_id: payload.department_id,
            role_id: payload.role_id,
        }
    }
}

//=========================================================================================
// `AttendanceService` Trait Implementation
//=========================================================================================

#[async_trait]
impl AttendanceService for HttpAttendanceAdapter {
    async fn get_latest_service(&self, campus_id: Uuid) -> PortResult<Option<ServiceWindow>> {
        let request = self
            .client
            .get(self.url("/services/latest"))
            .query(&[("campusId", campus_id.to_string())]);

        let response = match self.send(request, "get_latest_service").await {
            Ok(response) => response,
            Err(PortError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e),
        };

        let record: Option<ServiceRecord> = Self::parse(response, "get_latest_service").await?;
        record.map(ServiceRecord::to_domain).transpose()
    }

    async fn get_attendance(&self, query: AttendanceQuery) -> PortResult<Vec<AttendanceRecord>> {
        let request = self.client.get(self.url("/attendance")).query(&[
            ("userId", query.user_id.to_string()),
            ("serviceId", query.service_id.to_string()),
        ]);

        let response = self.send(request, "get_attendance").await?;
        let rows: Vec<AttendanceRow> = Self::parse(response, "get_attendance").await?;
        rows.into_iter().map(AttendanceRow::to_domain).collect()
    }

    async fn clock_in(&self, payload: ClockInPayload) -> PortResult<AttendanceRecord> {
        let request = self
            .client
            .post(self.url("/attendance/clock-in"))
            .json(&ClockInBody::from(&payload));

        let response = self.send(request, "clock_in").await?;
        let row: AttendanceRow = Self::parse(response, "clock_in").await?;
        row.to_domain()
    }

    async fn clock_out(&self, attendance_id: Uuid) -> PortResult<AttendanceRecord> {
        let request = self
            .client
            .patch(self.url(&format!("/attendance/{}/clock-out", attendance_id)));

        let response = self.send(request, "clock_out").await?;
        let row: AttendanceRow = Self::parse(response, "clock_out").await?;
        row.to_domain()
    }
}
