//! Blocking HTTP clients for OpenIPMap and the RIPE Atlas API.
//!
//! Each client is built from its own [`EndpointConfig`], so relaxing TLS
//! certificate validation for one service never affects the others.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use super::{GeoHintSource, LookupError, ProbeDirectory};
use crate::measurement::ProbeId;
use crate::utils::geo::GeoPoint;

pub const OPENIPMAP_URL: &str = "http://marmot.ripe.net/openipmap/ipmeta.json";
pub const ATLAS_PROBE_URL: &str = "https://atlas.ripe.net/api/v1/probe/";
pub const ATLAS_MEASUREMENT_URL: &str = "https://atlas.ripe.net/api/v1/measurement-latest/";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for one remote service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub url: String,
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
    /// Skip TLS certificate validation for this endpoint only
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

impl EndpointConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: DEFAULT_TIMEOUT,
            accept_invalid_certs: false,
        }
    }

    pub fn with_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    pub fn openipmap() -> Self {
        Self::new(OPENIPMAP_URL).with_invalid_certs(true)
    }

    pub fn atlas_probes() -> Self {
        Self::new(ATLAS_PROBE_URL)
    }

    pub fn atlas_measurements() -> Self {
        Self::new(ATLAS_MEASUREMENT_URL)
    }

    fn build_client(&self) -> Result<Client, LookupError> {
        if self.accept_invalid_certs {
            log::warn!("TLS certificate validation disabled for {}", self.url);
        }
        Client::builder()
            .timeout(self.timeout)
            .danger_accept_invalid_certs(self.accept_invalid_certs)
            .user_agent(concat!("hopcheck/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(LookupError::Client)
    }
}

/// GET `url` and return the body, failing on transport errors and non-2xx
fn get_text(client: &Client, url: &str, query: &[(&str, String)]) -> Result<String, LookupError> {
    log::debug!("GET {} {:?}", url, query);
    let response = client
        .get(url)
        .query(query)
        .send()
        .map_err(|source| LookupError::Transport { url: url.to_string(), source })?;

    let status = response.status();
    if !status.is_success() {
        return Err(LookupError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    response
        .text()
        .map_err(|source| LookupError::Transport { url: url.to_string(), source })
}

fn decode<T: serde::de::DeserializeOwned>(url: &str, body: &str) -> Result<T, LookupError> {
    serde_json::from_str(body).map_err(|source| LookupError::Decode { url: url.to_string(), source })
}

/// Body of an OpenIPMap `ipmeta.json` response
#[derive(Debug, Deserialize)]
struct IpMeta {
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
}

impl IpMeta {
    fn into_location(self, address: &str) -> Result<Option<GeoPoint>, LookupError> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Ok(Some(GeoPoint::new(lat, lon))),
            (None, None) => Ok(None),
            _ => Err(LookupError::IncompleteLocation {
                subject: address.to_string(),
                reason: "only one of lat/lon present".to_string(),
            }),
        }
    }
}

/// Claimed locations from OpenIPMap
pub struct OpenIpMapClient {
    client: Client,
    url: String,
}

impl OpenIpMapClient {
    pub fn new(endpoint: &EndpointConfig) -> Result<Self, LookupError> {
        Ok(Self {
            client: endpoint.build_client()?,
            url: endpoint.url.clone(),
        })
    }
}

impl GeoHintSource for OpenIpMapClient {
    fn claimed_location(&self, address: &str) -> Result<Option<GeoPoint>, LookupError> {
        let body = get_text(&self.client, &self.url, &[("ip", address.to_string())])?;
        decode::<IpMeta>(&self.url, &body)?.into_location(address)
    }
}

#[derive(Debug, Deserialize)]
struct ProbeList {
    objects: Vec<ProbeMeta>,
}

#[derive(Debug, Deserialize)]
struct ProbeMeta {
    latitude: Option<f64>,
    longitude: Option<f64>,
}

/// Probe positions from the Atlas probe API
pub struct AtlasProbeClient {
    client: Client,
    url: String,
}

impl AtlasProbeClient {
    pub fn new(endpoint: &EndpointConfig) -> Result<Self, LookupError> {
        Ok(Self {
            client: endpoint.build_client()?,
            url: endpoint.url.clone(),
        })
    }
}

impl ProbeDirectory for AtlasProbeClient {
    fn probe_location(&self, probe_id: ProbeId) -> Result<GeoPoint, LookupError> {
        let body = get_text(&self.client, &self.url, &[("id", probe_id.to_string())])?;
        let list: ProbeList = decode(&self.url, &body)?;
        let probe = list
            .objects
            .into_iter()
            .next()
            .ok_or(LookupError::UnknownProbe(probe_id))?;

        match (probe.latitude, probe.longitude) {
            (Some(lat), Some(lon)) => Ok(GeoPoint::new(lat, lon)),
            _ => Err(LookupError::IncompleteLocation {
                subject: format!("probe {}", probe_id),
                reason: "latitude/longitude missing".to_string(),
            }),
        }
    }
}

/// Downloads the latest results of an Atlas measurement
pub struct AtlasMeasurementClient {
    client: Client,
    url: String,
}

impl AtlasMeasurementClient {
    pub fn new(endpoint: &EndpointConfig) -> Result<Self, LookupError> {
        Ok(Self {
            client: endpoint.build_client()?,
            url: endpoint.url.clone(),
        })
    }

    /// Fetch results as line-delimited records, one JSON document per line
    pub fn fetch_latest(&self, measurement_id: u64) -> Result<String, LookupError> {
        let url = format!("{}/{}/", self.url.trim_end_matches('/'), measurement_id);
        log::info!("Fetching measurement {} from {}", measurement_id, url);
        let body = get_text(&self.client, &url, &[])?;
        to_line_delimited(&url, &body)
    }
}

/// Normalise a results body to one record per line.
///
/// The API answers with a JSON array; bodies that are already line-delimited
/// are passed through.
pub fn to_line_delimited(url: &str, body: &str) -> Result<String, LookupError> {
    if !body.trim_start().starts_with('[') {
        return Ok(body.to_string());
    }

    let records: Vec<serde_json::Value> = decode(url, body)?;
    let mut out = String::with_capacity(body.len());
    for record in &records {
        out.push_str(&record.to_string());
        out.push('\n');
    }
    Ok(out)
}
