//! Baidu LBS HTTP adapter: place-search geocoding and direction-lite
//! route durations.
//!
//! Every request carries an `sn` signature: MD5 over the query-escaped
//! concatenation of the request path and the secret key, per the LBS
//! console's signing scheme.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Deserialize;

use crate::model::{Coordinate, TransportMode};
use crate::traits::{Geocoder, ProviderError, RouteProvider};

// Unreserved characters survive escaping; space becomes '+'.
const QUERY_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

#[derive(Debug, Clone)]
pub struct BaiduConfig {
    pub base_url: String,
    /// API access key, sent as `ak` on every request.
    pub ak: String,
    /// Secret key used only to sign requests.
    pub sk: String,
    /// Region hint for place search.
    pub region: String,
    pub timeout_secs: u64,
}

impl Default for BaiduConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.map.baidu.com".to_string(),
            ak: String::new(),
            sk: String::new(),
            region: "上海".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BaiduClient {
    config: BaiduConfig,
    client: reqwest::blocking::Client,
}

impl BaiduClient {
    pub fn new(config: BaiduConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    fn signed_url(&self, path: &str) -> String {
        format!(
            "{}{}&sn={}",
            self.config.base_url,
            path,
            sn_for(path, &self.config.sk)
        )
    }

    fn place_path(&self, address: &str) -> String {
        format!(
            "/place/v2/search?query={}&region={}&output=json&ak={}",
            query_escape(address),
            query_escape(&self.config.region),
            self.config.ak
        )
    }

    fn route_path(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        mode: TransportMode,
        departure_epoch: i64,
    ) -> String {
        format!(
            "/directionlite/v1/{}?origin={:.6},{:.6}&destination={:.6},{:.6}&timestamp={}&ak={}",
            mode_endpoint(mode),
            origin.lat,
            origin.lng,
            destination.lat,
            destination.lng,
            departure_epoch,
            self.config.ak
        )
    }

    fn get<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, ProviderError> {
        self.client
            .get(url)
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json::<T>())
            .map_err(|err| ProviderError::Transport(err.to_string()))
    }
}

impl Geocoder for BaiduClient {
    fn resolve(&self, address: &str) -> Result<Coordinate, ProviderError> {
        let url = self.signed_url(&self.place_path(address));
        let response: PlaceResponse = self.get(&url)?;
        coordinate_from(response)
    }
}

impl RouteProvider for BaiduClient {
    fn duration_minutes(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        mode: TransportMode,
        departure_epoch: i64,
    ) -> Result<u32, ProviderError> {
        let url = self.signed_url(&self.route_path(origin, destination, mode, departure_epoch));
        let response: RouteResponse = self.get(&url)?;
        minutes_from(response)
    }
}

/// Direction-lite endpoint segment per mode. Note the `transport` mode
/// queries the `transit` endpoint.
fn mode_endpoint(mode: TransportMode) -> &'static str {
    match mode {
        TransportMode::Walk => "walking",
        TransportMode::Ride => "riding",
        TransportMode::Transit => "transit",
        TransportMode::Drive => "driving",
    }
}

/// Go-style query escaping: unreserved characters pass through, space
/// becomes '+', everything else is %XX-encoded.
fn query_escape(raw: &str) -> String {
    utf8_percent_encode(raw, QUERY_ESCAPE)
        .to_string()
        .replace("%20", "+")
}

fn sn_for(path: &str, sk: &str) -> String {
    let raw = query_escape(&format!("{}{}", path, sk));
    format!("{:x}", md5::compute(raw))
}

fn coordinate_from(response: PlaceResponse) -> Result<Coordinate, ProviderError> {
    if response.status != 0 {
        return Err(ProviderError::Status {
            code: response.status,
            message: response.message,
        });
    }
    let first = response.results.first().ok_or(ProviderError::NoResult)?;
    Ok(Coordinate::new(first.location.lat, first.location.lng))
}

fn minutes_from(response: RouteResponse) -> Result<u32, ProviderError> {
    if response.status != 0 {
        return Err(ProviderError::Status {
            code: response.status,
            message: response.message,
        });
    }
    let leg = response.result.routes.first().ok_or(ProviderError::NoResult)?;
    Ok((leg.duration.max(0) / 60) as u32)
}

#[derive(Debug, Deserialize)]
struct PlaceResponse {
    status: i64,
    #[serde(default)]
    message: String,
    #[serde(default)]
    results: Vec<PlaceResult>,
}

#[derive(Debug, Deserialize)]
struct PlaceResult {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct RouteResponse {
    status: i64,
    #[serde(default)]
    message: String,
    #[serde(default)]
    result: RouteResult,
}

#[derive(Debug, Default, Deserialize)]
struct RouteResult {
    #[serde(default)]
    routes: Vec<RouteLeg>,
}

#[derive(Debug, Deserialize)]
struct RouteLeg {
    /// Seconds.
    duration: i64,
}
