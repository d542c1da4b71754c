//! Catalog REST client.
//!
//! Every resource goes through one request path. The `(Resource, ApiVersion)`
//! table in [`endpoint`] supplies the URL template, whether the v2 auth
//! header is sent, and where in the response document the payload lives.
//!
//! Two layers are exposed:
//! - `try_*` methods return `Result<_, ApiError>` so callers can tell a
//!   transport failure from a bad status or a malformed body.
//! - The plain methods never fail: on any error they log it and hand back
//!   the empty value (empty map / vec, `None`).

use std::collections::BTreeMap;
use std::path::PathBuf;

use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::StatusCode;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, error, warn};

use super::catalog::{ApiVersion, CatalogId, Environment, Episode, Podcast, Station, StationSummary};
use super::config::Config;

pub const USER_AGENT: &str = concat!("podcast-player/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("bad response ({status}) from {url}")]
    Status { url: String, status: u16 },
    #[error("malformed JSON from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("unexpected response from {url}: no usable '{path}'")]
    Shape { url: String, path: String },
    #[error("{resource} is not implemented in the {version} API")]
    Unsupported {
        resource: &'static str,
        version: ApiVersion,
    },
    #[error("cannot write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ApiError {
    /// Short category label for logs and toasts.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport { .. } => "transport",
            Self::Status { .. } => "http-status",
            Self::Decode { .. } => "decode",
            Self::Shape { .. } => "shape",
            Self::Unsupported { .. } => "unsupported",
            Self::Io { .. } => "io",
        }
    }
}

// ── Endpoint table ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource {
    StationIndex,
    Station(CatalogId),
    PodcastsByStation(CatalogId),
    EpisodesByPodcast(CatalogId),
    PodcastImage(CatalogId),
}

impl Resource {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::StationIndex => "station index",
            Self::Station(_) => "station",
            Self::PodcastsByStation(_) => "podcasts by station",
            Self::EpisodesByPodcast(_) => "episodes by podcast",
            Self::PodcastImage(_) => "podcast image",
        }
    }

    fn id(&self) -> &str {
        match self {
            Self::StationIndex => "",
            Self::Station(id)
            | Self::PodcastsByStation(id)
            | Self::EpisodesByPodcast(id)
            | Self::PodcastImage(id) => id.as_str(),
        }
    }
}

/// How one `(resource, version)` pair is requested and unpacked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    /// `{base}`, `{version}` and `{id}` are substituted; `{id}` is percent-encoded.
    pub template: &'static str,
    /// Send `Authorization: <v2_api_auth_token>`.
    pub auth: bool,
    /// Keys leading from the document root to the payload.
    pub extract: &'static [&'static str],
    /// For list payloads: keys leading from each entry to its record.
    pub item: &'static [&'static str],
}

impl Endpoint {
    pub fn url(&self, base: &str, version: ApiVersion, id: &str) -> String {
        self.template
            .replace("{base}", base.trim_end_matches('/'))
            .replace("{version}", version.as_str())
            .replace("{id}", &urlencoding::encode(id))
    }
}

/// Endpoint for a resource, or `None` where the API version has no such call.
/// The v2 API has no podcast/episode filtering yet.
pub fn endpoint(resource: &Resource, version: ApiVersion) -> Option<Endpoint> {
    use ApiVersion::{V1, V2};
    let ep = match (resource, version) {
        (Resource::StationIndex, V1) => Endpoint {
            template: "{base}/{version}/stations?page[size]=400",
            auth: false,
            extract: &["data"],
            item: &["attributes"],
        },
        (Resource::StationIndex, V2) => Endpoint {
            template: "{base}/{version}/stations",
            auth: true,
            extract: &["stations"],
            item: &[],
        },
        (Resource::Station(_), V1) => Endpoint {
            template: "{base}/{version}/stations/{id}",
            auth: false,
            extract: &["data", "attributes"],
            item: &[],
        },
        (Resource::Station(_), V2) => Endpoint {
            template: "{base}/{version}/stations/{id}",
            auth: true,
            extract: &["station"],
            item: &[],
        },
        (Resource::PodcastsByStation(_), V1) => Endpoint {
            template: "{base}/{version}/podcasts?filter[station_id]={id}&page[size]=100",
            auth: false,
            extract: &["data"],
            item: &[],
        },
        (Resource::EpisodesByPodcast(_), V1) => Endpoint {
            template: "{base}/{version}/episodes?filter[podcast_id]={id}&page[size]=100",
            auth: false,
            extract: &["data"],
            item: &[],
        },
        (Resource::PodcastImage(_), V1) => Endpoint {
            template: "{base}/{version}/podcasts/{id}",
            auth: false,
            extract: &["data", "attributes", "image"],
            item: &[],
        },
        (Resource::PodcastsByStation(_), V2)
        | (Resource::EpisodesByPodcast(_), V2)
        | (Resource::PodcastImage(_), V2) => return None,
    };
    Some(ep)
}

fn pluck<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |v, key| v.get(*key))
}

// ── Client ────────────────────────────────────────────────────────────────────

/// Which deployment and API flavour a call goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Target {
    pub environment: Environment,
    pub version: ApiVersion,
}

impl Target {
    pub fn new(environment: Environment, version: ApiVersion) -> Self {
        Self { environment, version }
    }
}

/// Cheaply cloneable; clones share the underlying connection pool.
#[derive(Clone)]
pub struct CatalogClient {
    http: reqwest::Client,
    config: Config,
}

impl CatalogClient {
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(config.request_timeout)
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            http,
            config: config.clone(),
        })
    }

    /// Underlying HTTP client, shared with the image cache.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub fn url_for(&self, resource: &Resource, target: Target) -> Option<String> {
        let ep = endpoint(resource, target.version)?;
        Some(ep.url(
            self.config.base_url_for(target.environment),
            target.version,
            resource.id(),
        ))
    }

    /// Issue the GET for `resource` and return `(url, payload)`.
    async fn fetch(&self, resource: &Resource, target: Target) -> Result<(String, Value), ApiError> {
        let ep = endpoint(resource, target.version).ok_or(ApiError::Unsupported {
            resource: resource.kind(),
            version: target.version,
        })?;
        let url = ep.url(
            self.config.base_url_for(target.environment),
            target.version,
            resource.id(),
        );
        debug!("GET {} ({})", url, resource.kind());

        let mut request = self.http.get(&url).header(ACCEPT, "application/json");
        if ep.auth {
            match &self.config.v2_auth_token {
                Some(token) => request = request.header(AUTHORIZATION, token.as_str()),
                None => warn!("v2 request to {} without v2_api_auth_token", url),
            }
        }

        let response = request.send().await.map_err(|source| ApiError::Transport {
            url: url.clone(),
            source,
        })?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(ApiError::Status {
                url,
                status: status.as_u16(),
            });
        }
        let body = response.bytes().await.map_err(|source| ApiError::Transport {
            url: url.clone(),
            source,
        })?;
        let document: Value =
            serde_json::from_slice(&body).map_err(|source| ApiError::Decode {
                url: url.clone(),
                source,
            })?;

        match pluck(&document, ep.extract) {
            Some(payload) => {
                let payload = payload.clone();
                Ok((url, payload))
            }
            None => Err(ApiError::Shape {
                url,
                path: ep.extract.join("."),
            }),
        }
    }

    async fn fetch_list(
        &self,
        resource: &Resource,
        target: Target,
    ) -> Result<(String, Vec<Value>), ApiError> {
        let (url, payload) = self.fetch(resource, target).await?;
        match payload {
            Value::Array(items) => Ok((url, items)),
            _ => Err(ApiError::Shape {
                url,
                path: "[]".to_string(),
            }),
        }
    }

    // ── Fallible layer ───────────────────────────────────────────────────────

    /// Callsign → station id.
    pub async fn try_station_ids(&self, target: Target) -> Result<BTreeMap<String, CatalogId>, ApiError> {
        let resource = Resource::StationIndex;
        let item_path = endpoint(&resource, target.version)
            .map(|ep| ep.item)
            .unwrap_or(&[]);
        let (url, items) = self.fetch_list(&resource, target).await?;

        let mut stations = BTreeMap::new();
        for item in &items {
            let summary = pluck(item, item_path)
                .and_then(|record| record.as_object())
                .and_then(StationSummary::from_record);
            match summary {
                Some(s) => {
                    stations.insert(s.callsign, s.id);
                }
                None => warn!("{}: skipping station entry without callsign/id", url),
            }
        }
        debug!("{}: {} stations", url, stations.len());
        Ok(stations)
    }

    pub async fn try_station(&self, id: &CatalogId, target: Target) -> Result<Station, ApiError> {
        let (url, payload) = self.fetch(&Resource::Station(id.clone()), target).await?;
        match payload {
            Value::Object(attributes) => {
                Station::from_attributes(attributes).ok_or(ApiError::Shape {
                    url,
                    path: "callsign/id".to_string(),
                })
            }
            _ => Err(ApiError::Shape {
                url,
                path: "{}".to_string(),
            }),
        }
    }

    pub async fn try_podcasts(&self, station_id: &CatalogId, target: Target) -> Result<Vec<Podcast>, ApiError> {
        let (url, items) = self
            .fetch_list(&Resource::PodcastsByStation(station_id.clone()), target)
            .await?;
        Ok(decode_items(&url, &items, Podcast::from_record))
    }

    pub async fn try_episodes(&self, podcast_id: &CatalogId, target: Target) -> Result<Vec<Episode>, ApiError> {
        let (url, items) = self
            .fetch_list(&Resource::EpisodesByPodcast(podcast_id.clone()), target)
            .await?;
        Ok(decode_items(&url, &items, Episode::from_record))
    }

    pub async fn try_podcast_image_url(&self, podcast_id: &CatalogId, target: Target) -> Result<String, ApiError> {
        let (url, payload) = self
            .fetch(&Resource::PodcastImage(podcast_id.clone()), target)
            .await?;
        match payload {
            Value::String(s) if !s.is_empty() => Ok(s),
            _ => Err(ApiError::Shape {
                url,
                path: "data.attributes.image".to_string(),
            }),
        }
    }

    // ── Never-fail layer ─────────────────────────────────────────────────────

    pub async fn station_ids(&self, target: Target) -> BTreeMap<String, CatalogId> {
        self.try_station_ids(target)
            .await
            .unwrap_or_else(|e| report("Unable to obtain information for stations", e))
    }

    /// Raw attribute map of one station, empty on failure.
    pub async fn station_attributes(&self, id: &CatalogId, target: Target) -> Map<String, Value> {
        self.station(id, target)
            .await
            .map(|s| s.attributes)
            .unwrap_or_default()
    }

    pub async fn station(&self, id: &CatalogId, target: Target) -> Option<Station> {
        self.try_station(id, target).await.map(Some).unwrap_or_else(|e| {
            report(&format!("Unable to obtain information for station {}", id), e)
        })
    }

    pub async fn podcasts_for_station(&self, station_id: &CatalogId, target: Target) -> Vec<Podcast> {
        self.try_podcasts(station_id, target)
            .await
            .unwrap_or_else(|e| report("Unable to obtain podcast information", e))
    }

    pub async fn episodes_for_podcast(&self, podcast_id: &CatalogId, target: Target) -> Vec<Episode> {
        self.try_episodes(podcast_id, target).await.unwrap_or_else(|e| {
            report(&format!("Unable to obtain episodes for podcast_id {}", podcast_id), e)
        })
    }

    pub async fn podcast_image_url(&self, podcast_id: &CatalogId, target: Target) -> Option<String> {
        self.try_podcast_image_url(podcast_id, target)
            .await
            .map(Some)
            .unwrap_or_else(|e| {
                report(&format!("Unable to obtain image for podcast_id {}", podcast_id), e)
            })
    }
}

fn decode_items<T>(url: &str, items: &[Value], decode: impl Fn(&Value) -> Option<T>) -> Vec<T> {
    let out: Vec<T> = items.iter().filter_map(&decode).collect();
    if out.len() != items.len() {
        warn!("{}: skipped {} entries without an id", url, items.len() - out.len());
    }
    out
}

/// Log a client error and yield the empty value.
fn report<T: Default>(context: &str, err: ApiError) -> T {
    match err {
        ApiError::Unsupported { .. } => warn!("{}: {}", context, err),
        _ => error!("{} [{}]: {}", context, err.kind(), err),
    }
    T::default()
}
