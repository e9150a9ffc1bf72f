use std::{collections::HashMap, fmt};

use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// Successful response body of the provider's token endpoint.
#[derive(Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: u64,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
}

impl fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &"[REDACTED]")
            .field("expires_in", &self.expires_in)
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("scope", &self.scope)
            .field("token_type", &self.token_type)
            .finish()
    }
}

/// Persisted credential, stored under the `spotify` key of the settings document.
///
/// `access_expires_at` is in milliseconds since the Unix epoch and already has
/// the safety margin subtracted. `refresh_token_enc` only ever holds cipher output.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialRecord {
    #[serde(rename = "clientId")]
    pub client_id: String,
    pub access_token: String,
    pub access_expires_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token_enc: Option<String>,
}

impl CredentialRecord {
    /// A token is fresh strictly before its (margin-adjusted) expiry.
    pub fn is_fresh(&self, now_millis: i64) -> bool {
        !self.access_token.is_empty() && now_millis < self.access_expires_at
    }

    pub fn has_refresh_token(&self) -> bool {
        self.refresh_token_enc
            .as_deref()
            .is_some_and(|blob| !blob.is_empty())
    }

    pub fn public(&self) -> PublicCredential {
        PublicCredential {
            client_id: self.client_id.clone(),
            access_token: self.access_token.clone(),
            access_expires_at: self.access_expires_at,
            has_refresh_token: self.has_refresh_token(),
        }
    }
}

impl fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("client_id", &self.client_id)
            .field("access_token", &"[REDACTED]")
            .field("access_expires_at", &self.access_expires_at)
            .field("has_refresh_token", &self.has_refresh_token())
            .finish()
    }
}

/// What a successful login hands back: never the refresh token, never its blob.
#[derive(Clone, Serialize)]
pub struct PublicCredential {
    pub client_id: String,
    pub access_token: String,
    pub access_expires_at: i64,
    pub has_refresh_token: bool,
}

impl fmt::Debug for PublicCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublicCredential")
            .field("client_id", &self.client_id)
            .field("access_token", &"[REDACTED]")
            .field("access_expires_at", &self.access_expires_at)
            .field("has_refresh_token", &self.has_refresh_token)
            .finish()
    }
}

/// Verifier, challenge and CSRF state for one login attempt. Lives in memory only.
pub struct PkceSession {
    pub verifier: String,
    pub challenge: String,
    pub state: String,
}

impl fmt::Debug for PkceSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PkceSession")
            .field("verifier", &"[REDACTED]")
            .field("challenge", &self.challenge)
            .field("state", &self.state)
            .finish()
    }
}

/// Query parameters captured from the authorization redirect.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RedirectParams(HashMap<String, String>);

impl RedirectParams {
    pub fn new(params: HashMap<String, String>) -> Self {
        Self(params)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn code(&self) -> Option<&str> {
        self.get("code").filter(|c| !c.is_empty())
    }

    pub fn state(&self) -> Option<&str> {
        self.get("state")
    }

    pub fn error(&self) -> Option<&str> {
        self.get("error")
    }

    pub fn error_description(&self) -> Option<&str> {
        self.get("error_description")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimpleArtist {
    pub id: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimpleAlbum {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub release_date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<SimpleArtist>,
    #[serde(default)]
    pub album: Option<SimpleAlbum>,
    #[serde(default)]
    pub duration_ms: u64,
    #[serde(default)]
    pub popularity: Option<u32>,
    #[serde(default)]
    pub uri: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paging<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub tracks: Option<Paging<Track>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioFeatures {
    pub id: String,
    pub tempo: f64,
    pub key: i32,
    pub mode: i32,
    pub energy: f64,
    pub danceability: f64,
    pub valence: f64,
    #[serde(default)]
    pub loudness: Option<f64>,
    #[serde(default)]
    pub time_signature: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AudioFeaturesResponse {
    #[serde(default)]
    pub audio_features: Vec<Option<AudioFeatures>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationsResponse {
    #[serde(default)]
    pub tracks: Vec<Track>,
}

/// Seeds and tuning targets for `GET /recommendations`.
#[derive(Debug, Clone, Default)]
pub struct RecommendationParams {
    pub seed_tracks: Vec<String>,
    pub seed_artists: Vec<String>,
    pub seed_genres: Vec<String>,
    pub target_tempo: Option<f64>,
    pub target_key: Option<i32>,
    pub min_energy: Option<f64>,
    pub max_energy: Option<f64>,
    pub limit: Option<u32>,
}

#[derive(Tabled)]
pub struct TrackTableRow {
    pub id: String,
    pub name: String,
    pub artists: String,
    pub album: String,
    pub length: String,
}

impl From<&Track> for TrackTableRow {
    fn from(track: &Track) -> Self {
        let seconds = track.duration_ms / 1000;
        TrackTableRow {
            id: track.id.clone().unwrap_or_default(),
            name: track.name.clone(),
            artists: track
                .artists
                .iter()
                .map(|a| a.name.as_str())
                .collect::<Vec<&str>>()
                .join(", "),
            album: track
                .album
                .as_ref()
                .map(|a| a.name.clone())
                .unwrap_or_default(),
            length: format!("{}:{:02}", seconds / 60, seconds % 60),
        }
    }
}

#[derive(Tabled)]
pub struct FeaturesTableRow {
    pub id: String,
    pub tempo: String,
    pub key: i32,
    pub mode: String,
    pub energy: String,
    pub danceability: String,
}

impl From<&AudioFeatures> for FeaturesTableRow {
    fn from(f: &AudioFeatures) -> Self {
        FeaturesTableRow {
            id: f.id.clone(),
            tempo: format!("{:.1}", f.tempo),
            key: f.key,
            mode: if f.mode == 1 { "major" } else { "minor" }.to_string(),
            energy: format!("{:.2}", f.energy),
            danceability: format!("{:.2}", f.danceability),
        }
    }
}
