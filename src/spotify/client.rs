use std::sync::Arc;

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use crate::{
    error::{Error, Result},
    management::CredentialManager,
    types::{
        AudioFeatures, AudioFeaturesResponse, RecommendationParams, RecommendationsResponse,
        SearchResponse, Track,
    },
};

/// Default page size for track searches.
pub const DEFAULT_SEARCH_LIMIT: u32 = 10;

/// Default number of recommended tracks.
pub const DEFAULT_RECOMMENDATION_LIMIT: u32 = 20;

/// Client for the Spotify Web API.
///
/// Every call asks the [`CredentialManager`] for an access token first, so an
/// expired token is refreshed before the request goes out. There is no
/// retry and no refresh on a 401; that surfaces as [`Error::Api`].
pub struct SpotifyClient {
    http: Client,
    api_base: String,
    credentials: Arc<CredentialManager>,
}

impl SpotifyClient {
    pub fn new(api_base: &str, credentials: Arc<CredentialManager>) -> Self {
        Self {
            http: Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
            credentials,
        }
    }

    /// Fetches one track by its Spotify id.
    pub async fn track(&self, id: &str) -> Result<Track> {
        let url = self.endpoint(&["tracks", id])?;
        self.get(url).await
    }

    /// Searches the catalogue for tracks. An empty result set is not an error.
    pub async fn search_tracks(&self, query: &str, limit: Option<u32>) -> Result<Vec<Track>> {
        let mut url = self.endpoint(&["search"])?;
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("type", "track")
            .append_pair(
                "limit",
                &limit.unwrap_or(DEFAULT_SEARCH_LIMIT).to_string(),
            );

        let res: SearchResponse = self.get(url).await?;
        Ok(res.tracks.map(|page| page.items).unwrap_or_default())
    }

    /// Audio features for up to 100 tracks; ids Spotify does not know are skipped.
    pub async fn audio_features(&self, ids: &[String]) -> Result<Vec<AudioFeatures>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut url = self.endpoint(&["audio-features"])?;
        url.query_pairs_mut().append_pair("ids", &ids.join(","));

        let res: AudioFeaturesResponse = self.get(url).await?;
        Ok(res.audio_features.into_iter().flatten().collect())
    }

    /// Tracks recommended from the given seeds and tuning targets.
    pub async fn recommendations(&self, params: &RecommendationParams) -> Result<Vec<Track>> {
        let mut url = self.endpoint(&["recommendations"])?;
        {
            let mut query = url.query_pairs_mut();
            if !params.seed_tracks.is_empty() {
                query.append_pair("seed_tracks", &params.seed_tracks.join(","));
            }
            if !params.seed_artists.is_empty() {
                query.append_pair("seed_artists", &params.seed_artists.join(","));
            }
            if !params.seed_genres.is_empty() {
                query.append_pair("seed_genres", &params.seed_genres.join(","));
            }
            if let Some(tempo) = params.target_tempo {
                query.append_pair("target_tempo", &tempo.to_string());
            }
            if let Some(key) = params.target_key {
                query.append_pair("target_key", &key.to_string());
            }
            if let Some(min) = params.min_energy {
                query.append_pair("min_energy", &min.to_string());
            }
            if let Some(max) = params.max_energy {
                query.append_pair("max_energy", &max.to_string());
            }
            query.append_pair(
                "limit",
                &params
                    .limit
                    .unwrap_or(DEFAULT_RECOMMENDATION_LIMIT)
                    .to_string(),
            );
        }

        let res: RecommendationsResponse = self.get(url).await?;
        Ok(res.tracks)
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.api_base)
            .map_err(|e| Error::Config(format!("invalid Spotify API base {}: {}", self.api_base, e)))?;
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("invalid Spotify API base {}", self.api_base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let token = self.credentials.get_access_token().await?;

        tracing::debug!(path = url.path(), "spotify api request");
        let response = self.http.get(url).bearer_auth(token).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<T>().await?)
    }
}
