use tabled::Table;

use crate::{
    types::{FeaturesTableRow, RecommendationParams, Track, TrackTableRow},
    warning,
};

use super::{fail, spotify_client};

fn print_tracks(tracks: &[Track]) {
    if tracks.is_empty() {
        warning!("No tracks found.");
        return;
    }
    let rows: Vec<TrackTableRow> = tracks.iter().map(TrackTableRow::from).collect();
    println!("{}", Table::new(rows));
}

/// Searches Spotify for tracks matching `query`.
pub async fn search(query: String, limit: Option<u32>) {
    let query = query.trim();
    if query.is_empty() {
        warning!("Nothing to search for.");
        return;
    }

    match spotify_client().search_tracks(query, limit).await {
        Ok(tracks) => print_tracks(&tracks),
        Err(e) => fail("Search failed", e),
    }
}

/// Shows a single track.
pub async fn track(id: String) {
    match spotify_client().track(id.trim()).await {
        Ok(track) => print_tracks(std::slice::from_ref(&track)),
        Err(e) => fail("Cannot fetch track", e),
    }
}

/// Shows tempo, key, mode, energy and danceability for the given tracks.
pub async fn features(ids: Vec<String>) {
    let ids: Vec<String> = ids
        .iter()
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .collect();
    if ids.is_empty() {
        warning!("No track ids given.");
        return;
    }

    match spotify_client().audio_features(&ids).await {
        Ok(features) if features.is_empty() => warning!("No audio features available."),
        Ok(features) => {
            let rows: Vec<FeaturesTableRow> =
                features.iter().map(FeaturesTableRow::from).collect();
            println!("{}", Table::new(rows));
        }
        Err(e) => fail("Cannot fetch audio features", e),
    }
}

/// Lists recommended tracks for the given seeds.
pub async fn recommend(params: RecommendationParams) {
    if params.seed_tracks.is_empty()
        && params.seed_artists.is_empty()
        && params.seed_genres.is_empty()
    {
        warning!("Give at least one --seed-track, --seed-artist or --seed-genre.");
        return;
    }

    match spotify_client().recommendations(&params).await {
        Ok(tracks) => print_tracks(&tracks),
        Err(e) => fail("Cannot fetch recommendations", e),
    }
}
