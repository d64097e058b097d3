//! Built-in fixture rows, matching what the home screen shows before any
//! data has been stored.

use crate::entity_store::{CuratedAlbum, CuratedPlaylist, Track};

fn track(id: &str, title: &str, artist: &str, album: &str, duration: u32) -> Track {
    Track {
        id: id.to_string(),
        title: title.to_string(),
        artist: artist.to_string(),
        album: album.to_string(),
        image_url: format!("/images/tracks/{}.jpg", id),
        duration,
    }
}

fn playlist(id: &str, title: &str, description: &str) -> CuratedPlaylist {
    CuratedPlaylist {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        image_url: format!("/images/playlists/{}.jpg", id),
    }
}

fn album(id: &str, title: &str, artist: &str, duration: u32) -> CuratedAlbum {
    CuratedAlbum {
        id: id.to_string(),
        title: title.to_string(),
        artist: artist.to_string(),
        image_url: format!("/images/albums/{}.jpg", id),
        duration,
    }
}

/// Songs listed under "Recently played", most recent first.
pub fn recently_played_tracks() -> Vec<Track> {
    vec![
        track("rp-1", "Blinding Lights", "The Weeknd", "After Hours", 200),
        track("rp-2", "Levitating", "Dua Lipa", "Future Nostalgia", 203),
        track("rp-3", "Heat Waves", "Glass Animals", "Dreamland", 238),
        track("rp-4", "Good 4 U", "Olivia Rodrigo", "SOUR", 178),
        track("rp-5", "Stay", "The Kid LAROI & Justin Bieber", "F*CK LOVE 3", 141),
        track("rp-6", "As It Was", "Harry Styles", "Harry's House", 167),
    ]
}

pub fn made_for_you_playlists() -> Vec<CuratedPlaylist> {
    vec![
        playlist("mfy-1", "Discover Weekly", "Your weekly mixtape of fresh music"),
        playlist("mfy-2", "Release Radar", "Catch all the latest music from artists you follow"),
        playlist("mfy-3", "Daily Mix 1", "The Weeknd, Dua Lipa, Harry Styles and more"),
        playlist("mfy-4", "Daily Mix 2", "Glass Animals, Tame Impala, MGMT and more"),
        playlist("mfy-5", "On Repeat", "Songs you can't stop playing"),
        playlist("mfy-6", "Time Capsule", "Songs to take you back"),
    ]
}

pub fn popular_albums() -> Vec<CuratedAlbum> {
    vec![
        album("pa-1", "After Hours", "The Weeknd", 3360),
        album("pa-2", "Future Nostalgia", "Dua Lipa", 2623),
        album("pa-3", "SOUR", "Olivia Rodrigo", 2073),
        album("pa-4", "Harry's House", "Harry Styles", 2506),
        album("pa-5", "Un Verano Sin Ti", "Bad Bunny", 4852),
        album("pa-6", "Midnights", "Taylor Swift", 2650),
    ]
}
