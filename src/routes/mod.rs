mod artists;
mod health_check;
mod playlists;
mod tracks;
mod users;

pub use artists::{
    artist_tracks, create_artist, delete_artist, get_artist, list_artists, update_artist,
};
pub use health_check::health_check;
pub use playlists::{
    add_tracks, create_playlist, delete_playlist, get_playlist, list_playlists, playlist_tracks,
    remove_tracks,
};
pub use tracks::{create_track, delete_track, get_track, list_tracks, update_track};
pub use users::{
    change_password, delete_user, follow_artist, followed_artists, get_user, login, refresh,
    register, update_user,
};
