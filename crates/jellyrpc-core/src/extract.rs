//! Now-playing extraction.
//!
//! Picks the first session that is actually playing something and turns it
//! into a [`NormalizedPresence`]. Later sessions are ignored.

use crate::models::{MediaKind, NormalizedPresence, NowPlayingItem, PlayState, Session};

/// The session chosen for display, borrowed from the poll response.
#[derive(Debug, Clone, Copy)]
pub struct Selection<'a> {
    pub session: &'a Session,
    pub item: &'a NowPlayingItem,
    pub play_state: &'a PlayState,
    pub item_id: &'a str,
}

/// First session with an item (that has an id) and a play state.
pub fn select_session(sessions: &[Session]) -> Option<Selection<'_>> {
    sessions.iter().find_map(|session| {
        let item = session.now_playing_item.as_ref()?;
        let play_state = session.play_state.as_ref()?;
        let item_id = item.id.as_deref().filter(|id| !id.is_empty())?;
        Some(Selection {
            session,
            item,
            play_state,
            item_id,
        })
    })
}

/// Classify the selected item and build its presentation record.
///
/// `image_url` is left empty; cover resolution happens afterwards because it
/// needs the network.
pub fn normalize(selection: &Selection<'_>) -> NormalizedPresence {
    let item = selection.item;
    let name = |fallback: &str| item.name.clone().unwrap_or_else(|| fallback.to_string());

    let (kind, title, details, state) = match item.item_type.as_deref().unwrap_or("Unknown") {
        "Audio" => {
            let title = name("Unknown Track");
            let artists = item.artist_names();
            let album = item.album.clone().unwrap_or_else(|| "Unknown Album".into());
            let state = format!("by {} from {}", artists.join(", "), album);
            let kind = MediaKind::Audio {
                artists,
                album,
                track: item.index_number,
            };
            (kind, title.clone(), title, state)
        }
        "Movie" => {
            let title = name("Unknown Movie");
            let year = item.production_year;
            let genres = item.genres.clone();
            let state = match year {
                Some(year) if !genres.is_empty() => format!("{year} • {}", genres.join(", ")),
                _ => "Movie".to_string(),
            };
            (MediaKind::Movie { year, genres }, title.clone(), title, state)
        }
        "Episode" => {
            let series = item
                .series_name
                .clone()
                .unwrap_or_else(|| "Unknown Series".into());
            let season = item.parent_index_number;
            let episode = item.index_number;
            let details = format!("{series} S{}E{}", number(season), number(episode));
            let title = name("Unknown Episode");
            let kind = MediaKind::Episode {
                series,
                season,
                episode,
            };
            (kind, title.clone(), details, title)
        }
        other => {
            let title = name("Unknown Media");
            let kind = MediaKind::Other {
                kind: other.to_string(),
            };
            (kind, title.clone(), title, other.to_string())
        }
    };

    NormalizedPresence {
        item_id: selection.item_id.to_string(),
        activity: kind.activity(),
        kind,
        title,
        details,
        state,
        image_url: None,
        run_time_ticks: item.run_time_ticks,
        position_ticks: selection.play_state.position_ticks.unwrap_or(0),
        is_paused: selection.play_state.is_paused,
        is_muted: selection.play_state.is_muted,
        client_name: selection
            .session
            .client
            .clone()
            .unwrap_or_else(|| "Unknown Client".into()),
        links: item.external_urls.clone(),
    }
}

/// Select and normalize in one step.
pub fn extract_now_playing(sessions: &[Session]) -> Option<NormalizedPresence> {
    select_session(sessions).map(|selection| normalize(&selection))
}

fn number(n: Option<u32>) -> String {
    n.map(|n| n.to_string()).unwrap_or_else(|| "?".into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActivityKind, ExternalUrl, NameIdPair};

    fn session(item: NowPlayingItem) -> Session {
        Session {
            client: Some("Jellyfin Web".into()),
            now_playing_item: Some(item),
            play_state: Some(PlayState {
                position_ticks: Some(75_000_000),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn item(kind: &str, name: &str) -> NowPlayingItem {
        NowPlayingItem {
            id: Some(format!("{name}-id")),
            name: Some(name.into()),
            item_type: Some(kind.into()),
            run_time_ticks: Some(1_200_000_000),
            ..Default::default()
        }
    }

    fn artist(name: &str) -> NameIdPair {
        NameIdPair {
            name: Some(name.into()),
            id: None,
        }
    }

    #[test]
    fn test_no_playable_session() {
        let idle = Session::default();
        let no_state = Session {
            now_playing_item: Some(item("Movie", "A")),
            ..Default::default()
        };
        let no_item = Session {
            play_state: Some(PlayState::default()),
            ..Default::default()
        };
        assert!(extract_now_playing(&[]).is_none());
        assert!(extract_now_playing(&[idle, no_state, no_item]).is_none());
    }

    #[test]
    fn test_item_without_id_is_skipped() {
        let mut anonymous = item("Movie", "Nameless");
        anonymous.id = None;
        let sessions = [session(anonymous), session(item("Movie", "Named"))];
        let presence = extract_now_playing(&sessions).unwrap();
        assert_eq!(presence.title, "Named");
    }

    #[test]
    fn test_first_session_wins() {
        let sessions = [session(item("Movie", "First")), session(item("Movie", "Second"))];
        let presence = extract_now_playing(&sessions).unwrap();
        assert_eq!(presence.title, "First");
        assert_eq!(presence.item_id, "First-id");
    }

    #[test]
    fn test_audio() {
        let mut track = item("Audio", "One More Time");
        track.artist_items = vec![artist("Daft Punk"), artist("Romanthony")];
        track.album_artists = vec![artist("Ignored")];
        track.album = Some("Discovery".into());
        track.index_number = Some(1);

        let presence = extract_now_playing(&[session(track)]).unwrap();
        assert_eq!(presence.activity, ActivityKind::Listening);
        assert_eq!(presence.details, "One More Time");
        assert_eq!(presence.state, "by Daft Punk, Romanthony from Discovery");
        assert_eq!(presence.caption(), "Discovery");
        assert_eq!(
            presence.kind,
            MediaKind::Audio {
                artists: vec!["Daft Punk".into(), "Romanthony".into()],
                album: "Discovery".into(),
                track: Some(1),
            }
        );
    }

    #[test]
    fn test_audio_falls_back_to_album_artists_and_unknown_album() {
        let mut track = item("Audio", "Intro");
        track.album_artists = vec![artist("The xx")];

        let presence = extract_now_playing(&[session(track)]).unwrap();
        assert_eq!(presence.state, "by The xx from Unknown Album");
    }

    #[test]
    fn test_movie() {
        let mut movie = item("Movie", "Movie title");
        movie.production_year = Some(2010);
        movie.genres = vec!["Action".into()];

        let presence = extract_now_playing(&[session(movie)]).unwrap();
        assert_eq!(presence.activity, ActivityKind::Watching);
        assert_eq!(presence.details, "Movie title");
        assert_eq!(presence.state, "2010 • Action");
    }

    #[test]
    fn test_movie_generic_subtitle() {
        let mut no_genres = item("Movie", "A");
        no_genres.production_year = Some(1999);
        let mut no_year = item("Movie", "B");
        no_year.genres = vec!["Drama".into()];

        assert_eq!(extract_now_playing(&[session(no_genres)]).unwrap().state, "Movie");
        assert_eq!(extract_now_playing(&[session(no_year)]).unwrap().state, "Movie");
    }

    #[test]
    fn test_episode() {
        let mut ep = item("Episode", "Ozymandias");
        ep.series_name = Some("Breaking Bad".into());
        ep.parent_index_number = Some(5);
        ep.index_number = Some(14);

        let presence = extract_now_playing(&[session(ep)]).unwrap();
        assert_eq!(presence.activity, ActivityKind::Watching);
        assert_eq!(presence.details, "Breaking Bad S5E14");
        assert_eq!(presence.state, "Ozymandias");
        assert_eq!(presence.caption(), "Breaking Bad");
    }

    #[test]
    fn test_episode_missing_numbers() {
        let ep = item("Episode", "Pilot");
        let presence = extract_now_playing(&[session(ep)]).unwrap();
        assert_eq!(presence.details, "Unknown Series S?E?");
    }

    #[test]
    fn test_other_kind() {
        let presence = extract_now_playing(&[session(item("AudioBook", "Dune"))]).unwrap();
        assert_eq!(presence.activity, ActivityKind::Playing);
        assert_eq!(presence.details, "Dune");
        assert_eq!(presence.state, "AudioBook");
        assert_eq!(presence.kind.type_name(), "AudioBook");
    }

    #[test]
    fn test_play_state_and_client() {
        let mut s = session(item("Movie", "A"));
        s.play_state = Some(PlayState {
            position_ticks: None,
            is_paused: true,
            is_muted: true,
        });
        s.client = None;
        s.now_playing_item.as_mut().unwrap().external_urls = vec![ExternalUrl {
            name: "IMDb".into(),
            url: "https://www.imdb.com/title/tt1".into(),
        }];

        let presence = extract_now_playing(&[s]).unwrap();
        assert_eq!(presence.position_ticks, 0);
        assert!(presence.is_paused);
        assert!(presence.is_muted);
        assert_eq!(presence.client_name, "Unknown Client");
        assert_eq!(presence.links.len(), 1);
        assert!(presence.image_url.is_none());
    }
}
