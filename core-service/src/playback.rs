//! Client-side play queue.
//!
//! Audio output belongs to the host; the queue only tracks what should be
//! playing and announces changes as [`PlaybackEvent`]s.

use core_library::Song;
use core_runtime::events::{CoreEvent, EventBus, PlaybackEvent};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

#[derive(Debug, Default)]
struct QueueState {
    songs: Vec<Song>,
    position: Option<usize>,
    playing: bool,
}

impl QueueState {
    fn current(&self) -> Option<&Song> {
        self.position.and_then(|index| self.songs.get(index))
    }
}

/// Cloneable handle; clones share one queue.
#[derive(Clone, Default)]
pub struct PlaybackQueue {
    state: Arc<Mutex<QueueState>>,
    events: Option<EventBus>,
}

impl PlaybackQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_event_bus(mut self, bus: EventBus) -> Self {
        self.events = Some(bus);
        self
    }

    /// Replace the queue with `song` alone and start it.
    pub fn play_song(&self, song: Song) {
        let song_id = song.id;
        {
            let mut state = self.lock();
            state.songs = vec![song];
            state.position = Some(0);
            state.playing = true;
        }
        self.emit(PlaybackEvent::QueueChanged {
            length: 1,
            position: Some(0),
        });
        self.emit(PlaybackEvent::Started { song_id });
    }

    /// Queue `songs` in order and start the first. Returns `false` for an
    /// empty list, leaving the queue untouched.
    pub fn play_all(&self, songs: Vec<Song>) -> bool {
        let Some(first_id) = songs.first().map(|song| song.id) else {
            return false;
        };
        let length = songs.len();
        {
            let mut state = self.lock();
            state.songs = songs;
            state.position = Some(0);
            state.playing = true;
        }
        self.emit(PlaybackEvent::QueueChanged {
            length,
            position: Some(0),
        });
        self.emit(PlaybackEvent::Started { song_id: first_id });
        true
    }

    /// Pause or resume the current song. Returns the new playing flag.
    pub fn toggle(&self) -> bool {
        let (song_id, playing) = {
            let mut state = self.lock();
            let Some(song_id) = state.current().map(|song| song.id) else {
                return false;
            };
            state.playing = !state.playing;
            (song_id, state.playing)
        };

        self.emit(if playing {
            PlaybackEvent::Resumed { song_id }
        } else {
            PlaybackEvent::Paused { song_id }
        });
        playing
    }

    /// Advance to the next queued song. At the end of the queue nothing changes.
    pub fn next(&self) -> Option<Song> {
        self.step(|position, length| (position + 1 < length).then_some(position + 1))
    }

    /// Go back one song, or restart the first one.
    pub fn previous(&self) -> Option<Song> {
        self.step(|position, _| Some(position.saturating_sub(1)))
    }

    pub fn stop(&self) {
        {
            let mut state = self.lock();
            if state.songs.is_empty() {
                return;
            }
            *state = QueueState::default();
        }
        self.emit(PlaybackEvent::Stopped);
        self.emit(PlaybackEvent::QueueChanged {
            length: 0,
            position: None,
        });
    }

    pub fn current_song(&self) -> Option<Song> {
        self.lock().current().cloned()
    }

    pub fn is_playing(&self) -> bool {
        self.lock().playing
    }

    /// Whether `song_id` is the current song and audible.
    pub fn is_song_playing(&self, song_id: i64) -> bool {
        let state = self.lock();
        state.playing && state.current().map(|song| song.id) == Some(song_id)
    }

    pub fn queue(&self) -> Vec<Song> {
        self.lock().songs.clone()
    }

    fn step(&self, target: impl Fn(usize, usize) -> Option<usize>) -> Option<Song> {
        let (song, position, length) = {
            let mut state = self.lock();
            let position = state.position?;
            let next = target(position, state.songs.len())?;
            state.position = Some(next);
            state.playing = true;
            (state.songs.get(next).cloned()?, next, state.songs.len())
        };

        self.emit(PlaybackEvent::QueueChanged {
            length,
            position: Some(position),
        });
        self.emit(PlaybackEvent::Started { song_id: song.id });
        Some(song)
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn emit(&self, event: PlaybackEvent) {
        if let Some(bus) = &self.events {
            if bus.emit(CoreEvent::Playback(event)).is_err() {
                debug!("No subscribers for playback event");
            }
        }
    }
}

impl std::fmt::Debug for PlaybackQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("PlaybackQueue")
            .field("length", &state.songs.len())
            .field("position", &state.position)
            .field("playing", &state.playing)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song(id: i64) -> Song {
        serde_json::from_value(serde_json::json!({ "Id": id, "title_c": format!("Track {}", id) }))
            .unwrap()
    }

    #[test]
    fn test_play_all_queues_in_order() {
        let queue = PlaybackQueue::new();
        assert!(queue.play_all(vec![song(3), song(1), song(2)]));

        assert_eq!(queue.current_song().map(|s| s.id), Some(3));
        assert_eq!(queue.next().map(|s| s.id), Some(1));
        assert_eq!(queue.next().map(|s| s.id), Some(2));
        assert!(queue.next().is_none());
        assert_eq!(queue.current_song().map(|s| s.id), Some(2));
        assert_eq!(queue.previous().map(|s| s.id), Some(1));
    }

    #[test]
    fn test_play_all_empty_keeps_queue() {
        let queue = PlaybackQueue::new();
        queue.play_song(song(9));

        assert!(!queue.play_all(Vec::new()));
        assert_eq!(queue.current_song().map(|s| s.id), Some(9));
    }

    #[test]
    fn test_toggle_and_stop() {
        let queue = PlaybackQueue::new();
        assert!(!queue.toggle());

        queue.play_song(song(4));
        assert!(queue.is_song_playing(4));
        assert!(!queue.toggle());
        assert!(!queue.is_song_playing(4));
        assert!(queue.toggle());

        queue.stop();
        assert!(queue.current_song().is_none());
        assert!(!queue.is_playing());
        assert!(queue.queue().is_empty());
    }

    #[tokio::test]
    async fn test_events_follow_queue_changes() {
        let bus = EventBus::new(16);
        let mut events = bus.subscribe();
        let queue = PlaybackQueue::new().with_event_bus(bus);

        queue.play_song(song(5));
        queue.toggle();
        queue.stop();

        let received: Vec<_> = std::iter::from_fn(|| events.try_recv().ok()).collect();
        assert_eq!(
            received,
            vec![
                CoreEvent::Playback(PlaybackEvent::QueueChanged { length: 1, position: Some(0) }),
                CoreEvent::Playback(PlaybackEvent::Started { song_id: 5 }),
                CoreEvent::Playback(PlaybackEvent::Paused { song_id: 5 }),
                CoreEvent::Playback(PlaybackEvent::Stopped),
                CoreEvent::Playback(PlaybackEvent::QueueChanged { length: 0, position: None }),
            ]
        );
    }
}
