use crate::model::{Direction, PlaybackState, PlayerEvent, SessionState};

pub trait Picker {
    fn pick(&mut self, len: usize) -> usize;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadPicker;

impl Picker for ThreadPicker {
    fn pick(&mut self, len: usize) -> usize {
        rand::random_range(0..len)
    }
}

impl PlaybackState {
    pub fn select(&mut self, index: usize, len: usize) -> bool {
        if index >= len {
            return false;
        }
        self.current_index = Some(index);
        true
    }

    pub fn advance<P: Picker + ?Sized>(
        &mut self,
        direction: Direction,
        len: usize,
        picker: &mut P,
    ) -> Option<usize> {
        if len == 0 {
            return None;
        }

        let next = if self.shuffle_enabled {
            picker.pick(len) % len
        } else {
            step_index(self.current_index, direction, len)
        };
        self.current_index = Some(next);
        Some(next)
    }

    pub fn toggle_shuffle<P: Picker + ?Sized>(
        &mut self,
        len: usize,
        picker: &mut P,
    ) -> Option<usize> {
        self.shuffle_enabled = !self.shuffle_enabled;
        if self.shuffle_enabled {
            self.advance(Direction::Forward, len, picker)
        } else {
            None
        }
    }

    pub fn reconcile(&mut self, len: usize) {
        if let Some(current) = self.current_index
            && current >= len
        {
            self.current_index = (len > 0).then_some(0);
        }
    }

    pub fn stop(&mut self) {
        self.current_index = None;
    }
}

impl SessionState {
    pub fn apply<P: Picker + ?Sized>(
        mut self,
        event: PlayerEvent,
        len: usize,
        picker: &mut P,
    ) -> Self {
        self.playback.reconcile(len);

        match event {
            PlayerEvent::Close => {
                self.launched = false;
                self.playback.stop();
            }
            PlayerEvent::Select(index) => {
                self.playback.select(index, len);
            }
            PlayerEvent::Advance(direction) => {
                self.playback.advance(direction, len, picker);
            }
            PlayerEvent::TrackEnded => {
                self.playback.advance(Direction::Forward, len, picker);
            }
            PlayerEvent::ToggleShuffle => {
                self.playback.toggle_shuffle(len, picker);
            }
        }

        self
    }
}

fn step_index(current: Option<usize>, direction: Direction, len: usize) -> usize {
    let Some(current) = current else {
        return match direction {
            Direction::Forward => 0,
            Direction::Backward => len - 1,
        };
    };

    let current = current.min(len - 1) as isize;
    (current + direction.offset()).rem_euclid(len as isize) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prop_assert;
    use std::collections::HashSet;

    struct ScriptedPicker {
        picks: Vec<usize>,
        cursor: usize,
    }

    impl Picker for ScriptedPicker {
        fn pick(&mut self, _len: usize) -> usize {
            let pick = self.picks[self.cursor % self.picks.len()];
            self.cursor += 1;
            pick
        }
    }

    fn picker() -> ThreadPicker {
        ThreadPicker
    }

    #[test]
    fn select_sets_valid_index() {
        let mut state = PlaybackState::default();
        assert!(state.select(2, 3));
        assert_eq!(state.current_index, Some(2));
    }

    #[test]
    fn select_out_of_range_is_ignored() {
        let mut state = PlaybackState {
            current_index: Some(1),
            shuffle_enabled: false,
        };
        assert!(!state.select(3, 3));
        assert_eq!(state.current_index, Some(1));
    }

    #[test]
    fn forward_wraps_from_last_track() {
        let mut state = PlaybackState {
            current_index: Some(2),
            shuffle_enabled: false,
        };
        let next = state.advance(Direction::Forward, 3, &mut picker());
        assert_eq!(next, Some(0));
        assert_eq!(state.current_index, Some(0));
    }

    #[test]
    fn backward_wraps_from_first_track() {
        let mut state = PlaybackState {
            current_index: Some(0),
            shuffle_enabled: false,
        };
        assert_eq!(state.advance(Direction::Backward, 4, &mut picker()), Some(3));
    }

    #[test]
    fn idle_advance_starts_at_playlist_edges() {
        let mut state = PlaybackState::default();
        assert_eq!(state.advance(Direction::Forward, 5, &mut picker()), Some(0));

        let mut state = PlaybackState::default();
        assert_eq!(state.advance(Direction::Backward, 5, &mut picker()), Some(4));
    }

    #[test]
    fn advance_on_empty_playlist_is_noop() {
        let mut state = PlaybackState::default();
        assert_eq!(state.advance(Direction::Forward, 0, &mut picker()), None);
        assert_eq!(state.current_index, None);

        state.shuffle_enabled = true;
        assert_eq!(state.advance(Direction::Forward, 0, &mut picker()), None);
    }

    #[test]
    fn sequential_cycle_visits_every_track_once() {
        let mut state = PlaybackState {
            current_index: Some(0),
            shuffle_enabled: false,
        };
        let mut picker = picker();
        let mut seen = HashSet::new();
        for _ in 0..6 {
            let next = state.advance(Direction::Forward, 6, &mut picker).expect("next");
            assert!(seen.insert(next), "index {next} repeated inside one cycle");
        }
        assert_eq!(seen.len(), 6);
        assert_eq!(state.current_index, Some(0));
    }

    #[test]
    fn enabling_shuffle_jumps_to_a_track() {
        let mut state = PlaybackState::default();
        let picked = state.toggle_shuffle(4, &mut picker());
        assert!(state.shuffle_enabled);
        assert!(picked.is_some_and(|idx| idx < 4));
        assert_eq!(state.current_index, picked);
    }

    #[test]
    fn shuffle_may_repeat_current_track() {
        let mut state = PlaybackState {
            current_index: Some(1),
            shuffle_enabled: true,
        };
        let mut picker = ScriptedPicker {
            picks: vec![1],
            cursor: 0,
        };
        assert_eq!(state.advance(Direction::Forward, 3, &mut picker), Some(1));
        assert_eq!(state.advance(Direction::Backward, 3, &mut picker), Some(1));
    }

    #[test]
    fn disabling_shuffle_keeps_current_track() {
        let mut state = PlaybackState {
            current_index: Some(3),
            shuffle_enabled: true,
        };
        assert_eq!(state.toggle_shuffle(4, &mut picker()), None);
        assert!(!state.shuffle_enabled);
        assert_eq!(state.current_index, Some(3));
    }

    #[test]
    fn reconcile_clamps_stale_index() {
        let mut state = PlaybackState {
            current_index: Some(9),
            shuffle_enabled: false,
        };
        state.reconcile(3);
        assert_eq!(state.current_index, Some(0));

        state.current_index = Some(2);
        state.reconcile(0);
        assert_eq!(state.current_index, None);
    }

    #[test]
    fn close_returns_to_landing_and_idle() {
        let mut picker = picker();
        let mut session = SessionState::default();
        crate::view::resolve(true, &mut session);
        let session = session
            .apply(PlayerEvent::Select(1), 3, &mut picker)
            .apply(PlayerEvent::ToggleShuffle, 3, &mut picker)
            .apply(PlayerEvent::Close, 3, &mut picker);

        assert!(!session.launched);
        assert_eq!(session.playback.current_index, None);
        assert!(session.playback.shuffle_enabled);
    }

    #[test]
    fn track_end_moves_forward() {
        let session = SessionState {
            launched: true,
            playback: PlaybackState {
                current_index: Some(1),
                shuffle_enabled: false,
            },
        };
        let session = session.apply(PlayerEvent::TrackEnded, 3, &mut picker());
        assert_eq!(session.playback.current_index, Some(2));
    }

    proptest::proptest! {
        #[test]
        fn select_then_read_returns_index(len in 1usize..64, pick in 0usize..64) {
            let index = pick % len;
            let mut state = PlaybackState::default();
            prop_assert!(state.select(index, len));
            prop_assert!(state.current_index == Some(index));
        }

        #[test]
        fn shuffle_picks_stay_in_bounds(
            len in 1usize..50,
            picks in proptest::collection::vec(0usize..100, 1..8),
        ) {
            let mut picker = ScriptedPicker { picks, cursor: 0 };
            let mut state = PlaybackState { current_index: None, shuffle_enabled: true };
            for _ in 0..20 {
                let next = state.advance(Direction::Forward, len, &mut picker);
                prop_assert!(next.is_some_and(|idx| idx < len));
            }
        }

        #[test]
        fn index_invariant_holds_after_random_events(
            len in 0usize..12,
            ops in proptest::collection::vec((0u8..7, 0usize..16), 1..200),
        ) {
            let mut picker = picker();
            let mut session = SessionState::default();
            for (op, arg) in ops {
                let event = match op {
                    0 => {
                        crate::view::resolve(true, &mut session);
                        continue;
                    }
                    1 => PlayerEvent::Close,
                    2 => PlayerEvent::Select(arg),
                    3 => PlayerEvent::Advance(Direction::Forward),
                    4 => PlayerEvent::Advance(Direction::Backward),
                    5 => PlayerEvent::TrackEnded,
                    _ => PlayerEvent::ToggleShuffle,
                };
                session = session.apply(event, len, &mut picker);
                if let Some(idx) = session.playback.current_index {
                    prop_assert!(idx < len);
                }
            }
        }
    }
}
