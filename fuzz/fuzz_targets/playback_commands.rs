#![no_main]

use libfuzzer_sys::fuzz_target;
use shellarchive::core::Picker;
use shellarchive::model::{Direction, PlayerEvent, SessionState};
use shellarchive::view;

struct BytePicker(u8);

impl Picker for BytePicker {
    fn pick(&mut self, len: usize) -> usize {
        usize::from(self.0) % len.max(1)
    }
}

fuzz_target!(|data: &[u8]| {
    let Some((&len, ops)) = data.split_first() else {
        return;
    };
    let len = usize::from(len % 32);
    let mut session = SessionState::default();

    for byte in ops {
        let event = match byte % 7 {
            0 => {
                view::resolve(true, &mut session);
                continue;
            }
            1 => PlayerEvent::Close,
            2 => PlayerEvent::Select(usize::from(byte / 7)),
            3 => PlayerEvent::Advance(Direction::Forward),
            4 => PlayerEvent::Advance(Direction::Backward),
            5 => PlayerEvent::TrackEnded,
            _ => PlayerEvent::ToggleShuffle,
        };
        session = session.apply(event, len, &mut BytePicker(byte.rotate_left(3)));
        if let Some(idx) = session.playback.current_index {
            assert!(idx < len);
        }
    }
});
