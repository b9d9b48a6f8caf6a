mod engine;
mod ticker;

pub use engine::{
    Advance, MinuteInput, Mode, PomodoroState, DEFAULT_BREAK_MINUTES, DEFAULT_FOCUS_MINUTES,
    MAX_MINUTES, MIN_MINUTES,
};
pub use ticker::{Ticker, DEFAULT_PERIOD};
