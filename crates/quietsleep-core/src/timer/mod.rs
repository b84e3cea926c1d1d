mod countdown;
mod timeline;

pub use countdown::{format_clock, Countdown, CountdownTick, CountdownTimer, TIMER_OPTIONS_MIN};
pub use timeline::{TimerId, Timeline};
