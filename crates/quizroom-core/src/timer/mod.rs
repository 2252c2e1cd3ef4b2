mod countdown;

pub use countdown::{
    progress_fraction, Countdown, CountdownHandle, CountdownSettings, TimerSignal,
};
