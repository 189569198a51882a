pub mod clock;
pub mod logging;
pub mod percentage;
pub mod time;
