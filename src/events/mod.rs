pub mod mouse;

pub use mouse::{Button, RawInputEvent, RECORD_SIZE};
