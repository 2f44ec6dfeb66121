pub mod click_session;
pub mod command_dispatcher;
pub mod device_source;
pub mod event_loop;

pub use click_session::ClickSession;
pub use command_dispatcher::{create_launcher, CommandDispatcher};
pub use device_source::create_device_source;
pub use event_loop::{EventLoop, LoopExit};
