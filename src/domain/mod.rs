pub mod event;
pub mod attendee;
pub mod status;
pub mod time;

pub use event::*;
pub use attendee::*;
pub use status::*;
