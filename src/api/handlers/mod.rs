pub mod root;
pub mod events;
pub mod attendees;
