pub mod conversation;
pub mod reply;
pub mod ticket;
