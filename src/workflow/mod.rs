pub mod session;
pub mod submit;
