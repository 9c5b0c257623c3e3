pub mod check;
pub mod log;
pub mod send;
