pub mod polygon;
pub mod user;
