pub mod dashboard;
pub mod map;
