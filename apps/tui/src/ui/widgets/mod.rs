pub mod charts;
pub mod popup;
pub mod selectors;
pub mod tables;
