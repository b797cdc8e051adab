pub mod change_feed;
pub mod generator;
pub mod refresher;
pub mod scan_validator;
pub mod stats;
