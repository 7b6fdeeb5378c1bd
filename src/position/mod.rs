pub mod accuracy;
pub mod coords;
pub mod error;
pub mod geo_position;
