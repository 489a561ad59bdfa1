pub mod auth;
pub mod networks;
pub mod substations;
