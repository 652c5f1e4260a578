pub mod analysis;
pub mod fixed_point;
pub mod models;
pub mod random;
