pub mod decimation;
pub mod point;
