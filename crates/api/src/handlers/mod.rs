pub mod ops;
pub mod records;
