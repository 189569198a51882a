pub mod aggregation;
pub mod entities;
pub mod mutation;
