pub mod catalog;
pub mod envelope;
pub mod tools;
