pub mod typed;
pub mod vec;
