pub mod extract;
pub mod predict;
