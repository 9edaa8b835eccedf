pub mod rect;
pub mod rotation;
