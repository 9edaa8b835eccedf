pub mod copy;
pub mod row;
pub mod scale;
