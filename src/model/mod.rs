pub mod item;
pub mod task;
