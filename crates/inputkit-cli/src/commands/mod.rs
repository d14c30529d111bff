pub mod show;
pub mod write;
