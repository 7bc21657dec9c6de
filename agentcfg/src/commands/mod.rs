pub mod show;
pub mod wizard;
