pub mod class;
pub mod clip;
