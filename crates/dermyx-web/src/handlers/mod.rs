pub mod diagnose;
pub mod diseases;
pub mod symptoms;
pub mod status;
pub mod image;
