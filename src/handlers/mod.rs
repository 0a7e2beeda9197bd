pub mod home;
pub mod hospitals;
pub mod sessions;
