pub mod admin;
pub mod analysis;
pub mod feedback;
pub mod resume;
