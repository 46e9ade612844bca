pub mod alerts;
pub mod analysis;
pub mod health;
pub mod indices;
pub mod mappings;
pub mod upload;
