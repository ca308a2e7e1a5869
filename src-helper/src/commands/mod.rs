pub mod path;
pub mod repository;
