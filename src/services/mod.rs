pub mod address;
pub mod git;
