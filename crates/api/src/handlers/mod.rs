pub mod companies;
pub mod games;
pub mod installers;
pub mod library;
