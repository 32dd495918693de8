pub mod generic;
pub mod labstore;

pub use labstore::LabStore;
