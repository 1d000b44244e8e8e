//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&MySqlPool` as the first argument.

pub mod logistic_payment_repo;
pub mod packing_list_repo;
pub mod project_image_repo;
pub mod project_repo;
pub mod user_repo;
pub mod warehouse_repo;

pub use logistic_payment_repo::LogisticPaymentRepo;
pub use packing_list_repo::PackingListRepo;
pub use project_image_repo::ProjectImageRepo;
pub use project_repo::ProjectRepo;
pub use user_repo::UserRepo;
pub use warehouse_repo::WarehouseRepo;
