//! Row models and DTOs, one module per table.

pub mod logistic_payment;
pub mod packing_list;
pub mod project;
pub mod project_image;
pub mod user;
pub mod warehouse;
