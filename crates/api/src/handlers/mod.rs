pub mod auth;
pub mod finance;
pub mod logistic_payment;
pub mod mj_project;
pub mod packing_list;
pub mod project_images;
pub mod upload_form;
pub mod users;
pub mod warehouse;
