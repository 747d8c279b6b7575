pub mod action;
pub mod error;
pub mod form_model;
