pub mod response_model;
