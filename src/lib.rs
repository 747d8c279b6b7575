//! Client-side handling of document upload forms.
//!
//! Each registered form posts its fields to a processing endpoint, shows a
//! loading indicator while the request is out, and renders the JSON reply
//! (or an error message) into its own display regions.

pub mod cli;
pub mod form;
pub mod handler;
pub mod render;
pub mod report;
pub mod response;
pub mod trace;
pub mod transport;
