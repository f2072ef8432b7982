//! gst-service: GST tax computation, fiscal document numbering and
//! GSTR-1 filing aggregation for the retail back-office.

pub mod config;
pub mod models;
pub mod services;
