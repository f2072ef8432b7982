//! ewaybill-service: session-based encrypted protocol client for the
//! national tax authority's e-way bill web service.

pub mod config;
pub mod models;
pub mod services;
