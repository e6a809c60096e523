//! Paced bulk email campaigns with open tracking.
//!
//! [`send_campaign`] renders a template for every recipient of a CSV
//! list and delivers the messages one by one over SMTP, pausing between
//! sends. [`tracker`] serves the tracking pixel embedded in those
//! messages and counts how often it was fetched.

pub mod db;
pub mod domain;
pub mod errors;
pub mod models;
pub mod repository;
pub mod schema;
pub mod send_campaign;
pub mod settings;
pub mod tracker;
