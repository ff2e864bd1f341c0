//! Persistence records for the CRM tables.

pub mod activity;
pub mod customer;
pub mod customer_tag;
pub mod funnel;
pub mod note;
pub mod tag;
pub mod task;
