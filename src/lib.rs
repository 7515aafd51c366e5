//! dynquery - client-side query state and request protocol for generic
//! entity query endpoints
//!
//! A session holds the entity, projection, typed filters (including nested
//! subqueries), multi-column sort and paging, encodes them into one
//! canonical request, and consumes the browse or export response.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod filter;
pub mod observability;
pub mod query;
pub mod response;
pub mod session;
pub mod sort;
pub mod transport;
