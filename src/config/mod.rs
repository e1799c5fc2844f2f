//! Configuration modules for the Cohortly API.
//!
//! Each submodule handles one aspect of configuration, loaded from
//! environment variables with sensible development defaults.
//!
//! - [`cors`]: allowed origins for the CORS layer
//! - [`database`]: PostgreSQL connection pool initialization
//! - [`email`]: SMTP settings for outbound mail
//! - [`jwt`]: token secret and expiries
//! - [`rate_limit`]: request throttling for the auth surface
//! - [`superadmin`]: the env-configured superadmin identity
//! - [`uploads`]: file upload directory, URL prefix and size cap

pub mod cors;
pub mod database;
pub mod email;
pub mod jwt;
pub mod rate_limit;
pub mod superadmin;
pub mod uploads;
