//! External system integrations for Slotwise.
//!
//! - [`clinic`] - the clinic backend's appointment, patient and ledger endpoints
//!
//! # Design Pattern
//!
//! Adapters isolate external dependencies behind traits so the scheduling
//! core can be exercised against in-memory implementations.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use slotwise::adapters::clinic::{AppointmentApi, HttpClinicApi};
//! use slotwise::config::{secret_string, ApiConfig};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ApiConfig {
//!     base_url: "https://clinic.example.com".to_string(),
//!     auth_token: Some(secret_string("token".to_string())),
//!     ..ApiConfig::default()
//! };
//!
//! let api: Arc<dyn AppointmentApi> = Arc::new(HttpClinicApi::new(&config)?);
//! # Ok(())
//! # }
//! ```

pub mod clinic;
