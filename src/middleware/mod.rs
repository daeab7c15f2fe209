//! Request middleware.

pub mod auth;
pub mod metrics;
pub mod request_id;

pub use auth::{admin_manager_gate, admin_page_gate, staff_write_gate};
pub use metrics::metrics_middleware;
pub use request_id::{request_id_middleware, RequestId, REQUEST_ID_HEADER};
