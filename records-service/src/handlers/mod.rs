pub mod docs;
pub mod health;
pub mod logs;
pub mod metrics;
pub mod records;

pub use docs::index;
pub use health::health_check;
pub use logs::get_logs;
pub use metrics::metrics;
pub use records::{get_payroll, get_shipping, update_payroll, update_shipping};
