mod database;
pub mod error;
pub mod log_reader;
mod memory;
pub mod metrics;
mod records;

pub use database::{DocumentStore, MongoStore};
pub use error::StoreError;
pub use log_reader::{tail_lines, LOG_TAIL_LINES};
pub use memory::InMemoryStore;
pub use metrics::{get_metrics, init_metrics};
pub use records::RecordsRepository;
