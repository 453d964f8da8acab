//! Repository implementations
//!
//! Repositories own the SQL and return plain row types; conversion into
//! domain models happens in the adapters.

pub mod receivables;

pub use receivables::{
    CustomerQuery, CustomerRow, PaymentRow, ReceivablesRepository, TransactionQuery,
    TransactionRow,
};
