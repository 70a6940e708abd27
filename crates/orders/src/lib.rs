//! `mandra-orders` — procurement domain: purchase orders and their lines.
//!
//! Pure domain logic only: validation, derived totals, numbering. Persistence
//! and the transactional boundary live in `mandra-infra`.

pub mod number;
pub mod order;

pub use number::generate_order_number;
pub use order::{
    build_order, validate_lines, NewOrder, NewOrderLine, OrderStatus, PurchaseOrder,
    PurchaseOrderLine, DEFAULT_CURRENCY,
};
