use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use mandra_core::{round_currency, DomainError, LineId, OrderId, SupplierId};

/// Currency applied to new orders. Provisioned clients all trade in the
/// plant's home currency today.
pub const DEFAULT_CURRENCY: &str = "TRY";

/// Purchase order status lifecycle.
///
/// `Pending -> Approved -> SentToSupplier -> Received`; `Cancelled` is
/// terminal. No endpoint in this service mutates status; orders are created
/// `Pending` and transitions happen downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Approved,
    SentToSupplier,
    Received,
    Cancelled,
}

impl OrderStatus {
    /// Stable text form used in the relational status column (matches the
    /// serde representation).
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Approved => "approved",
            OrderStatus::SentToSupplier => "sent_to_supplier",
            OrderStatus::Received => "received",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl core::str::FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "approved" => Ok(OrderStatus::Approved),
            "sent_to_supplier" => Ok(OrderStatus::SentToSupplier),
            "received" => Ok(OrderStatus::Received),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(DomainError::invalid_argument(format!(
                "unknown order status '{other}'"
            ))),
        }
    }
}

/// One line of a purchase order.
///
/// Material code/name are a denormalized snapshot taken at order time; they
/// do not track later stock-item edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseOrderLine {
    pub id: LineId,
    pub order_id: OrderId,
    pub material_code: String,
    pub material_name: String,
    pub quantity: Decimal,
    pub unit: String,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

/// A committed purchase order with its lines loaded eagerly.
///
/// Invariant: `total_amount == sum(line.line_total)`; the order is immutable
/// once lines are attached except for status transitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseOrder {
    pub id: OrderId,
    pub order_number: String,
    pub source_application: String,
    pub status: OrderStatus,
    pub supplier_id: Option<SupplierId>,
    pub notes: Option<String>,
    pub requested_delivery_date: Option<DateTime<Utc>>,
    pub total_amount: Decimal,
    pub currency: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub lines: Vec<PurchaseOrderLine>,
}

/// Requested line for a new order, before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrderLine {
    pub material_code: String,
    pub material_name: String,
    pub quantity: Decimal,
    pub unit: String,
    pub unit_price: Decimal,
}

/// Request to create an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrder {
    pub lines: Vec<NewOrderLine>,
    pub requested_delivery_date: Option<DateTime<Utc>>,
    pub supplier_id: Option<SupplierId>,
    pub notes: Option<String>,
}

/// Validate a requested line set.
///
/// Rejects the whole batch: an empty set or any line with a non-positive
/// quantity or negative unit price fails without partial acceptance.
pub fn validate_lines(lines: &[NewOrderLine]) -> Result<(), DomainError> {
    if lines.is_empty() {
        return Err(DomainError::invalid_argument(
            "at least one order line is required",
        ));
    }

    for line in lines {
        if line.quantity <= Decimal::ZERO {
            return Err(DomainError::invalid_argument(format!(
                "quantity for '{}' must be greater than zero",
                line.material_code
            )));
        }
        if line.unit_price < Decimal::ZERO {
            return Err(DomainError::invalid_argument(format!(
                "unit price for '{}' must not be negative",
                line.material_code
            )));
        }
    }

    Ok(())
}

/// Build a `Pending` order from a validated request.
///
/// Computes `line_total = round(quantity * unit_price, 2)` per line and
/// `total_amount` as their sum. The caller supplies the generated order
/// number; persistence decides whether it survives the uniqueness gate.
pub fn build_order(
    request: &NewOrder,
    order_number: String,
    source_application: &str,
    now: DateTime<Utc>,
) -> Result<PurchaseOrder, DomainError> {
    validate_lines(&request.lines)?;

    let order_id = OrderId::new();
    let lines: Vec<PurchaseOrderLine> = request
        .lines
        .iter()
        .map(|l| PurchaseOrderLine {
            id: LineId::new(),
            order_id,
            material_code: l.material_code.clone(),
            material_name: l.material_name.clone(),
            quantity: l.quantity,
            unit: l.unit.clone(),
            unit_price: l.unit_price,
            line_total: round_currency(l.quantity * l.unit_price),
        })
        .collect();

    let total_amount: Decimal = lines.iter().map(|l| l.line_total).sum();

    Ok(PurchaseOrder {
        id: order_id,
        order_number,
        source_application: source_application.to_string(),
        status: OrderStatus::Pending,
        supplier_id: request.supplier_id,
        notes: request.notes.clone(),
        requested_delivery_date: request.requested_delivery_date,
        total_amount,
        currency: DEFAULT_CURRENCY.to_string(),
        created_at: now,
        updated_at: now,
        lines,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn line(code: &str, quantity: Decimal, unit_price: Decimal) -> NewOrderLine {
        NewOrderLine {
            material_code: code.to_string(),
            material_name: format!("material {code}"),
            quantity,
            unit: "kg".to_string(),
            unit_price,
        }
    }

    fn request(lines: Vec<NewOrderLine>) -> NewOrder {
        NewOrder {
            lines,
            requested_delivery_date: None,
            supplier_id: None,
            notes: None,
        }
    }

    #[test]
    fn empty_lines_are_rejected() {
        let err = validate_lines(&[]).unwrap_err();
        assert!(matches!(err, DomainError::InvalidArgument(_)));
    }

    #[test]
    fn non_positive_quantity_rejects_whole_batch() {
        let lines = vec![line("SUT-001", dec!(100), dec!(28.5)), line("MAYA-001", dec!(0), dec!(850))];
        let err = validate_lines(&lines).unwrap_err();
        assert!(matches!(err, DomainError::InvalidArgument(_)));
    }

    #[test]
    fn negative_unit_price_is_rejected() {
        let lines = vec![line("SUT-001", dec!(10), dec!(-1))];
        assert!(validate_lines(&lines).is_err());
    }

    #[test]
    fn line_totals_and_total_amount_are_derived() {
        let req = request(vec![
            line("SUT-001", dec!(100), dec!(28.5)),
            line("MAYA-001", dec!(20), dec!(850.00)),
        ]);

        let order = build_order(&req, "PO-MOB-20250601-ABC123".to_string(), "MobilApp", Utc::now())
            .unwrap();

        assert_eq!(order.lines[0].line_total, dec!(2850.00));
        assert_eq!(order.lines[1].line_total, dec!(17000.00));
        assert_eq!(order.total_amount, dec!(19850.00));
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.currency, DEFAULT_CURRENCY);
    }

    #[test]
    fn line_total_rounds_to_currency_precision() {
        let req = request(vec![line("TUZ-001", dec!(3), dec!(8.999))]);
        let order = build_order(&req, "PO-GEN-20250601-ABC123".to_string(), "ERPKonnektör", Utc::now())
            .unwrap();
        // 3 * 8.999 = 26.997 -> 27.00
        assert_eq!(order.lines[0].line_total, dec!(27.00));
        assert_eq!(order.total_amount, dec!(27.00));
    }

    #[test]
    fn lines_carry_their_order_id() {
        let req = request(vec![line("A", dec!(1), dec!(1)), line("B", dec!(2), dec!(2))]);
        let order = build_order(&req, "PO-WEB-20250601-ABC123".to_string(), "WebPortal", Utc::now())
            .unwrap();
        assert!(order.lines.iter().all(|l| l.order_id == order.id));
    }

    proptest! {
        #[test]
        fn total_amount_always_equals_sum_of_line_totals(
            quantities in proptest::collection::vec(1u32..10_000, 1..8),
            prices in proptest::collection::vec(0u32..100_000, 1..8),
        ) {
            let lines: Vec<NewOrderLine> = quantities
                .iter()
                .zip(prices.iter().cycle())
                .enumerate()
                .map(|(idx, (q, p))| {
                    // prices carry two implied decimals
                    line(&format!("M-{idx}"), Decimal::from(*q), Decimal::new(i64::from(*p), 2))
                })
                .collect();

            let order = build_order(
                &request(lines),
                "PO-GEN-20250601-ABC123".to_string(),
                "GenClient",
                Utc::now(),
            )
            .unwrap();

            let expected: Decimal = order.lines.iter().map(|l| l.line_total).sum();
            prop_assert_eq!(order.total_amount, expected);
        }
    }
}
