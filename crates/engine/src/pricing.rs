//! Pricing and validation of purchase requests.
//!
//! Everything here is pure: the caller reads a [`CatalogSnapshot`] from the
//! store and this module decides, without touching the store, whether the
//! request is acceptable and what it costs.

use std::collections::HashMap;

use api_types::Money;

use crate::{EngineError, Item, PurchaseLine, ResultEngine};

/// Current catalog state for the items named by one request.
#[derive(Clone, Debug, Default)]
pub struct CatalogSnapshot {
    items: HashMap<i32, Item>,
}

impl CatalogSnapshot {
    pub fn new(items: impl IntoIterator<Item = Item>) -> Self {
        Self {
            items: items.into_iter().map(|item| (item.id, item)).collect(),
        }
    }

    pub fn get(&self, item_id: i32) -> Option<&Item> {
        self.items.get(&item_id)
    }
}

/// A validated line with its server-side price.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PricedLine {
    pub item_id: i32,
    pub qty: i64,
    pub unit_price: Money,
    pub sub_total: Money,
}

/// Outcome of pricing a request: lines in request order and their total.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PricedPurchase {
    pub supplier_id: i32,
    pub lines: Vec<PricedLine>,
    pub grand_total: Money,
}

/// Check the request shape before any store access.
pub fn validate_lines(lines: &[PurchaseLine]) -> ResultEngine<()> {
    if lines.is_empty() {
        return Err(EngineError::InvalidInput(
            "details must contain at least one line".to_string(),
        ));
    }
    if let Some(line) = lines.iter().find(|line| line.qty < 1) {
        return Err(EngineError::InvalidInput(format!(
            "qty for item {} must be >= 1",
            line.item_id
        )));
    }
    Ok(())
}

/// Price every line against `snapshot`.
///
/// Fails on the first line whose item is missing or owned by another
/// supplier; a failure prices nothing.
pub fn price_purchase(
    supplier_id: i32,
    lines: &[PurchaseLine],
    snapshot: &CatalogSnapshot,
) -> ResultEngine<PricedPurchase> {
    validate_lines(lines)?;

    let priced = lines
        .iter()
        .map(|line| price_line(supplier_id, line, snapshot))
        .collect::<ResultEngine<Vec<_>>>()?;

    let grand_total = Money::checked_sum(priced.iter().map(|line| line.sub_total))
        .ok_or_else(|| EngineError::InvalidInput("grand total too large".to_string()))?;

    Ok(PricedPurchase {
        supplier_id,
        lines: priced,
        grand_total,
    })
}

fn price_line(
    supplier_id: i32,
    line: &PurchaseLine,
    snapshot: &CatalogSnapshot,
) -> ResultEngine<PricedLine> {
    let item = snapshot
        .get(line.item_id)
        .ok_or_else(|| EngineError::KeyNotFound(format!("item {}", line.item_id)))?;
    if item.supplier_id != supplier_id {
        return Err(EngineError::SupplierMismatch {
            item_id: item.id,
            supplier_id,
        });
    }
    let sub_total = item.price.checked_mul(line.qty).ok_or_else(|| {
        EngineError::InvalidInput(format!("subtotal for item {} too large", item.id))
    })?;
    Ok(PricedLine {
        item_id: item.id,
        qty: line.qty,
        unit_price: item.price,
        sub_total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: i32, supplier_id: i32, price_cents: i64, stock: i64) -> Item {
        Item {
            id,
            name: format!("item-{id}"),
            stock,
            price: Money::new(price_cents),
            supplier_id,
        }
    }

    fn snapshot() -> CatalogSnapshot {
        CatalogSnapshot::new([
            item(1, 1, 10_00, 5),
            item(2, 1, 5_00, 2),
            item(3, 2, 7_25, 0),
        ])
    }

    #[test]
    fn prices_example_request() {
        let lines = [PurchaseLine::new(1, 3), PurchaseLine::new(2, 4)];
        let priced = price_purchase(1, &lines, &snapshot()).unwrap();

        assert_eq!(priced.grand_total, Money::new(50_00));
        assert_eq!(priced.lines.len(), 2);
        assert_eq!(priced.lines[0].sub_total, Money::new(30_00));
        assert_eq!(priced.lines[1].sub_total, Money::new(20_00));
        assert_eq!(priced.lines[1].unit_price, Money::new(5_00));
    }

    #[test]
    fn keeps_request_order_and_repeated_items() {
        let lines = [
            PurchaseLine::new(2, 1),
            PurchaseLine::new(1, 1),
            PurchaseLine::new(2, 2),
        ];
        let priced = price_purchase(1, &lines, &snapshot()).unwrap();
        let ids: Vec<_> = priced.lines.iter().map(|l| l.item_id).collect();
        assert_eq!(ids, vec![2, 1, 2]);
        assert_eq!(priced.grand_total, Money::new(5_00 + 10_00 + 10_00));
    }

    #[test]
    fn total_has_no_drift_over_many_lines() {
        let snapshot = CatalogSnapshot::new([item(9, 1, 1, 0)]);
        let lines = vec![PurchaseLine::new(9, 1); 10_000];
        let priced = price_purchase(1, &lines, &snapshot).unwrap();
        assert_eq!(priced.grand_total, Money::new(10_000));
        assert_eq!(priced.grand_total.to_string(), "100.00");
    }

    #[test]
    fn rejects_unknown_item_anywhere_in_request() {
        let lines = [
            PurchaseLine::new(1, 3),
            PurchaseLine::new(2, 4),
            PurchaseLine::new(999, 1),
        ];
        let err = price_purchase(1, &lines, &snapshot()).unwrap_err();
        assert_eq!(err, EngineError::KeyNotFound("item 999".to_string()));
    }

    #[test]
    fn rejects_item_of_other_supplier() {
        let lines = [PurchaseLine::new(1, 1), PurchaseLine::new(3, 1)];
        let err = price_purchase(1, &lines, &snapshot()).unwrap_err();
        assert_eq!(
            err,
            EngineError::SupplierMismatch {
                item_id: 3,
                supplier_id: 1
            }
        );
    }

    #[test]
    fn rejects_empty_and_non_positive_quantities() {
        assert!(matches!(
            price_purchase(1, &[], &snapshot()),
            Err(EngineError::InvalidInput(_))
        ));
        for qty in [0, -3] {
            let err = price_purchase(1, &[PurchaseLine::new(1, qty)], &snapshot()).unwrap_err();
            assert!(matches!(err, EngineError::InvalidInput(_)));
        }
    }

    #[test]
    fn overflowing_subtotal_is_rejected() {
        let snapshot = CatalogSnapshot::new([item(1, 1, i64::MAX / 2, 0)]);
        let err = price_purchase(1, &[PurchaseLine::new(1, 3)], &snapshot).unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));
    }
}
