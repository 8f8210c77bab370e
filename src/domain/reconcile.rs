//! Stock reconciliation between two versions of an order's line items.
//!
//! Every order mutation reduces to the same diff: creation is a diff
//! against an empty list, deletion is a diff towards an empty list, and
//! an edit is a diff between the previous and the submitted lines.

use std::collections::BTreeMap;

use uuid::Uuid;

/// One product line with its ordered quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineQty {
    pub product_id: Uuid,
    pub quantity: i64,
}

impl LineQty {
    pub fn new(product_id: Uuid, quantity: i64) -> Self {
        Self {
            product_id,
            quantity,
        }
    }
}

/// A signed stock adjustment for one product. Positive `change` returns
/// stock to the shelf, negative takes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockDelta {
    pub product_id: Uuid,
    pub change: i64,
}

/// Collapses duplicate product lines into one quantity per product.
pub fn quantity_by_product(lines: &[LineQty]) -> BTreeMap<Uuid, i64> {
    let mut merged = BTreeMap::new();
    for line in lines {
        *merged.entry(line.product_id).or_insert(0) += line.quantity;
    }
    merged
}

/// Stock adjustments that turn the `old` line set into the `new` one.
///
/// A product present in both lists is adjusted by the signed difference,
/// one removed entirely gets its full prior quantity back, and one newly
/// added is decremented by its quantity. Products whose quantity did not
/// change are omitted.
pub fn stock_deltas(old: &[LineQty], new: &[LineQty]) -> Vec<StockDelta> {
    let old = quantity_by_product(old);
    let mut new = quantity_by_product(new);

    let mut deltas = Vec::new();
    for (product_id, old_qty) in old {
        let new_qty = new.remove(&product_id).unwrap_or(0);
        let change = old_qty - new_qty;
        if change != 0 {
            deltas.push(StockDelta { product_id, change });
        }
    }
    for (product_id, new_qty) in new {
        if new_qty != 0 {
            deltas.push(StockDelta {
                product_id,
                change: -new_qty,
            });
        }
    }
    deltas
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u8) -> Uuid {
        Uuid::from_u128(u128::from(n))
    }

    #[test]
    fn creation_decrements_by_ordered_quantities() {
        let new = vec![LineQty::new(id(1), 2), LineQty::new(id(2), 5)];
        let deltas = stock_deltas(&[], &new);
        let decremented: i64 = deltas.iter().map(|d| -d.change).sum();
        assert_eq!(decremented, 7);
        assert!(deltas.iter().all(|d| d.change < 0));
    }

    #[test]
    fn deletion_restores_prior_quantities() {
        let old = vec![LineQty::new(id(1), 2), LineQty::new(id(2), 5)];
        let forward = stock_deltas(&[], &old);
        let backward = stock_deltas(&old, &[]);
        let mut net: BTreeMap<Uuid, i64> = BTreeMap::new();
        for d in forward.iter().chain(backward.iter()) {
            *net.entry(d.product_id).or_insert(0) += d.change;
        }
        assert!(net.values().all(|change| *change == 0));
    }

    #[test]
    fn edit_adjusts_by_signed_difference() {
        let old = vec![LineQty::new(id(1), 4)];
        let new = vec![LineQty::new(id(1), 1)];
        assert_eq!(
            stock_deltas(&old, &new),
            vec![StockDelta {
                product_id: id(1),
                change: 3
            }]
        );

        let raised = vec![LineQty::new(id(1), 6)];
        assert_eq!(
            stock_deltas(&old, &raised),
            vec![StockDelta {
                product_id: id(1),
                change: -2
            }]
        );
    }

    #[test]
    fn removed_product_gets_full_restore_and_added_one_is_taken() {
        let old = vec![LineQty::new(id(1), 3)];
        let new = vec![LineQty::new(id(2), 2)];
        let deltas = stock_deltas(&old, &new);
        assert_eq!(deltas.len(), 2);
        assert!(deltas.contains(&StockDelta {
            product_id: id(1),
            change: 3
        }));
        assert!(deltas.contains(&StockDelta {
            product_id: id(2),
            change: -2
        }));
    }

    #[test]
    fn unchanged_lines_produce_no_deltas() {
        let lines = vec![LineQty::new(id(1), 2), LineQty::new(id(2), 1)];
        assert!(stock_deltas(&lines, &lines).is_empty());
    }

    #[test]
    fn duplicate_lines_are_merged_before_diffing() {
        let old = vec![LineQty::new(id(1), 1), LineQty::new(id(1), 2)];
        let new = vec![LineQty::new(id(1), 3)];
        assert!(stock_deltas(&old, &new).is_empty());
    }
}
