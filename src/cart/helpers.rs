//! Shopping Cart Business Logic Helpers
//!
//! Pure functions over the cart lines. The controller wraps these with
//! locking, persistence and remote synchronization.

use super::models::{CartLine, CatId, CatalogItem};
use super::rollback::Rollback;
use rust_decimal::{Decimal, RoundingStrategy};

/// How [`increment_or_append`] changed the cart.
#[derive(Debug, Clone, PartialEq)]
pub enum LineChange {
    /// An existing line now has `quantity`
    Incremented { id: CatId, quantity: u32 },
    /// A new line was pushed to the end of the cart
    Appended(CartLine),
}

impl LineChange {
    /// The mutation that undoes this change.
    pub fn rollback(&self) -> Rollback {
        match self {
            Self::Incremented { id, .. } => Rollback::Decrement(id.clone()),
            Self::Appended(line) => Rollback::DropAppended(line.id.clone()),
        }
    }
}

/// Adds one unit of `item` to the cart.
///
/// Increments the existing line for the item's id, or appends a new line
/// with quantity 1.
pub fn increment_or_append(lines: &mut Vec<CartLine>, item: &CatalogItem) -> LineChange {
    if let Some(existing) = lines.iter_mut().find(|l| l.id == item.id) {
        existing.quantity = existing.quantity.saturating_add(1);
        return LineChange::Incremented {
            id: existing.id.clone(),
            quantity: existing.quantity,
        };
    }

    let line = CartLine::from_catalog(item);
    lines.push(line.clone());
    LineChange::Appended(line)
}

/// Removes the line for `id`, returning the rollback that puts it back at
/// its original index. `None` when no such line exists.
pub fn remove_line(lines: &mut Vec<CartLine>, id: &CatId) -> Option<Rollback> {
    let index = lines.iter().position(|l| l.id == *id)?;
    let line = lines.remove(index);
    Some(Rollback::Reinsert { index, line })
}

/// Empties the cart, returning the snapshot restore.
pub fn take_all(lines: &mut Vec<CartLine>) -> Rollback {
    Rollback::Restore(std::mem::take(lines))
}

/// Coerces a user-edited quantity into a valid line quantity.
///
/// Missing values, NaN and anything below 1 become 1; everything else is
/// floored. Values beyond `u32::MAX` saturate.
pub fn sanitize_quantity(raw: Option<f64>) -> u32 {
    match raw {
        Some(value) if value >= 1.0 => {
            let floored = value.floor();
            if floored >= f64::from(u32::MAX) {
                u32::MAX
            } else {
                floored as u32
            }
        }
        _ => 1,
    }
}

/// Reads a quantity typed into a form field.
///
/// Blank input is treated as missing; unparseable text becomes NaN so that
/// [`sanitize_quantity`] resets it.
pub fn parse_quantity(input: &str) -> Option<f64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.parse::<f64>().unwrap_or(f64::NAN))
}

/// Sum of `price * quantity` over all lines, formatted with two decimals.
///
/// The sum saturates at the largest representable amount instead of
/// overflowing.
pub fn total_price(lines: &[CartLine]) -> String {
    let total = lines.iter().fold(Decimal::ZERO, |acc, line| {
        let subtotal = line.subtotal();
        acc.checked_add(subtotal).unwrap_or(if subtotal.is_sign_negative() {
            Decimal::MIN
        } else {
            Decimal::MAX
        })
    });
    let rounded = total.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.2}", rounded)
}

/// Brings an untrusted snapshot in line with the cart invariants.
///
/// # Behaviour
///
/// * Lines with quantity 0 are dropped.
/// * If an id appears more than once, the quantities are summed into the
///   first occurrence; its name and price are kept.
pub fn normalize_lines(lines: Vec<CartLine>) -> Vec<CartLine> {
    let mut normalized: Vec<CartLine> = Vec::with_capacity(lines.len());
    for incoming in lines {
        if incoming.quantity == 0 {
            continue;
        }
        if let Some(existing) = normalized.iter_mut().find(|l| l.id == incoming.id) {
            existing.quantity = existing.quantity.saturating_add(incoming.quantity);
        } else {
            normalized.push(incoming);
        }
    }
    normalized
}

/// Produces a human-readable one-line summary for a list of cart lines.
///
/// Example output: `"2x Mochi, 1x Tofu"`.
pub fn format_item_summary(lines: &[CartLine]) -> String {
    lines
        .iter()
        .map(|l| format!("{}x {}", l.quantity, l.name))
        .collect::<Vec<_>>()
        .join(", ")
}
