//! Inverse mutations for optimistic cart updates
//!
//! Every local mutation that is later confirmed against the remote store
//! produces a [`Rollback`] describing how to undo it. The controller applies
//! the rollback when the remote half of the operation fails.

use super::models::{CartLine, CatId};

/// The inverse of a single optimistic cart mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum Rollback {
    /// Undo a quantity increment on an existing line
    Decrement(CatId),
    /// Undo the append of a brand-new line
    DropAppended(CatId),
    /// Undo the removal of `line` from position `index`
    Reinsert { index: usize, line: CartLine },
    /// Undo a bulk clear by restoring the whole snapshot
    Restore(Vec<CartLine>),
}

impl Rollback {
    /// Applies the inverse mutation to `lines`.
    ///
    /// Lines are located by id rather than by position, since other
    /// operations may have touched the cart while the remote call was in
    /// flight. A decrement that would reach zero removes the line.
    pub fn apply(self, lines: &mut Vec<CartLine>) {
        match self {
            Self::Decrement(id) => {
                if let Some(index) = lines.iter().position(|l| l.id == id) {
                    if lines[index].quantity > 1 {
                        lines[index].quantity -= 1;
                    } else {
                        lines.remove(index);
                    }
                }
            }
            Self::DropAppended(id) => {
                if let Some(index) = lines.iter().rposition(|l| l.id == id) {
                    lines.remove(index);
                }
            }
            Self::Reinsert { index, line } => {
                if lines.iter().any(|l| l.id == line.id) {
                    return;
                }
                let index = index.min(lines.len());
                lines.insert(index, line);
            }
            Self::Restore(snapshot) => *lines = snapshot,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn line(id: i64, quantity: u32) -> CartLine {
        CartLine {
            id: CatId::new(id),
            name: format!("cat-{id}"),
            price: Decimal::new(10, 0),
            quantity,
        }
    }

    #[test]
    fn decrement_lowers_quantity() {
        let mut lines = vec![line(1, 3)];
        Rollback::Decrement(CatId::new(1)).apply(&mut lines);
        assert_eq!(lines, vec![line(1, 2)]);
    }

    #[test]
    fn decrement_never_leaves_a_zero_quantity_line() {
        let mut lines = vec![line(1, 1), line(2, 1)];
        Rollback::Decrement(CatId::new(1)).apply(&mut lines);
        assert_eq!(lines, vec![line(2, 1)]);
    }

    #[test]
    fn drop_appended_removes_the_line() {
        let mut lines = vec![line(1, 1), line(2, 1)];
        Rollback::DropAppended(CatId::new(2)).apply(&mut lines);
        assert_eq!(lines, vec![line(1, 1)]);
    }

    #[test]
    fn reinsert_restores_original_position() {
        let mut lines = vec![line(1, 1), line(3, 1)];
        Rollback::Reinsert {
            index: 1,
            line: line(2, 4),
        }
        .apply(&mut lines);
        assert_eq!(lines, vec![line(1, 1), line(2, 4), line(3, 1)]);
    }

    #[test]
    fn reinsert_clamps_to_the_end_of_a_shorter_cart() {
        let mut lines = vec![];
        Rollback::Reinsert {
            index: 5,
            line: line(2, 1),
        }
        .apply(&mut lines);
        assert_eq!(lines, vec![line(2, 1)]);
    }

    #[test]
    fn reinsert_skips_when_id_came_back_meanwhile() {
        let mut lines = vec![line(2, 1)];
        Rollback::Reinsert {
            index: 0,
            line: line(2, 5),
        }
        .apply(&mut lines);
        assert_eq!(lines, vec![line(2, 1)]);
    }

    #[test]
    fn restore_replaces_everything() {
        let mut lines = vec![line(9, 1)];
        Rollback::Restore(vec![line(1, 2), line(2, 1)]).apply(&mut lines);
        assert_eq!(lines, vec![line(1, 2), line(2, 1)]);
    }
}
