use rust_decimal::Decimal;

use crate::domain::bill::LineItem;
use crate::errors::DomainError;

/// The per-session working set of line items not yet committed to durable
/// storage. Lines are ordered and unique by item name; adding a name that is
/// already present increments its quantity instead of appending a duplicate.
///
/// The cart is owned by the calling session context and passed explicitly
/// into handlers; it holds no reference to any saved bill. The presentation
/// layer re-reads cart state after each mutating call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one unit of the named item. Merges into an existing line when
    /// the name is already present.
    pub fn add_item(&mut self, name: impl Into<String>, unit_price: Decimal) {
        let name = name.into();
        if let Some(line) = self.items.iter_mut().find(|line| line.name == name) {
            line.quantity += 1;
            return;
        }
        self.items.push(LineItem { name, unit_price, quantity: 1 });
    }

    /// Applies a quantity delta to the line at `index`. A result of zero or
    /// below removes the line; a quantity cannot go negative.
    pub fn change_quantity(&mut self, index: usize, delta: i64) -> Result<(), DomainError> {
        let len = self.items.len();
        let line =
            self.items.get_mut(index).ok_or(DomainError::LineOutOfRange { index, len })?;

        let next = i64::from(line.quantity) + delta;
        if next > 0 {
            line.quantity = u32::try_from(next).unwrap_or(u32::MAX);
            return Ok(());
        }
        self.items.remove(index);
        Ok(())
    }

    pub fn remove_item(&mut self, index: usize) -> Result<(), DomainError> {
        if index >= self.items.len() {
            return Err(DomainError::LineOutOfRange { index, len: self.items.len() });
        }
        self.items.remove(index);
        Ok(())
    }

    /// Recomputed from the current lines on every call; never cached.
    pub fn total(&self) -> Decimal {
        self.items.iter().map(LineItem::line_total).sum()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Owned copy for handing to the bill store, so later cart mutation
    /// cannot alter an already-saved bill.
    pub fn snapshot(&self) -> Vec<LineItem> {
        self.items.clone()
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
