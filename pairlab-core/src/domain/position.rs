//! Position tracking, one slot per instrument.

use super::instrument::{InstrumentId, MAX_INSTRUMENTS};
use serde::{Deserialize, Serialize};

/// Long-only integer share position.
///
/// `entry_price` is set when the position opens from zero and cleared when it
/// returns to zero. Scale-ins keep the first entry price.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub quantity: u64,
    pub entry_price: Option<f64>,
}

impl Position {
    pub fn is_flat(&self) -> bool {
        self.quantity == 0
    }

    pub fn market_value(&self, price: f64) -> f64 {
        self.quantity as f64 * price
    }

    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        match self.entry_price {
            Some(entry) if self.quantity > 0 => (price - entry) * self.quantity as f64,
            _ => 0.0,
        }
    }

    /// Return relative to the entry price, if long.
    pub fn return_since_entry(&self, price: f64) -> Option<f64> {
        match self.entry_price {
            Some(entry) if self.quantity > 0 && entry > 0.0 => Some((price - entry) / entry),
            _ => None,
        }
    }

    pub(crate) fn add(&mut self, quantity: u64, price: f64) {
        if self.quantity == 0 {
            self.entry_price = Some(price);
        }
        self.quantity += quantity;
    }

    pub(crate) fn remove(&mut self, quantity: u64) {
        debug_assert!(quantity <= self.quantity);
        self.quantity -= quantity;
        if self.quantity == 0 {
            self.entry_price = None;
        }
    }
}

/// Fixed-size, index-addressed positions for a universe.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionBook {
    slots: [Position; MAX_INSTRUMENTS],
    len: usize,
}

impl PositionBook {
    pub fn new(len: usize) -> Self {
        Self { slots: [Position::default(); MAX_INSTRUMENTS], len: len.min(MAX_INSTRUMENTS) }
    }

    pub fn get(&self, id: InstrumentId) -> &Position {
        &self.slots[id.0]
    }

    pub(crate) fn get_mut(&mut self, id: InstrumentId) -> &mut Position {
        &mut self.slots[id.0]
    }

    pub fn iter(&self) -> impl Iterator<Item = (InstrumentId, &Position)> {
        self.slots[..self.len].iter().enumerate().map(|(i, p)| (InstrumentId(i), p))
    }

    pub fn quantities(&self) -> Vec<u64> {
        self.slots[..self.len].iter().map(|p| p.quantity).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_price_set_on_open_and_kept_on_scale_in() {
        let mut pos = Position::default();
        pos.add(10, 100.0);
        pos.add(5, 120.0);
        assert_eq!(pos.quantity, 15);
        assert_eq!(pos.entry_price, Some(100.0));
    }

    #[test]
    fn entry_price_cleared_when_flat() {
        let mut pos = Position::default();
        pos.add(10, 100.0);
        pos.remove(4);
        assert_eq!(pos.entry_price, Some(100.0));
        pos.remove(6);
        assert!(pos.is_flat());
        assert_eq!(pos.entry_price, None);
        pos.add(3, 90.0);
        assert_eq!(pos.entry_price, Some(90.0));
    }

    #[test]
    fn unrealized_and_return() {
        let mut pos = Position::default();
        assert_eq!(pos.unrealized_pnl(50.0), 0.0);
        assert_eq!(pos.return_since_entry(50.0), None);
        pos.add(10, 100.0);
        assert!((pos.unrealized_pnl(110.0) - 100.0).abs() < 1e-10);
        assert!((pos.return_since_entry(95.0).unwrap() + 0.05).abs() < 1e-12);
    }

    #[test]
    fn book_iterates_only_universe_slots() {
        let mut book = PositionBook::new(1);
        book.get_mut(InstrumentId(0)).add(7, 10.0);
        assert_eq!(book.quantities(), vec![7]);
        assert_eq!(book.iter().count(), 1);
    }
}
