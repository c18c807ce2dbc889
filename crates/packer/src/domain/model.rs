//! Domain models for items, packages, and selections.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::domain::errors::PackageError;

/// Largest capacity a package may declare, in whole units.
pub const MAX_CAPACITY: u64 = 100;
/// Largest number of candidate items a package may hold.
pub const MAX_ITEMS: usize = 15;

/// Non-negative fixed-point quantity with two decimal places.
///
/// Weights, values and capacities are all stored as integer hundredths so sums compare
/// exactly against the capacity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(u64);

impl Amount {
    pub const ZERO: Amount = Amount(0);
    /// Number of hundredths in one whole unit.
    pub const SCALE: u64 = 100;

    pub const fn from_hundredths(hundredths: u64) -> Self {
        Self(hundredths)
    }

    pub const fn from_units(units: u64) -> Self {
        Self(units * Self::SCALE)
    }

    pub const fn hundredths(self) -> u64 {
        self.0
    }

    pub fn saturating_add(self, other: Amount) -> Amount {
        Amount(self.0.saturating_add(other.0))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / Self::SCALE, self.0 % Self::SCALE)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Error returned when text is not a valid [`Amount`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{0}' is not a non-negative number with at most two decimals")]
pub struct AmountParseError(String);

impl FromStr for Amount {
    type Err = AmountParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let text = value.trim();
        let invalid = || AmountParseError(text.to_string());

        let (whole, fraction) = match text.split_once('.') {
            Some((whole, fraction)) if !fraction.is_empty() && fraction.len() <= 2 => {
                (whole, fraction)
            }
            Some(_) => return Err(invalid()),
            None => (text, ""),
        };
        let all_digits = |part: &str| part.bytes().all(|byte| byte.is_ascii_digit());
        if whole.is_empty() || !all_digits(whole) || !all_digits(fraction) {
            return Err(invalid());
        }

        let whole: u64 = whole.parse().map_err(|_| invalid())?;
        // "5" is 50 hundredths, "05" is 5.
        let fraction: u64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<u64>().map_err(|_| invalid())? * 10,
            _ => fraction.parse().map_err(|_| invalid())?,
        };

        whole
            .checked_mul(Self::SCALE)
            .and_then(|scaled| scaled.checked_add(fraction))
            .map(Amount)
            .ok_or_else(invalid)
    }
}

/// A single candidate for a package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Item {
    pub index: u32,
    pub weight: Amount,
    pub value: Amount,
}

impl Item {
    pub fn new(index: u32, weight: Amount, value: Amount) -> Self {
        Self {
            index,
            weight,
            value,
        }
    }
}

/// One optimization problem: a capacity and the items competing for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    capacity: Amount,
    items: Vec<Item>,
}

impl Package {
    /// Build a package, enforcing the capacity and item count maxima and index uniqueness.
    pub fn new(capacity: Amount, items: Vec<Item>) -> Result<Self, PackageError> {
        if capacity > Amount::from_units(MAX_CAPACITY) {
            return Err(PackageError::InvalidCapacity(capacity.to_string()));
        }
        if items.len() > MAX_ITEMS {
            return Err(PackageError::TooManyItems(items.len()));
        }

        let mut seen = Vec::with_capacity(items.len());
        for item in &items {
            if item.index == 0 || seen.contains(&item.index) {
                return Err(PackageError::DuplicateOrInvalidIndex(i64::from(item.index)));
            }
            seen.push(item.index);
        }

        Ok(Self { capacity, items })
    }

    pub fn capacity(&self) -> Amount {
        self.capacity
    }

    /// Items in their current order (textual order unless re-sorted).
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether the item could be packed on its own.
    pub fn fits(&self, item: &Item) -> bool {
        item.weight <= self.capacity
    }

    /// Borrowed view ordered by ascending weight, lighter index first on ties.
    pub fn items_by_weight(&self) -> Vec<&Item> {
        let mut ordered: Vec<&Item> = self.items.iter().collect();
        ordered.sort_by_key(|item| (item.weight, item.index));
        ordered
    }

    pub fn sort_items_by_weight(&mut self) {
        self.items.sort_by_key(|item| (item.weight, item.index));
    }

    pub fn sort_items_by_index(&mut self) {
        self.items.sort_by_key(|item| item.index);
    }
}

/// The subset of a package's items chosen by a strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Selection {
    indices: Vec<u32>,
    total_weight: Amount,
    total_value: Amount,
}

impl Selection {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Collect the given items, keeping their indices in ascending order.
    pub fn from_items<'a>(items: impl IntoIterator<Item = &'a Item>) -> Self {
        let mut selection = Self::empty();
        for item in items {
            selection.indices.push(item.index);
            selection.total_weight = selection.total_weight.saturating_add(item.weight);
            selection.total_value = selection.total_value.saturating_add(item.value);
        }
        selection.indices.sort_unstable();
        selection
    }

    /// Chosen indices, ascending.
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn total_weight(&self) -> Amount {
        self.total_weight
    }

    pub fn total_value(&self) -> Amount {
        self.total_value
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amount(text: &str) -> Amount {
        text.parse().expect("valid amount")
    }

    fn item(index: u32, weight: &str, value: &str) -> Item {
        Item::new(index, amount(weight), amount(value))
    }

    #[test]
    fn parses_amounts_into_hundredths() {
        assert_eq!(amount("53.38").hundredths(), 5338);
        assert_eq!(amount("15.3").hundredths(), 1530);
        assert_eq!(amount("15.03").hundredths(), 1503);
        assert_eq!(amount("45").hundredths(), 4500);
        assert_eq!(amount(" 0 ").hundredths(), 0);
    }

    #[test]
    fn rejects_malformed_amounts() {
        for text in ["", "-1", "+1", "1.234", "1.", ".5", "1e3", "abc", "1.2.3", "€5"] {
            assert!(text.parse::<Amount>().is_err(), "accepted {text:?}");
        }
    }

    #[test]
    fn displays_two_decimals() {
        assert_eq!(amount("15.3").to_string(), "15.30");
        assert_eq!(amount("7").to_string(), "7.00");
        assert_eq!(Amount::from_hundredths(5).to_string(), "0.05");
    }

    #[test]
    fn rejects_capacity_above_maximum() {
        let err = Package::new(amount("100.01"), Vec::new()).unwrap_err();
        assert!(matches!(err, PackageError::InvalidCapacity(_)));
        assert!(Package::new(amount("100"), Vec::new()).is_ok());
    }

    #[test]
    fn rejects_more_than_fifteen_items() {
        let items: Vec<Item> = (1..=16).map(|index| item(index, "1", "1")).collect();
        let err = Package::new(amount("10"), items).unwrap_err();
        assert_eq!(err, PackageError::TooManyItems(16));
    }

    #[test]
    fn rejects_zero_and_duplicate_indices() {
        let zero = Package::new(amount("10"), vec![item(0, "1", "1")]).unwrap_err();
        assert_eq!(zero, PackageError::DuplicateOrInvalidIndex(0));

        let duplicate =
            Package::new(amount("10"), vec![item(2, "1", "1"), item(2, "3", "4")]).unwrap_err();
        assert_eq!(duplicate, PackageError::DuplicateOrInvalidIndex(2));
    }

    #[test]
    fn sorts_by_weight_then_back_by_index() {
        let mut package = Package::new(
            amount("50"),
            vec![item(1, "30", "1"), item(2, "10", "1"), item(3, "10", "1")],
        )
        .unwrap();

        let borrowed: Vec<u32> = package.items_by_weight().iter().map(|i| i.index).collect();
        assert_eq!(borrowed, vec![2, 3, 1]);

        package.sort_items_by_weight();
        let sorted: Vec<u32> = package.items().iter().map(|i| i.index).collect();
        assert_eq!(sorted, vec![2, 3, 1]);

        package.sort_items_by_index();
        let restored: Vec<u32> = package.items().iter().map(|i| i.index).collect();
        assert_eq!(restored, vec![1, 2, 3]);
    }

    #[test]
    fn selection_totals_and_orders_indices() {
        let items = [item(9, "6.76", "64"), item(8, "19.36", "79")];
        let selection = Selection::from_items(&items);
        assert_eq!(selection.indices(), &[8, 9]);
        assert_eq!(selection.total_weight(), amount("26.12"));
        assert_eq!(selection.total_value(), amount("143"));
    }
}
