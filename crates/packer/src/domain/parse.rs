//! Parsing of `CAPACITY : (INDEX,WEIGHT,€VALUE) ...` package lines.

use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::errors::PackageError;
use crate::domain::model::{Amount, Item, Package};

static ITEM_GROUP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(([^)]*)\)").expect("item group pattern compiles"));

impl Package {
    /// Parse and validate a single package line.
    pub fn parse(line: &str) -> Result<Self, PackageError> {
        let (head, rest) = line
            .split_once(':')
            .ok_or_else(|| PackageError::InvalidCapacity(line.trim().to_string()))?;

        let head = head.trim();
        let capacity: Amount = head
            .parse()
            .map_err(|_| PackageError::InvalidCapacity(head.to_string()))?;

        let leftover = ITEM_GROUP.replace_all(rest, "");
        let leftover = leftover.trim();
        if !leftover.is_empty() {
            return Err(PackageError::malformed(
                leftover,
                "text outside of an item group",
            ));
        }

        let items = ITEM_GROUP
            .captures_iter(rest)
            .map(|group| group[1].parse::<Item>())
            .collect::<Result<Vec<_>, _>>()?;

        Package::new(capacity, items)
    }
}

impl FromStr for Package {
    type Err = PackageError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        Package::parse(line)
    }
}

impl FromStr for Item {
    type Err = PackageError;

    /// Parse the inside of one group, e.g. `1,53.38,€45`.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = text.split(',').map(str::trim).collect();
        let [index, weight, value] = fields.as_slice() else {
            return Err(PackageError::malformed(
                text,
                format!("expected index, weight and value but found {} fields", fields.len()),
            ));
        };

        let index: i64 = index
            .parse()
            .map_err(|_| PackageError::malformed(text, "index is not an integer"))?;
        if index <= 0 {
            return Err(PackageError::DuplicateOrInvalidIndex(index));
        }
        let index = u32::try_from(index)
            .map_err(|_| PackageError::malformed(text, "index is too large"))?;

        let weight: Amount = weight
            .parse()
            .map_err(|err| PackageError::malformed(text, format!("weight {err}")))?;
        let value: Amount = strip_currency(value)
            .parse()
            .map_err(|err| PackageError::malformed(text, format!("value {err}")))?;

        Ok(Item::new(index, weight, value))
    }
}

fn strip_currency(value: &str) -> &str {
    value.trim_start_matches(|c: char| !(c.is_ascii_digit() || matches!(c, '.' | '-' | '+')))
}
