use std::fmt;
use std::str::FromStr;

use crate::Money;

/// Label of the line opening a receipt, followed by the customer's tax id
pub const TAX_ID_LABEL: &str = "ΑΦΜ:";
/// Label of the line holding the declared total of a receipt
pub const TOTAL_LABEL: &str = "ΣΥΝΟΛΟ:";

const TAX_ID_LEN: usize = 10;

/// Possible errors to occur while reading a tax id
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum TaxIdError {
    #[error("A tax id has exactly 10 characters, found {0}")]
    Length(usize),
    #[error("A tax id only consists of the digits 0-9")]
    NonNumeric,
}

/// The tax identifier (AFM) of a customer
///
/// Always exactly ten ASCII digits, without sign or separators.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaxId(String);

impl TaxId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for TaxId {
    type Err = TaxIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let len = s.chars().count();
        if len != TAX_ID_LEN {
            return Err(TaxIdError::Length(len));
        }
        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TaxIdError::NonNumeric);
        }

        Ok(Self(s.to_owned()))
    }
}

impl fmt::Display for TaxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The fields of an item line, before any arithmetic is checked
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemLine {
    /// The product name, in uppercase
    pub product: String,
    pub amount: u32,
    pub unit_price: Money,
    pub total_price: Money,
}

/// The category of a single ledger line
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Line {
    /// A line of dashes, delimiting receipt blocks
    Separator,
    /// `ΑΦΜ: <tax id>`
    Header(TaxId),
    /// `<PRODUCT>: <amount> <unit price> <total price>`
    Item(ItemLine),
    /// `ΣΥΝΟΛΟ: <total>`
    Total(Money),
    Unrecognized,
}

impl Line {
    /// Classifies a raw line of text
    ///
    /// Only the shape of each field is checked here; whether the prices add
    /// up is decided by the receipt model.
    pub fn classify(line: &str) -> Line {
        let line = line.trim();
        if !line.is_empty() && line.chars().all(|c| c == '-') {
            return Line::Separator;
        }

        let tokens: Vec<&str> = line.split_whitespace().collect();
        match tokens.as_slice() {
            [label, tax_id] if is_label(label, TAX_ID_LABEL) => tax_id
                .parse()
                .map_or(Line::Unrecognized, Line::Header),
            [label, total] if is_label(label, TOTAL_LABEL) => total
                .parse()
                .map_or(Line::Unrecognized, Line::Total),
            [label, ..] if is_label(label, TAX_ID_LABEL) || is_label(label, TOTAL_LABEL) => Line::Unrecognized,
            [product, amount, unit_price, total_price] => {
                classify_item(product, amount, unit_price, total_price)
                    .map_or(Line::Unrecognized, Line::Item)
            }
            _ => Line::Unrecognized,
        }
    }
}

fn is_label(token: &str, label: &str) -> bool {
    token.to_uppercase() == label
}

fn classify_item(product: &str, amount: &str, unit_price: &str, total_price: &str) -> Option<ItemLine> {
    let product = product.strip_suffix(':')?;
    if product.is_empty() || product.contains(':') {
        return None;
    }
    if !amount.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let amount: u32 = amount.parse().ok().filter(|&amount| amount > 0)?;

    Some(ItemLine {
        product: product.to_uppercase(),
        amount,
        unit_price: unit_price.parse().ok()?,
        total_price: total_price.parse().ok()?,
    })
}
