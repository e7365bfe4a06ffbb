use crate::{ItemLine, Money, TaxId};

/// Possible errors to occur while building a receipt
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ReceiptError {
    #[error("{product}: {amount} x {unit_price} does not equal the line total {total_price}")]
    EntryTotalMismatch {
        product: String,
        amount: u32,
        unit_price: Money,
        total_price: Money,
    },
    #[error("The entries add up to {running}, but the receipt declares {declared}")]
    ReceiptTotalMismatch {
        running: Money,
        declared: Money,
    },
    #[error("The receipt total exceeds the representable range")]
    Overflow,
}

/// A single line item of a receipt
///
/// An entry can only be constructed if its total equals the unit price
/// multiplied by the amount.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReceiptEntry {
    product: String,
    amount: u32,
    unit_price: Money,
    total_price: Money,
}

impl ReceiptEntry {
    /// Creates a new entry, checking its arithmetic
    pub fn new(product: impl Into<String>, amount: u32, unit_price: Money, total_price: Money) -> Result<Self, ReceiptError> {
        let product = product.into().to_uppercase();
        match unit_price.checked_mul(amount) {
            Some(expected) if expected == total_price => Ok(Self {
                product,
                amount,
                unit_price,
                total_price,
            }),
            _ => Err(ReceiptError::EntryTotalMismatch {
                product,
                amount,
                unit_price,
                total_price,
            }),
        }
    }

    /// The product name, in uppercase
    pub fn product(&self) -> &str {
        &self.product
    }

    pub fn amount(&self) -> u32 {
        self.amount
    }

    pub fn unit_price(&self) -> Money {
        self.unit_price
    }

    pub fn total_price(&self) -> Money {
        self.total_price
    }
}

impl TryFrom<ItemLine> for ReceiptEntry {
    type Error = ReceiptError;

    fn try_from(item: ItemLine) -> Result<Self, Self::Error> {
        Self::new(item.product, item.amount, item.unit_price, item.total_price)
    }
}

/// The receipt of one customer
///
/// A receipt keeps its entries in the order they were added, together with
/// the running total of all entry totals. Once the declared total of the
/// receipt has been checked against the running total, the receipt is
/// complete.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Receipt {
    tax_id: TaxId,
    entries: Vec<ReceiptEntry>,
    running_total: Money,
    declared_total: Option<Money>,
}

impl Receipt {
    /// Creates a new receipt without entries
    pub fn new(tax_id: TaxId) -> Self {
        Self {
            tax_id,
            entries: Vec::new(),
            running_total: Money::zero(),
            declared_total: None,
        }
    }

    /// The tax id of the customer
    pub fn tax_id(&self) -> &TaxId {
        &self.tax_id
    }

    /// The entries, in the order they were added
    pub fn entries(&self) -> &[ReceiptEntry] {
        &self.entries
    }

    /// The sum of all entry totals
    pub fn running_total(&self) -> Money {
        self.running_total
    }

    /// The declared total, once it was confirmed by [`Receipt::confirm_total`]
    pub fn declared_total(&self) -> Option<Money> {
        self.declared_total
    }

    pub fn is_complete(&self) -> bool {
        self.declared_total.is_some()
    }

    /// Appends an entry and adds its total to the running total
    pub fn add_entry(&mut self, entry: ReceiptEntry) -> Result<(), ReceiptError> {
        self.running_total = self.running_total
            .checked_add(entry.total_price)
            .ok_or(ReceiptError::Overflow)?;
        self.entries.push(entry);

        Ok(())
    }

    /// Checks the declared total against the running total
    ///
    /// The receipt is only marked complete if both are equal.
    pub fn confirm_total(&mut self, declared: Money) -> Result<(), ReceiptError> {
        match self.running_total == declared {
            true => {
                self.declared_total = Some(declared);
                Ok(())
            }
            false => Err(ReceiptError::ReceiptTotalMismatch {
                running: self.running_total,
                declared,
            }),
        }
    }
}
