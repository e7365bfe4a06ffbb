use std::collections::BTreeMap;
use std::convert::Infallible;

use crate::{Money, Receipt, ReceiptParser, TaxId};

/// Cumulative sales, keyed by product and then by customer
pub type ProductSales = BTreeMap<String, BTreeMap<TaxId, Money>>;
/// Cumulative sales, keyed by customer and then by product
pub type CustomerSales = BTreeMap<TaxId, BTreeMap<String, Money>>;

/// The aggregated sales of all accepted receipts
///
/// The statistics hold two views of the same sales:
/// 1. Per product:
///    How much of a product every customer bought.
/// 2. Per customer:
///    How much a customer spent on every product.
///
/// Both views are only ever updated together, so for every product `p`
/// and tax id `t` the entry at `[p][t]` of the first view equals the
/// entry at `[t][p]` of the second.
#[derive(Debug, Default)]
pub struct SalesStats {
    product_sales: ProductSales,
    customer_sales: CustomerSales,
}

impl SalesStats {
    /// Creates new, empty statistics
    pub fn new() -> Self {
        Self {
            product_sales: BTreeMap::new(),
            customer_sales: BTreeMap::new(),
        }
    }

    /// Sales per product, broken down by customer
    pub fn product_sales(&self) -> &ProductSales {
        &self.product_sales
    }

    /// Sales per customer, broken down by product
    pub fn customer_sales(&self) -> &CustomerSales {
        &self.customer_sales
    }

    pub fn is_empty(&self) -> bool {
        self.product_sales.is_empty()
    }

    /// Adds all entries of a completed receipt to both views
    ///
    /// The receipt has to be validated beforehand, see [`ReceiptParser`].
    pub fn record(&mut self, receipt: Receipt) {
        for entry in receipt.entries() {
            let per_customer = self.product_sales
                .entry(entry.product().to_owned())
                .or_default()
                .entry(receipt.tax_id().clone())
                .or_default();
            *per_customer = per_customer.saturating_add(entry.total_price());

            let per_product = self.customer_sales
                .entry(receipt.tax_id().clone())
                .or_default()
                .entry(entry.product().to_owned())
                .or_default();
            *per_product = per_product.saturating_add(entry.total_price());
        }
    }

    /// Parses a complete ledger with a fresh parser and records every
    /// accepted receipt
    ///
    /// Returns the number of accepted receipts.
    pub fn ingest<I, S>(&mut self, lines: I) -> usize
        where I: IntoIterator<Item = S>,
              S: AsRef<str>,
    {
        match self.try_ingest(lines.into_iter().map(Ok::<S, Infallible>)) {
            Ok(accepted) => accepted,
            Err(never) => match never {},
        }
    }

    /// Like [`SalesStats::ingest`], but stops at the first line that failed
    /// to be read
    ///
    /// Receipts completed before the failing line stay recorded.
    pub fn try_ingest<I, S, E>(&mut self, lines: I) -> Result<usize, E>
        where I: IntoIterator<Item = Result<S, E>>,
              S: AsRef<str>,
    {
        let mut parser = ReceiptParser::new();
        let mut accepted = 0;

        for line in lines {
            if let Some(receipt) = parser.feed_line(line?.as_ref()) {
                self.record(receipt);
                accepted += 1;
            }
        }

        Ok(accepted)
    }

    /// Drops all recorded sales
    pub fn reset(&mut self) {
        self.product_sales.clear();
        self.customer_sales.clear();
    }
}
