use std::collections::BTreeMap;
use std::fmt;

use crate::{Money, SalesStats, TaxId};

/// One line of a report
///
/// Depending on the report, the key is either a tax id or a product name.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct ReportLine {
    pub key: String,
    pub amount: Money,
}

/// The sales of one product or one customer, ordered by ascending key
///
/// Displays as one `<key> <amount>` line per entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Report {
    lines: Vec<ReportLine>,
}

impl Report {
    fn from_sales<K: fmt::Display>(sales: &BTreeMap<K, Money>) -> Option<Self> {
        let lines: Vec<_> = sales
            .iter()
            .map(|(key, amount)| ReportLine {
                key: key.to_string(),
                amount: *amount,
            })
            .collect();

        (!lines.is_empty()).then(|| Self { lines })
    }

    pub fn lines(&self) -> &[ReportLine] {
        &self.lines
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{} {}", line.key, line.amount)?;
        }

        Ok(())
    }
}

impl SalesStats {
    /// The sales of a product per customer, ordered by tax id
    ///
    /// Product names are matched case-insensitively. Returns `None` if the
    /// product was never sold.
    pub fn by_product(&self, product: &str) -> Option<Report> {
        self.product_sales()
            .get(&product.trim().to_uppercase())
            .and_then(Report::from_sales)
    }

    /// The sales to a customer per product, ordered by product name
    ///
    /// Returns `None` if the customer never bought anything.
    pub fn by_customer(&self, tax_id: &TaxId) -> Option<Report> {
        self.customer_sales()
            .get(tax_id)
            .and_then(Report::from_sales)
    }
}
