pub use self::{
    line::{ItemLine, Line, TaxId, TaxIdError, TAX_ID_LABEL, TOTAL_LABEL},
    money::{Money, MoneyError},
    parser::{ParserState, ReceiptParser},
    receipt::{Receipt, ReceiptEntry, ReceiptError},
    report::{Report, ReportLine},
    stats::{CustomerSales, ProductSales, SalesStats},
};

mod line;
mod money;
mod parser;
mod receipt;
mod report;
mod stats;
