use std::mem;

use crate::{Line, Receipt, ReceiptEntry, ReceiptError};

/// The observable state of a [`ReceiptParser`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParserState {
    /// No separator was seen yet
    NotInitialized,
    /// A separator was seen, a header is expected next
    Initialized,
    /// A header was read, an item is expected next
    AfmProvided,
    /// At least one item was read
    EntryProvided,
    /// The declared total matched, a closing separator is expected next
    TotalProvided,
    /// A receipt was just emitted; the next block may start right away
    Completed,
    /// The current block is broken and is skipped until the next separator
    Invalid,
}

/// The internal state, carrying the receipt under construction
#[derive(Debug)]
enum State {
    NotInitialized,
    Initialized,
    AfmProvided(Receipt),
    EntryProvided(Receipt),
    TotalProvided(Receipt),
    Completed,
    Invalid,
}

/// Why a block was abandoned
#[derive(Debug, thiserror::Error)]
enum Rejection {
    #[error("Unexpected line, {0}")]
    Unexpected(&'static str),
    #[error(transparent)]
    Receipt(#[from] ReceiptError),
}

/// A line based parser for receipt ledgers
///
/// The parser consumes one line at a time and emits a receipt whenever a
/// block is closed by a separator after its total was confirmed. Any line
/// that doesn't fit the block abandons the receipt under construction; the
/// parser then skips everything up to the next separator.
///
/// A parser is meant to be used for a single input stream. To read another
/// file, create a new parser.
#[derive(Debug)]
pub struct ReceiptParser {
    state: State,
    line_number: usize,
}

impl Default for ReceiptParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ReceiptParser {
    /// Creates a new parser that waits for the first separator
    pub fn new() -> Self {
        Self {
            state: State::NotInitialized,
            line_number: 0,
        }
    }

    /// The current state of the parser
    pub fn state(&self) -> ParserState {
        match self.state {
            State::NotInitialized => ParserState::NotInitialized,
            State::Initialized => ParserState::Initialized,
            State::AfmProvided(_) => ParserState::AfmProvided,
            State::EntryProvided(_) => ParserState::EntryProvided,
            State::TotalProvided(_) => ParserState::TotalProvided,
            State::Completed => ParserState::Completed,
            State::Invalid => ParserState::Invalid,
        }
    }

    /// Feeds the next line of the input
    ///
    /// Returns the completed receipt if this line closed a valid block.
    pub fn feed_line(&mut self, line: &str) -> Option<Receipt> {
        self.line_number += 1;
        let line = Line::classify(line);
        let state = mem::replace(&mut self.state, State::Invalid);

        match Self::transition(state, line) {
            Ok((next, completed)) => {
                self.state = next;
                if let Some(receipt) = &completed {
                    tracing::trace!(
                        line = self.line_number,
                        tax_id = %receipt.tax_id(),
                        entries = receipt.entries().len(),
                        "receipt accepted"
                    );
                }
                completed
            }
            Err(rejection) => {
                tracing::debug!(line = self.line_number, reason = %rejection, "receipt block rejected");
                self.state = State::Invalid;
                None
            }
        }
    }

    fn transition(state: State, line: Line) -> Result<(State, Option<Receipt>), Rejection> {
        let next = match (state, line) {
            (State::NotInitialized, Line::Separator) => State::Initialized,
            (State::NotInitialized, _) => State::NotInitialized,

            (State::Initialized | State::Completed, Line::Separator) => State::Initialized,
            (State::Initialized | State::Completed, Line::Header(tax_id)) => State::AfmProvided(Receipt::new(tax_id)),
            (State::Initialized | State::Completed, _) => return Err(Rejection::Unexpected("expected a tax id header")),

            // an unfinished block is dropped and the separator opens the next one
            (State::AfmProvided(_) | State::EntryProvided(_), Line::Separator) => State::Initialized,
            (State::AfmProvided(mut receipt) | State::EntryProvided(mut receipt), Line::Item(item)) => {
                receipt.add_entry(ReceiptEntry::try_from(item)?)?;
                State::EntryProvided(receipt)
            }
            (State::EntryProvided(mut receipt), Line::Total(declared)) => {
                receipt.confirm_total(declared)?;
                State::TotalProvided(receipt)
            }
            (State::AfmProvided(_), _) => return Err(Rejection::Unexpected("expected an item")),
            (State::EntryProvided(_), _) => return Err(Rejection::Unexpected("expected an item or the total")),

            (State::TotalProvided(receipt), Line::Separator) => return Ok((State::Completed, Some(receipt))),
            (State::TotalProvided(_), _) => return Err(Rejection::Unexpected("expected a closing separator")),

            (State::Invalid, Line::Separator) => State::Initialized,
            (State::Invalid, _) => State::Invalid,
        };

        Ok((next, None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use ParserState::*;

    const SEPARATOR: &str = "----------";
    const HEADER: &str = "ΑΦΜ: 1234567890";
    const ITEM: &str = "MILK: 2 1.50 3.00";
    const BAD_ITEM: &str = "MILK: 2 1.50 3.01";
    const TOTAL: &str = "ΣΥΝΟΛΟ: 3.00";
    const BAD_TOTAL: &str = "ΣΥΝΟΛΟ: 3.01";
    const GARBAGE: &str = "hello world";

    /// Feeds all lines and checks the state after each one
    macro_rules! transition_test {
        (
            $name:ident
            $( $line:ident => $state:ident ),+ $(,)?
        ) => {
            #[test]
            fn $name() {
                let mut parser = ReceiptParser::new();
                $(
                    let emitted = parser.feed_line($line);
                    assert_eq!(parser.state(), $state, "after `{}`", $line);
                    assert_eq!(emitted.is_some(), $state == Completed, "after `{}`", $line);
                )+
            }
        };
    }

    transition_test!(not_initialized_waits_for_separator
        HEADER => NotInitialized,
        ITEM => NotInitialized,
        TOTAL => NotInitialized,
        GARBAGE => NotInitialized,
        SEPARATOR => Initialized,
    );
    transition_test!(mismatching_total_invalidates_block
        SEPARATOR => Initialized,
        HEADER => AfmProvided,
        ITEM => EntryProvided,
        ITEM => EntryProvided,
        BAD_TOTAL => Invalid,
    );
    transition_test!(single_item_block
        SEPARATOR => Initialized,
        HEADER => AfmProvided,
        ITEM => EntryProvided,
        TOTAL => TotalProvided,
        SEPARATOR => Completed,
    );
    transition_test!(initialized_rejects_everything_but_headers
        SEPARATOR => Initialized,
        SEPARATOR => Initialized,
        ITEM => Invalid,
        SEPARATOR => Initialized,
        TOTAL => Invalid,
        SEPARATOR => Initialized,
        GARBAGE => Invalid,
    );
    transition_test!(afm_provided
        SEPARATOR => Initialized,
        HEADER => AfmProvided,
        HEADER => Invalid,
        SEPARATOR => Initialized,
        HEADER => AfmProvided,
        TOTAL => Invalid,
        SEPARATOR => Initialized,
        HEADER => AfmProvided,
        BAD_ITEM => Invalid,
        SEPARATOR => Initialized,
        HEADER => AfmProvided,
        SEPARATOR => Initialized,
    );
    transition_test!(entry_provided
        SEPARATOR => Initialized,
        HEADER => AfmProvided,
        ITEM => EntryProvided,
        BAD_ITEM => Invalid,
        SEPARATOR => Initialized,
        HEADER => AfmProvided,
        ITEM => EntryProvided,
        HEADER => Invalid,
        SEPARATOR => Initialized,
        HEADER => AfmProvided,
        ITEM => EntryProvided,
        GARBAGE => Invalid,
        SEPARATOR => Initialized,
        HEADER => AfmProvided,
        ITEM => EntryProvided,
        SEPARATOR => Initialized,
    );
    transition_test!(total_provided_needs_separator
        SEPARATOR => Initialized,
        HEADER => AfmProvided,
        ITEM => EntryProvided,
        TOTAL => TotalProvided,
        ITEM => Invalid,
        SEPARATOR => Initialized,
        HEADER => AfmProvided,
        ITEM => EntryProvided,
        TOTAL => TotalProvided,
        TOTAL => Invalid,
    );
    transition_test!(completed_starts_next_block
        SEPARATOR => Initialized,
        HEADER => AfmProvided,
        ITEM => EntryProvided,
        TOTAL => TotalProvided,
        SEPARATOR => Completed,
        HEADER => AfmProvided,
        ITEM => EntryProvided,
        TOTAL => TotalProvided,
        SEPARATOR => Completed,
        SEPARATOR => Initialized,
    );
    transition_test!(completed_rejects_items
        SEPARATOR => Initialized,
        HEADER => AfmProvided,
        ITEM => EntryProvided,
        TOTAL => TotalProvided,
        SEPARATOR => Completed,
        ITEM => Invalid,
    );
    transition_test!(invalid_recovers_on_separator
        SEPARATOR => Initialized,
        GARBAGE => Invalid,
        HEADER => Invalid,
        ITEM => Invalid,
        TOTAL => Invalid,
        SEPARATOR => Initialized,
        HEADER => AfmProvided,
    );

    fn parse(input: &str) -> Vec<Receipt> {
        let mut parser = ReceiptParser::new();
        input.lines().filter_map(|line| parser.feed_line(line)).collect()
    }

    #[test]
    fn emits_validated_receipt() {
        let receipts = parse(
            "----------
             ΑΦΜ: 1234567890
             MILK: 2 1.50 3.00
             bread: 1 2.50 2.50
             ΣΥΝΟΛΟ: 5.50
             ----------",
        );

        assert_eq!(receipts.len(), 1);
        let receipt = &receipts[0];
        assert_eq!(receipt.tax_id().as_str(), "1234567890");
        assert_eq!(
            receipt.entries().iter().map(ReceiptEntry::product).collect::<Vec<_>>(),
            ["MILK", "BREAD"],
        );
        assert_eq!(receipt.declared_total(), Some("5.50".parse().unwrap()));
        assert_eq!(receipt.running_total(), "5.50".parse().unwrap());
    }

    #[test]
    fn skips_broken_blocks_only() {
        let receipts = parse(
            "----------
             ΑΦΜ: 1111111111
             MILK: 2 1.50 3.00
             ΣΥΝΟΛΟ: 3.01
             ----------
             ΑΦΜ: 2222222222
             MILK: 1 1.50 1.50
             ΣΥΝΟΛΟ: 1.50
             ----------
             ΑΦΜ: 3333333333
             MILK: 1 1.50 1.49
             ΣΥΝΟΛΟ: 1.49
             ----------",
        );

        assert_eq!(
            receipts.iter().map(|receipt| receipt.tax_id().as_str()).collect::<Vec<_>>(),
            ["2222222222"],
        );
    }

    #[test]
    fn reserved_labels_are_not_products() {
        let receipts = parse(
            "----------
             ΑΦΜ: 1234567890
             ΑΦΜ: 1 1.00 1.00
             ΣΥΝΟΛΟ: 1.00
             ----------
             ΑΦΜ: 1234567890
             MILK: 1 1.00 1.00
             ΣΥΝΟΛΟ: 1 1.00 1.00
             ΣΥΝΟΛΟ: 2.00
             ----------",
        );

        assert!(receipts.is_empty());
    }

    #[test]
    fn block_without_closing_separator_is_dropped() {
        let receipts = parse(
            "----------
             ΑΦΜ: 1234567890
             MILK: 2 1.50 3.00
             ΣΥΝΟΛΟ: 3.00",
        );

        assert!(receipts.is_empty());
    }
}
