use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use receipt_stats::{Report, SalesStats, TaxId};

const MENU: &str = "Give your preference: (1: read new input file, 2: print statistics for a specific product, 3: print statistics for a specific AFM, 4: exit the program)";
const ASK_INPUT: &str = "Give name/path to input file: ";
const ASK_PRODUCT: &str = "Give the product name: ";
const ASK_AFM: &str = "Give the AFM: ";

/// Sales statistics over receipt ledgers
#[derive(Debug, Parser)]
#[clap(version)]
struct Args {
    /// Receipt files to load before the menu starts
    inputs: Vec<PathBuf>,
    /// Drop all statistics whenever a new file is loaded from the menu
    #[clap(long)]
    reset_on_load: bool,
    /// Print the sales of this product and exit, instead of showing the menu
    #[clap(long = "product", value_name = "NAME")]
    products: Vec<String>,
    /// Print the sales to this customer and exit, instead of showing the menu
    #[clap(long = "afm", value_name = "AFM")]
    tax_ids: Vec<String>,
    /// Print reports as CSV
    #[clap(long)]
    csv: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Format {
    Plain,
    Csv,
}

/// The options of the interactive menu
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum MenuChoice {
    LoadFile,
    ProductStats,
    CustomerStats,
    Exit,
}

impl FromStr for MenuChoice {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1" => Ok(MenuChoice::LoadFile),
            "2" => Ok(MenuChoice::ProductStats),
            "3" => Ok(MenuChoice::CustomerStats),
            "4" => Ok(MenuChoice::Exit),
            other => anyhow::bail!("Unknown option `{}`, choose one of 1-4", other),
        }
    }
}

struct Shell<W> {
    stats: SalesStats,
    reset_on_load: bool,
    format: Format,
    output: W,
}

impl<W: Write> Shell<W> {
    fn new(reset_on_load: bool, format: Format, output: W) -> Self {
        Self {
            stats: SalesStats::new(),
            reset_on_load,
            format,
            output,
        }
    }

    /// Streams a file through a fresh parser into the statistics
    ///
    /// Receipts accepted before a read error stay recorded.
    fn ingest_file(&mut self, path: &Path) -> anyhow::Result<usize> {
        let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        let accepted = self.stats
            .try_ingest(BufReader::new(file).lines())
            .with_context(|| format!("Failed to read {}", path.display()))?;

        tracing::info!(path = %path.display(), accepted, "loaded receipts");
        Ok(accepted)
    }

    /// Loads a file on behalf of the menu, applying the reset policy
    fn load(&mut self, path: &Path) -> anyhow::Result<usize> {
        if self.reset_on_load {
            self.stats.reset();
        }
        self.ingest_file(path)
    }

    fn product_report(&self, product: &str) -> Option<Report> {
        self.stats.by_product(product)
    }

    /// Malformed tax ids never produce a report
    fn customer_report(&self, tax_id: &str) -> Option<Report> {
        match TaxId::from_str(tax_id.trim()) {
            Ok(tax_id) => self.stats.by_customer(&tax_id),
            Err(err) => {
                tracing::debug!(%err, "rejected tax id query");
                None
            }
        }
    }

    fn print_report(&mut self, report: Option<Report>) -> anyhow::Result<()> {
        let report = match report {
            Some(report) => report,
            None => return Ok(()),
        };

        match self.format {
            Format::Plain => writeln!(self.output, "{}", report)?,
            Format::Csv => {
                let mut writer = csv::WriterBuilder::new()
                    .has_headers(true)
                    .from_writer(&mut self.output);
                for line in report.lines() {
                    writer.serialize(line)?;
                }
                writer.flush()?;
            }
        }

        Ok(())
    }

    fn prompt<L>(&mut self, lines: &mut L, text: &str) -> anyhow::Result<Option<String>>
        where L: Iterator<Item = io::Result<String>>
    {
        write!(self.output, "{}", text)?;
        self.output.flush()?;

        Ok(lines.next().transpose()?)
    }

    /// Runs the interactive menu until the user exits or the input ends
    fn run<R: BufRead>(&mut self, input: R) -> anyhow::Result<()> {
        let mut lines = input.lines();

        loop {
            let choice = match self.prompt(&mut lines, &format!("{}\n", MENU))? {
                Some(choice) => choice,
                None => return Ok(()),
            };
            let choice = match choice.parse::<MenuChoice>() {
                Ok(choice) => choice,
                Err(err) => {
                    writeln!(self.output, "{}", err)?;
                    continue;
                }
            };

            match choice {
                MenuChoice::LoadFile => {
                    let path = match self.prompt(&mut lines, ASK_INPUT)? {
                        Some(path) => PathBuf::from(path.trim()),
                        None => return Ok(()),
                    };
                    // a failed load keeps whatever was recorded before the failure
                    if let Err(err) = self.load(&path) {
                        tracing::warn!("{:#}", err);
                    }
                }
                MenuChoice::ProductStats => {
                    let product = match self.prompt(&mut lines, ASK_PRODUCT)? {
                        Some(product) => product,
                        None => return Ok(()),
                    };
                    let report = self.product_report(&product);
                    self.print_report(report)?;
                }
                MenuChoice::CustomerStats => {
                    let tax_id = match self.prompt(&mut lines, ASK_AFM)? {
                        Some(tax_id) => tax_id,
                        None => return Ok(()),
                    };
                    let report = self.customer_report(&tax_id);
                    self.print_report(report)?;
                }
                MenuChoice::Exit => return Ok(()),
            }
        }
    }
}

/// Logs go to stderr, filtered by `RUST_LOG` (default: `warn`)
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();
    let format = match args.csv {
        true => Format::Csv,
        false => Format::Plain,
    };
    let mut shell = Shell::new(args.reset_on_load, format, io::stdout());

    for path in &args.inputs {
        // unreadable files are skipped, like failed loads from the menu
        if let Err(err) = shell.ingest_file(path) {
            tracing::warn!("{:#}", err);
        }
    }

    if args.products.is_empty() && args.tax_ids.is_empty() {
        return shell.run(io::stdin().lock());
    }

    for product in &args.products {
        let report = shell.product_report(product);
        shell.print_report(report)?;
    }
    for tax_id in &args.tax_ids {
        let report = shell.customer_report(tax_id);
        shell.print_report(report)?;
    }

    Ok(())
}
