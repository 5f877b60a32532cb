//! # Command Line Front End
//!
//! One invocation is one register session: config is loaded, the database
//! opened, a fresh cart created, and the subcommand runs against them.
//!
//! ```text
//! retreat-register items
//! retreat-register add-item "Icon Print" --price 25.00 --variant "Size=Small,Large"
//! retreat-register buy --buyer "Jane" --payment venmo "Holy Bible (NRSV):2" "Retreat T-Shirt;Size=L;Color=Navy"
//! retreat-register buy --buyer "Tom" --save-for-later "Retreat Hoodie;Size=M"
//! retreat-register complete <receipt-id> --payment card
//! retreat-register history --saved
//! retreat-register receipt <receipt-id>
//! retreat-register revenue
//! retreat-register export --kind by-item --dir ./exports
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use retreat_core::report::ReportKind;
use retreat_core::{DisplayItem, ItemVariant, Money, PaymentMethod, ReceiptData};
use retreat_db::{Database, DbConfig};
use tracing::{info, warn};

use crate::commands::{self, history::HistoryFilter};
use crate::error::ApiError;
use crate::share::FileShare;
use crate::state::{CartState, ConfigState, DbState};

#[derive(Debug, Parser)]
#[command(name = "retreat-register", about = "Retreat bookstore register", long_about = None)]
pub struct Cli {
    /// Config file (defaults to register.toml in the platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List the catalog
    Items,
    /// Add a catalog item
    AddItem(AddItemArgs),
    /// Delete a catalog item by id or name
    RemoveItem { reference: String },
    /// Ring up a sale (or park it with --save-for-later)
    Buy(BuyArgs),
    /// Check out a saved-for-later receipt
    Complete(CompleteArgs),
    /// List receipts
    History(HistoryArgs),
    /// Show one receipt by id
    Receipt { id: String },
    /// Revenue over checked-out receipts
    Revenue,
    /// Export purchase history as CSV
    Export(ExportArgs),
    /// Delete a receipt
    DeleteReceipt { id: String },
}

#[derive(Debug, Args)]
struct AddItemArgs {
    name: String,

    /// Unit price, e.g. 12.50
    #[arg(long, value_parser = parse_money)]
    price: Money,

    /// Variant axis, e.g. "Size=S,M,L" (repeatable)
    #[arg(long = "variant", value_parser = parse_variant)]
    variants: Vec<ItemVariant>,
}

#[derive(Debug, Args)]
struct BuyArgs {
    #[arg(long)]
    buyer: String,

    #[arg(long, default_value = "cash")]
    payment: PaymentMethod,

    #[arg(long)]
    save_for_later: bool,

    /// Lines as NAME[:QTY][;KEY=VALUE...], e.g. "Retreat T-Shirt:2;Size=L"
    #[arg(required = true, value_parser = parse_line)]
    lines: Vec<LineSpec>,
}

#[derive(Debug, Args)]
struct CompleteArgs {
    id: String,

    /// Payment method, if different from the one saved
    #[arg(long)]
    payment: Option<PaymentMethod>,
}

#[derive(Debug, Args)]
struct HistoryArgs {
    /// Buyer name contains this text (any status)
    #[arg(long, conflicts_with_all = ["saved", "all"])]
    buyer: Option<String>,

    /// Saved-for-later receipts only
    #[arg(long, conflicts_with = "all")]
    saved: bool,

    /// Every receipt regardless of status
    #[arg(long)]
    all: bool,
}

#[derive(Debug, Args)]
struct ExportArgs {
    #[arg(long, default_value = "combined")]
    kind: ReportKind,

    /// Output directory (overrides export_dir from config)
    #[arg(long, conflicts_with = "stdout")]
    dir: Option<PathBuf>,

    /// Print the CSV instead of writing a file
    #[arg(long)]
    stdout: bool,
}

/// One requested cart line.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LineSpec {
    reference: String,
    quantity: i64,
    selections: BTreeMap<String, String>,
}

impl Cli {
    pub async fn run(self) -> Result<(), ApiError> {
        let config = ConfigState::load(self.config)?;
        let db = DbState::new(open_database(&config).await?);

        if db.inner().load_sample_data_if_first_run().await? {
            info!("Sample catalog loaded");
        }

        let cart = CartState::new();
        let outcome = dispatch(self.command, &db, &cart, &config).await;

        db.inner().close().await;
        outcome
    }
}

async fn dispatch(
    command: Commands,
    db: &DbState,
    cart: &CartState,
    config: &ConfigState,
) -> Result<(), ApiError> {
    match command {
        Commands::Items => {
            let items = commands::catalog::list_items(db, cart).await?;
            println!("{} ({} items)", config.store_name, items.len());
            for item in &items {
                print_item(item);
            }
        }
        Commands::AddItem(args) => {
            let item = commands::catalog::add_item(db, &args.name, args.price, args.variants).await?;
            print_item(&item);
        }
        Commands::RemoveItem { reference } => {
            let item = commands::catalog::find_item(db, &reference).await?;
            commands::catalog::delete_item(db, &item.id).await?;
            println!("Removed {}", item.name);
        }
        Commands::Buy(args) => {
            for line in &args.lines {
                commands::cart::add_item_to_cart(db, cart, &line.reference, line.quantity, &line.selections)
                    .await?;
            }
            commands::cart::set_payment_method(cart, args.payment)?;

            let receipt = if args.save_for_later {
                commands::checkout::save_for_later(db, cart, &args.buyer).await?
            } else {
                commands::checkout::checkout(db, cart, &args.buyer).await?
            };
            print_receipt(&receipt);
        }
        Commands::Complete(args) => {
            let resumed = commands::history::resume_receipt(db, cart, &args.id).await?;
            if let Some(method) = args.payment {
                commands::cart::set_payment_method(cart, method)?;
            }

            match commands::checkout::checkout(db, cart, &resumed.buyer_name).await {
                Ok(receipt) => print_receipt(&receipt),
                Err(err) => {
                    // Put the receipt back so it is not lost with this session's cart
                    if let Err(restore) =
                        commands::checkout::save_for_later(db, cart, &resumed.buyer_name).await
                    {
                        warn!(receipt_id = %args.id, %restore, "Failed to restore saved receipt");
                    }
                    return Err(err);
                }
            }
        }
        Commands::History(args) => {
            let filter = match (args.buyer, args.saved, args.all) {
                (Some(buyer), _, _) => HistoryFilter::Buyer(buyer),
                (None, true, _) => HistoryFilter::Saved,
                (None, false, true) => HistoryFilter::All,
                (None, false, false) => HistoryFilter::Purchased,
            };
            let receipts = commands::history::list_receipts(db, filter).await?;
            for receipt in &receipts {
                print_receipt(receipt);
            }
            println!("{} receipt(s)", receipts.len());
        }
        Commands::Receipt { id } => {
            let receipt = commands::history::get_receipt(db, &id).await?;
            print_receipt(&receipt);
        }
        Commands::Revenue => {
            let summary = commands::history::revenue_summary(db).await?;
            for (method, total) in &summary.by_method {
                println!("{:<8} {}", method.as_str(), total);
            }
            println!("{:<8} {} over {} receipt(s)", "TOTAL", summary.total, summary.receipt_count);
        }
        Commands::Export(args) => {
            if args.stdout {
                print!("{}", commands::export::render_csv(db, config, args.kind).await?);
            } else {
                let share = FileShare::new(args.dir.unwrap_or_else(|| config.export_dir_or_default()));
                let response = commands::export::export_csv(db, config, &share, args.kind).await?;
                println!(
                    "Exported {} receipt(s) to {}",
                    response.receipt_count, response.location
                );
            }
        }
        Commands::DeleteReceipt { id } => {
            commands::history::delete_receipt(db, &id).await?;
            println!("Deleted receipt {}", id);
        }
    }

    Ok(())
}

async fn open_database(config: &ConfigState) -> Result<Database, ApiError> {
    let path = crate::get_database_path(config)?;
    info!(?path, "Database path determined");

    let db = Database::new(DbConfig::new(path)).await?;
    info!("Database connected and migrations applied");
    Ok(db)
}

// =============================================================================
// Output
// =============================================================================

fn print_item(item: &DisplayItem) {
    let variants: Vec<String> = item
        .variants
        .iter()
        .map(|v| format!("{}: {}", v.key, v.value_list.join("|")))
        .collect();

    println!(
        "{}  {:<28} {:>9}  {}{}",
        item.id,
        item.name,
        item.price.to_string(),
        variants.join("; "),
        if item.is_in_cart { "  (in cart)" } else { "" }
    );
}

fn print_receipt(receipt: &ReceiptData) {
    println!(
        "{}  {}  {:<20} {:<14} {:<6} {:>9}",
        receipt.date_time.format("%Y/%m/%d %H:%M"),
        receipt.id,
        receipt.buyer_name,
        receipt.checkout_status.as_str(),
        receipt.payment_method.as_str(),
        receipt.total_price().to_string()
    );
    for line in &receipt.checkout_list {
        println!(
            "    {} x {:<28} {:<24} {:>9}",
            line.quantity,
            line.item_name,
            line.variants_label(),
            line.total_price.to_string()
        );
    }
}

// =============================================================================
// Argument Parsers
// =============================================================================

/// `12`, `12.5`, `12.50` or `$12.50` → cents.
fn parse_money(raw: &str) -> Result<Money, String> {
    let text = raw.trim().trim_start_matches('$');
    let (whole, fraction) = text.split_once('.').unwrap_or((text, ""));

    let digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if whole.is_empty() || fraction.len() > 2 || !digits(whole) || !digits(fraction) {
        return Err(format!("invalid amount '{}', expected e.g. 12.50", raw));
    }

    let major: i64 = whole.parse().map_err(|_| format!("amount '{}' is too large", raw))?;
    let minor: i64 = if fraction.is_empty() {
        0
    } else {
        format!("{:0<2}", fraction)
            .parse()
            .map_err(|_| format!("invalid amount '{}'", raw))?
    };

    major
        .checked_mul(100)
        .and_then(|cents| cents.checked_add(minor))
        .map(Money::from_cents)
        .ok_or_else(|| format!("amount '{}' is too large", raw))
}

/// `Size=S,M,L` → variant axis.
fn parse_variant(raw: &str) -> Result<ItemVariant, String> {
    let (key, values) = raw
        .split_once('=')
        .ok_or_else(|| format!("invalid variant '{}', expected KEY=VALUE,VALUE", raw))?;

    let values: Vec<&str> = values.split(',').map(str::trim).filter(|v| !v.is_empty()).collect();
    Ok(ItemVariant::new(key.trim(), values))
}

/// `NAME[:QTY][;KEY=VALUE...]` → cart line request.
fn parse_line(raw: &str) -> Result<LineSpec, String> {
    let mut parts = raw.split(';');
    let head = parts.next().unwrap_or_default().trim();

    let (reference, quantity) = match head.rsplit_once(':') {
        Some((name, qty)) => match qty.trim().parse::<i64>() {
            Ok(qty) => (name.trim(), qty),
            Err(_) => (head, 1),
        },
        None => (head, 1),
    };
    if reference.is_empty() {
        return Err(format!("missing item name in '{}'", raw));
    }

    let mut selections = BTreeMap::new();
    for part in parts.map(str::trim).filter(|p| !p.is_empty()) {
        let (key, value) = part
            .split_once('=')
            .ok_or_else(|| format!("invalid selection '{}', expected KEY=VALUE", part))?;
        selections.insert(key.trim().to_string(), value.trim().to_string());
    }

    Ok(LineSpec {
        reference: reference.to_string(),
        quantity,
        selections,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_money() {
        assert_eq!(parse_money("12").unwrap(), Money::from_cents(1200));
        assert_eq!(parse_money("12.5").unwrap(), Money::from_cents(1250));
        assert_eq!(parse_money("$0.05").unwrap(), Money::from_cents(5));
        assert!(parse_money("12.505").is_err());
        assert!(parse_money("-3").is_err());
        assert!(parse_money("abc").is_err());
        assert!(parse_money(".50").is_err());
    }

    #[test]
    fn test_parse_variant() {
        let variant = parse_variant("Size = S, M ,L").unwrap();
        assert_eq!(variant, ItemVariant::new("Size", ["S", "M", "L"]));
        assert!(parse_variant("Size").is_err());
    }

    #[test]
    fn test_parse_line() {
        let line = parse_line("Retreat T-Shirt:2;Size=L; Color = Navy").unwrap();
        assert_eq!(line.reference, "Retreat T-Shirt");
        assert_eq!(line.quantity, 2);
        assert_eq!(line.selections["Size"], "L");
        assert_eq!(line.selections["Color"], "Navy");

        let line = parse_line("Worship CD").unwrap();
        assert_eq!((line.reference.as_str(), line.quantity), ("Worship CD", 1));

        // A colon not followed by a number is part of the name
        let line = parse_line("Psalms: A Reader").unwrap();
        assert_eq!((line.reference.as_str(), line.quantity), ("Psalms: A Reader", 1));

        assert!(parse_line(":3").is_err());
        assert!(parse_line("Hoodie;Size").is_err());
    }

    #[test]
    fn test_cli_parses_buy() {
        let cli = Cli::try_parse_from([
            "retreat-register",
            "buy",
            "--buyer",
            "Jane",
            "--payment",
            "venmo",
            "Holy Bible (NRSV):2",
        ])
        .unwrap();

        match cli.command {
            Commands::Buy(args) => {
                assert_eq!(args.payment, PaymentMethod::Venmo);
                assert!(!args.save_for_later);
                assert_eq!(args.lines.len(), 1);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_report_kind() {
        assert!(Cli::try_parse_from(["retreat-register", "export", "--kind", "pie-chart"]).is_err());

        let cli = Cli::try_parse_from(["retreat-register", "export", "--kind", "per-variant"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Export(ExportArgs { kind: ReportKind::PerVariant, .. })
        ));
    }

    #[test]
    fn test_cli_parses_receipt() {
        let cli = Cli::try_parse_from(["retreat-register", "receipt", "r-42"]).unwrap();
        assert!(matches!(cli.command, Commands::Receipt { ref id } if id == "r-42"));
        assert!(Cli::try_parse_from(["retreat-register", "receipt"]).is_err());
    }

    #[test]
    fn test_cli_history_flags_conflict() {
        assert!(Cli::try_parse_from(["retreat-register", "history", "--saved", "--all"]).is_err());
    }
}
