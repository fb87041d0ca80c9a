//! Tally CLI - Customers, invoices and exports from the terminal
//!
//! Thin client over the Tally HTTP API.

mod api;
mod config;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use dialoguer::{Confirm, Input};
use serde::Deserialize;
use std::fs;
use std::io::Read;
use std::path::PathBuf;
use uuid::Uuid;

use api::{CreateCustomerRequest, InvoiceFilter, InvoiceResponse, TallyClient};
use config::Config;

#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Tally CLI - Customers, invoices and exports", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show or change configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },

    /// Check the API is reachable
    Health,

    /// Customer operations
    Customer {
        #[command(subcommand)]
        action: CustomerAction,
    },

    /// Invoice operations
    Invoice {
        #[command(subcommand)]
        action: InvoiceAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Set the API base URL
    SetUrl {
        /// e.g. https://tally.example.com
        url: String,
    },
}

#[derive(Subcommand)]
enum CustomerAction {
    /// List all customers
    List,
    /// Show one customer by code
    Show {
        code: String,
    },
    /// Add a customer (prompts for missing fields)
    Add {
        #[arg(long)]
        code: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        zip_code: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },
    /// Remove a customer by code
    Remove {
        code: String,
        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Import customers from CSV (columns: code,name,zip_code,address,phone)
    Import {
        file: PathBuf,
    },
}

#[derive(Subcommand)]
enum InvoiceAction {
    /// List invoices, newest first
    List {
        /// Match invoice number, buyer or customer code
        #[arg(short, long)]
        search: Option<String>,
        /// Earliest invoice date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Latest invoice date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,
        #[arg(short, long)]
        page: Option<u32>,
        #[arg(short, long)]
        limit: Option<u32>,
    },
    /// Show one invoice with its items
    Show {
        id: Uuid,
    },
    /// Create an invoice from a JSON file ("-" reads stdin)
    Create {
        #[arg(short, long)]
        file: String,
    },
    /// Delete an invoice
    Delete {
        id: Uuid,
        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Show the dates an invoice number may carry
    Constraints {
        /// Invoice number, e.g. AB12345678
        number: String,
        /// Invoice being edited (never its own neighbour)
        #[arg(long)]
        exclude: Option<Uuid>,
    },
    /// Download invoices as CSV, PDF or Excel
    Export {
        format: ExportFormat,
        #[arg(short, long)]
        search: Option<String>,
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
        /// Output path (defaults to the server's file name)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    Csv,
    Pdf,
    Excel,
}

impl ExportFormat {
    fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Pdf => "pdf",
            ExportFormat::Excel => "excel",
        }
    }

    fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Pdf => "pdf",
            ExportFormat::Excel => "xlsx",
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Commands::Config { action } => cmd_config(action.unwrap_or(ConfigAction::Show)),
        Commands::Health => cmd_health().await,
        Commands::Customer { action } => cmd_customer(action).await,
        Commands::Invoice { action } => cmd_invoice(action).await,
    }
}

fn client() -> Result<(Config, TallyClient)> {
    let config = Config::load()?;
    let client = TallyClient::new(&config.effective_base_url());
    Ok((config, client))
}

// ============================================
// Command Implementations
// ============================================

fn cmd_config(action: ConfigAction) -> Result<()> {
    let mut config = Config::load()?;

    match action {
        ConfigAction::Show => {
            println!("{}", "Configuration:".bold());
            println!("  Path: {:?}", Config::config_path()?);
            println!("  Base URL: {}", config.base_url);
            if std::env::var(config::API_URL_ENV).is_ok() {
                println!(
                    "  {} {} overrides it: {}",
                    "!".yellow(),
                    config::API_URL_ENV,
                    config.effective_base_url()
                );
            }
            println!(
                "  Page size: {}",
                config
                    .page_size
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| "server default".to_string())
            );
        }
        ConfigAction::SetUrl { url } => {
            config.set_base_url(&url);
            config.save()?;
            println!("{} Base URL set to {}", "✓".green(), config.base_url);
        }
    }

    Ok(())
}

async fn cmd_health() -> Result<()> {
    let (config, client) = client()?;
    print!("Checking {} ... ", config.effective_base_url());

    match client.health().await {
        Ok(health) => {
            println!("{} ({} v{})", "OK".green(), health.status, health.version);
            Ok(())
        }
        Err(e) => {
            println!("{}", "Failed".red());
            Err(e)
        }
    }
}

async fn cmd_customer(action: CustomerAction) -> Result<()> {
    let (_, client) = client()?;

    match action {
        CustomerAction::List => {
            let customers = client.list_customers().await?;

            if customers.is_empty() {
                println!("No customers found.");
                return Ok(());
            }

            println!("{}", "Customers:".bold());
            for customer in customers {
                println!(
                    "  {} {} {}",
                    customer.code.cyan(),
                    customer.name,
                    customer.phone.as_deref().unwrap_or("").dimmed()
                );
            }
        }

        CustomerAction::Show { code } => {
            let customer = client
                .find_customer(&code)
                .await?
                .with_context(|| format!("Customer '{}' not found", code))?;

            println!("{} {}", customer.code.cyan().bold(), customer.name.bold());
            println!("  ID:       {}", customer.id.to_string().dimmed());
            println!("  Zip code: {}", customer.zip_code.as_deref().unwrap_or("-"));
            println!("  Address:  {}", customer.address.as_deref().unwrap_or("-"));
            println!("  Phone:    {}", customer.phone.as_deref().unwrap_or("-"));
        }

        CustomerAction::Add {
            code,
            name,
            zip_code,
            address,
            phone,
        } => {
            let code = match code {
                Some(c) => c,
                None => Input::new()
                    .with_prompt("Customer code")
                    .interact_text()
                    .context("Failed to read input")?,
            };
            let name = match name {
                Some(n) => n,
                None => Input::new()
                    .with_prompt("Name")
                    .interact_text()
                    .context("Failed to read input")?,
            };

            let customer = client
                .create_customer(&CreateCustomerRequest {
                    code,
                    name,
                    zip_code,
                    address,
                    phone,
                })
                .await?;

            println!("{} Customer {} added ({})", "✓".green(), customer.code.cyan(), customer.name);
        }

        CustomerAction::Remove { code, yes } => {
            let customer = client
                .find_customer(&code)
                .await?
                .with_context(|| format!("Customer '{}' not found", code))?;

            if !yes && !confirm(&format!("Remove customer {} ({})?", customer.code, customer.name))? {
                println!("Cancelled.");
                return Ok(());
            }

            client.delete_customer(customer.id).await?;
            println!("{} Customer {} removed", "✓".green(), customer.code.cyan());
        }

        CustomerAction::Import { file } => {
            let reader = fs::File::open(&file)
                .with_context(|| format!("Failed to open {:?}", file))?;
            let rows = read_customer_rows(reader)?;

            let (mut added, mut skipped) = (0, 0);
            for row in rows {
                if client.find_customer(&row.code).await?.is_some() {
                    println!("  {} {} already exists, skipped", "-".yellow(), row.code);
                    skipped += 1;
                    continue;
                }
                client.create_customer(&row).await?;
                println!("  {} {} {}", "+".green(), row.code.cyan(), row.name);
                added += 1;
            }

            println!(
                "{} Imported {} customers ({} skipped)",
                "✓".green(),
                added.to_string().green(),
                skipped
            );
        }
    }

    Ok(())
}

async fn cmd_invoice(action: InvoiceAction) -> Result<()> {
    let (config, client) = client()?;

    match action {
        InvoiceAction::List {
            search,
            from,
            to,
            page,
            limit,
        } => {
            let filter = InvoiceFilter { search, from, to };
            let result = client
                .list_invoices(&filter, page, limit.or(config.page_size))
                .await?;

            if result.data.is_empty() {
                println!("No invoices found.");
                return Ok(());
            }

            println!(
                "{} (page {}/{}, {} total)",
                "Invoices:".bold(),
                result.page,
                result.total_pages.max(1),
                result.total
            );
            for invoice in &result.data {
                println!("  {}", invoice_summary(invoice));
            }
        }

        InvoiceAction::Show { id } => {
            let invoice = client.get_invoice(id).await?;
            print_invoice(&invoice);
        }

        InvoiceAction::Create { file } => {
            let content = if file == "-" {
                let mut buf = String::new();
                std::io::stdin()
                    .read_to_string(&mut buf)
                    .context("Failed to read stdin")?;
                buf
            } else {
                fs::read_to_string(&file).with_context(|| format!("Failed to read file: {}", file))?
            };
            let body: serde_json::Value =
                serde_json::from_str(&content).context("Invoice file is not valid JSON")?;

            let invoice = client.create_invoice(&body).await?;
            println!("{} Invoice created", "✓".green());
            print_invoice(&invoice);
        }

        InvoiceAction::Delete { id, yes } => {
            let invoice = client.get_invoice(id).await?;

            if !yes && !confirm(&format!("Delete invoice {}?", invoice.invoice_number))? {
                println!("Cancelled.");
                return Ok(());
            }

            client.delete_invoice(id).await?;
            println!("{} Invoice {} deleted", "✓".green(), invoice.invoice_number.cyan());
        }

        InvoiceAction::Constraints { number, exclude } => {
            let c = client.date_constraints(&number, exclude).await?;

            println!("{} {}", "Date constraints for".bold(), number.cyan());
            match &c.prev_invoice {
                Some(prev) => println!(
                    "  Previous: {} on {} ({})",
                    prev.invoice_number.cyan(),
                    prev.invoice_date,
                    prev.id.to_string().dimmed()
                ),
                None => println!("  Previous: {}", "none".dimmed()),
            }
            match &c.next_invoice {
                Some(next) => println!(
                    "  Next:     {} on {} ({})",
                    next.invoice_number.cyan(),
                    next.invoice_date,
                    next.id.to_string().dimmed()
                ),
                None => println!("  Next:     {}", "none".dimmed()),
            }
            println!("  Allowed:  {}", describe_range(c.min_date, c.max_date).green());
        }

        InvoiceAction::Export {
            format,
            search,
            from,
            to,
            output,
        } => {
            let filter = InvoiceFilter { search, from, to };
            let export = client.export(format.as_str(), &filter).await?;

            let path = output.unwrap_or_else(|| {
                PathBuf::from(export.file_name.clone().unwrap_or_else(|| {
                    format!(
                        "invoices_{}.{}",
                        chrono::Local::now().date_naive(),
                        format.extension()
                    )
                }))
            });

            fs::write(&path, &export.bytes)
                .with_context(|| format!("Failed to write {:?}", path))?;
            println!(
                "{} Saved {} ({} bytes)",
                "✓".green(),
                path.display().to_string().cyan(),
                export.bytes.len()
            );
        }
    }

    Ok(())
}

// ============================================
// Helpers
// ============================================

fn confirm(prompt: &str) -> Result<bool> {
    Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .context("Failed to read confirmation")
}

/// Customer CSV row
#[derive(Debug, Deserialize)]
struct CustomerRow {
    code: String,
    name: String,
    zip_code: Option<String>,
    address: Option<String>,
    phone: Option<String>,
}

/// Parse customer rows; blank codes are dropped, empty columns become `None`
fn read_customer_rows<R: Read>(reader: R) -> Result<Vec<CreateCustomerRequest>> {
    let mut csv = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let mut rows = Vec::new();
    for (index, record) in csv.deserialize::<CustomerRow>().enumerate() {
        let row = record.with_context(|| format!("Invalid customer row {}", index + 2))?;
        if row.code.is_empty() {
            continue;
        }
        rows.push(CreateCustomerRequest {
            code: row.code,
            name: row.name,
            zip_code: row.zip_code.filter(|s| !s.is_empty()),
            address: row.address.filter(|s| !s.is_empty()),
            phone: row.phone.filter(|s| !s.is_empty()),
        });
    }
    Ok(rows)
}

fn invoice_status(invoice: &InvoiceResponse) -> Option<&'static str> {
    if invoice.is_voided {
        Some("VOID")
    } else if invoice.is_blank {
        Some("BLANK")
    } else {
        None
    }
}

fn invoice_summary(invoice: &InvoiceResponse) -> String {
    let status = invoice_status(invoice)
        .map(|s| format!(" [{}]", s))
        .unwrap_or_default();
    format!(
        "{} {} {} {}{}",
        invoice.invoice_number,
        invoice.invoice_date,
        truncate_string(&invoice.buyer, 24),
        invoice.tax_included_amount,
        status
    )
}

fn print_invoice(invoice: &InvoiceResponse) {
    println!(
        "{} {}{}",
        invoice.invoice_number.cyan().bold(),
        invoice.invoice_date,
        invoice_status(invoice)
            .map(|s| format!(" [{}]", s).red().to_string())
            .unwrap_or_default()
    );
    println!("  ID:       {}", invoice.id.to_string().dimmed());
    println!(
        "  Customer: {} {}",
        invoice.customer_code.as_deref().unwrap_or("-"),
        invoice.buyer
    );
    if invoice.is_dual_format {
        println!("  Format:   {}", "dual (amounts include tax)".dimmed());
    }

    for item in &invoice.items {
        println!(
            "  - {} x{} @ {} = {}",
            item.product_name, item.quantity, item.unit_price, item.amount
        );
    }

    println!("  Tax excluded: {}", invoice.tax_excluded_amount);
    println!("  Tax (5%):     {}", invoice.tax);
    println!("  Total:        {}", invoice.tax_included_amount.to_string().green());
}

fn describe_range(min: Option<NaiveDate>, max: Option<NaiveDate>) -> String {
    match (min, max) {
        (Some(min), Some(max)) => format!("{} .. {}", min, max),
        (Some(min), None) => format!("on or after {}", min),
        (None, Some(max)) => format!("on or before {}", max),
        (None, None) => "any date".to_string(),
    }
}

/// Truncate string safely for UTF-8 (by char count, not bytes)
fn truncate_string(s: &str, max_chars: usize) -> String {
    let chars: Vec<char> = s.chars().take(max_chars).collect();
    if s.chars().count() > max_chars {
        format!("{}...", chars.into_iter().collect::<String>())
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_customer_rows() {
        let data = "code,name,zip_code,address,phone\n\
                    C001,Acme,100,Taipei,02-1234\n\
                    C002, Contoso ,,,\n\
                    ,Nobody,,,\n";

        let rows = read_customer_rows(data.as_bytes()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].phone.as_deref(), Some("02-1234"));
        assert_eq!(rows[1].name, "Contoso");
        assert_eq!(rows[1].zip_code, None);
    }

    #[test]
    fn test_read_customer_rows_reports_bad_row() {
        let data = "code,name\nC001\n";
        assert!(read_customer_rows(data.as_bytes()).is_err());
    }

    #[test]
    fn test_describe_range() {
        let d = |day| NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
        assert_eq!(describe_range(Some(d(10)), Some(d(12))), "2024-01-10 .. 2024-01-12");
        assert_eq!(describe_range(None, Some(d(12))), "on or before 2024-01-12");
        assert_eq!(describe_range(None, None), "any date");
    }

    #[test]
    fn test_truncate_string_counts_chars() {
        assert_eq!(truncate_string("發票清單測試", 4), "發票清單...");
        assert_eq!(truncate_string("short", 10), "short");
    }

    #[test]
    fn test_cli_parses_export_command() {
        let cli = Cli::try_parse_from([
            "tally", "invoice", "export", "excel", "--from", "2024-01-01", "-o", "out.xlsx",
        ])
        .unwrap();

        match cli.command {
            Commands::Invoice {
                action: InvoiceAction::Export { format, from, output, .. },
            } => {
                assert_eq!(format.extension(), "xlsx");
                assert_eq!(from, NaiveDate::from_ymd_opt(2024, 1, 1));
                assert_eq!(output, Some(PathBuf::from("out.xlsx")));
            }
            _ => panic!("expected invoice export"),
        }
    }
}
