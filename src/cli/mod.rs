use anyhow::Result;
use chrono::Local;
use clap::{Parser, Subcommand};

use crate::application::{BillingService, WorkAnalysis};
use crate::domain::{CustomerId, Owner, PositionedEntry, format_amount};

/// Excavator Billing - work ledger and bill sender
#[derive(Parser)]
#[command(name = "excavator-billing")]
#[command(about = "Track excavator rental hours per customer and send bill totals")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, default_value = "excavator_data.db")]
    pub database: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Operator account to act as (omit to use the shared ledger)
    #[arg(long, global = true, env = "EXCAVATOR_ACCOUNT")]
    pub account: Option<String>,

    /// Password for --account
    #[arg(long, global = true, env = "EXCAVATOR_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Create an operator account
    Signup {
        /// Account name (must be unique)
        name: String,

        /// Password for the new account
        #[arg(long = "new-password")]
        new_password: String,

        /// Contact number
        #[arg(short, long)]
        mobile: Option<String>,
    },

    /// Customer management commands
    #[command(subcommand)]
    Customer(CustomerCommands),

    /// Record hours worked for a customer
    Work {
        /// Customer id
        customer: CustomerId,

        /// Hours worked
        #[arg(long)]
        hours: f64,

        /// Cost per hour
        #[arg(long)]
        rate: f64,

        /// Date of the work (defaults to today)
        #[arg(long)]
        date: Option<String>,
    },

    /// List every ledger entry with its position
    Entries,

    /// Delete the entry at a position shown by `entries` or `customer show`
    DeleteEntry {
        /// Position in the current ledger snapshot
        position: usize,
    },

    /// Show a customer's bill total and the link to send it
    Bill {
        /// Customer id
        customer: CustomerId,
    },

    /// Hours worked over time for a customer
    Analysis {
        /// Customer id
        customer: CustomerId,

        /// Output format: table, json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
}

#[derive(Subcommand)]
pub enum CustomerCommands {
    /// Add a new customer
    Add {
        /// Customer name
        name: String,

        /// Mobile number with country code, e.g. 91XXXXXXXXXX
        mobile: String,
    },

    /// List customers
    List,

    /// Show a customer's work entries and bill total
    Show {
        /// Customer id
        id: CustomerId,
    },

    /// Delete a customer and all of their entries
    Delete {
        /// Customer id
        id: CustomerId,
    },
}

impl Cli {
    /// Resolve the ledger owner from --account/--password.
    async fn owner(&self, service: &BillingService) -> Result<Owner> {
        match &self.account {
            Some(name) => {
                let password = self
                    .password
                    .as_deref()
                    .ok_or_else(|| anyhow::anyhow!("--password is required with --account"))?;
                let account = service.login(name, password).await?;
                Ok(account.owner())
            }
            None => Ok(Owner::Shared),
        }
    }

    pub async fn run(self) -> Result<()> {
        let service = BillingService::init(&self.database).await?;

        match &self.command {
            Commands::Init => {
                println!("Database initialized: {}", self.database);
            }

            Commands::Signup {
                name,
                new_password,
                mobile,
            } => {
                let account = service
                    .signup(name, new_password, mobile.as_deref())
                    .await?;
                println!("Created account: {} ({})", account.name, account.id);
            }

            Commands::Customer(customer_cmd) => {
                let owner = self.owner(&service).await?;
                run_customer_command(&service, owner, customer_cmd).await?;
            }

            Commands::Work {
                customer,
                hours,
                rate,
                date,
            } => {
                let owner = self.owner(&service).await?;
                let date = date
                    .clone()
                    .unwrap_or_else(|| Local::now().date_naive().to_string());

                match service
                    .record_work(owner, *customer, &date, *hours, *rate)
                    .await?
                {
                    Some(entry) => println!(
                        "Added {} hours for {} on {} at ₹{}/hr",
                        hours, entry.customer_name, date, rate
                    ),
                    None => println!("No customer with id {}; nothing recorded.", customer),
                }
            }

            Commands::Entries => {
                let owner = self.owner(&service).await?;
                let entries = service.entries(owner).await?;
                if entries.is_empty() {
                    println!("No entries found.");
                } else {
                    print_entries(&entries, true);
                }
            }

            Commands::DeleteEntry { position } => {
                let owner = self.owner(&service).await?;
                match service.delete_entry(owner, *position).await? {
                    Some(_) => println!("Entry deleted successfully!"),
                    None => println!("No entry at position {}; nothing deleted.", position),
                }
            }

            Commands::Bill { customer } => {
                let owner = self.owner(&service).await?;
                let bill = service.bill(owner, *customer).await?;
                println!("{}", bill.message);
                println!("Send via WhatsApp: {}", bill.link);
            }

            Commands::Analysis { customer, format } => {
                let owner = self.owner(&service).await?;
                match service.analysis(owner, *customer).await? {
                    Some(analysis) => print_analysis(&analysis, format)?,
                    None => println!("No data available for analysis."),
                }
            }
        }

        Ok(())
    }
}

async fn run_customer_command(
    service: &BillingService,
    owner: Owner,
    cmd: &CustomerCommands,
) -> Result<()> {
    match cmd {
        CustomerCommands::Add { name, mobile } => {
            let name = name.trim();
            let mobile = mobile.trim();
            if name.is_empty() || mobile.is_empty() {
                anyhow::bail!("Please enter a valid name and mobile number");
            }
            let customer = service.add_customer(owner, name, mobile).await?;
            println!("Customer '{}' added with id {}", customer.name, customer.id);
        }

        CustomerCommands::List => {
            let customers = service.customers(owner).await?;
            if customers.is_empty() {
                println!("No customers found.");
            } else {
                println!("{:<6} {:<24} {:<16}", "ID", "NAME", "MOBILE");
                println!("{}", "-".repeat(48));
                for customer in customers {
                    println!(
                        "{:<6} {:<24} {:<16}",
                        customer.id,
                        truncate(&customer.name, 24),
                        customer.contact
                    );
                }
            }
        }

        CustomerCommands::Show { id } => {
            let bill = service.bill(owner, *id).await?;
            let history = service.customer_history(owner, *id).await?;

            println!("Customer: {} ({})", bill.customer.name, bill.customer.contact);
            println!();
            if history.is_empty() {
                println!("No work recorded.");
            } else {
                print_entries(&history, false);
            }
            println!();
            println!("Total: ₹{}", format_amount(bill.total));
        }

        CustomerCommands::Delete { id } => {
            let removed = service.delete_customer(owner, *id).await?;
            println!("Deleted customer {} ({} entries)", id, removed);
        }
    }

    Ok(())
}

fn print_entries(entries: &[PositionedEntry], with_customer: bool) {
    if with_customer {
        println!(
            "{:<5} {:<20} {:<12} {:>8} {:>10} {:>12}",
            "POS", "CUSTOMER", "DATE", "HOURS", "RATE", "TOTAL"
        );
        println!("{}", "-".repeat(72));
    } else {
        println!(
            "{:<5} {:<12} {:>8} {:>10} {:>12}",
            "POS", "DATE", "HOURS", "RATE", "TOTAL"
        );
        println!("{}", "-".repeat(51));
    }

    for PositionedEntry { position, entry } in entries {
        let date = entry.date.as_deref().unwrap_or("-");
        let hours = entry.hours.map(format_amount).unwrap_or_else(|| "-".into());
        let rate = entry.rate.map(format_amount).unwrap_or_else(|| "-".into());
        let total = entry
            .total_cost
            .map(format_amount)
            .unwrap_or_else(|| "-".into());

        if with_customer {
            println!(
                "{:<5} {:<20} {:<12} {:>8} {:>10} {:>12}",
                position,
                truncate(&entry.customer_name, 20),
                date,
                hours,
                rate,
                total
            );
        } else {
            println!(
                "{:<5} {:<12} {:>8} {:>10} {:>12}",
                position, date, hours, rate, total
            );
        }
    }
}

fn print_analysis(analysis: &WorkAnalysis, format: &str) -> Result<()> {
    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(analysis)?);
        }
        "csv" => {
            let mut writer = csv::Writer::from_writer(std::io::stdout());
            writer.write_record(["date", "hours", "total_cost"])?;
            for point in &analysis.points {
                writer.write_record([
                    point.date.to_string(),
                    point.hours.to_string(),
                    point.total_cost.to_string(),
                ])?;
            }
            writer.flush()?;
        }
        _ => {
            println!("Work Analysis for {}", analysis.customer.name);
            println!();
            if analysis.points.is_empty() {
                println!("No valid date entries found for this customer.");
                return Ok(());
            }
            println!("{:<12} {:>8} {:>12}", "DATE", "HOURS", "TOTAL");
            println!("{}", "-".repeat(34));
            for point in &analysis.points {
                println!(
                    "{:<12} {:>8} {:>12}",
                    point.date.format("%Y-%m-%d"),
                    format_amount(point.hours),
                    format_amount(point.total_cost)
                );
            }
            println!("{}", "-".repeat(34));
            println!(
                "{:<12} {:>8} {:>12}",
                "TOTAL",
                format_amount(analysis.total_hours),
                format_amount(analysis.total_billing)
            );
        }
    }
    Ok(())
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}
