use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use rzpay::application::facade::{CallbackParams, PaymentFacade};
use rzpay::config::AppConfig;
use rzpay::domain::gateway::Order;
use rzpay::domain::money::Amount;
use rzpay::domain::ports::TransactionStoreBox;
use rzpay::domain::transaction::{Basket, Transaction};
use rzpay::error::PaymentError;
use rzpay::infrastructure::in_memory::InMemoryTransactionStore;
use rzpay::infrastructure::razorpay::RazorpayClient;
#[cfg(feature = "storage-rocksdb")]
use rzpay::infrastructure::rocksdb::RocksDBStore;
use rzpay::interfaces::csv::transaction_writer::TransactionWriter;
use serde::Serialize;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to persistent database. Required by every command that reads a
    /// transaction started by an earlier run.
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start a transaction for a basket and create the gateway order
    Checkout {
        #[arg(long)]
        basket_id: String,
        /// Amount in major units, e.g. 99.99
        #[arg(long)]
        amount: String,
        /// Basket currency; falls back to RZPAY_DEFAULT_CURRENCY
        #[arg(long)]
        currency: Option<String>,
        #[arg(long)]
        user_id: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    /// Complete a checkout from the gateway's success redirect
    Callback {
        #[arg(long)]
        order_id: String,
        #[arg(long)]
        payment_id: String,
        #[arg(long)]
        signature: String,
        #[arg(long)]
        txnid: String,
    },
    /// Check a payment signature
    Verify {
        #[arg(long)]
        order_id: String,
        #[arg(long)]
        payment_id: String,
        #[arg(long)]
        signature: String,
    },
    /// Mirror the gateway's payment state onto a local transaction
    Reconcile {
        #[arg(long)]
        payment_id: String,
        #[arg(long)]
        txnid: String,
    },
    /// Mark a reconciled payment captured if the gateway reports it so
    Capture {
        #[arg(long)]
        payment_id: String,
    },
    /// Refund part or all of a reconciled payment
    Refund {
        #[arg(long)]
        payment_id: String,
        /// Amount in minor units, e.g. 9999 for 99.99
        #[arg(long, allow_negative_numbers = true)]
        amount: i64,
        #[arg(long)]
        currency: String,
    },
    /// Print all stored transactions as CSV
    List,
    /// Print one transaction as JSON
    Show {
        #[arg(long)]
        txnid: String,
    },
}

impl Command {
    fn needs_gateway(&self) -> bool {
        !matches!(self, Command::List | Command::Show { .. })
    }

    /// Commands that look up transactions written by an earlier invocation.
    fn reads_prior_state(&self) -> bool {
        !matches!(self, Command::Checkout { .. } | Command::Verify { .. })
    }
}

#[derive(Serialize)]
struct CheckoutOutput {
    transaction: Transaction,
    order: Order,
    amount_minor: i64,
}

#[derive(Serialize)]
struct RefundOutput<'a> {
    payment_id: &'a str,
    amount: i64,
    currency: &'a str,
    refunded: bool,
}

fn open_store(db_path: Option<PathBuf>, command: &Command) -> Result<TransactionStoreBox> {
    match db_path {
        #[cfg(feature = "storage-rocksdb")]
        Some(path) => Ok(Box::new(RocksDBStore::open(path).into_diagnostic()?)),
        #[cfg(not(feature = "storage-rocksdb"))]
        Some(_) => Err(PaymentError::Config(
            "--db-path needs the 'storage-rocksdb' feature".to_string(),
        ))
        .into_diagnostic(),
        None if command.reads_prior_state() => Err(PaymentError::Config(
            "--db-path is required to read earlier transactions".to_string(),
        ))
        .into_diagnostic(),
        None => {
            tracing::debug!("no --db-path given, transaction kept in memory for this run");
            Ok(Box::new(InMemoryTransactionStore::new()))
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).into_diagnostic()?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = AppConfig::from_env().into_diagnostic()?;
    if cli.command.needs_gateway() {
        cfg.razorpay.validate().into_diagnostic()?;
    }

    let store = open_store(cli.db_path, &cli.command)?;
    let gateway = Box::new(RazorpayClient::new(&cfg.razorpay));
    let facade = PaymentFacade::new(store, gateway, cfg.default_currency.clone());

    match cli.command {
        Command::Checkout {
            basket_id,
            amount,
            currency,
            user_id,
            email,
        } => {
            let amount = Amount::parse(&amount).into_diagnostic()?;
            let basket = Basket::new(basket_id, currency);
            let transaction = facade
                .start_transaction(&basket, amount.value(), user_id, email)
                .await
                .into_diagnostic()?;
            let order = facade
                .create_remote_order(amount.value(), &basket, &transaction)
                .await
                .into_diagnostic()?;
            print_json(&CheckoutOutput {
                amount_minor: order.amount,
                transaction,
                order,
            })?;
        }
        Command::Callback {
            order_id,
            payment_id,
            signature,
            txnid,
        } => {
            let params = CallbackParams {
                order_id,
                payment_id,
                signature,
                txnid,
            };
            let txn = facade.handle_callback(&params).await.into_diagnostic()?;
            print_json(&txn)?;
        }
        Command::Verify {
            order_id,
            payment_id,
            signature,
        } => {
            let valid = facade
                .validate_signature(&order_id, &payment_id, &signature)
                .into_diagnostic()?;
            print_json(&serde_json::json!({ "valid": valid }))?;
        }
        Command::Reconcile { payment_id, txnid } => {
            let txn = facade
                .reconcile_transaction(&payment_id, &txnid)
                .await
                .into_diagnostic()?;
            print_json(&txn)?;
        }
        Command::Capture { payment_id } => {
            let txn = facade
                .capture_transaction(&payment_id)
                .await
                .into_diagnostic()?;
            print_json(&txn)?;
        }
        Command::Refund {
            payment_id,
            amount,
            currency,
        } => {
            facade
                .refund_transaction(&payment_id, amount, &currency)
                .await
                .into_diagnostic()?;
            print_json(&RefundOutput {
                payment_id: &payment_id,
                amount,
                currency: &currency,
                refunded: true,
            })?;
        }
        Command::List => {
            let transactions = facade.list_transactions().await.into_diagnostic()?;
            let stdout = io::stdout();
            let mut writer = TransactionWriter::new(stdout.lock());
            writer
                .write_transactions(&transactions)
                .into_diagnostic()?;
        }
        Command::Show { txnid } => {
            let txn = facade.get_transaction(&txnid).await.into_diagnostic()?;
            print_json(&txn)?;
        }
    }

    Ok(())
}
