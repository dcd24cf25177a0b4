//! CareHub mock data store — demo CLI
//!
//! Drives the in-memory store through the same fluent client the portal
//! pages use, so the latency, filtering, and auth stub behavior can be seen
//! without a real database.
//!
//! Usage:
//!   cargo run -p demo -- walkthrough
//!   cargo run -p demo -- sign-in --email sarah.johnson@carehub.example --password doctor123
//!   cargo run -p demo -- query appointments --eq patientId=3 --order date
//!   cargo run -p demo -- --instant --config carehub.toml --seed seed.json walkthrough

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

use carehub_contracts::{
    error::{StoreError, StoreResult},
    record::{rows_as, ClinicalRecord, Row, ScheduledVisit},
};
use carehub_core::Client;
use carehub_mock_store::{LatencyProfile, MockStore, Seed, StoreConfig};

// ── CLI definition ────────────────────────────────────────────────────────────

/// CareHub — in-memory stand-in for the portal's database.
#[derive(Parser)]
#[command(
    name = "carehub-demo",
    about = "CareHub mock data store demo",
    long_about = "Runs queries and sign-ins against the in-memory CareHub store,\n\
                  with the same simulated latency the portal sees during development."
)]
struct Cli {
    /// Store configuration TOML (latency, credential checking).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Seed JSON to load instead of the built-in fixtures.
    #[arg(long, global = true)]
    seed: Option<PathBuf>,

    /// Disable all simulated latency.
    #[arg(long, global = true)]
    instant: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in as a doctor, then schedule, complete, and cancel a visit.
    Walkthrough,
    /// Try one sign-in and print the session or the error.
    SignIn {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Select rows from a table and print them as JSON.
    Query {
        /// Table name: users, appointments, or medical_records.
        table: String,
        /// Equality filter written as column=value.
        #[arg(long, value_parser = parse_filter)]
        eq: Option<(String, String)>,
        /// Column to sort on.
        #[arg(long)]
        order: Option<String>,
        /// Sort descending instead of ascending.
        #[arg(long, requires = "order")]
        desc: bool,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    // Initialize structured logging.  Set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    let result = match build_client(&cli) {
        Ok(client) => match cli.command {
            Command::Walkthrough => run_walkthrough(&client).await,
            Command::SignIn { email, password } => run_sign_in(&client, &email, &password).await,
            Command::Query {
                table,
                eq,
                order,
                desc,
            } => run_query(&client, &table, eq, order, desc).await,
        },
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("Demo error: {}", e);
        std::process::exit(1);
    }
}

fn build_client(cli: &Cli) -> StoreResult<Client> {
    let mut config = match &cli.config {
        Some(path) => StoreConfig::from_file(path)?,
        None => StoreConfig::default(),
    };
    if cli.instant {
        config.latency = LatencyProfile::instant();
    }
    let seed = match &cli.seed {
        Some(path) => Seed::from_file(path)?,
        None => Seed::fixtures(),
    };
    Ok(Client::new(MockStore::new(config, seed)))
}

fn parse_filter(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(column, value)| (column.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected column=value, got '{}'", s))
}

// ── Commands ──────────────────────────────────────────────────────────────────

async fn run_walkthrough(client: &Client) -> StoreResult<()> {
    println!();
    println!("CareHub — mock store walkthrough");
    println!("================================");
    println!();

    let auth = client
        .auth()
        .authenticate("sarah.johnson@carehub.example", "doctor123")
        .await?;
    let doctor_id = auth.user.id.clone().unwrap_or_default();
    println!(
        "[1] Signed in as {} (id {})",
        auth.user.name.as_deref().unwrap_or("unknown"),
        doctor_id
    );

    let visits: Vec<ScheduledVisit> = rows_as(
        client
            .from("appointments")
            .select("*")
            .eq("doctorId", doctor_id.as_str())
            .order("date", true)
            .await?,
    );
    println!("[2] {} visit(s) on the schedule:", visits.len());
    for visit in &visits {
        print_visit(visit);
    }

    let stored = client
        .from("appointments")
        .insert(json!({
            "patientId": "3",
            "doctorId": doctor_id,
            "date": "2024-04-02T11:00",
            "status": "scheduled",
            "type": "follow-up",
            "notes": "Blood pressure follow-up"
        }))
        .await?
        .ok_or_else(|| StoreError::Backend {
            reason: "appointments table did not accept the insert".to_string(),
        })?;
    let visit_id = stored.id().unwrap_or_default().to_string();
    println!("[3] Scheduled visit {}", visit_id);

    let outcome = client
        .from("appointments")
        .update(json!({ "status": "completed" }))
        .eq("id", visit_id.as_str())
        .await?;
    println!("[4] Marked completed ({} row(s) updated)", outcome.affected);

    let outcome = client
        .from("appointments")
        .delete()
        .eq("id", visit_id.as_str())
        .await?;
    println!("[5] Cancelled ({} row(s) removed)", outcome.affected);

    let records: Vec<ClinicalRecord> = rows_as(
        client
            .from("medical_records")
            .select("*")
            .eq("doctorId", doctor_id.as_str())
            .await?,
    );
    println!("[6] {} clinical record(s) authored:", records.len());
    for record in &records {
        println!(
            "      {}  {}  →  {}",
            record.date.as_deref().unwrap_or("-"),
            record.diagnosis.as_deref().unwrap_or("-"),
            record.prescription.as_deref().unwrap_or("-"),
        );
    }

    client.auth().deauthenticate().await?;
    println!("[7] Signed out");
    println!();
    Ok(())
}

async fn run_sign_in(client: &Client, email: &str, password: &str) -> StoreResult<()> {
    let auth = client.auth().authenticate(email, password).await?;
    let mut rendered = serde_json::Map::new();
    rendered.insert("user".to_string(), to_json(&auth.user)?);
    rendered.insert("session".to_string(), to_json(&auth.session)?);
    println!("{}", to_pretty(&Value::Object(rendered))?);
    Ok(())
}

async fn run_query(
    client: &Client,
    table: &str,
    eq: Option<(String, String)>,
    order: Option<String>,
    desc: bool,
) -> StoreResult<()> {
    let mut query = client.from(table).select("*");
    if let Some((column, value)) = eq {
        query = query.eq(column, value);
    }
    if let Some(column) = order {
        query = query.order(column, !desc);
    }
    let rows: Vec<Row> = query.await?;
    println!("{}", to_pretty(&to_json(&rows)?)?);
    Ok(())
}

// ── Output ────────────────────────────────────────────────────────────────────

fn print_visit(visit: &ScheduledVisit) {
    println!(
        "      {}  patient {}  {:<12} {}",
        visit.date.as_deref().unwrap_or("-"),
        visit.patient_id.as_deref().unwrap_or("-"),
        visit.status.as_deref().unwrap_or("-"),
        visit.kind.as_deref().unwrap_or("-"),
    );
}

fn to_json<T: Serialize>(value: &T) -> StoreResult<Value> {
    serde_json::to_value(value).map_err(|e| StoreError::Backend {
        reason: format!("failed to render JSON: {}", e),
    })
}

fn to_pretty(value: &Value) -> StoreResult<String> {
    serde_json::to_string_pretty(value).map_err(|e| StoreError::Backend {
        reason: format!("failed to render JSON: {}", e),
    })
}
