use anyhow::{bail, Context};
use balances_client::{BalancesClient, BalancesStore};
use balances_core::bank_accounts::{
    BankAccount, BankAccountBalanceInput, BankAccountInput, BankAccountStatus,
};
use balances_core::drafts::Draft;
use balances_core::entities::{EntityId, EntityKind};
use balances_core::properties::Property;
use balances_core::search::{DetailQuery, SearchFilter};
use balances_core::session::Credentials;
use balances_core::state::PaginationRecord;
use balances_core::vehicles::Vehicle;
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;

use crate::config::Config;
use crate::format;
use crate::main_lib::build_store;

#[derive(Debug, Parser)]
#[command(name = "balances", about = "Track bank accounts, vehicles and properties", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in and remember the session
    Login {
        username: String,
        #[arg(long, env = "BALANCES_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Check the backend is reachable
    Health,
    /// Show or set the preferred locale
    Locale { value: Option<String> },
    /// Search bank accounts
    Accounts(SearchArgs),
    /// Show one bank account with its balance history
    Account(DetailArgs),
    /// Change the details of a bank account
    AccountEdit(AccountEditArgs),
    /// Record a balance for a bank account
    BalanceAdd {
        account_id: String,
        amount: Decimal,
        /// Day of the balance, as YYYY-MM-DD; defaults to now
        #[arg(long, value_parser = parse_date)]
        date: Option<DateTime<Utc>>,
    },
    /// Soft-delete a record
    Delete {
        #[arg(value_enum)]
        target: DeleteTarget,
        id: String,
    },
    /// Renew the session token
    Refresh,
    /// Search vehicles
    Vehicles(SearchArgs),
    /// Show one vehicle with its valuations
    Vehicle(DetailArgs),
    /// Search properties
    Properties(SearchArgs),
    /// Show one property with its valuations
    Property(DetailArgs),
    /// Totals across every asset class
    Summary,
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Match against names and numbers
    keyword: Option<String>,
    #[arg(long, default_value_t = 1)]
    page: u32,
    #[arg(long)]
    page_size: Option<u32>,
    #[arg(long)]
    include_deleted: bool,
}

impl SearchArgs {
    fn filter(&self) -> SearchFilter {
        SearchFilter {
            keyword: Some(self.keyword.clone().unwrap_or_default()),
            include_deleted: self.include_deleted.then_some(true),
            page: Some(self.page),
            page_size: self.page_size,
            ..SearchFilter::default()
        }
    }
}

#[derive(Debug, Args)]
pub struct DetailArgs {
    id: String,
    /// Earliest history entry, as YYYY-MM-DD
    #[arg(long, value_parser = parse_date)]
    from: Option<DateTime<Utc>>,
    /// Latest history entry, as YYYY-MM-DD
    #[arg(long, value_parser = parse_date)]
    to: Option<DateTime<Utc>>,
}

impl DetailArgs {
    fn query(&self) -> DetailQuery {
        DetailQuery {
            start_date: self.from,
            end_date: self.to,
            ..DetailQuery::with_history()
        }
    }
}

#[derive(Debug, Args)]
pub struct AccountEditArgs {
    id: String,
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    bank: Option<String>,
    #[arg(long)]
    holder: Option<String>,
    #[arg(long)]
    number: Option<String>,
    /// active or inactive
    #[arg(long, value_parser = parse_status)]
    status: Option<BankAccountStatus>,
}

impl AccountEditArgs {
    /// Writes the requested fields into the draft. Fields left out of the
    /// command line keep their stored value.
    fn apply(&self, draft: &mut Draft<BankAccountInput>) {
        draft.begin_edit();
        let input = draft.value_mut();
        if let Some(name) = &self.name {
            input.account_name = name.clone();
        }
        if let Some(bank) = &self.bank {
            input.bank_name = bank.clone();
        }
        if let Some(holder) = &self.holder {
            input.account_holder_name = holder.clone();
        }
        if let Some(number) = &self.number {
            input.account_number = number.clone();
        }
        if let Some(status) = self.status {
            input.status = status;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DeleteTarget {
    Account,
    Balance,
    Vehicle,
    VehicleValue,
    Property,
    PropertyValue,
}

impl DeleteTarget {
    fn kind(self) -> EntityKind {
        match self {
            DeleteTarget::Account => EntityKind::BankAccounts,
            DeleteTarget::Balance => EntityKind::BankAccountBalances,
            DeleteTarget::Vehicle => EntityKind::Vehicles,
            DeleteTarget::VehicleValue => EntityKind::VehicleValues,
            DeleteTarget::Property => EntityKind::Properties,
            DeleteTarget::PropertyValue => EntityKind::PropertyValues,
        }
    }
}

fn parse_status(raw: &str) -> Result<BankAccountStatus, String> {
    serde_json::from_value(serde_json::Value::String(raw.trim().to_lowercase()))
        .map_err(|_| format!("unknown status `{raw}`, expected active or inactive"))
}

fn parse_date(raw: &str) -> Result<DateTime<Utc>, String> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| format!("expected YYYY-MM-DD: {e}"))
        .and_then(|date| {
            date.and_hms_opt(0, 0, 0)
                .map(|time| time.and_utc())
                .ok_or_else(|| "invalid date".to_string())
        })
}

pub async fn run(command: Command, config: &Config) -> anyhow::Result<()> {
    if matches!(command, Command::Health) {
        let client = BalancesClient::new(&config.api_base_url, config.request_timeout)?;
        let message = client.health().await.context("Backend is not healthy")?;
        println!("{}: {}", client.base_url(), message);
        return Ok(());
    }

    let mut store = build_store(config)?;
    store.hydrate()?;

    match command {
        Command::Health => {}
        Command::Login { username, password } => {
            let session = store.authenticate(&Credentials::new(username, password)).await?;
            println!(
                "Logged in as {} until {}",
                session.user.display_name(),
                session.expiration.to_rfc3339()
            );
        }
        Command::Logout => {
            store.deauthenticate()?;
            println!("Logged out");
        }
        Command::Whoami => match store.current_user() {
            Some(user) => println!("{} <{}> ({})", user.display_name(), user.email, user.id),
            None => println!("Not logged in"),
        },
        Command::Locale { value } => {
            if let Some(locale) = value {
                store.set_locale(&locale)?;
            }
            println!("{}", store.locale());
        }
        Command::Accounts(args) => {
            require_login(&store)?;
            let filter = args.filter();
            let record = store.search(EntityKind::BankAccounts, &filter).await?;
            let accounts: Vec<BankAccount> = store.views(EntityKind::BankAccounts, &record.ids)?;
            let rows = accounts
                .iter()
                .map(|a| {
                    vec![
                        a.id.to_string(),
                        a.account_name.clone(),
                        a.bank_name.clone(),
                        format::money(a.last_balance, &config.default_currency),
                        format::label(&a.status),
                    ]
                })
                .collect::<Vec<_>>();
            println!("{}", format::table(&["ID", "NAME", "BANK", "BALANCE", "STATUS"], &rows));
            print_page(&record);
        }
        Command::Account(args) => {
            require_login(&store)?;
            let id = load(&mut store, EntityKind::BankAccounts, &args).await?;
            let account = store
                .bank_account(&id)?
                .with_context(|| format!("Bank account {id} is not loaded"))?;
            println!("{} ({})", account.account_name, format::label(&account.status));
            println!("Bank:    {}", account.bank_name);
            println!("Holder:  {}", account.account_holder_name);
            println!("Number:  {}", account.account_number);
            println!(
                "Balance: {} on {}",
                format::money(account.last_balance, &config.default_currency),
                format::date(account.last_balance_date)
            );
            println!("Created by {}", format::user(&account.audit.created_by));
            let rows = account
                .balance_history()
                .into_iter()
                .map(|b| {
                    vec![
                        format::date(b.date),
                        format::money(b.balance, &config.default_currency),
                        format::user(&b.audit.created_by),
                    ]
                })
                .collect::<Vec<_>>();
            println!();
            println!("{}", format::table(&["DATE", "BALANCE", "BY"], &rows));
        }
        Command::AccountEdit(args) => {
            require_login(&store)?;
            let id = store
                .fetch(EntityKind::BankAccounts, &EntityId::new(&args.id), &DetailQuery::default())
                .await?;
            let account = store
                .bank_account(&id)?
                .with_context(|| format!("Bank account {id} is not loaded"))?;

            let mut draft = Draft::new(BankAccountInput::from(&account));
            args.apply(&mut draft);
            if !draft.is_dirty() {
                println!("Nothing to change");
                return Ok(());
            }
            match store.save(draft.value()).await {
                Ok(saved) => {
                    let input = draft.commit();
                    println!("Saved {} ({})", input.account_name, saved);
                }
                Err(e) => {
                    draft.revert();
                    tracing::warn!("Edit of {} discarded", draft.value().account_name);
                    return Err(e).context("Could not save bank account");
                }
            }
        }
        Command::BalanceAdd { account_id, amount, date } => {
            require_login(&store)?;
            let input = BankAccountBalanceInput {
                id: None,
                bank_account_id: Some(EntityId::new(&account_id)),
                date: date.unwrap_or_else(Utc::now),
                balance: amount,
            };
            let id = store.save(&input).await?;
            println!(
                "Recorded {} on {} ({})",
                format::money(input.balance, &config.default_currency),
                format::date(input.date),
                id
            );
        }
        Command::Delete { target, id } => {
            require_login(&store)?;
            let id = store.delete(target.kind(), &EntityId::new(&id)).await?;
            println!("Deleted {id}");
        }
        Command::Refresh => {
            require_login(&store)?;
            let session = store.refresh_token().await?;
            println!("Session renewed until {}", session.expiration.to_rfc3339());
        }
        Command::Vehicles(args) => {
            require_login(&store)?;
            let record = store.search(EntityKind::Vehicles, &args.filter()).await?;
            let vehicles: Vec<Vehicle> = store.views(EntityKind::Vehicles, &record.ids)?;
            let rows = vehicles
                .iter()
                .map(|v| {
                    vec![
                        v.id.to_string(),
                        v.name.clone(),
                        format!("{} {} {}", v.year, v.make, v.model),
                        format::money(v.current_value, &config.default_currency),
                        format::label(&v.status),
                    ]
                })
                .collect::<Vec<_>>();
            println!("{}", format::table(&["ID", "NAME", "VEHICLE", "VALUE", "STATUS"], &rows));
            print_page(&record);
        }
        Command::Vehicle(args) => {
            require_login(&store)?;
            let id = load(&mut store, EntityKind::Vehicles, &args).await?;
            let vehicle = store
                .vehicle(&id)?
                .with_context(|| format!("Vehicle {id} is not loaded"))?;
            println!("{} ({})", vehicle.name, format::label(&vehicle.status));
            println!("Vehicle: {} {} {}", vehicle.year, vehicle.make, vehicle.model);
            println!("Plate:   {}", vehicle.license_plate_number);
            println!(
                "Value:   {} on {} ({}%/yr depreciation)",
                format::money(vehicle.current_value, &config.default_currency),
                format::date(vehicle.current_value_date),
                vehicle.annual_depreciation_percent
            );
            let rows = vehicle
                .value_history()
                .into_iter()
                .map(|v| {
                    vec![
                        format::date(v.date),
                        format::money(v.value, &config.default_currency),
                    ]
                })
                .collect::<Vec<_>>();
            println!();
            println!("{}", format::table(&["DATE", "VALUE"], &rows));
        }
        Command::Properties(args) => {
            require_login(&store)?;
            let record = store.search(EntityKind::Properties, &args.filter()).await?;
            let properties: Vec<Property> = store.views(EntityKind::Properties, &record.ids)?;
            let rows = properties
                .iter()
                .map(|p| {
                    vec![
                        p.id.to_string(),
                        p.name.clone(),
                        format::label(&p.property_type),
                        format::money(p.current_value, &config.default_currency),
                        format::label(&p.status),
                    ]
                })
                .collect::<Vec<_>>();
            println!("{}", format::table(&["ID", "NAME", "TYPE", "VALUE", "STATUS"], &rows));
            print_page(&record);
        }
        Command::Property(args) => {
            require_login(&store)?;
            let id = load(&mut store, EntityKind::Properties, &args).await?;
            let property = store
                .property(&id)?
                .with_context(|| format!("Property {id} is not loaded"))?;
            println!("{} ({})", property.name, format::label(&property.status));
            println!("Address: {}", property.address);
            println!(
                "Area:    {} total, {} built ({})",
                property.total_area,
                property.building_area,
                format::label(&property.area_unit)
            );
            println!(
                "Value:   {} on {} ({}%/yr appreciation)",
                format::money(property.current_value, &config.default_currency),
                format::date(property.current_value_date),
                property.annual_appreciation_percent
            );
            let rows = property
                .value_history()
                .into_iter()
                .map(|v| {
                    vec![
                        format::date(v.date),
                        format::money(v.value, &config.default_currency),
                    ]
                })
                .collect::<Vec<_>>();
            println!();
            println!("{}", format::table(&["DATE", "VALUE"], &rows));
        }
        Command::Summary => {
            require_login(&store)?;
            for kind in [EntityKind::BankAccounts, EntityKind::Vehicles, EntityKind::Properties] {
                store.search_all(kind, &SearchFilter::default()).await?;
            }
            let summary = store.summary();
            let currency = &config.default_currency;
            let rows = vec![
                vec![
                    "Bank accounts".to_string(),
                    summary.bank_accounts_count.to_string(),
                    format::money(summary.bank_accounts_total, currency),
                ],
                vec![
                    "Vehicles".to_string(),
                    summary.vehicles_count.to_string(),
                    format::money(summary.vehicles_total, currency),
                ],
                vec![
                    "Properties".to_string(),
                    summary.properties_count.to_string(),
                    format::money(summary.properties_total, currency),
                ],
                vec![
                    "Total".to_string(),
                    String::new(),
                    format::money(summary.total, currency),
                ],
            ];
            println!("{}", format::table(&["CLASS", "COUNT", "VALUE"], &rows));
        }
    }
    Ok(())
}

fn require_login(store: &BalancesStore) -> anyhow::Result<()> {
    if !store.state().is_authenticated() {
        bail!("Not logged in; run `balances login <username>` first");
    }
    Ok(())
}

/// Fetches a record with its history, then everything it references.
async fn load(
    store: &mut BalancesStore,
    kind: EntityKind,
    args: &DetailArgs,
) -> anyhow::Result<EntityId> {
    let id = store
        .fetch(kind, &EntityId::new(&args.id), &args.query())
        .await?;
    store.ensure_ready(kind, &id).await?;
    Ok(id)
}

fn print_page(record: &PaginationRecord) {
    println!(
        "\nPage {} of {} ({} total)",
        record.current_page,
        record.page_count.max(1),
        record.total_count
    );
}
