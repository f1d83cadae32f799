use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use healthmoney_dashboard::{
    config::AppConfig,
    models::{ExpenseField, FormField},
    pages::{month_label, AgendaPage, Notice, Outcome, ReportsPage},
    services::ServiceContainer,
    tracing as app_tracing,
};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "\nrustc:  ",
    env!("RUSTC_VERSION"),
    "\ntarget: ",
    env!("BUILD_TARGET"),
    "\nbuilt:  ",
    env!("BUILD_TIMESTAMP"),
);

#[derive(Parser)]
#[command(name = "healthmoney")]
#[command(version, long_version = LONG_VERSION)]
#[command(about = "Agenda and financial reports of the HealthMoney dashboard", long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the layered sources
    #[arg(short, long, global = true, env = "HEALTHMONEY_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the appointments on the calendar
    #[clap(visible_alias = "a")]
    Agenda {
        /// Delete this appointment before listing
        #[arg(long)]
        delete: Option<String>,
    },
    /// Create an appointment through the new-appointment form
    #[clap(visible_alias = "s")]
    Schedule {
        #[arg(short, long)]
        title: String,
        /// Day of the appointment (YYYY-MM-DD)
        #[arg(short, long)]
        date: String,
        /// Start time (HH:MM)
        #[arg(long)]
        start: String,
        /// End time (HH:MM)
        #[arg(long)]
        end: String,
        /// Patient e-mail
        #[arg(short, long)]
        email: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Show the monthly financial report
    #[clap(visible_alias = "r")]
    Report {
        /// Month to show (1-12), defaults to the current month
        #[arg(short, long)]
        month: Option<u32>,
        /// Print the spreadsheet export as JSON
        #[arg(long)]
        export: bool,
    },
    /// Record an expense
    #[clap(visible_alias = "e")]
    Expense {
        #[arg(long)]
        category: String,
        #[arg(long)]
        description: String,
        /// Amount, with either a decimal point or a decimal comma
        #[arg(long)]
        amount: String,
        /// Payment date (YYYY-MM-DD)
        #[arg(long)]
        date: String,
    },
    /// Print the configuration template or the effective configuration
    Config {
        /// Write the template to this file instead of printing it
        #[arg(short, long, conflicts_with = "show")]
        output: Option<PathBuf>,
        /// Print the effective configuration
        #[arg(long)]
        show: bool,
        /// Use JSON for --show
        #[arg(long, requires = "show")]
        json: bool,
    },
}

fn load_config(path: Option<&PathBuf>) -> Result<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::load_from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => AppConfig::load().context("Failed to load configuration")?,
    };
    Ok(config)
}

fn print_notice(notice: Option<Notice>) {
    if let Some(notice) = notice {
        if notice.is_error() {
            eprintln!("{}", notice);
        } else {
            println!("{}", notice);
        }
    }
}

fn ensure_session(redirect: Option<&str>) -> Result<()> {
    match redirect {
        Some(path) => bail!("Sessão expirada. Faça login novamente em {}", path),
        None => Ok(()),
    }
}

async fn run_agenda(container: &ServiceContainer, config: &AppConfig, delete: Option<String>) -> Result<()> {
    let mut page = AgendaPage::new(container.scheduling_service(), config.backend.login_path.as_str());

    match delete {
        Some(id) => {
            if page.delete_appointment(&id).await {
                println!("Agendamento {} excluído.", id);
            }
        }
        None => page.refresh().await,
    }

    ensure_session(page.redirect())?;
    print_notice(page.take_notice());

    for event in page.events() {
        println!(
            "{}  {} - {}  {}",
            event.start.format("%d/%m/%Y"),
            event.start.format("%H:%M"),
            event.end.format("%H:%M"),
            event.title
        );
    }

    Ok(())
}

async fn run_schedule(container: &ServiceContainer, config: &AppConfig, fields: [(FormField, String); 6]) -> Result<()> {
    let mut page = AgendaPage::new(container.scheduling_service(), config.backend.login_path.as_str());

    let form = page.open_dialog();
    for (field, value) in &fields {
        form.update_input(*field, value);
    }

    let outcome = page.submit_appointment().await;
    print_notice(page.take_notice());

    match outcome {
        Some(Outcome::Created) | None => Ok(()),
        Some(Outcome::Rejected(errors)) => {
            for (field, message) in errors.iter() {
                eprintln!("{}: {}", field, message);
            }
            bail!("O agendamento tem {} campo(s) inválido(s)", errors.len())
        }
        Some(Outcome::SessionExpired) => ensure_session(page.redirect()),
        Some(Outcome::Failed(message)) => bail!(message),
        Some(Outcome::Ignored) => bail!("Agendamento já enviado"),
    }
}

async fn run_report(container: &ServiceContainer, config: &AppConfig, month: Option<u32>, export: bool) -> Result<()> {
    let mut page = ReportsPage::new(
        container.report_service(),
        config.backend.login_path.as_str(),
        config.reports.effective_year(),
    );

    match month {
        Some(month) => {
            if !page.select_month(month).await {
                bail!("Mês inválido: {} (use 1 a 12)", month);
            }
        }
        None => page.load().await,
    }
    ensure_session(page.redirect())?;

    if export {
        let workbook = page.export();
        print_notice(page.take_notice());
        if let Some(workbook) = workbook {
            println!("{}", serde_json::to_string_pretty(&workbook)?);
        }
        return Ok(());
    }

    if page.report().is_none() {
        bail!("Não foi possível carregar o relatório");
    }

    println!("{} de {}", month_label(page.month()).unwrap_or("?"), page.year());
    for card in page.summary_cards() {
        println!("{:<16} {}", card.label, card.value);
    }
    for (heading, slices) in [("Receitas", page.income_slices()), ("Despesas", page.expense_slices())] {
        println!("\n{}", heading);
        for slice in slices {
            println!("  {:<20} {:>12.2}  {}", slice.name, slice.amount, slice.color);
        }
    }

    Ok(())
}

async fn run_expense(container: &ServiceContainer, config: &AppConfig, fields: [(ExpenseField, String); 4]) -> Result<()> {
    let mut page = ReportsPage::new(
        container.report_service(),
        config.backend.login_path.as_str(),
        config.reports.effective_year(),
    );

    page.open_expense_dialog();
    for (field, value) in &fields {
        page.update_expense(*field, value);
    }

    let saved = page.save_expense().await;
    ensure_session(page.redirect())?;
    print_notice(page.take_notice());

    if !saved {
        bail!("Despesa não registrada");
    }
    Ok(())
}

fn run_config(config_path: Option<&PathBuf>, output: Option<PathBuf>, show: bool, json: bool) -> Result<()> {
    if show {
        let config = load_config(config_path)?;
        let rendered = if json { config.to_json()? } else { config.to_yaml()? };
        println!("{}", rendered);
        return Ok(());
    }

    match output {
        Some(path) => {
            AppConfig::write_template(&path)?;
            println!("Configuration template written to {}", path.display());
        }
        None => print!("{}", AppConfig::generate_template()),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if let Commands::Config { output, show, json } = &cli.command {
        return run_config(cli.config.as_ref(), output.clone(), *show, *json);
    }

    let config = load_config(cli.config.as_ref())?;
    let _guards = app_tracing::init_tracing(&config)?;

    tracing::info!(
        environment = %config.environment,
        backend = %config.backend.base_url,
        sentry = %app_tracing::sentry_summary(&config.sentry),
        "Configuration loaded and tracing initialized"
    );
    if config.is_production() && !config.sentry.is_enabled() {
        tracing::warn!("Sentry is disabled in production");
    }

    let container = ServiceContainer::new(&config)?;

    match cli.command {
        Commands::Agenda { delete } => run_agenda(&container, &config, delete).await,
        Commands::Schedule {
            title,
            date,
            start,
            end,
            email,
            description,
        } => {
            let fields = [
                (FormField::Title, title),
                (FormField::Date, date),
                (FormField::StartTime, start),
                (FormField::EndTime, end),
                (FormField::PatientEmail, email),
                (FormField::Description, description),
            ];
            run_schedule(&container, &config, fields).await
        }
        Commands::Report { month, export } => run_report(&container, &config, month, export).await,
        Commands::Expense {
            category,
            description,
            amount,
            date,
        } => {
            let fields = [
                (ExpenseField::Category, category),
                (ExpenseField::Description, description),
                (ExpenseField::Amount, amount),
                (ExpenseField::Date, date),
            ];
            run_expense(&container, &config, fields).await
        }
        Commands::Config { .. } => Ok(()),
    }
}
