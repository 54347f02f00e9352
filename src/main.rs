use clap::Parser;
use grade_inquiry::domain::model::Term;
use grade_inquiry::utils::error::{ErrorSeverity, Result};
use grade_inquiry::utils::{logger, validation::Validate};
use grade_inquiry::{
    AuthService, CliConfig, Command, Disposition, GradeInquiryService, InMemoryRecords,
    InquiryError, PlainTextVerifier,
};
use serde::Serialize;
use std::sync::Arc;

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(cli: &CliConfig) -> Result<()> {
    let config = cli.resolve_config()?;
    config.validate()?;

    let fixture = config
        .fixture_path()
        .ok_or_else(|| InquiryError::MissingConfigError {
            field: "data.fixture_path".to_string(),
        })?;
    let records = InMemoryRecords::from_fixture_file(fixture)?;
    tracing::info!("Service {} loaded records from {}", config.service.name, fixture);

    let records_handle = Arc::new(records.clone());
    let auth = AuthService::new(
        records_handle.clone(),
        records_handle,
        Arc::new(PlainTextVerifier),
    );

    let mut request = cli.inbound_request(&config)?;
    if let Some(login_id) = &cli.session_login {
        let password = cli.session_password.as_deref().unwrap_or_default();
        let login = auth.login(login_id, password).await?;
        tracing::info!("Session established for user {}", login.identity.user_id.0);
        request = request.session(login.identity);
    }

    let service = GradeInquiryService::with_cache(records, config.cache_store());

    match &cli.command {
        Command::Terms => print_json(&service.available_terms(&request).await?),
        Command::Summary { term } => {
            print_json(&service.summary(&request, &Term::from(term.as_str())).await?)
        }
        Command::List { term } => {
            print_json(&service.detail_list(&request, &Term::from(term.as_str())).await?)
        }
        Command::Login { login_id, password } => {
            print_json(&auth.login(login_id, password).await?)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }
    tracing::debug!("CLI config: {:?}", cli);

    if let Err(e) = run(&cli).await {
        tracing::error!(
            "Inquiry failed: {} (Category: {:?}, Severity: {:?}, Status: {})",
            e,
            e.category(),
            e.severity(),
            e.disposition().status_code()
        );
        tracing::error!("Recovery suggestion: {}", e.recovery_suggestion());

        // Missing records for a released term read as an empty result.
        if e.disposition() == Disposition::EmptySuccess {
            print_json(&serde_json::Value::Null)?;
        }
        eprintln!("{}", e.user_friendly_message());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}
