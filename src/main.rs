use clap::Parser;
use contest_seating::core::session::SessionPlan;
use contest_seating::core::Notifier;
use contest_seating::utils::error::ErrorSeverity;
use contest_seating::utils::{logger, validation::Validate};
use contest_seating::{
    AssignmentExporter, CliArgs, JsonRosterStore, LocalStorage, LogNotifier, SeatingSession,
    SessionConfig, SessionReport, WebhookNotifier,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // 初始化日誌
    if args.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting contest-seating");
    tracing::info!("📁 Loading session from: {}", args.config);

    let mut config = match SessionConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load session file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    args.apply_overrides(&mut config);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Session '{}' loaded and validated", config.competition.name);

    let outcome = execute(&config, args.dry_run).await;

    if let Err(e) = outcome {
        tracing::error!(
            "❌ Seating run failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

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

async fn execute(config: &SessionConfig, dry_run: bool) -> contest_seating::Result<()> {
    if dry_run {
        tracing::info!("🔍 DRY RUN MODE - nothing will be saved, exported or sent");
        let plan = build_session(config.clone(), LogNotifier)?.plan().await?;
        print_plan(&plan);
    } else if let Some(url) = config.webhook().map(str::to_string) {
        let report = build_session(config.clone(), WebhookNotifier::new(url))?
            .run()
            .await?;
        print_report(&report);
    } else {
        let report = build_session(config.clone(), LogNotifier)?.run().await?;
        print_report(&report);
    }
    Ok(())
}

type Session<N> = SeatingSession<
    JsonRosterStore<LocalStorage>,
    AssignmentExporter<LocalStorage>,
    N,
    SessionConfig,
>;

fn build_session<N: Notifier>(
    config: SessionConfig,
    notifier: N,
) -> contest_seating::Result<Session<N>> {
    let store = JsonRosterStore::new(
        LocalStorage::new("."),
        config.roster.path.clone(),
        config.rules.clone(),
    );
    let formats = config.export_formats()?;
    let exporter = AssignmentExporter::new(
        LocalStorage::new(config.export.output_path.clone()),
        formats,
        config.export.bundle.clone(),
    );
    Ok(SeatingSession::new(store, exporter, notifier, config))
}

fn print_plan(plan: &SessionPlan) {
    println!(
        "🔍 {} transfers applied, {} of {} teams seated",
        plan.transfers_applied,
        plan.result.seated_count(),
        plan.result.required_seats
    );
    for row in plan.result.export_rows() {
        println!(
            "  {} [{}] {} -> {} {}",
            row.team_id, row.team_level, row.team_name, row.site_name, row.team_seat
        );
    }
    for team_id in &plan.result.unseated {
        println!("  {} -> (no seat)", team_id);
    }
    if plan.result.insufficient_seats {
        println!(
            "⚠️ Not enough seats: {} required, {} available",
            plan.result.required_seats, plan.result.available_capacity
        );
    }
}

fn print_report(report: &SessionReport) {
    println!(
        "✅ Seated {} of {} teams, notified {}",
        report.result.seated_count(),
        report.result.required_seats,
        report.notified
    );
    for output in &report.outputs {
        println!("📁 Output saved to: {}", output);
    }
    if report.result.insufficient_seats {
        println!(
            "⚠️ Not enough seats: {} teams unseated, add rooms or lower the skip factor",
            report.result.unseated.len()
        );
    }
}
