use anyhow::{anyhow, Context, Result};
use supplysense_core::UserContext;
use supplysense_ingest::{import, parse_csv};
use supplysense_network::{
    find_scenario, render_text, report_view, CoordinationReport, CoordinationRequest, NetworkError,
    DISRUPTION_TRIGGER,
};
use supplysense_voice::{briefing_text, BriefingPlayer, Delivery};
use tokio::net::TcpListener;

use crate::config::{Command, Config};
use crate::routes::router;
use crate::state::AppState;

pub async fn run(config: Config, command: Command) -> Result<()> {
    match command {
        Command::Serve => serve(&config).await,
        Command::Import { path, dry_run } => import_file(&config, &path, dry_run).await,
        Command::Analyze => analyze(&config).await,
        Command::Coordinate { scenario } => coordinate(&config, scenario.as_deref()).await,
        Command::Brief { output } => brief(&config, output.as_deref()).await,
    }
}

fn user(config: &Config) -> Result<UserContext> {
    Ok(UserContext::new(config.user.as_str())?)
}

async fn serve(config: &Config) -> Result<()> {
    let state = AppState::from_config(config).await?;
    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    tracing::info!(addr = %config.bind, "supplysense listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

async fn import_file(config: &Config, path: &std::path::Path, dry_run: bool) -> Result<()> {
    let ctx = user(config)?;
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let parsed = match parse_csv(&file_name, &bytes) {
        Ok(parsed) => parsed,
        Err(err) => {
            for message in err.messages() {
                eprintln!("{message}");
            }
            return Err(anyhow!("{file_name} was not imported"));
        }
    };

    println!("{} rows in {}", parsed.row_count(), parsed.file_name());
    for record in parsed.preview() {
        println!(
            "  {}  {}  sold {} @ {:.2}  stock {}",
            record.sale_date,
            record.product_name,
            record.quantity_sold,
            record.unit_price,
            record.current_stock
        );
    }
    if dry_run {
        return Ok(());
    }

    let state = AppState::from_config(config).await?;
    let summary = import(&ctx, &parsed, &state.store).await?;
    println!(
        "Imported {} rows in {} batches (upload {})",
        summary.inserted, summary.batches, summary.upload.id
    );
    Ok(())
}

async fn analyze(config: &Config) -> Result<()> {
    let ctx = user(config)?;
    let state = AppState::from_config(config).await?;
    let outcome = state.analyzer.run(&ctx).await?;
    println!("Generated {} insights", outcome.count);

    for insight in state.store.list_insights(&ctx).await? {
        println!(
            "  [{}] {}: {}",
            insight.risk_level.as_str(),
            insight.product_name,
            insight.recommendation
        );
    }
    Ok(())
}

async fn coordinate(config: &Config, scenario: Option<&str>) -> Result<()> {
    let ctx = user(config)?;
    let request = match scenario {
        Some(key) => {
            let scenario = find_scenario(key)
                .ok_or_else(|| NetworkError::UnknownScenario(key.to_string()))?;
            println!("Scenario: {}", scenario.label);
            CoordinationRequest {
                trigger_type: Some(DISRUPTION_TRIGGER.to_string()),
                disruption: Some(scenario.disruption),
            }
        }
        None => CoordinationRequest::default(),
    };

    let state = AppState::from_config(config).await?;
    let outcome = state.coordinator.run(&ctx, request).await?;
    let roster = state.coordinator.roster();

    for message in &outcome.messages {
        println!(
            "{} -> {} [{}] {}",
            roster.display_name(&message.from),
            roster.display_name(&message.to),
            message.kind,
            match message.content.as_str() {
                Some(text) => text.to_string(),
                None => message.content.to_string(),
            }
        );
    }

    let report = CoordinationReport::from_value(&outcome.report);
    let view = report_view(&report, outcome.messages.len(), roster);
    if view.is_displayable() {
        println!();
        print!("{}", render_text(&view));
    }
    println!("Session {}", outcome.session_id);
    Ok(())
}

async fn brief(config: &Config, output: Option<&std::path::Path>) -> Result<()> {
    let ctx = user(config)?;
    let state = AppState::from_config(config).await?;
    let insights = state.store.list_insights(&ctx).await?;
    let text = briefing_text(&insights);
    if text.is_empty() {
        println!("No insights yet; run `supplysense analyze` first.");
        return Ok(());
    }
    println!("{text}");

    let player = BriefingPlayer::new(state.tts.clone(), state.speech.clone())
        .with_audio_player(state.audio_player.clone());
    match player.deliver(&text).await? {
        Delivery::Audio(audio) => {
            println!("Played briefing audio");
            if let Some(path) = output {
                tokio::fs::write(path, &audio)
                    .await
                    .with_context(|| format!("failed to write {}", path.display()))?;
                println!("Saved briefing audio to {}", path.display());
            }
        }
        Delivery::Spoken => {
            if let Some(path) = output {
                tracing::warn!(path = %path.display(), "briefing was spoken locally; no audio to save");
            }
        }
    }
    Ok(())
}
