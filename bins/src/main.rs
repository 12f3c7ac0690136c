use std::sync::Arc;

use bg_process::{unban::UnbanBg, BgProcess};
use bot_core::bot::TgBot;
use dotenv::dotenv;
use env::Env;
use eyre::Context;
use ledger::Ledger;
use log::info;
use storage::google::GoogleSheets;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    if let Err(err) = dotenv() {
        info!("Failed to load .env file: {}", err);
    }
    pretty_env_logger::init();
    color_eyre::install()?;

    let env = Env::load().context("Failed to load env")?;
    info!("connecting to sheet {}", env.sheet_name());
    let sheets = GoogleSheets::with_credentials(
        env.google_credentials(),
        env.spreadsheet_id(),
        env.sheet_name(),
    )
    .context("Failed to create sheets client")?;

    info!("creating ledger");
    let bot = TgBot::from_token(env.tg_token());
    let ledger = Ledger::new(
        Arc::new(sheets),
        Arc::new(bot),
        env.chat_id(),
        env.sheet_offset(),
    );

    let mut bg = BgProcess::new().await?;
    bg.add(UnbanBg::new(ledger, env.unban_schedule())).await?;
    bg.start().await?;
    info!("Bot started! v{}", env!("CARGO_PKG_VERSION"));
    info!("Unban job scheduled: {}", env.unban_schedule());

    shutdown_signal().await?;
    info!("Shutting down...");
    bg.shutdown().await?;
    Ok(())
}

#[cfg(unix)]
async fn shutdown_signal() -> eyre::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut term = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result?,
        _ = term.recv() => {}
    }
    Ok(())
}

#[cfg(not(unix))]
async fn shutdown_signal() -> eyre::Result<()> {
    tokio::signal::ctrl_c().await?;
    Ok(())
}
