use clap::Parser;
use roundkeeper::utils::{logger, validation::Validate};
use roundkeeper::{
    CliConfig, FileMarkerStore, HoleCount, HoleEdit, HoleEntry, HttpCourseCatalog, HttpRoundStore,
    Notice, Round, RoundSession, SessionStep,
};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

type CliSession = RoundSession<HttpRoundStore, HttpCourseCatalog, FileMarkerStore>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting roundkeeper CLI");

    let config = match cli.effective_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load configuration: {}", e);
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    display_round_summary(&config);

    // 建立外部介面與 session
    let store = Arc::new(HttpRoundStore::new(config.api.round_endpoint.clone()));
    let catalog = HttpCourseCatalog::new(config.course_endpoint().to_string());
    let markers = FileMarkerStore::new(config.marker_path().to_string());

    let resuming = config.round.round_id.is_some();
    let round_id = config.round.round_id.clone().unwrap_or_else(|| {
        format!("round-{}", chrono::Utc::now().format("%Y%m%d%H%M%S"))
    });
    let hole_count = HoleCount::try_from(config.round.holes)
        .map_err(|reason| anyhow::anyhow!("invalid hole count: {}", reason))?;
    let round = Round::new(
        round_id,
        config.round.course_id.clone(),
        config.round.tee.clone(),
        hole_count,
    );

    let mut session = RoundSession::new(round, store, catalog, markers, config.scheduler_config());

    let loaded = if resuming {
        session.resume(config.round.start_hole).await.map(|hole| {
            println!("⛳ Resumed at hole {}", hole);
        })
    } else {
        session.load_new().await
    };

    if let Err(e) = loaded {
        tracing::error!(
            "❌ Could not start the round: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 建議: {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            roundkeeper::utils::error::ErrorSeverity::Low => 0,
            roundkeeper::utils::error::ErrorSeverity::Medium => 2, // 重試可恢復
            roundkeeper::utils::error::ErrorSeverity::High => 1,
            roundkeeper::utils::error::ErrorSeverity::Critical => 3, // 系統錯誤
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
        return Ok(());
    }

    print_hole(&session.current_hole_entry());
    print_help();
    run_repl(&mut session).await
}

fn display_round_summary(config: &roundkeeper::RoundConfig) {
    println!("📋 Round Summary:");
    println!("  Course: {}", config.round.course_id);
    if let Some(tee) = &config.round.tee {
        println!("  Tee: {}", tee);
    }
    println!("  Holes: {}", config.round.holes);
    println!("  Round store: {}", config.api.round_endpoint);
    println!("  Marker dir: {}", config.marker_path());
    println!();
}

fn print_help() {
    println!("Commands:");
    println!("  s <strokes>   set score for the current hole");
    println!("  p <putts>     set putt count");
    println!("  f [on|off]    toggle / set fairway hit");
    println!("  g [on|off]    toggle / set green in regulation");
    println!("  n             next hole (finishes the round on the last hole)");
    println!("  b             previous hole");
    println!("  card          show the whole scorecard");
    println!("  finish        finish the round now");
    println!("  quit          leave (the round can be resumed later)");
}

fn print_hole(entry: &HoleEntry) {
    let distance = if entry.distance > 0 {
        format!("{}m", entry.distance)
    } else {
        "—".to_string()
    };
    println!(
        "⛳ Hole {} · Par {} · {} | score {}, putts {}, FIR {}, GIR {}",
        entry.hole,
        entry.par,
        distance,
        entry.score,
        entry.putts,
        if entry.fairway_hit { "✓" } else { "✗" },
        if entry.green_in_regulation { "✓" } else { "✗" },
    );
}

fn print_card(entries: &[HoleEntry]) {
    println!("  hole  par  dist  score  putts  FIR  GIR");
    for entry in entries {
        println!(
            "  {:>4}  {:>3}  {:>4}  {:>5}  {:>5}  {:>3}  {:>3}",
            entry.hole,
            entry.par,
            entry.distance,
            entry.score,
            entry.putts,
            if entry.fairway_hit { "✓" } else { "-" },
            if entry.green_in_regulation { "✓" } else { "-" },
        );
    }
}

fn parse_flag(arg: Option<&str>, current: bool) -> bool {
    match arg {
        Some("on") | Some("true") | Some("yes") => true,
        Some("off") | Some("false") | Some("no") => false,
        _ => !current,
    }
}

fn drain_notices(session: &mut CliSession) {
    while let Some(notice) = session.poll_notice() {
        match notice {
            Notice::WriteFailed { hole, attempts } => {
                println!(
                    "⚠️ Hole {} could not be saved online after {} attempts; it is kept on this device",
                    hole, attempts
                );
            }
            Notice::TotalsWriteFailed => {
                println!("⚠️ Round totals could not be saved online; shown from local data");
            }
        }
    }
}

async fn run_repl(session: &mut CliSession) -> anyhow::Result<()> {
    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    while let Some(line) = lines.next_line().await? {
        let mut parts = line.split_whitespace();
        let command = match parts.next() {
            Some(command) => command,
            None => continue,
        };
        let arg = parts.next();

        let result = match command {
            "s" | "score" => session
                .edit_hole(HoleEdit::Score(arg.unwrap_or("").to_string()))
                .await
                .map(|entry| print_hole(&entry)),
            "p" | "putts" => session
                .edit_hole(HoleEdit::Putts(arg.unwrap_or("").to_string()))
                .await
                .map(|entry| print_hole(&entry)),
            "f" | "fairway" => {
                let value = parse_flag(arg, session.current_hole_entry().fairway_hit);
                session
                    .edit_hole(HoleEdit::FairwayHit(value))
                    .await
                    .map(|entry| print_hole(&entry))
            }
            "g" | "green" => {
                let value = parse_flag(arg, session.current_hole_entry().green_in_regulation);
                session
                    .edit_hole(HoleEdit::GreenInRegulation(value))
                    .await
                    .map(|entry| print_hole(&entry))
            }
            "n" | "next" => match session.go_next().await {
                Ok(SessionStep::Moved(_)) => {
                    print_hole(&session.current_hole_entry());
                    Ok(())
                }
                Ok(SessionStep::Finished(totals)) => {
                    drain_notices(session);
                    println!(
                        "🏁 Round finished! {} strokes, {} putts, {} fairways, {} greens",
                        totals.score,
                        totals.putts,
                        totals.fairways_hit,
                        totals.greens_in_regulation
                    );
                    return Ok(());
                }
                Ok(SessionStep::AtFirst) => Ok(()),
                Err(e) => Err(e),
            },
            "b" | "back" => match session.go_previous().await {
                Ok(SessionStep::AtFirst) => {
                    println!("Already on hole 1");
                    Ok(())
                }
                Ok(_) => {
                    print_hole(&session.current_hole_entry());
                    Ok(())
                }
                Err(e) => Err(e),
            },
            "card" => {
                print_card(&session.scorecard_entries());
                Ok(())
            }
            "finish" => match session.finish_round().await {
                Ok(totals) => {
                    drain_notices(session);
                    println!(
                        "🏁 Round finished! {} strokes, {} putts, {} fairways, {} greens",
                        totals.score,
                        totals.putts,
                        totals.fairways_hit,
                        totals.greens_in_regulation
                    );
                    return Ok(());
                }
                Err(e) => Err(e),
            },
            "quit" | "q" | "exit" => {
                // 保留續局標記，之後可以 --round-id 續局
                println!("👋 Round {} paused; resume it any time", session.round().id);
                return Ok(());
            }
            "help" | "?" => {
                print_help();
                Ok(())
            }
            other => {
                println!("Unknown command '{}'; type 'help' for the list", other);
                Ok(())
            }
        };

        if let Err(e) = result {
            println!("❌ {}", e.user_friendly_message());
        }
        drain_notices(session);
    }

    Ok(())
}
