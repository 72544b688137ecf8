use crease_core::{BallOutcome, GameMode, Roster};
use crease_host::{load_report, load_script, replay_script, save_report, verify_report, ReplayReport};
use std::env;
use std::time::Instant;

fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::filter::EnvFilter::from_default_env())
        .init();

    println!("🏏 Crease Over Replay");
    println!("{}", "=".repeat(70));
    println!();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage(&args[0]);
        std::process::exit(1);
    }

    let command = &args[1];

    match command.as_str() {
        "replay" => {
            if args.len() < 3 {
                eprintln!("Usage: {} replay <script_file> [output_file]", args[0]);
                std::process::exit(1);
            }
            let output_file = args.get(3).map(|s| s.as_str());
            replay_command(&args[2], output_file);
        }

        "inspect" => {
            if args.len() < 3 {
                eprintln!("Usage: {} inspect <report_file>", args[0]);
                eprintln!("Error: Missing required argument");
                std::process::exit(1);
            }
            inspect_command(&args[2]);
        }

        "--help" | "-h" => {
            print_usage(&args[0]);
            std::process::exit(0);
        }

        _ => {
            eprintln!("❌ Unknown command: {}", command);
            print_usage(&args[0]);
            std::process::exit(1);
        }
    }
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} <command> [options]", program);
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  replay <script_file> [output_file]");
    eprintln!("      Play a recorded session through the engine and report the over");
    eprintln!("      - script_file: JSON file with the session setup and inputs");
    eprintln!("      - output_file: Optional file to save the report (JSON)");
    eprintln!("                     Defaults to: crease-over_<mode>_<timestamp>.json");
    eprintln!();
    eprintln!("  inspect <report_file>");
    eprintln!("      Check a saved report against its outcome hash and print it");
    eprintln!();
    eprintln!("Example workflow:");
    eprintln!("  1. Replay:  {} replay session.json", program);
    eprintln!("  2. Inspect: {} inspect crease-over_batting_<timestamp>.json", program);
}

fn replay_command(script_file: &str, output_file: Option<&str>) {
    println!("📋 Replaying session");
    println!("  Script file: {}", script_file);
    println!();

    let script = load_script(script_file).unwrap_or_else(|e| {
        eprintln!("❌ Error loading script: {}", e);
        std::process::exit(1);
    });

    println!("📦 Loaded {} inputs", script.inputs.len());
    println!("  Mode: {}", script.mode);
    println!("  Difficulty: {}", script.difficulty);
    println!();

    let start = Instant::now();
    let roster = Roster::default();
    let report = replay_script(&script, &roster).unwrap_or_else(|e| {
        eprintln!();
        eprintln!("❌ Replay failed: {}", e);
        std::process::exit(1);
    });
    println!("  Replay time: {:.3}s", start.elapsed().as_secs_f64());
    println!();

    let default_filename = format!("crease-over_{}_{}.json", script.mode, chrono::Utc::now().timestamp());
    let file_to_save = output_file.unwrap_or(&default_filename);

    match save_report(&report, file_to_save) {
        Ok(_) => {
            println!("✅ Over complete!");
            print_report(&report);
            println!();
            println!("💾 Report saved to: {}", file_to_save);
            println!("   Use 'inspect {}' to check it later", file_to_save);
            println!("{}", "=".repeat(70));
        }
        Err(e) => {
            eprintln!("❌ Error saving report: {}", e);
            std::process::exit(1);
        }
    }
}

fn inspect_command(report_file: &str) {
    println!("📋 Inspecting report");
    println!("  Report file: {}", report_file);
    println!();

    let report = match load_report(report_file) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("❌ Error loading report: {}", e);
            std::process::exit(1);
        }
    };

    match verify_report(&report) {
        Ok(()) => {
            println!("✅ Outcome hash verified!");
            print_report(&report);
            println!("{}", "=".repeat(70));
        }
        Err(e) => {
            eprintln!();
            eprintln!("❌ Report verification failed: {}", e);
            eprintln!("{}", "=".repeat(70));
            std::process::exit(1);
        }
    }
}

fn print_report(report: &ReplayReport) {
    let payload = &report.payload;
    println!("  Mode: {}", payload.mode);
    println!("  Difficulty: {}", payload.difficulty);
    println!("  Opponent: {} ({})", payload.opponent_ref.name, payload.opponent_ref.team);
    println!();
    for outcome in &payload.outcomes {
        match outcome {
            BallOutcome::Batting(b) => println!("  Ball {}: {} runs", b.index + 1, b.score),
            BallOutcome::Bowling(b) => println!(
                "  Ball {}: {:.1} km/h, {:.1}% accuracy",
                b.index + 1,
                b.speed_kmh,
                b.accuracy_pct
            ),
        }
    }
    println!();
    match payload.mode {
        GameMode::Batting => println!(
            "  Total: {} runs (avg {:.2} per ball)",
            report.summary.total_runs, report.summary.average_score
        ),
        GameMode::Bowling => println!(
            "  Average: {:.1} km/h, {:.1}% accuracy",
            report.summary.average_speed_kmh, report.summary.average_accuracy_pct
        ),
    }
    if let Some(profile) = &report.matched_profile {
        println!("  You played like: {} ({})", profile.name, profile.team);
        for fact in &profile.fun_facts {
            println!("    - {}", fact);
        }
    }
    println!("  Log Hash: 0x{}", report.log_hash);
    println!("  Events Emitted: {}", report.events_len);
}
