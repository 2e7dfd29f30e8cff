use clap::Parser;
use colored::Colorize;
use flood_aco::prelude::*;
use flood_aco::terrain::parse_drain_plan;
use std::time::Instant;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(Args::parse()) {
        eprintln!("{} {}", "error:".red().bold(), err);
        std::process::exit(1);
    }
}

fn run(args: Args) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let mut engine = SimulationEngine::new(args.to_config(), args.seed)?;

    // Setup: explicit drains first, otherwise the lowest ground
    let mut drains = args.drains.clone();
    if let Some(plan) = &args.drain_plan {
        drains.extend(parse_drain_plan(plan)?);
    }
    if drains.is_empty() {
        engine.auto_place_drains(args.auto_drains)?;
    } else {
        for pos in drains {
            engine.place_drain(pos)?;
        }
    }

    let start = Instant::now();

    // Optimize
    engine.begin_optimization()?;
    for _ in 0..args.max_iterations {
        let converged = engine.optimize_iteration()?;
        if !args.suppress_events {
            if let Some(colony) = engine.colony() {
                print_iteration(colony);
            }
        }
        if converged {
            break;
        }
    }

    // Defend
    engine.begin_defense()?;
    engine.run_defense(args.defend_ticks)?;

    engine.print_summary(start.elapsed());

    Ok(())
}

fn print_iteration(colony: &Colony) {
    let mut line = format!(
        "{} {} {} {}",
        "🐜".yellow(),
        format!("iteration {}", colony.iteration()).bright_white(),
        format!("paths+{}", colony.accepted_this_iteration()).cyan(),
        format!("pipes={}", colony.total_pipe_length()).cyan(),
    );
    if let Some(reason) = colony.exceeded_reason() {
        line.push(' ');
        line.push_str(&format!("exceeded={reason}").red().to_string());
    }
    println!("{line}");
}
