use std::io::{self, BufRead, Write};

use colored::Colorize;
use tracing::{info, warn};
use wf_core::GameId;
use wf_engine::Engine;

pub async fn run(lang: Option<&str>) -> Result<(), String> {
    let (engine, start) = super::start(lang).await?;
    let game = start.game.id;

    println!("  {} The Lighthouse", "Starting".bold());
    println!("  Type a route name or number, 'look', 'log', 'help' or 'quit'.\n");
    super::print_lines(&start.lines);
    look(&engine, game).await?;

    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let mut line = String::new();

    loop {
        print!("> ");
        io::stdout().flush().map_err(|e| e.to_string())?;

        line.clear();
        match reader.read_line(&mut line) {
            Ok(0) => break, // EOF
            Err(e) => return Err(e.to_string()),
            _ => {}
        }

        let input = line.trim();
        match input {
            "" => continue,
            "quit" | "q" => {
                let lines = engine.end_game(game).await.map_err(|e| e.to_string())?;
                super::print_lines(&lines);
                break;
            }
            "look" | "l" => look(&engine, game).await?,
            "log" => {
                let transcript = engine.transcript(game).await.map_err(|e| e.to_string())?;
                for entry in &transcript {
                    println!("  {:>3}  {}", entry.position.to_string().dimmed(), entry.text);
                }
                println!();
            }
            "help" | "h" | "?" => {
                println!("  <number> or <route>  take a route");
                println!("  look                 describe where you are");
                println!("  log                  show the transcript so far");
                println!("  quit                 end the game\n");
            }
            _ => {
                if step(&engine, game, input).await? {
                    let lines = engine.end_game(game).await.map_err(|e| e.to_string())?;
                    super::print_lines(&lines);
                    println!("\n  {}", "The end.".bold());
                    break;
                }
            }
        }
    }

    Ok(())
}

async fn look(engine: &Engine, game: GameId) -> Result<(), String> {
    let view = engine
        .describe_location(game)
        .await
        .map_err(|e| e.to_string())?;
    super::print_location(&view);
    Ok(())
}

/// Take the route named or numbered by `input`. Returns whether the game
/// reached a final location.
async fn step(engine: &Engine, game: GameId, input: &str) -> Result<bool, String> {
    let view = engine
        .describe_location(game)
        .await
        .map_err(|e| e.to_string())?;
    let exit = match input.parse::<usize>() {
        Ok(n) => n.checked_sub(1).and_then(|i| view.exits.get(i)),
        Err(_) => view
            .exits
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(input)),
    };
    let Some(exit) = exit else {
        println!("  {}\n", format!("No route '{input}' from here.").yellow());
        return Ok(false);
    };

    match engine.take_route(game, exit.route).await {
        Ok(transition) => {
            info!(route = %exit.name, reached_final = transition.reached_final, "took route");
            super::print_lines(&transition.lines);
            if !transition.reached_final {
                look(engine, game).await?;
            }
            Ok(transition.reached_final)
        }
        Err(e) => {
            warn!(route = %exit.name, error = %e, "route failed");
            println!("  {}\n", e.to_string().yellow());
            Ok(false)
        }
    }
}
