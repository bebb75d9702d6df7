use colored::Colorize;
use serde::Serialize;
use tracing::info;
use wf_engine::LogLine;

#[derive(Serialize)]
struct WalkReport {
    language: String,
    location: String,
    finished: bool,
    lines: Vec<LogLine>,
}

pub async fn run(lang: Option<&str>, routes: &[String], json: bool) -> Result<(), String> {
    let (engine, start) = super::start(lang).await?;
    let game = start.game.id;
    let language = start.game.language.to_string();
    let mut lines = start.lines;
    let mut finished = false;

    for name in routes {
        if finished {
            return Err(format!("the adventure is over, cannot take '{name}'"));
        }
        let route = engine
            .find_route(game, name)
            .await
            .map_err(|e| e.to_string())?
            .ok_or_else(|| format!("no route named '{name}' from here"))?;
        let transition = engine
            .take_route(game, route.id)
            .await
            .map_err(|e| e.to_string())?;
        info!(
            route = %name,
            lines = transition.lines.len(),
            reached_final = transition.reached_final,
            "took route"
        );
        lines.extend(transition.lines);
        finished = transition.reached_final;
    }

    let location = engine
        .describe_location(game)
        .await
        .map_err(|e| e.to_string())?
        .name;
    if finished {
        lines.extend(engine.end_game(game).await.map_err(|e| e.to_string())?);
    }

    if json {
        let report = WalkReport {
            language,
            location,
            finished,
            lines,
        };
        let out = serde_json::to_string_pretty(&report).map_err(|e| e.to_string())?;
        println!("{out}");
        return Ok(());
    }

    super::print_lines(&lines);
    println!();
    if finished {
        println!("  {}", "The end.".bold());
    } else {
        println!("  You are at: {location}");
    }
    Ok(())
}
