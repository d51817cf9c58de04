//! # Moon Phase Explorer Entry Point
//!
//! This binary crate wires the phase model, the renderers and the tutor
//! together. Pure commands (`phase`, `svg`, `ascii`, `raster`) print or write their
//! output directly; interactive commands (`drag`, `explain`, `quiz`, `chat`) run
//! on a Tokio runtime and read from stdin.

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use moon_phase_lib::{
    chat::ChatTranscript,
    config::Config,
    interaction::PhaseController,
    lunar,
    phase::is_waxing,
    quiz::{AnswerOutcome, QuizResult, QuizSession},
    renderer,
    scheduler::{ExplanationEvent, ExplanationScheduler},
    terminator::{lit_outline, LitOutline},
    tutor::{Tutor, TutorBackend},
    MoonData, Point,
};

#[derive(Parser)]
#[command(name = "moon-phase", version, about = "Explore the phases of the Moon")]
struct Cli {
    /// Configuration file (defaults to moon-config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct AngleArgs {
    /// Phase angle in degrees (0 = new moon, 180 = full moon)
    #[arg(allow_negative_numbers = true)]
    angle: Option<f64>,

    /// Use the real Moon's phase angle right now
    #[arg(long, conflicts_with = "angle")]
    today: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum ViewKind {
    /// Both views with a caption
    Scene,
    /// The Moon as seen from Earth
    Earth,
    /// The orbit seen from above
    Orbit,
}

#[derive(Subcommand)]
enum Command {
    /// Print the phase name, illumination and lit outline for an angle
    Phase {
        #[command(flatten)]
        angle: AngleArgs,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Render an SVG document
    Svg {
        #[command(flatten)]
        angle: AngleArgs,
        #[arg(long, value_enum, default_value = "scene")]
        view: ViewKind,
        /// Output file (stdout when omitted)
        #[arg(long, short)]
        out: Option<PathBuf>,
    },
    /// Draw the Moon as seen from Earth in the terminal
    Ascii {
        #[command(flatten)]
        angle: AngleArgs,
    },
    /// Rasterize the Earth view onto a pixel grid and print it
    Raster {
        #[command(flatten)]
        angle: AngleArgs,
        /// Width and height of the grid in pixels
        #[arg(long, default_value_t = 48)]
        size: u32,
    },
    /// Read pointer positions "x y" from stdin and follow the phase
    Drag,
    /// Ask the tutor to explain a phase
    Explain {
        #[command(flatten)]
        angle: AngleArgs,
    },
    /// Take a quiz about the Moon's phases
    Quiz,
    /// Chat with the tutor
    Chat,
}

/// Machine-readable output of the `phase` command.
#[derive(Serialize)]
struct PhaseReport {
    #[serde(flatten)]
    data: MoonData,
    outline: LitOutline,
    path: String,
}

fn resolve_angle(args: &AngleArgs, config: &Config) -> f64 {
    if args.today {
        let angle = lunar::phase_angle_now();
        log::info!("Tonight's phase angle is {:.1}°", angle);
        angle
    } else {
        args.angle.unwrap_or(config.view.initial_angle)
    }
}

fn print_phase(angle: f64, config: &Config, json: bool) -> anyhow::Result<()> {
    let data = MoonData::from_angle(angle);
    let outline = lit_outline(data.angle, config.view.moon_radius, config.view.moon_center);

    if json {
        let report = PhaseReport {
            path: outline.to_svg_path(),
            data,
            outline,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}  {}", data.japanese_name, data.label);
    println!("angle:        {:.1}°", data.angle);
    println!("illuminated:  {:.1}%", data.illumination * 100.0);
    if data.illumination > 0.0 && data.illumination < 1.0 {
        let trend = if is_waxing(data.angle) { "waxing" } else { "waning" };
        println!("trend:        {}", trend);
    }
    if outline.is_empty() {
        println!("outline:      (empty)");
    } else {
        println!("outline:      {}", outline.to_svg_path());
    }
    Ok(())
}

fn write_svg(angle: f64, view: ViewKind, out: Option<PathBuf>, config: &Config) -> anyhow::Result<()> {
    let svg = match view {
        ViewKind::Scene => renderer::scene_svg(angle, &config.view),
        ViewKind::Earth => renderer::earth_view_svg(angle, &config.view),
        ViewKind::Orbit => renderer::orbit_view_svg(angle, &config.view),
    };
    match out {
        Some(path) => {
            std::fs::write(&path, svg)
                .with_context(|| format!("writing {}", path.display()))?;
            log::info!("Wrote {}", path.display());
        }
        None => print!("{}", svg),
    }
    Ok(())
}

fn parse_pointer(line: &str) -> Option<Point> {
    let mut parts = line.split(|c: char| c.is_whitespace() || c == ',').filter(|s| !s.is_empty());
    let x = parts.next()?.parse().ok()?;
    let y = parts.next()?.parse().ok()?;
    Some(Point::new(x, y))
}

fn print_raster(angle: f64, size: u32) {
    for line in renderer::raster_moon(angle, size).to_lines() {
        println!("{}", line);
    }
}

fn print_explanation(event: ExplanationEvent) {
    match event {
        ExplanationEvent::Loading(phase) => {
            println!("… {} について考え中", phase.short_name());
        }
        ExplanationEvent::Ready { phase, text } => {
            println!("【{}】{}", phase.short_name(), text);
        }
    }
}

/// Wait for the last scheduled explanation and return the events not read yet.
async fn finish_explanations<T: Tutor + 'static>(
    scheduler: ExplanationScheduler<T>,
    mut events: mpsc::UnboundedReceiver<ExplanationEvent>,
) -> Vec<ExplanationEvent> {
    scheduler.finish().await;
    let mut remaining = Vec::new();
    while let Some(event) = events.recv().await {
        remaining.push(event);
    }
    remaining
}

async fn run_drag(config: &Config) -> anyhow::Result<()> {
    let tutor = Arc::new(TutorBackend::from_config(&config.tutor));
    let delay = Duration::from_millis(config.tutor.explanation_delay_ms);
    let (mut scheduler, mut events) = ExplanationScheduler::new(tutor, delay);

    let mut controller = PhaseController::new(config.view.initial_angle, config.view.orbit_center);
    let start = controller.data();
    println!("{:.0}°  {}", start.angle, start.japanese_name);
    scheduler.on_phase(start.phase);
    controller.begin_drag();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let Some(pointer) = parse_pointer(&line) else {
                    log::warn!("Ignoring input {:?}, expected \"x y\"", line);
                    continue;
                };
                if let Some(update) = controller.drag_to(pointer) {
                    if update.bucket_changed {
                        println!("{:.0}°  {}", update.data.angle, update.data.japanese_name);
                    }
                    scheduler.on_phase(update.data.phase);
                }
            }
            Some(event) = events.recv() => {
                print_explanation(event);
            }
        }
    }
    controller.end_drag();

    for event in finish_explanations(scheduler, events).await {
        print_explanation(event);
    }
    Ok(())
}

async fn run_explain(angle: f64, config: &Config) {
    let tutor = TutorBackend::from_config(&config.tutor);
    let phase = MoonData::from_angle(angle).phase;
    let text = tutor.explain(phase.short_name()).await;
    println!("【{}】{}", phase.short_name(), text);
}

fn read_choice(line: &str, options: usize) -> Option<usize> {
    match line.trim().parse::<usize>() {
        Ok(n) if (1..=options).contains(&n) => Some(n - 1),
        _ => None,
    }
}

fn wants_again(line: &str) -> bool {
    matches!(line.trim().to_lowercase().as_str(), "y" | "yes" | "はい" | "うん")
}

fn result_message(result: &QuizResult) -> &'static str {
    if result.is_perfect() {
        "全問正解！すごい！"
    } else {
        "よくがんばったね！"
    }
}

async fn run_quiz(config: &Config) -> anyhow::Result<()> {
    let tutor = TutorBackend::from_config(&config.tutor);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        // Every round asks the tutor for fresh questions
        let questions = tutor.quiz(config.tutor.quiz_size).await;
        let Some(mut session) = QuizSession::start(questions) else {
            println!("クイズを作れなかったよ。もう一回ためしてね。");
            return Ok(());
        };

        while let Some(question) = session.current_question().cloned() {
            let (index, total) = session.progress();
            println!();
            println!("もんだい {} / {}  (今のスコア: {})", index + 1, total, session.score());
            println!("{}", question.question);
            for (i, option) in question.options.iter().enumerate() {
                println!("  {}. {}", i + 1, option);
            }

            let choice = loop {
                let Some(line) = lines.next_line().await? else {
                    return Ok(());
                };
                match read_choice(&line, question.options.len()) {
                    Some(choice) => break choice,
                    None => println!("1 から {} の番号を入れてね", question.options.len()),
                }
            };

            match session.answer(choice) {
                AnswerOutcome::Correct => println!("せいかい！"),
                AnswerOutcome::Incorrect { correct_index } => {
                    println!("ざんねん… こたえは {}. {}", correct_index + 1, question.options[correct_index])
                }
                AnswerOutcome::AlreadyAnswered => {}
            }
            println!("解説：{}", question.explanation);

            if let Some(result) = session.advance() {
                println!();
                println!("けっか: {} / {}", result.score, result.total);
                println!("{}", result_message(&result));
            }
        }

        println!("もう一回やる？ (y/n)");
        match lines.next_line().await? {
            Some(line) if wants_again(&line) => continue,
            _ => return Ok(()),
        }
    }
}

async fn run_chat(config: &Config) -> anyhow::Result<()> {
    let tutor = TutorBackend::from_config(&config.tutor);
    let mut transcript = ChatTranscript::new();
    if let Some(greeting) = transcript.messages().first() {
        println!("{}", greeting.text);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let Some(message) = transcript.submit(&line) else {
            continue;
        };
        let reply = tutor.chat(&message).await;
        println!("{}", reply);
        transcript.receive(reply);
    }
    Ok(())
}

/// Main application entry point.
fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load_from_path(path),
        None => Config::load(),
    };

    match cli.command {
        Command::Phase { angle, json } => print_phase(resolve_angle(&angle, &config), &config, json),
        Command::Svg { angle, view, out } => {
            write_svg(resolve_angle(&angle, &config), view, out, &config)
        }
        Command::Ascii { angle } => {
            renderer::draw_ascii(resolve_angle(&angle, &config), &config.view);
            Ok(())
        }
        Command::Raster { angle, size } => {
            print_raster(resolve_angle(&angle, &config), size);
            Ok(())
        }
        Command::Explain { angle } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(run_explain(resolve_angle(&angle, &config), &config));
            Ok(())
        }
        Command::Drag => tokio::runtime::Runtime::new()?.block_on(run_drag(&config)),
        Command::Quiz => tokio::runtime::Runtime::new()?.block_on(run_quiz(&config)),
        Command::Chat => tokio::runtime::Runtime::new()?.block_on(run_chat(&config)),
    }
}
