//! CLI for Screenforge - game concepts and screenshots from one idea.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use screenforge::{ScreenType, Studio};

#[derive(Parser)]
#[command(name = "screenforge")]
#[command(about = "Generate mobile game concepts and screenshots via the ModelScope API")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a structured game concept from a free-text idea
    Concept(ConceptArgs),

    /// Generate a concept plus screenshots for the chosen screens
    Shots(ShotsArgs),

    /// List available screen types
    Screens,
}

#[derive(Args)]
struct ConceptArgs {
    /// The game idea, e.g. "a cozy potion-sorting puzzle"
    idea: String,
}

#[derive(Args)]
struct ShotsArgs {
    /// The game idea
    idea: String,

    /// Screens to generate
    #[arg(short, long, value_enum, value_delimiter = ',', default_value = "gameplay")]
    screens: Vec<ScreenType>,

    /// Output directory for the screenshots
    #[arg(short, long, default_value = ".")]
    out: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Concept(args) => generate_concept(args, cli.json).await,
        Commands::Shots(args) => generate_shots(args, cli.json).await,
        Commands::Screens => {
            list_screens(cli.json);
            Ok(())
        }
    }
}

async fn generate_concept(args: ConceptArgs, json_output: bool) -> anyhow::Result<()> {
    let studio = Studio::from_env()?;
    let concept = studio.new_concept(&args.idea).await?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&concept)?);
    } else {
        println!("Title:       {}", concept.title);
        println!("Genre:       {}", concept.genre);
        println!("Art style:   {}", concept.art_style);
        println!("Palette:     {}", concept.color_palette);
        println!("Mechanic:    {}", concept.gameplay_mechanic);
        println!("Visuals:     {}", concept.visual_description);
    }

    Ok(())
}

async fn generate_shots(args: ShotsArgs, json_output: bool) -> anyhow::Result<()> {
    std::fs::create_dir_all(&args.out)
        .with_context(|| format!("creating output directory {}", args.out.display()))?;

    let studio = Studio::from_env()?;
    let concept = studio.new_concept(&args.idea).await?;
    eprintln!("Concept: {} ({})", concept.title, concept.genre);

    let mut saved = Vec::new();
    let mut failures = Vec::new();

    for (index, screen) in args.screens.iter().enumerate() {
        eprintln!("Generating {} ...", screen);
        match studio.generate_screenshot(*screen).await {
            Ok(entry) => {
                let path = args.out.join(format!(
                    "{:02}-{}.{}",
                    index + 1,
                    screen.slug(),
                    entry.screenshot.format.extension()
                ));
                entry.screenshot.save(&path)?;
                saved.push((screen, path, entry.screenshot.size()));
            }
            Err(e) => {
                eprintln!("  {screen} failed: {e}");
                failures.push((screen, e));
            }
        }
    }

    if json_output {
        let result = serde_json::json!({
            "concept": concept,
            "saved": saved
                .iter()
                .map(|(screen, path, size)| {
                    serde_json::json!({
                        "screen": screen.label(),
                        "path": path.display().to_string(),
                        "size_bytes": size,
                    })
                })
                .collect::<Vec<_>>(),
            "failed": failures
                .iter()
                .map(|(screen, e)| {
                    serde_json::json!({ "screen": screen.label(), "error": e.to_string() })
                })
                .collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        for (screen, path, size) in &saved {
            println!("Saved {}: {} ({} bytes)", screen, path.display(), size);
        }
    }

    if saved.is_empty() && !failures.is_empty() {
        anyhow::bail!("all screenshot generations failed");
    }
    Ok(())
}

fn list_screens(json_output: bool) {
    if json_output {
        let screens: Vec<_> = ScreenType::ALL
            .iter()
            .map(|s| serde_json::json!({ "slug": s.slug(), "label": s.label() }))
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&screens).expect("static values serialize")
        );
    } else {
        println!("Available screens:\n");
        for screen in ScreenType::ALL {
            println!("  {:<14} {}", screen.slug(), screen.label());
        }
    }
}
