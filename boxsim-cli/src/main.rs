mod viewer;

use boxsim_core::diagnostics::{format_diagnostic, format_parse_error};
use boxsim_core::{
    analyze_scene, build_simulation_context_from_source, parse_scene, scene_result,
    step_simulation, Error,
};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "boxsim")]
#[command(about = "Colliding particles in a reflective box", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scene headless and print the final particle states
    Run {
        /// Path to the scene file
        file: PathBuf,
        /// Override the number of frames from the scene
        #[arg(long)]
        frames: Option<u32>,
    },
    /// Parse and analyze a scene without running it
    Check {
        /// Path to the scene file
        file: PathBuf,
    },
    /// Open the interactive viewer; the scene reloads when the file changes
    View {
        /// Path to the scene file
        file: PathBuf,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run { file, frames } => run_file(&file, frames),
        Commands::Check { file } => check_file(&file),
        Commands::View { file } => view_file(file),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run_file(file: &PathBuf, frames: Option<u32>) -> Result<(), Box<dyn std::error::Error>> {
    let source = fs::read_to_string(file)?;
    let (mut ctx, _diagnostics) =
        build_simulation_context_from_source(&source).map_err(|e| describe(e, &source))?;
    if let Some(frames) = frames {
        ctx.max_frames = frames;
    }

    while !step_simulation(&mut ctx) {}
    let result = scene_result(&ctx);

    println!("frames = {}", result.frames);
    println!("elapsed = {}", result.elapsed);
    println!("momentum = {}", result.total_momentum);
    println!("kinetic_energy = {}", result.kinetic_energy);
    for (idx, record) in result.particles.iter().enumerate() {
        println!(
            "particle {} position = {} speed = {} mass = {}",
            idx, record.position, record.speed, record.mass
        );
    }

    Ok(())
}

fn check_file(file: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let source = fs::read_to_string(file)?;
    let scene = parse_scene(&source).map_err(|e| format_parse_error(&e, &source))?;
    let diagnostics = analyze_scene(&scene);

    for diagnostic in diagnostics.iter() {
        println!("{}", format_diagnostic(diagnostic, &source));
    }

    if diagnostics.has_errors() {
        return Err(format!("{} error(s) in {}", diagnostics.errors().count(), file.display()).into());
    }
    println!(
        "ok: {} particles, {} warning(s)",
        scene.particle_count(),
        diagnostics.warnings().count()
    );
    Ok(())
}

fn view_file(file: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1000.0, 1000.0])
            .with_title("boxsim"),
        ..Default::default()
    };

    eframe::run_native(
        "boxsim",
        options,
        Box::new(move |cc| {
            let app: Box<dyn eframe::App> = Box::new(viewer::ViewerApp::new(file, cc));
            Ok(app)
        }),
    )?;
    Ok(())
}

/// Render a core error for the terminal, with source context for parse errors.
fn describe(error: Error, source: &str) -> String {
    match error {
        Error::Scene(parse_error) => format_parse_error(&parse_error, source),
        other => other.to_string(),
    }
}
