use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{CommandFactory, Parser, Subcommand};
use plasmatrim_core::{
    sequence_file::SequenceFile,
    types::{Color, Sequence, SequenceStep, Timing, MAX_SEQUENCE_STEPS},
};

/// PlasmaTrim sequence files utility
///
/// A command line application for inspecting and generating PlasmaTrim RGB-8
/// sequence files.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = false)]
struct Cli {
    /// Actual command
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the sequence stored in the file
    Show {
        /// Sequence file path
        #[arg(value_name = "FILE")]
        path: PathBuf,
        /// Print the sequence as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check that the file is a valid sequence file
    Check {
        /// Sequence file path
        #[arg(value_name = "FILE")]
        path: PathBuf,
    },
    /// Write a sequence file filled with a single color
    Fill {
        /// Output file path
        #[arg(value_name = "FILE")]
        path: PathBuf,
        /// Color of every LED in the `RRGGBB` form
        #[arg(short, long, value_parser = parse_color, value_name = "RRGGBB")]
        color: Color,
        /// Number of the sequence slots to fill
        #[arg(short, long, default_value_t = 1)]
        slots: usize,
        /// Hold time of each step
        #[arg(long, default_value = "1s")]
        hold: Timing,
        /// Fade time of each step
        #[arg(long, default_value = "1s")]
        fade: Timing,
    },
    /// Generate shell completions
    Completions {
        /// The shell to generate the completions for
        #[arg(value_enum)]
        shell: clap_complete_command::Shell,
    },
}

fn parse_color(s: &str) -> anyhow::Result<Color> {
    let s = s.trim_start_matches('#');
    if s.len() != 6 || !s.is_ascii() {
        bail!("Color must have the RRGGBB form");
    }

    let channel = |i: usize| {
        u8::from_str_radix(&s[i..i + 2], 16).with_context(|| format!("Invalid color {s}"))
    };
    Ok(Color::new(channel(0)?, channel(2)?, channel(4)?))
}

fn print_step(slot: usize, step: &SequenceStep) {
    let colors = step
        .colors
        .iter()
        .map(|c| format!("{:02X}{:02X}{:02X}", c.r, c.g, c.b))
        .collect::<Vec<_>>()
        .join(" ");
    println!(
        "{slot:02}: hold {:>5} fade {:>5} - {colors}",
        step.hold.to_string(),
        step.fade.to_string()
    );
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Show { path, json } => {
            log::debug!("Reading sequence file {:?}", path);

            let file = SequenceFile::load(&path)
                .with_context(|| format!("Unable to read sequence file {}", path.display()))?;
            if json {
                let value = serde_json::json!({
                    "active_slots": file.active_slots,
                    "steps": file.sequence,
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                println!("Active slots: {}", file.active_slots);
                for (slot, step) in file.sequence.iter().enumerate() {
                    print_step(slot, step);
                }
            }
        }
        Command::Check { path } => {
            let file = SequenceFile::load(&path)
                .with_context(|| format!("Invalid sequence file {}", path.display()))?;
            if file.active_slots > file.sequence.len() {
                log::warn!(
                    "{} declares {} active slots, but stores only {} steps",
                    path.display(),
                    file.active_slots,
                    file.sequence.len()
                );
            }
            println!(
                "{}: {} steps, {} active",
                path.display(),
                file.sequence.len(),
                file.active_steps().len()
            );
        }
        Command::Fill {
            path,
            color,
            slots,
            hold,
            fade,
        } => {
            if slots > MAX_SEQUENCE_STEPS {
                bail!("The device stores at most {MAX_SEQUENCE_STEPS} slots, got {slots}");
            }

            let mut step = SequenceStep::solid(color);
            step.hold = hold;
            step.fade = fade;

            let mut sequence = Sequence::new();
            for _ in 0..slots {
                sequence.push(step)?;
            }

            SequenceFile::new(sequence)
                .save(&path)
                .with_context(|| format!("Unable to write sequence file {}", path.display()))?;
            log::info!("Written {} slots into {}", slots, path.display());
        }

        Command::Completions { shell } => {
            shell.generate(&mut Cli::command(), &mut std::io::stdout());
        }
    }

    Ok(())
}
