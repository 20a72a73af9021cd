// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// The entry point for all user interaction, parsed with `clap`.
// All business logic is delegated to Layer 2 (application).
//
// Two commands are supported:
//   1. `train`    — trains the model on a .txt corpus
//   2. `generate` — loads a checkpoint and continues a prompt

// Declare the commands submodule
pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, GenerateArgs, TrainArgs};

/// The main CLI struct — clap reads the fields and generates
/// argument parsing code via the Parser derive macro.
#[derive(Parser, Debug)]
#[command(
    name = "textgen",
    version = "0.1.0",
    about = "Train a minimal GPT on .txt files, then generate text from a prompt."
)]
pub struct Cli {
    /// The subcommand to run (train or generate)
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch to the correct use
    /// case. The CLI layer only routes, never computes.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)    => self.run_train(args),
            Commands::Generate(args) => self.run_generate(args),
        }
    }

    /// Handles the `train` subcommand.
    fn run_train(&self, args: TrainArgs) -> Result<()> {
        use crate::application::train_use_case::TrainUseCase;

        tracing::info!("Starting training on corpus in: {}", args.corpus_dir);

        // Convert CLI args → application config
        let use_case = TrainUseCase::new(args.into());
        use_case.execute()?;

        println!("Training complete. Checkpoint saved.");
        Ok(())
    }

    /// Handles the `generate` subcommand.
    fn run_generate(&self, args: GenerateArgs) -> Result<()> {
        use crate::application::generate_use_case::GenerateUseCase;
        use crate::domain::traits::TextGenerator;

        let mut use_case = GenerateUseCase::new(args.checkpoint_dir.clone())?;
        let text = use_case.complete(&args.prompt, args.max_length)?;

        println!("\n{}", text);
        Ok(())
    }
}
