use ai_studio_core::{
    config::Config,
    init,
    session::{Session, Slot},
    AiStudio, AspectRatio, CreateFunction, EditFunction, ImageSource, Mode,
};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Directory the generated image is saved into
    #[arg(short, long, global = true, default_value = ".")]
    output: PathBuf,

    /// Override the text-to-image model defined in .env
    #[arg(long, global = true)]
    image_model: Option<String>,

    /// Override the image editing model defined in .env
    #[arg(long, global = true)]
    edit_model: Option<String>,

    /// Log requests to stderr
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a new image from a description
    Create {
        /// free, sticker, text or comic
        #[arg(short, long, default_value = "free")]
        function: CreateFunction,

        /// 1:1, 16:9, 9:16, 4:3 or 3:4
        #[arg(short, long, default_value = "1:1")]
        aspect_ratio: AspectRatio,

        /// Edit the result afterwards with this prompt
        #[arg(long)]
        then: Option<String>,

        #[arg(trailing_var_arg = true)]
        prompt: Vec<String>,
    },
    /// Edit a single image
    Edit {
        /// add-remove, retouch or style
        #[arg(short, long, default_value = "add-remove")]
        function: EditFunction,

        #[arg(short, long)]
        image: PathBuf,

        /// Edit the result afterwards with this prompt
        #[arg(long)]
        then: Option<String>,

        #[arg(trailing_var_arg = true)]
        prompt: Vec<String>,
    },
    /// Combine two images
    Compose {
        /// The two images, in order (repeat the flag)
        #[arg(short, long, required = true)]
        image: Vec<PathBuf>,

        /// Edit the result afterwards with this prompt
        #[arg(long)]
        then: Option<String>,

        #[arg(trailing_var_arg = true)]
        prompt: Vec<String>,
    },
    /// List the available functions per mode
    Functions,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    // Setup
    init();
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Command::Functions = args.command {
        print_functions();
        return Ok(());
    }

    // Load config and override models if specified via CLI
    let mut config = Config::load().context("Failed to load configuration")?;
    if let Some(m) = args.image_model {
        config.image_model = m;
    }
    if let Some(m) = args.edit_model {
        config.edit_model = m;
    }

    let studio = AiStudio::with_config(config).context("Failed to initialize Gemini client")?;
    let mut session = studio.new_session();

    let then = match args.command {
        Command::Create { function, aspect_ratio, then, prompt } => {
            session.select_function(function)?;
            session.set_aspect_ratio(aspect_ratio);
            session.set_prompt(prompt.join(" "));
            then
        }
        Command::Edit { function, image, then, prompt } => {
            if function.requires_two() {
                anyhow::bail!("Use the compose command to combine two images");
            }
            session.select_function(function)?;
            session.upload(Slot::First, ImageSource::File(image))?;
            session.set_prompt(prompt.join(" "));
            then
        }
        Command::Compose { image, then, prompt } => {
            if image.len() > 2 {
                anyhow::bail!("Compose takes exactly two images");
            }
            session.select_function(EditFunction::Compose)?;
            for (slot, path) in [Slot::First, Slot::Second].into_iter().zip(image) {
                session.upload(slot, ImageSource::File(path))?;
            }
            session.set_prompt(prompt.join(" "));
            then
        }
        Command::Functions => return Ok(()),
    };

    let saved = generate_and_save(&mut session, &studio, &args.output).await?;
    println!("{}", saved.display());

    // Feed the result back into the editor for a follow-up edit
    if let Some(follow_up) = then {
        session.send_result_to_edit()?;
        session.set_prompt(follow_up);
        let saved = generate_and_save(&mut session, &studio, &args.output).await?;
        println!("{}", saved.display());
    }

    Ok(())
}

async fn generate_and_save(
    session: &mut Session,
    studio: &AiStudio,
    output: &Path,
) -> Result<PathBuf> {
    let config = studio.config();
    let model = match session.mode() {
        Mode::Create => &config.image_model,
        Mode::Edit => &config.edit_model,
    };

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
            .template("{spinner:.green} {msg}")?
    );
    spinner.set_message(format!("Generating with {}...", model));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let outcome = session.generate(studio.client()).await;
    spinner.finish_and_clear();

    let image = match outcome {
        Ok(image) => image,
        Err(e) => {
            tracing::debug!(error = %e, "generation failed");
            anyhow::bail!("{}", e.user_message());
        }
    };

    image
        .save_to(output)
        .await
        .with_context(|| format!("Failed to save image into {}", output.display()))
}

fn print_functions() {
    println!("create:");
    for f in CreateFunction::ALL {
        println!("  {:<12} {}", f.id(), f.label());
    }
    println!("edit:");
    for f in EditFunction::ALL {
        println!("  {:<12} {} ({} image{})", f.id(), f.label(), f.image_count(), if f.image_count() == 1 { "" } else { "s" });
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "ai_studio_core=debug,info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
