use pixel_genie::{
    logger, services,
    ui::{self, banner, prompt_input, ImageDisplay, LoadingSpinner, PromptInput},
    AppState, Config, Orchestrator,
};
use std::env;
use std::io::Write;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("❌ {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let dotenv_loaded = dotenv::dotenv().is_ok();

    let config = Config::from_env()?;
    logger::init_with_config(config.logger_config())?;

    if dotenv_loaded {
        log::debug!("✅ .env file loaded");
    } else {
        log::debug!("No .env file found, using system environment variables");
    }

    logger::log_startup_info(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    logger::log_config_info(&config);

    let (refiner, generator) = services::connect(&config).await?;
    let orchestrator = Orchestrator::new(refiner, generator);
    let images = ImageDisplay::new(&config.output_dir);

    println!("{}\n", banner::header());

    let args: Vec<String> = env::args().skip(1).collect();
    let code = if args.is_empty() {
        interactive(&orchestrator, &images).await?;
        ExitCode::SUCCESS
    } else {
        let state = submit(&orchestrator, args.join(" ")).await;
        let shown = show(&state, &images);
        if state.has_error() || !shown {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        }
    };

    println!(
        "\n{}",
        banner::footer(orchestrator.refiner_label(), orchestrator.generator_label())
    );
    Ok(code)
}

async fn interactive(
    orchestrator: &Orchestrator,
    images: &ImageDisplay,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut input = PromptInput::new(tokio::io::stdin());

    loop {
        print!("{}", prompt_input::render(&orchestrator.state()));
        std::io::stdout().flush()?;

        let Some(line) = input.read().await? else {
            println!();
            return Ok(());
        };

        let state = submit(orchestrator, line).await;
        show(&state, images);
        println!();
    }
}

async fn submit(orchestrator: &Orchestrator, prompt: String) -> AppState {
    let spinner = LoadingSpinner::start(orchestrator.subscribe());
    let state = orchestrator.generate(prompt).await;
    spinner.stop().await;
    state
}

/// Prints the result views. Returns `false` when the image could not be
/// decoded or written.
fn show(state: &AppState, images: &ImageDisplay) -> bool {
    match ui::render_result(state, images) {
        Ok(rendered) => {
            println!("{}", rendered);
            true
        }
        Err(e) => {
            log::error!("Could not display result: {}", e);
            println!("❌ {}", e.user_message());
            false
        }
    }
}
