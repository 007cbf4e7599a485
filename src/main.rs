//! Job application generator: tailored resumes and cover letters from a local model

use clap::Parser;
use colored::Colorize;
use job_app_generator::cli::{self, Cli, Commands, GenerateArgs};
use job_app_generator::config::{Config, ModelSettings};
use job_app_generator::error::{JobAppError, PipelineStage, Result};
use job_app_generator::llm::client::CompletionClient;
use job_app_generator::llm::resume_import::ResumeImporter;
use job_app_generator::output::exporter::{tool_version, PdfEngine};
use job_app_generator::output::template::TemplateStore;
use job_app_generator::processing::{ApplicationRequest, Pipeline};
use log::{error, info};
use std::path::Path;
use std::process;
use tokio::io::AsyncReadExt;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    if let Err(e) = run_command(&cli).await {
        error!("Command failed: {}", e);
        eprintln!("{} {}", "❌".red(), e.to_string().red());
        if e.is_connection() {
            print_connection_help(&cli.config);
        }
        process::exit(1);
    }
}

async fn run_command(cli: &Cli) -> Result<()> {
    match cli.command() {
        Commands::Generate(args) => generate(&cli.config, args).await,
        Commands::Import { resume, no_backup } => import(&cli.config, &resume, !no_backup).await,
        Commands::Models => list_models(&cli.config).await,
        Commands::Setup => setup(&cli.config).await,
    }
}

async fn generate(config_path: &Path, args: GenerateArgs) -> Result<()> {
    if let Some(resume) = &args.resume {
        cli::validate_resume_path(resume).map_err(|e| {
            JobAppError::InvalidInput(format!("Resume file: {}", e)).at_stage(PipelineStage::ResumeParsed)
        })?;
    }

    let mut config = Config::load(config_path).map_err(|e| e.at_stage(PipelineStage::ConfigLoaded))?;
    if args.no_pdf {
        config.pdf.enabled = false;
    }

    println!("🚀 Job application generator");
    println!("🤖 Model: {} at {}", config.lm_studio.model, config.lm_studio.base_url);
    if let Some(resume) = &args.resume {
        println!("📄 Resume: {}", resume.display());
    }

    let job_listing = match &args.job {
        Some(path) => tokio::fs::read_to_string(path).await.map_err(|e| {
            JobAppError::InvalidInput(format!("Cannot read job listing {}: {}", path.display(), e))
                .at_stage(PipelineStage::PromptsBuilt)
        })?,
        None => read_listing_from_stdin().await?,
    };

    let pipeline = Pipeline::from_config(config)?.with_progress(true);
    let request = ApplicationRequest {
        company_override: args.company,
        resume_path: args.resume,
        ..ApplicationRequest::new(job_listing)
    };

    let report = pipeline.run(&request).await?;
    report.print();
    Ok(())
}

async fn read_listing_from_stdin() -> Result<String> {
    println!("📋 Paste the job listing below, then press Ctrl-D (Ctrl-Z then Enter on Windows):");
    let mut listing = String::new();
    tokio::io::stdin().read_to_string(&mut listing).await?;
    Ok(listing)
}

async fn import(config_path: &Path, resume: &Path, backup: bool) -> Result<()> {
    cli::validate_resume_path(resume)
        .map_err(|e| JobAppError::InvalidInput(format!("Resume file: {}", e)))?;

    let settings = if config_path.exists() {
        Config::load(config_path)?.lm_studio
    } else {
        ModelSettings::default()
    };

    let client = CompletionClient::new(settings)?;
    println!("📄 Parsing {} with {}...", resume.display(), client.settings().model);
    let importer = ResumeImporter::new(client);
    let outcome = importer.import(resume, config_path, backup).await?;

    if let Some(backup_path) = &outcome.backup_path {
        println!("📋 Backed up existing config to {}", backup_path.display());
    }
    let profile = &outcome.config.profile;
    println!("👤 Name: {}", profile.personal_info.full_name);
    println!("📚 Education: {}", profile.personal_info.education().education_line);
    println!(
        "🛠️  {} skills, {} jobs, {} volunteer roles",
        profile.skills.len(),
        profile.experience.len(),
        profile.volunteer.len()
    );
    println!("{} Config updated: {}", "✅".green(), outcome.config_path.display());
    println!("💡 Review the file and adjust anything the model got wrong.");
    Ok(())
}

async fn list_models(config_path: &Path) -> Result<()> {
    let config = Config::load(config_path)?;
    let client = CompletionClient::new(config.lm_studio.clone())?;

    println!("🔍 Models at {}", config.lm_studio.base_url);
    let models = client.list_models().await?;
    if models.is_empty() {
        println!("   No models loaded. Load one in LM Studio first.");
    }
    for model in &models {
        let marker = if *model == config.lm_studio.model { "→".green().to_string() } else { " ".to_string() };
        println!(" {} {}", marker, model);
    }
    Ok(())
}

async fn setup(config_path: &Path) -> Result<()> {
    println!("🔧 Setting up job application generator");

    let created_config = !config_path.exists();
    let config = Config::load(config_path)?;
    if created_config {
        println!("📝 Created {} with placeholder details; edit it or run `import`", config_path.display());
    } else {
        println!("📝 Using existing {}", config_path.display());
    }

    for dir in [config.templates_dir(), config.output_dir()] {
        std::fs::create_dir_all(dir)?;
        info!("Ensured directory {}", dir.display());
    }
    for path in TemplateStore::new(config.templates_dir()).ensure_defaults()? {
        println!("📄 Created template {}", path.display());
    }

    match tool_version("pandoc").await {
        Some(version) => {
            println!("{} {}", "✅".green(), version);
            for engine in PdfEngine::preference_order() {
                match tool_version(engine.as_str()).await {
                    Some(_) => println!("   {} {} available", "✅".green(), engine),
                    None => println!("   {} {} not found", "⚠️".yellow(), engine),
                }
            }
        }
        None => println!(
            "{} pandoc not found; documents will be saved as markdown only",
            "⚠️".yellow()
        ),
    }

    let client = CompletionClient::new(config.lm_studio.clone())?;
    match client.list_models().await {
        Ok(models) => println!(
            "{} Model server reachable at {} ({} models)",
            "✅".green(),
            config.lm_studio.base_url,
            models.len()
        ),
        Err(e) => println!("{} Model server not reachable: {}", "⚠️".yellow(), e),
    }

    println!("🎉 Setup complete");
    Ok(())
}

fn print_connection_help(config_path: &Path) {
    eprintln!();
    eprintln!("💡 Troubleshooting:");
    eprintln!("   1. Make sure LM Studio is running");
    eprintln!("   2. Load a model and start the local server");
    eprintln!("   3. Check lm_studio.base_url in {}", config_path.display());
    eprintln!("   4. Run `job-app-generator models` to test the connection");
}
