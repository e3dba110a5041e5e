use std::path::PathBuf;

use clap::Parser;
use miette::{IntoDiagnostic, Result};

use scrutiny_core::Config;
use scrutiny_review::azure::AzureDevOpsClient;
use scrutiny_review::llm::OpenAiClient;
use scrutiny_review::pipeline::ReviewPipeline;
use scrutiny_skill::SkillDir;

#[derive(Parser)]
#[command(
    name = "scrutiny",
    version,
    about = "AI code review for Azure DevOps pull requests",
    long_about = "Scrutiny reviews an Azure DevOps pull request with an LLM and posts the\n\
                  results back as comments: one summary thread plus inline comments for\n\
                  critical and high-priority findings.\n\n\
                  Connection settings come from environment variables (set automatically\n\
                  in an Azure DevOps pipeline): SYSTEM_ACCESSTOKEN, OPENAI_API_KEY,\n\
                  PR_ID, ORG_URL, PROJECT, REPO_ID.\n\n\
                  Examples:\n  \
                    scrutiny                          Review the PR from the environment\n  \
                    scrutiny --model gpt-4o           Override the review model\n  \
                    scrutiny --max-files 20 -v        Smaller scope, verbose diagnostics"
)]
struct Cli {
    /// Model requested from the OpenAI-compatible endpoint
    #[arg(long)]
    model: Option<String>,

    /// Maximum number of files sent for review
    #[arg(long)]
    max_files: Option<usize>,

    /// Per-file line cap before truncation
    #[arg(long)]
    max_lines_per_file: Option<usize>,

    /// Path to the code-review skill directory
    #[arg(long)]
    skill_path: Option<PathBuf>,

    /// Enable verbose diagnostics
    #[arg(long, short)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    human_panic::setup_panic!();
    let cli = Cli::parse();

    let mut config = Config::from_env().into_diagnostic()?;
    if let Some(model) = cli.model {
        config.model = model;
    }
    if let Some(max_files) = cli.max_files {
        config.max_files = max_files;
    }
    if let Some(max_lines) = cli.max_lines_per_file {
        config.max_lines_per_file = max_lines;
    }
    if let Some(skill_path) = cli.skill_path {
        config.skill_path = skill_path;
    }
    config.debug |= cli.verbose;

    println!("{}", "=".repeat(60));
    println!("Scrutiny - AI Code Review for Azure DevOps");
    println!("{}", "=".repeat(60));
    println!("Project: {}", config.project);
    println!("PR ID: {}", config.pr_id);
    println!("Model: {}", config.model);
    println!("Skill path: {}", config.skill_path.display());

    let store = SkillDir::new(&config.skill_path);
    if store.exists() {
        println!("Skill directory found");
    } else {
        println!("Skill directory not found, using fallback prompt");
    }

    let azure = AzureDevOpsClient::new(&config).into_diagnostic()?;
    let llm = OpenAiClient::new(&config.openai_api_key, &config.model, None).into_diagnostic()?;

    let pipeline = ReviewPipeline::new(&azure, &azure, &llm, &store, &config);
    let report = pipeline.run().await.into_diagnostic()?;

    println!("{}", "=".repeat(60));
    println!("{report}");
    println!("Review completed");

    Ok(())
}
