use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use prompt_skills::apply::SkillApplier;
use prompt_skills::catalog;
use prompt_skills::config;
use prompt_skills::model::{self, LoadedModel};
use prompt_skills::skills::{Skill, SkillSelection};
use prompt_skills::templates::Language;
use prompt_skills::text::convert_newlines;

#[derive(Parser)]
#[command(name = "prompt-skills")]
#[command(about = "Apply prompt engineering techniques to a prompt through an OpenAI-compatible API", long_about = None)]
struct Cli {
    /// Config file path (default: PROMPT_SKILLS_CONFIG_PATH or ~/.prompt-skills/config.json)
    #[arg(long, short, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// List the available skills and their identifiers.
    Skills,

    /// List chat models available to OPENAI_API_KEY (falls back to a fixed list on any error).
    Models,

    /// Apply a single skill to the prompt.
    Apply {
        /// Skill identifier (see `prompt-skills skills`).
        skill: String,

        /// 1-based step number; with --english, only step 1 asks for English output.
        #[arg(long, default_value_t = 1)]
        position: usize,

        #[command(flatten)]
        request: RequestArgs,
    },

    /// Apply several skills in one request.
    Refine {
        /// Skill identifiers, in the order they should be listed to the model.
        #[arg(required = true, num_args = 1..)]
        skills: Vec<String>,

        #[command(flatten)]
        request: RequestArgs,
    },

    /// Apply several skills one after another, feeding each result into the next.
    Pipeline {
        /// Skill identifiers, in application order.
        #[arg(required = true, num_args = 1..)]
        skills: Vec<String>,

        /// Print every intermediate result, not just the last.
        #[arg(long)]
        all_steps: bool,

        #[command(flatten)]
        request: RequestArgs,
    },
}

#[derive(Args)]
struct RequestArgs {
    /// Prompt text. Read from stdin when omitted.
    #[arg(long, short)]
    prompt: Option<String>,

    /// Model name (default from config or gpt-4o-mini).
    #[arg(long, short)]
    model: Option<String>,

    /// Ask for the improved prompt in English.
    #[arg(long)]
    english: bool,

    /// Render single newlines as Markdown hard line breaks.
    #[arg(long)]
    markdown: bool,
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Version) => {
            println!("prompt-skills {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Some(Commands::Skills) => {
            for skill in Skill::ALL {
                println!("{:<18} {}", skill.id(), skill.title());
            }
            Ok(())
        }
        Some(Commands::Models) => run_models(cli.config).await,
        Some(Commands::Apply {
            skill,
            position,
            request,
        }) => run_apply(cli.config, &skill, position, request).await,
        Some(Commands::Refine { skills, request }) => run_refine(cli.config, &skills, request).await,
        Some(Commands::Pipeline {
            skills,
            all_steps,
            request,
        }) => run_pipeline(cli.config, &skills, all_steps, request).await,
        None => {
            println!("Run with --help for usage");
            Ok(())
        }
    };

    if let Err(e) = result {
        log::error!("{:#}", e);
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

/// Everything a request needs: loaded model, applier, prompt, language.
struct Session {
    model: LoadedModel,
    applier: SkillApplier,
    prompt: String,
    language: Language,
    markdown: bool,
}

fn prepare(config_path: Option<PathBuf>, request: RequestArgs) -> anyhow::Result<Session> {
    let (config, path) = config::load_config(config_path)?;
    let templates = config::load_templates(&config, &path)?;
    let model_name = request
        .model
        .unwrap_or_else(|| config::resolve_default_model(&config));
    let model = model::load_model_with_config(&model_name, &config)?;
    let prompt = match request.prompt {
        Some(p) => p,
        None => read_stdin()?,
    };
    if prompt.trim().is_empty() {
        anyhow::bail!("prompt is empty; pass --prompt or pipe text on stdin");
    }
    Ok(Session {
        model,
        applier: SkillApplier::new(Arc::new(templates)),
        prompt,
        language: Language::from_english_flag(request.english || config.english_output),
        markdown: request.markdown,
    })
}

fn read_stdin() -> anyhow::Result<String> {
    let mut s = String::new();
    std::io::stdin().read_to_string(&mut s)?;
    Ok(s)
}

fn print_output(text: &str, markdown: bool) {
    if markdown {
        println!("{}", convert_newlines(text));
    } else {
        println!("{}", text);
    }
}

async fn run_models(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let (config, _) = config::load_config(config_path)?;
    let models = match model::resolve_api_key() {
        Ok(key) => catalog::available_models_for_key(&key, Some(config::resolve_base_url(&config))).await,
        Err(e) => {
            log::warn!("{}; showing fallback models", e);
            catalog::fallback_models()
        }
    };
    for m in models {
        println!("{}", m);
    }
    Ok(())
}

async fn run_apply(
    config_path: Option<PathBuf>,
    skill: &str,
    position: usize,
    request: RequestArgs,
) -> anyhow::Result<()> {
    let skill: Skill = skill.parse()?;
    let session = prepare(config_path, request)?;
    let out = session
        .applier
        .apply_skill(&session.model, skill, &session.prompt, position, session.language)
        .await?;
    print_output(&out, session.markdown);
    Ok(())
}

async fn run_refine(config_path: Option<PathBuf>, skills: &[String], request: RequestArgs) -> anyhow::Result<()> {
    let selection = SkillSelection::parse(skills)?;
    let session = prepare(config_path, request)?;
    let out = session
        .applier
        .apply_skills(&session.model, &selection, &session.prompt, session.language)
        .await?;
    print_output(&out, session.markdown);
    Ok(())
}

async fn run_pipeline(
    config_path: Option<PathBuf>,
    skills: &[String],
    all_steps: bool,
    request: RequestArgs,
) -> anyhow::Result<()> {
    let selection = SkillSelection::parse(skills)?;
    let session = prepare(config_path, request)?;
    let steps = session
        .applier
        .apply_in_sequence(&session.model, &selection, &session.prompt, session.language)
        .await?;
    if all_steps {
        for step in &steps {
            println!("## {}. {}", step.position, step.skill.title());
            print_output(&step.output, session.markdown);
            println!();
        }
    } else if let Some(last) = steps.last() {
        print_output(&last.output, session.markdown);
    }
    Ok(())
}
