//! Curator CLI: talks to the curation backend and works on schema drafts.
//!
//! A draft is a session serialized as JSON.
//!
//! Usage:
//!   curator primitives [TEXT]
//!   curator disambiguate TEXT [--refvar]
//!   curator schemas [SEARCH]
//!   curator show FILE [--save draft.json]
//!   curator check draft.json
//!   curator submit draft.json [--download] [--reset]

use clap::{Parser, Subcommand};
use schema_curator::{
    CurationSession, Curator, CuratorBackend, CuratorConfig, HttpBackend, Lookup, SubmitError,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "curator", version, about = "Event schema curation client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Path to a YAML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Backend base URL, overriding config and environment
    #[arg(long, global = true)]
    api_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List every primitive, or recommend primitives for an event description
    Primitives {
        /// Event description to recommend for
        text: Option<String>,
    },
    /// Show qnode candidates for an event description or refvar
    Disambiguate {
        text: String,
        /// Treat the text as a refvar
        #[arg(long)]
        refvar: bool,
    },
    /// List saved schemas
    Schemas {
        /// Only schemas whose id, name or description contains this
        search: Option<String>,
    },
    /// Load a saved schema and summarise it
    Show {
        /// File stem as listed by `schemas`
        file: String,
        /// Write the loaded schema to a draft
        #[arg(long)]
        save: Option<PathBuf>,
    },
    /// Validate a draft without contacting the backend
    Check {
        draft: PathBuf,
    },
    /// Validate and submit a draft
    Submit {
        draft: PathBuf,
        /// Write the rendered YAML next to the draft
        #[arg(long)]
        download: bool,
        /// Empty the draft after a successful submit
        #[arg(long)]
        reset: bool,
    },
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();
}

fn read_draft(path: &Path) -> Result<CurationSession, String> {
    let text = std::fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    serde_json::from_str(&text).map_err(|e| format!("Invalid draft {}: {}", path.display(), e))
}

fn write_draft(path: &Path, session: &CurationSession) -> Result<(), String> {
    let json = serde_json::to_string_pretty(session).map_err(|e| format!("Failed to encode draft: {}", e))?;
    std::fs::write(path, json).map_err(|e| format!("Failed to write {}: {}", path.display(), e))
}

fn open_curator(config: &CuratorConfig, session: CurationSession) -> Result<Curator<HttpBackend>, String> {
    let backend = HttpBackend::new(config).map_err(|e| e.to_string())?;
    Ok(Curator::with_session(Arc::new(backend), session).with_suggestion_mode(config.suggestion_mode))
}

async fn cmd_primitives(curator: &Curator<HttpBackend>, text: Option<&str>) -> i32 {
    let result = match text {
        Some(text) => curator.recommend_primitives(text).await,
        None => curator.all_primitives().await,
    };
    match result {
        Ok(primitives) => {
            for p in primitives {
                println!("{}", p.type_subtype);
                if !p.subsubtypes.is_empty() {
                    println!("    subsubtypes: {}", p.subsubtypes.join(", "));
                }
                if let Some(description) = p.description.filter(|d| !d.is_empty()) {
                    println!("    {}", description);
                }
            }
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

async fn cmd_disambiguate(curator: &Curator<HttpBackend>, text: &str, refvar: bool) -> i32 {
    let lookup = if refvar { Lookup::refvar(text) } else { Lookup::event(text) };
    match curator.backend().disambiguate(&lookup).await {
        Ok(options) if options.is_empty() => {
            println!("No candidates for '{}'", text);
            0
        }
        Ok(options) => {
            for option in options {
                println!("{:<12} {}", option.qnode, option.raw_name);
                if !option.definition.is_empty() {
                    println!("             {}", option.definition);
                }
            }
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

async fn cmd_schemas(curator: &Curator<HttpBackend>, search: &str) -> i32 {
    match curator.saved_schemas(search).await {
        Ok(schemas) if schemas.is_empty() => {
            println!("No saved schemas");
            0
        }
        Ok(schemas) => {
            for s in schemas {
                let flag = if s.augmentation_flag { " [recommendations]" } else { "" };
                println!("{}  {} ({}){}", s.file, s.schema_name, s.schema_id, flag);
                println!("    {}  {}", s.timestamp, s.schema_dscpt);
            }
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

async fn cmd_show(curator: &mut Curator<HttpBackend>, file: &str, save: Option<&Path>) -> i32 {
    if let Err(e) = curator.load_saved_schema(file).await {
        eprintln!("Error: {}", e);
        return 1;
    }
    let session = curator.session();
    let details = session.details();
    println!(
        "{} ({})",
        details.schema_name.as_deref().unwrap_or_default(),
        details.schema_id.as_deref().unwrap_or_default()
    );
    println!("{}", details.schema_dscpt.as_deref().unwrap_or_default());
    println!();
    for event in session.events() {
        let primitive = event
            .event_primitive
            .as_ref()
            .map(|p| p.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("E{:<3} {} [{}]", event.id_num, event.event_text, primitive);
        for arg in &event.args {
            println!("       {}: {}", arg.role, arg.refvar.as_deref().unwrap_or("-"));
        }
    }
    if session.graph().edge_count() > 0 {
        println!();
        for edge in session.graph().edges() {
            println!("{}  {} -> {}", edge.id, edge.source, edge.target);
        }
    }
    let rows = session.recommendation_rows();
    if !rows.is_empty() {
        println!();
        println!("Recommended:");
        for row in rows {
            println!("  {} (after {})", row.event_text, row.after);
        }
    }
    if let Some(path) = save {
        if let Err(e) = write_draft(path, curator.session()) {
            eprintln!("Error: {}", e);
            return 1;
        }
        println!();
        println!("Saved draft to {}", path.display());
    }
    0
}

fn cmd_check(draft: &Path) -> i32 {
    let mut session = match read_draft(draft) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let violations = session.audit();
    for v in &violations {
        eprintln!("Inconsistent: {}", v);
    }
    match session.prepare_submission() {
        Ok(submission) if violations.is_empty() => {
            println!(
                "Draft '{}' is ready: {} events, {} links",
                submission.schema_id,
                submission.events.len(),
                submission.links.len()
            );
            0
        }
        Ok(_) => 1,
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

async fn cmd_submit(curator: &mut Curator<HttpBackend>, draft: &Path, download: bool, reset: bool) -> i32 {
    let output = match curator.submit(reset).await {
        Ok(output) => output,
        Err(e) => {
            if let SubmitError::Rejected { status, body } = &e {
                tracing::debug!(status, body = %body, "backend refused submission");
            }
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    println!("Schema submitted successfully! ({})", output.fname);

    if download {
        let dir = draft.parent().unwrap_or_else(|| Path::new("."));
        let path = dir.join(format!("{}.yaml", output.fname));
        if let Err(e) = std::fs::write(&path, &output.output) {
            eprintln!("Error: failed to write {}: {}", path.display(), e);
            return 1;
        }
        println!("Wrote {}", path.display());
    }
    if reset {
        if let Err(e) = write_draft(draft, curator.session()) {
            eprintln!("Error: {}", e);
            return 1;
        }
    }
    0
}

fn run(cli: Cli) -> i32 {
    let mut config = match CuratorConfig::load(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    if let Some(url) = cli.api_url {
        config.api_url = url;
    }

    if let Commands::Check { draft } = &cli.command {
        return cmd_check(draft);
    }

    let session = match &cli.command {
        Commands::Submit { draft, .. } => match read_draft(draft) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Error: {}", e);
                return 1;
            }
        },
        _ => CurationSession::new(),
    };
    let mut curator = match open_curator(&config, session) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("failed to create tokio runtime: {}", e);
            return 1;
        }
    };
    rt.block_on(async move {
        match cli.command {
            Commands::Primitives { text } => cmd_primitives(&curator, text.as_deref()).await,
            Commands::Disambiguate { text, refvar } => cmd_disambiguate(&curator, &text, refvar).await,
            Commands::Schemas { search } => cmd_schemas(&curator, search.as_deref().unwrap_or_default()).await,
            Commands::Show { file, save } => cmd_show(&mut curator, &file, save.as_deref()).await,
            Commands::Submit { draft, download, reset } => {
                cmd_submit(
                    &mut curator,
                    &draft,
                    download || config.download,
                    reset || config.reset_after_submit,
                )
                .await
            }
            Commands::Check { .. } => 0,
        }
    })
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    std::process::exit(run(cli));
}

