use chrono::Local;
use clap::{Parser, Subcommand};
use dbsmart::config::{API_KEY_ENV, ENDPOINT_ENV, MODEL_ENV};
use dbsmart::{
    report, Config, Dashboard, Error, GeminiClient, InputArtifact, Operation, Severity, Theme,
    UploadedFile,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "dbsmart")]
#[command(author, version, about = "Convert ER diagrams and SQL schemas with AI, and review schemas for optimizations")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Gemini API key
    #[arg(long, global = true, env = API_KEY_ENV, hide_env_values = true)]
    api_key: Option<String>,

    /// Model name (default: gemini-2.5-flash)
    #[arg(long, global = true, env = MODEL_ENV)]
    model: Option<String>,

    /// Completion service base URL
    #[arg(long, global = true, env = ENDPOINT_ENV)]
    endpoint: Option<String>,

    /// Directory for saved results (default: dbsmart-exports/<timestamp>)
    #[arg(long, global = true)]
    export_dir: Option<PathBuf>,

    /// Show debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the dashboard in the browser (default)
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3001")]
        port: u16,

        /// Don't open the browser
        #[arg(long)]
        no_open: bool,

        /// Start in dark mode
        #[arg(long)]
        dark: bool,
    },

    /// Generate an SQL schema from an ER diagram (image or text)
    Sql {
        /// ER diagram file (.png, .jpg, .json, .txt, .md)
        input: Option<PathBuf>,

        /// Describe the diagram inline instead of passing a file
        #[arg(short, long, conflicts_with = "input")]
        text: Option<String>,

        /// Launch GUI file picker
        #[arg(long)]
        gui: bool,

        /// Save schema.sql to the export directory instead of printing it
        #[arg(short, long)]
        save: bool,
    },

    /// Generate a Mermaid ER diagram from an SQL schema
    Er {
        /// SQL schema file
        schema: PathBuf,

        /// Save diagram.txt to the export directory instead of printing it
        #[arg(short, long)]
        save: bool,
    },

    /// Review an SQL schema and score it
    Optimize {
        /// SQL schema file
        schema: PathBuf,

        /// Report file (.html, .json, .csv)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Save optimizations.json to the export directory
        #[arg(short, long)]
        save: bool,

        /// Open the report when done
        #[arg(long = "open")]
        open_report: bool,
    },
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = Config::from_env()
        .with_api_key(args.api_key.clone())
        .with_model(args.model.clone())
        .with_endpoint(args.endpoint.clone());

    let client = match GeminiClient::new(&config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to set up client: {}", e);
            std::process::exit(1);
        }
    };

    let export_dir = args.export_dir.clone().unwrap_or_else(|| {
        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        PathBuf::from("dbsmart-exports").join(timestamp.to_string())
    });

    let command = args.command.unwrap_or(Command::Serve {
        port: 3001,
        no_open: false,
        dark: false,
    });

    let result = match command {
        Command::Serve { port, no_open, dark } => {
            if !config.has_api_key() {
                eprintln!(
                    "\x1b[33mwarning:\x1b[0m {} is not set; AI actions will fail until it is.",
                    API_KEY_ENV
                );
            }
            let theme = if dark { Theme::Dark } else { Theme::Light };
            dbsmart::serve::start(port, !no_open, theme, Arc::new(client)).map_err(Error::from)
        }
        Command::Sql { input, text, gui, save } => {
            load_er_input(input, text, gui).and_then(|artifact| {
                let mut dashboard = Dashboard::new();
                match artifact {
                    InputArtifact::File(file) => dashboard.upload(file),
                    InputArtifact::Text(text) => dashboard.set_text(text),
                }
                run(&mut dashboard, Operation::GenerateSql, &client)?;
                emit(&mut dashboard, save, &export_dir)
            })
        }
        Command::Er { schema, save } => read_schema(&schema).and_then(|sql| {
            let mut dashboard = Dashboard::new();
            dashboard.set_schema(sql);
            run(&mut dashboard, Operation::GenerateEr, &client)?;
            emit(&mut dashboard, save, &export_dir)
        }),
        Command::Optimize { schema, output, save, open_report } => read_schema(&schema).and_then(|sql| {
            let mut dashboard = Dashboard::new();
            dashboard.set_schema(sql);
            run(&mut dashboard, Operation::Optimize, &client)?;
            print_suggestions(&dashboard);

            if save {
                emit(&mut dashboard, true, &export_dir)?;
            }
            if let Some(ref path) = output {
                report::generate(path, dashboard.suggestions())?;
                eprintln!("\n\x1b[32mReport saved: {}\x1b[0m", path.display());
                if open_report {
                    if let Err(e) = open::that(path) {
                        eprintln!("Failed to open report: {}", e);
                    }
                }
            }
            Ok(())
        }),
    };

    if let Err(e) = result {
        eprintln!("\x1b[31merror:\x1b[0m {}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "dbsmart=debug" } else { "dbsmart=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Run one operation behind a spinner.
fn run(dashboard: &mut Dashboard, op: Operation, client: &GeminiClient) -> dbsmart::Result<()> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(format!("{} ({})", op, client.model()));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = dashboard.run(op, client);
    spinner.finish_and_clear();
    result
}

/// Print the active view's content, or write it into the export directory.
fn emit(dashboard: &mut Dashboard, save: bool, export_dir: &Path) -> dbsmart::Result<()> {
    let file = dashboard.export()?;
    if save {
        let path = file.write_to(export_dir)?;
        eprintln!("\x1b[32mSaved: {}\x1b[0m", path.display());
    } else {
        println!("{}", file.content);
    }
    Ok(())
}

fn read_schema(path: &Path) -> dbsmart::Result<String> {
    Ok(std::fs::read_to_string(path)?)
}

fn load_er_input(input: Option<PathBuf>, text: Option<String>, gui: bool) -> dbsmart::Result<InputArtifact> {
    if let Some(text) = text {
        return Ok(InputArtifact::Text(text));
    }

    #[cfg(feature = "gui")]
    let input = if input.is_none() || gui { pick_file_gui().or(input) } else { input };

    #[cfg(not(feature = "gui"))]
    let input = {
        if gui {
            eprintln!("Note: GUI mode not available in this build.");
        }
        input
    };

    match input {
        Some(path) => Ok(InputArtifact::File(UploadedFile::read(path)?)),
        None => Err(Error::InputMissing(dbsmart::ai::prompt::MISSING_ER_INPUT)),
    }
}

#[cfg(feature = "gui")]
fn pick_file_gui() -> Option<PathBuf> {
    let extensions: Vec<&str> = dbsmart::model::ACCEPTED_FILES
        .iter()
        .filter(|(ext, _)| *ext != "sql")
        .map(|(ext, _)| *ext)
        .collect();
    rfd::FileDialog::new()
        .set_title("Select ER diagram")
        .add_filter("ER diagrams", &extensions[..])
        .pick_file()
}

fn print_suggestions(dashboard: &Dashboard) {
    let suggestions = dashboard.suggestions();
    let reset = "\x1b[0m";

    eprintln!("\x1b[1mDBSmart - Optimization Report\x1b[0m");
    eprintln!("{}", "─".repeat(70));

    for s in suggestions {
        let color = match s.severity {
            Severity::Critical => "\x1b[31m", // Red
            Severity::Moderate => "\x1b[33m", // Yellow
            Severity::Good => "\x1b[32m",     // Green
        };
        println!(
            "{}{:<15}{} {:<20} {}",
            color,
            format!("[{}]", s.severity.title()),
            reset,
            s.category.as_str(),
            s.text
        );
        println!("    \x1b[90m{}{}", s.rationale, reset);
    }

    let summary = report::Summary::from_suggestions(suggestions);
    eprintln!("\n{}", "─".repeat(70));
    eprintln!("\x1b[1mSummary:\x1b[0m");
    eprintln!("  \x1b[31m✗ Critical:\x1b[0m      {}", summary.critical);
    eprintln!("  \x1b[33m? Moderate:\x1b[0m      {}", summary.moderate);
    eprintln!("  \x1b[32m✓ Good Practice:\x1b[0m {}", summary.good);
    eprintln!(
        "  Score: \x1b[1m{}/100\x1b[0m ({})",
        summary.score, summary.band
    );
}
