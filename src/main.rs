use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use hunkwise::render::{DEFAULT_SPLIT_WIDTH, render_split, render_unified};
use hunkwise::GitStager;
use hunkwise::selection::{parse_selection_refs, resolve_all};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hunkwise")]
#[command(about = "Line-level git staging with a split diff view")]
#[command(version)]
struct Cli {
    /// Run as if started in this directory
    #[arg(short = 'C', long = "repo", default_value = ".", global = true)]
    repo: String,

    /// Log git commands and patch construction
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show unstaged changes with selectable line coordinates
    Diff {
        /// Pair removed and added lines side by side
        #[arg(short, long)]
        split: bool,
        /// Width of the old-side column in split view
        #[arg(short, long, default_value_t = DEFAULT_SPLIT_WIDTH)]
        width: usize,
        /// Mark lines as selected, to preview a stage (e.g., "src/lib.rs:0.2")
        #[arg(long = "select", value_name = "FILE:REFS")]
        select: Vec<String>,
        /// Files to show (all changed files if omitted)
        files: Vec<String>,
    },
    /// Stage lines by reference (e.g., src/lib.rs:0.2,1)
    Stage {
        /// File and line references (e.g., "src/lib.rs:0" or "src/lib.rs:1.3..5")
        #[arg(required = true)]
        file_refs: Vec<String>,
    },
    /// Print the patch a stage would apply, without touching the index
    Patch {
        /// File and line references
        file_ref: String,
    },
    /// Generate shell completions
    Completions {
        shell: Shell,
    },
    /// Generate a man page
    Man,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "hunkwise=debug" } else { "hunkwise=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let stager = GitStager::new(&cli.repo);

    match cli.command {
        Commands::Diff {
            split,
            width,
            select,
            files,
        } => {
            let refs = select
                .iter()
                .map(|file_ref| parse_selection_refs(file_ref))
                .collect::<Result<Vec<_>, _>>()?;
            let diffs = stager.diffs(&files)?;
            let views: Vec<String> = diffs
                .iter()
                .map(|diff| {
                    let selection = resolve_all(diff, &refs);
                    if split {
                        render_split(diff, &selection, width)
                    } else {
                        render_unified(diff, &selection)
                    }
                })
                .collect();
            print!("{}", views.join("\n"));
        }
        Commands::Stage { file_refs } => {
            for file_ref in &file_refs {
                stager.stage(file_ref)?;
                eprintln!("Staged {}", file_ref);
            }
        }
        Commands::Patch { file_ref } => {
            print!("{}", stager.patch(&file_ref)?);
        }
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "hunkwise", &mut std::io::stdout());
        }
        Commands::Man => {
            clap_mangen::Man::new(Cli::command()).render(&mut std::io::stdout())?;
        }
    }

    Ok(())
}
