//! Headless code generation from saved `.pgp` projects.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use pillow_generator::codegen::{self, CodegenOptions, OutputMode};
use pillow_generator::project_file::load_project;

#[derive(Parser, Debug)]
#[command(name = "pillowgen", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write the Python function for a project.
    Generate(GenerateArgs),
    /// List the parameters the generated function takes.
    Params(ParamsArgs),
}

#[derive(Parser, Debug)]
struct GenerateArgs {
    /// Input project file.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output `.py` path. Prints to stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Overrides the function name stored in the project.
    #[arg(long)]
    function: Option<String>,

    /// Save the result to a path passed under this argument name instead of returning it.
    #[arg(long)]
    save_param: Option<String>,

    /// Emit file paths relative to this directory.
    #[arg(long)]
    relative_to: Option<PathBuf>,

    /// Leave out the `__main__` example block.
    #[arg(long)]
    no_example: bool,
}

#[derive(Parser, Debug)]
struct ParamsArgs {
    /// Input project file.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Include the output path argument under this name.
    #[arg(long)]
    save_param: Option<String>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Generate(args) => cmd_generate(args),
        Command::Params(args) => cmd_params(args),
    }
}

fn output_mode(save_param: Option<String>) -> OutputMode {
    match save_param {
        Some(param_name) => OutputMode::SaveToPath { param_name },
        None => OutputMode::ReturnImage,
    }
}

fn read_project(path: &Path) -> anyhow::Result<pillow_generator::Project> {
    load_project(path).with_context(|| format!("load project '{}'", path.display()))
}

fn cmd_generate(args: GenerateArgs) -> anyhow::Result<()> {
    let project = read_project(&args.in_path)?;
    let mut options = CodegenOptions::for_project(&project);
    if let Some(function) = args.function {
        options.function_name = function;
    }
    options.output = output_mode(args.save_param);
    options.relative_to = args.relative_to;
    options.include_example = !args.no_example;

    let source = codegen::generate(&project, &options)
        .with_context(|| format!("generate code for '{}'", args.in_path.display()))?;

    match args.out {
        Some(out) => {
            std::fs::write(&out, source).with_context(|| format!("write '{}'", out.display()))?;
            eprintln!("wrote {}", out.display());
        }
        None => print!("{source}"),
    }
    Ok(())
}

fn cmd_params(args: ParamsArgs) -> anyhow::Result<()> {
    let project = read_project(&args.in_path)?;
    let mut options = CodegenOptions::for_project(&project);
    options.output = output_mode(args.save_param);

    let params = codegen::signature(&project, &options)?;
    if params.is_empty() {
        println!("(no parameters)");
    }
    for param in params {
        println!("{}: {}  # {}", param.name, param.kind.python_type(), param.description);
    }
    Ok(())
}
