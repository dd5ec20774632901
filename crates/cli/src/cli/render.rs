use std::fs;
use std::path::{Path, PathBuf};

use apibuilder_common::BuilderConfig;
use apibuilder_core::generate_from_json;
use clap::Args;

use crate::cli::common::{ConfigArgs, LoadedConfig, generate_options};
use crate::cli::exit_code;
use crate::writer::{OutputFile, OutputLayout};

#[derive(Args, Debug, Clone)]
pub struct RenderArgs {
    /// Swagger 2, OpenAPI 3 or export JSON file
    #[arg(value_name = "FILE")]
    pub input: PathBuf,
    /// Write into the output directories instead of printing
    #[arg(long)]
    pub write: bool,
    #[command(flatten)]
    pub config: ConfigArgs,
}

pub fn run(args: RenderArgs) -> i32 {
    exit_code(run_inner(&args))
}

fn run_inner(args: &RenderArgs) -> Result<(), String> {
    let LoadedConfig { config, base_dir } = args.config.load()?;
    let files = render_files(args, &config, &base_dir)?;
    if args.write {
        OutputLayout::new(&config.output, &base_dir).write_all(&files)
    } else {
        print!("{}", listing(&files));
        Ok(())
    }
}

fn render_files(
    args: &RenderArgs,
    config: &BuilderConfig,
    base_dir: &Path,
) -> Result<Vec<OutputFile>, String> {
    let text = fs::read_to_string(&args.input)
        .map_err(|err| format!("Failed to read {}: {err}", args.input.display()))?;
    let namespace = config.namespace.clone().unwrap_or_default();
    let options = generate_options(config, &namespace)?;
    let artifacts = generate_from_json(&text, &options)
        .map_err(|err| format!("Failed to render {}: {err}", args.input.display()))?;
    Ok(OutputLayout::new(&config.output, base_dir).files(&namespace, &artifacts))
}

/// Every file preceded by a `// ==> path` marker line.
fn listing(files: &[OutputFile]) -> String {
    let mut out = String::new();
    for file in files {
        out.push_str(&format!("// ==> {}\n", file.path.display()));
        out.push_str(&file.contents);
        if !file.contents.ends_with('\n') {
            out.push('\n');
        }
    }
    out
}
