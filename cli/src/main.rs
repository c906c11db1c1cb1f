//! docfill CLI - document template filling tool

mod data;

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use docfill::{
    detect_image_format, probe_dimensions, CommandConverter, CommandEngine, DocFill, FieldRecord,
    FieldValue, FormatConverter, ImageSize, ImageSizing,
};

#[derive(Parser)]
#[command(name = "docfill")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Fill document templates with JSON field data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fill a template with field data
    #[command(alias = "gen")]
    Generate {
        /// Template document
        #[arg(value_name = "TEMPLATE")]
        template: PathBuf,

        /// Field data (JSON)
        #[arg(value_name = "DATA")]
        data: PathBuf,

        /// Output file (defaults to <TEMPLATE>.filled.<ext>)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Template engine program
        #[arg(long, env = "DOCFILL_ENGINE", value_name = "PROGRAM")]
        engine: String,

        /// Extra argument passed to the engine (repeatable)
        #[arg(long = "engine-arg", value_name = "ARG", allow_hyphen_values = true)]
        engine_args: Vec<String>,

        /// Display size for images (e.g., "120x80")
        #[arg(long, value_name = "WxH", conflicts_with = "intrinsic_size")]
        image_size: Option<ImageSize>,

        /// Size images by their pixel dimensions
        #[arg(long)]
        intrinsic_size: bool,

        /// Maximum nesting depth of the field data
        #[arg(long, value_name = "N")]
        max_depth: Option<usize>,

        /// Directory for temporary image files
        #[arg(long, env = "DOCFILL_TEMP_DIR", value_name = "DIR")]
        temp_dir: Option<PathBuf>,

        /// Also convert the filled document (e.g., "pdf")
        #[arg(long, value_name = "EXT")]
        convert: Option<String>,
    },

    /// Convert a document with LibreOffice
    Convert {
        /// Input document
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Target format extension
        #[arg(long, default_value = "pdf", value_name = "EXT")]
        to: String,

        /// Output file (defaults to the input with the new extension)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Show the field tree of a data file
    Inspect {
        /// Field data (JSON)
        #[arg(value_name = "DATA")]
        data: PathBuf,
    },

    /// Show version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Generate {
            template,
            data,
            output,
            engine,
            engine_args,
            image_size,
            intrinsic_size,
            max_depth,
            temp_dir,
            convert,
        } => {
            let sizing = if intrinsic_size {
                ImageSizing::Intrinsic
            } else {
                ImageSizing::Fixed(image_size.unwrap_or_default())
            };
            let engine = CommandEngine::new(engine)
                .args(engine_args)
                .with_template_extension(extension_of(&template, "docx"));
            let mut docfill = DocFill::new().with_engine(engine).with_image_sizing(sizing);
            if let Some(depth) = max_depth {
                docfill = docfill.with_max_depth(depth);
            }
            if let Some(dir) = temp_dir {
                docfill = docfill.with_temp_dir(dir);
            }
            cmd_generate(
                docfill,
                &template,
                &data,
                output.as_deref(),
                convert.as_deref(),
            )
        }
        Commands::Convert { input, to, output } => cmd_convert(&input, &to, output.as_deref()),
        Commands::Inspect { data } => cmd_inspect(&data),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn cmd_generate(
    docfill: DocFill,
    template: &Path,
    data: &Path,
    output: Option<&Path>,
    convert: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let ext = extension_of(template, "docx");
    let output = output.map(Path::to_path_buf).unwrap_or_else(|| {
        let stem = template.file_stem().unwrap_or_default().to_string_lossy();
        PathBuf::from(format!("{}.filled.{}", stem, ext))
    });

    let docfill = match convert {
        Some(target) => docfill.with_converter(
            CommandConverter::soffice(target).with_source_extension(ext.as_str()),
        ),
        None => docfill,
    };

    let steps = if convert.is_some() { 3 } else { 2 };
    let pb = ProgressBar::new(steps);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {msg}")?
            .progress_chars("#>-"),
    );

    pb.set_message("Loading data...");
    let template_bytes = fs::read(template)?;
    let fields = data::load(data)?;
    pb.inc(1);

    pb.set_message("Filling template...");
    let filled = docfill.generate(&template_bytes, &fields)?;
    fs::write(&output, &filled)?;
    pb.inc(1);

    let converted = match convert {
        Some(target) => {
            pb.set_message("Converting...");
            let bytes = docfill.convert(&filled, target)?;
            let path = output.with_extension(target.trim_start_matches('.'));
            fs::write(&path, &bytes)?;
            pb.inc(1);
            Some(path)
        }
        None => None,
    };

    pb.finish_with_message("Done!");

    println!("\n{}", "Output files:".green().bold());
    match converted {
        Some(path) => {
            println!("  {} {}", "├─".dimmed(), output.display());
            println!("  {} {}", "└─".dimmed(), path.display());
        }
        None => println!("  {} {}", "└─".dimmed(), output.display()),
    }

    Ok(())
}

fn cmd_convert(
    input: &Path,
    to: &str,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let converter =
        CommandConverter::soffice(to).with_source_extension(extension_of(input, "docx"));
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| input.with_extension(converter.target_extension()));

    let document = fs::read(input)?;
    let converted = converter.convert(&document)?;
    fs::write(&output, &converted)?;

    println!("{} {}", "Saved to".green(), output.display());
    Ok(())
}

fn cmd_inspect(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let fields = data::load(path)?;

    println!("{}", "Field Data".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "File".bold(), path.display());
    println!("{}: {}", "Fields".bold(), fields.len());
    println!("{}: {}", "Images".bold(), fields.image_count());
    println!();

    print_record(&fields, 0);
    Ok(())
}

fn print_record(record: &FieldRecord, indent: usize) {
    let pad = "  ".repeat(indent);
    for (name, value) in record.iter() {
        match value {
            FieldValue::Text(text) => {
                println!("{}{}: {} {:?}", pad, name.bold(), "text".dimmed(), text)
            }
            FieldValue::Number(number) => {
                println!("{}{}: {} {}", pad, name.bold(), "number".dimmed(), number)
            }
            FieldValue::Date(date) => {
                println!("{}{}: {} {}", pad, name.bold(), "date".dimmed(), date)
            }
            FieldValue::Image(bytes) => {
                let format = detect_image_format(bytes)
                    .map(|f| f.to_string())
                    .unwrap_or_else(|| "unknown format".to_string());
                let pixels = probe_dimensions(bytes)
                    .map(|size| format!(", {} px", size))
                    .unwrap_or_default();
                println!(
                    "{}{}: {} {} bytes, {}{}",
                    pad,
                    name.bold(),
                    "image".dimmed(),
                    bytes.len(),
                    format,
                    pixels
                );
            }
            FieldValue::Record(nested) => {
                println!("{}{}: {}", pad, name.bold(), "record".dimmed());
                print_record(nested, indent + 1);
            }
            FieldValue::List(rows) => {
                println!(
                    "{}{}: {} ({} rows)",
                    pad,
                    name.bold(),
                    "list".dimmed(),
                    rows.len()
                );
                for (i, row) in rows.iter().enumerate() {
                    println!("{}  {}", pad, format!("[{}]", i).dimmed());
                    print_record(row, indent + 2);
                }
            }
        }
    }
}

fn cmd_version() {
    println!("{} {}", "docfill".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Document template filling tool");
    println!();
    println!("Repository: {}", "https://github.com/iyulab/docfill".dimmed());
    println!("License: MIT");
}

/// Lowercase extension of `path`, or `default` when it has none.
fn extension_of(path: &Path, default: &str) -> String {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_else(|| default.to_string())
}
