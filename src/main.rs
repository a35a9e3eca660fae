use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use crossterm::style::{Color as TermColor, Stylize};
use tracing_subscriber::EnvFilter;

use svgtint::backends::ExportFormat;
use svgtint::cli::{Args, Command};
use svgtint::config::EditorConfig;
use svgtint::editor::{Editor, Outcome};
use svgtint::pipeline::extract::Palette;
use svgtint::pipeline::remap::ReduceTarget;
use svgtint::pipeline::replace::Target;
use svgtint::Color;

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose, matches!(args.command, Command::Edit { .. }));

    let config = match &args.config {
        Some(path) => EditorConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => EditorConfig::default(),
    };

    run(args.command, config)
}

/// Logs go to stderr. The interactive editor owns the terminal, so it only
/// logs when RUST_LOG asks for it explicitly.
fn init_logging(verbose: bool, interactive: bool) {
    let from_env = EnvFilter::try_from_default_env();
    if interactive && from_env.is_err() {
        return;
    }
    let filter = from_env.unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(command: Command, mut config: EditorConfig) -> Result<()> {
    match command {
        Command::Palette { input, json } => {
            let editor = open(&input, config)?;
            print_palette(editor.palette(), json)
        }

        Command::Replace {
            input,
            from,
            to,
            output,
        } => {
            parse_color(&from)?;
            if Target::parse(&to).is_none() {
                bail!("not a color: {to:?} (use `transparent` to erase)");
            }
            let mut editor = open(&input, config)?;
            let outcome = editor.replace_color(&from, &to);
            report(outcome, &format!("{from} does not occur in {}", input.display()));
            save(&editor, output.as_deref())
        }

        Command::Erase {
            input,
            color,
            output,
        } => {
            parse_color(&color)?;
            let mut editor = open(&input, config)?;
            let outcome = editor.erase(&color);
            report(outcome, &format!("{color} does not occur in {}", input.display()));
            save(&editor, output.as_deref())
        }

        Command::Remap {
            input,
            colors,
            output,
        } => {
            let targets = colors
                .iter()
                .map(|c| Target::parse(c).with_context(|| format!("not a color: {c:?}")))
                .collect::<Result<Vec<_>>>()?;
            let mut editor = open(&input, config)?;
            let outcome = editor.apply_palette(&targets);
            report(outcome, "palette already matches");
            save(&editor, output.as_deref())
        }

        Command::Reduce {
            input,
            colors,
            output,
        } => {
            let mut editor = open(&input, config)?;
            let available = editor.palette().len();
            if editor.reduce(ReduceTarget::Count(colors)) == Outcome::Rejected {
                bail!("cannot reduce to {colors} colors: the document has {available}");
            }
            save(&editor, output.as_deref())
        }

        Command::Export {
            input,
            output,
            format,
            round,
            precision,
            scale,
            quality,
            dpi,
            page,
        } => {
            let export = &mut config.export;
            if let Some(v) = precision {
                export.precision = v;
            }
            if let Some(v) = scale {
                export.scale = v;
            }
            if let Some(v) = quality {
                export.quality = v;
            }
            if let Some(v) = dpi {
                export.dpi = v;
            }
            if let Some(v) = page {
                export.page = v;
            }
            config.validate().context("invalid export options")?;

            let format = match format.or_else(|| ExportFormat::from_path(&output)) {
                Some(f) => f,
                None => bail!(
                    "cannot tell the format of {}; pass --format",
                    output.display()
                ),
            };
            let backend = format.backend(&config.export, round);
            let editor = open(&input, config)?;
            let bytes = editor
                .export(backend.as_ref())
                .with_context(|| format!("failed to export {}", input.display()))?;
            std::fs::write(&output, &bytes)
                .with_context(|| format!("failed to write {}", output.display()))?;
            eprintln!(
                "wrote {} ({}, {} bytes)",
                output.display(),
                backend.name(),
                bytes.len()
            );
            Ok(())
        }

        Command::Edit { input, output } => {
            let editor = open(&input, config)?;
            let target: PathBuf = output.unwrap_or(input);
            svgtint::tui::run(editor, target)
        }
    }
}

fn open(path: &Path, config: EditorConfig) -> Result<Editor> {
    let mut editor = Editor::new(config);
    editor
        .load_file(path)
        .with_context(|| format!("failed to load {}", path.display()))?;
    Ok(editor)
}

fn parse_color(input: &str) -> Result<Color> {
    Color::parse(input).with_context(|| format!("not a color: {input:?}"))
}

fn report(outcome: Outcome, unchanged: &str) {
    if outcome == Outcome::Unchanged {
        eprintln!("nothing changed: {unchanged}");
    }
}

/// Write the current document to `output`, or to stdout.
fn save(editor: &Editor, output: Option<&Path>) -> Result<()> {
    let Some(text) = editor.serialized() else {
        bail!("no document loaded");
    };
    match output {
        Some(path) => std::fs::write(path, text)
            .with_context(|| format!("failed to write {}", path.display())),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(text.as_bytes())
                .context("failed to write to stdout")?;
            stdout.flush().context("failed to write to stdout")
        }
    }
}

fn print_palette(palette: &Palette, json: bool) -> Result<()> {
    if json {
        let text = serde_json::to_string_pretty(palette).context("failed to encode palette")?;
        println!("{text}");
        return Ok(());
    }
    for entry in palette {
        let c = entry.color;
        let swatch = "    ".on(TermColor::Rgb {
            r: c.r,
            g: c.g,
            b: c.b,
        });
        let forms: Vec<&str> = entry.original_forms.iter().map(String::as_str).collect();
        println!(
            "{swatch} {}  {:>5}  {:<6}  {}",
            c.to_hex(),
            entry.count,
            entry.role.to_string(),
            forms.join(", ")
        );
    }
    Ok(())
}
