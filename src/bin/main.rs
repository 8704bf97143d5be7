use clap::{Arg, ArgMatches, Command};
use invoice2pdf::config::{self, ConfigSource};
use invoice2pdf::fonts::{self, FontConfig, FontSource};
use invoice2pdf::validation::{validate_invoice, ValidationErrors};
use invoice2pdf::{debug, DocumentRenderer, Invoice, RenderError, SystemClock};
use log::{error, info, warn};
use std::fs;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use thiserror::Error;

const DEFAULT_OUTPUT: &str = "factura.pdf";
const RC_FILE: &str = "invoice2pdfrc.toml";

#[derive(Debug, Error)]
enum AppError {
    #[error("Error reading {path}: {source}")]
    FileRead {
        path: String,
        source: std::io::Error,
    },
    #[error("No input provided")]
    NoInput,
    #[error("Invalid invoice JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{0}")]
    Invalid(#[from] ValidationErrors),
    #[error("{0}")]
    Render(#[from] RenderError),
    #[error("Cannot write layout dump {path}: {source}")]
    Dump {
        path: String,
        source: std::io::Error,
    },
    #[error("Path error: {0}")]
    Path(String),
}

/// Verbosity level for output
#[derive(Debug, Clone, Copy, PartialEq)]
enum Verbosity {
    Quiet,
    Normal,
    Verbose,
}

fn get_invoice_input(matches: &ArgMatches) -> Result<String, AppError> {
    if let Some(file_path) = matches.get_one::<String>("input") {
        fs::read_to_string(file_path).map_err(|source| AppError::FileRead {
            path: file_path.clone(),
            source,
        })
    } else if let Some(json) = matches.get_one::<String>("string") {
        Ok(json.to_string())
    } else {
        Err(AppError::NoInput)
    }
}

/// Explicit `--config` first, then `invoice2pdfrc.toml` in the working directory, then defaults.
fn get_config_source(matches: &ArgMatches) -> ConfigSource<'_> {
    if let Some(config_file) = matches.get_one::<String>("config") {
        return ConfigSource::File(config_file);
    }
    if std::path::Path::new(RC_FILE).exists() {
        return ConfigSource::File(RC_FILE);
    }
    ConfigSource::Default
}

fn get_output_path(matches: &ArgMatches) -> Result<PathBuf, AppError> {
    let current_dir = std::env::current_dir().map_err(|e| AppError::Path(e.to_string()))?;

    Ok(matches
        .get_one::<String>("output")
        .map(|p| current_dir.join(p))
        .unwrap_or_else(|| current_dir.join(DEFAULT_OUTPUT)))
}

fn get_font_config(matches: &ArgMatches) -> Option<FontConfig> {
    if !matches.contains_id("font-path") && !matches.contains_id("default-font") {
        return None;
    }
    Some(FontConfig {
        custom_paths: matches
            .get_many::<String>("font-path")
            .map(|values| values.map(PathBuf::from).collect())
            .unwrap_or_default(),
        default_font: matches.get_one::<String>("default-font").cloned(),
    })
}

/// Falls back to the embedded family when the requested one cannot be loaded.
fn get_font_source(font_config: Option<&FontConfig>) -> FontSource {
    match font_config.map(FontSource::from_config) {
        None => FontSource::embedded(),
        Some(Ok(source)) => source,
        Some(Err(e)) => {
            warn!("{}; using embedded '{}'", e, fonts::EMBEDDED_FAMILY);
            FontSource::embedded()
        }
    }
}

fn run(matches: ArgMatches) -> Result<(), AppError> {
    let verbosity = if matches.get_flag("quiet") {
        Verbosity::Quiet
    } else if matches.get_flag("verbose") {
        Verbosity::Verbose
    } else {
        Verbosity::Normal
    };

    let json = get_invoice_input(&matches)?;
    let invoice = Invoice::from_json(&json)?;
    validate_invoice(&invoice)?;

    if matches.get_flag("dry-run") {
        if verbosity != Verbosity::Quiet {
            println!(
                "✓ Invoice is valid ({} line item(s)). No PDF generated.",
                invoice.products.len()
            );
        }
        return Ok(());
    }

    let style = config::load_config_from_source(get_config_source(&matches));
    let font_config = get_font_config(&matches);
    let font_source = get_font_source(font_config.as_ref());
    if verbosity == Verbosity::Verbose {
        info!("Generating PDF with font '{}'", font_source.name());
    }

    let renderer = DocumentRenderer::new(Arc::new(style), font_source, Arc::new(SystemClock));
    let flow = renderer.layout(&invoice)?;
    if let Some(dump_path) = matches.get_one::<String>("dump-layout") {
        debug::save_flow_to_json_file(&flow, dump_path).map_err(|source| AppError::Dump {
            path: dump_path.clone(),
            source,
        })?;
        if verbosity == Verbosity::Verbose {
            info!("Layout written to {}", dump_path);
        }
    }
    let bytes = renderer.compose(&flow)?;

    let output_path = get_output_path(&matches)?;
    fs::write(&output_path, &bytes).map_err(|source| RenderError::Io {
        path: output_path.clone(),
        source,
    })?;

    if verbosity != Verbosity::Quiet {
        println!("✅ Successfully saved PDF to {}", output_path.display());
        if verbosity == Verbosity::Verbose {
            let size_kb = bytes.len() as f64 / 1024.0;
            if size_kb < 1024.0 {
                println!("   Size: {:.1} KB", size_kb);
            } else {
                println!("   Size: {:.2} MB", size_kb / 1024.0);
            }
        }
    }

    Ok(())
}

fn build_cli() -> Command {
    Command::new("invoice2pdf")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Render an invoice (JSON) into a PDF document")
        .after_help(
            "EXAMPLES:\n  \
            invoice2pdf -i invoice.json -o factura.pdf\n  \
            invoice2pdf -i invoice.json --dry-run\n  \
            invoice2pdf -i invoice.json -c theme.toml --dump-layout layout.json\n",
        )
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .value_name("INVOICE_JSON")
                .help("Path to the invoice JSON file")
                .conflicts_with("string"),
        )
        .arg(
            Arg::new("string")
                .short('s')
                .long("string")
                .value_name("JSON")
                .help("Invoice JSON as a string")
                .conflicts_with("input"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("OUTPUT_PATH")
                .help("Path to the output PDF file (defaults to ./factura.pdf)"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("CONFIG_FILE")
                .help("Style configuration (TOML). Auto-detects invoice2pdfrc.toml if not specified"),
        )
        .arg(
            Arg::new("font-path")
                .long("font-path")
                .value_name("PATH")
                .help("Path to custom font directory or font file")
                .action(clap::ArgAction::Append),
        )
        .arg(
            Arg::new("default-font")
                .long("default-font")
                .value_name("FONT_NAME")
                .help("Font family to use (default: embedded DejaVu Sans Condensed)"),
        )
        .arg(
            Arg::new("dump-layout")
                .long("dump-layout")
                .value_name("JSON_PATH")
                .help("Write the document flow as JSON before rendering"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Show detailed output including file size")
                .action(clap::ArgAction::SetTrue)
                .conflicts_with("quiet"),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Suppress all output except errors")
                .action(clap::ArgAction::SetTrue)
                .conflicts_with("verbose"),
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .help("Validate the invoice without generating a PDF")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("list-embedded-fonts")
                .short('E')
                .long("list-embedded-fonts")
                .help("List embedded fonts and exit")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("get-default-configuration")
                .long("get-default-configuration")
                .help("Print a default invoice2pdfrc.toml to stdout and exit")
                .action(clap::ArgAction::SetTrue),
        )
}

fn main() {
    // RUST_LOG controls log output
    env_logger::Builder::from_default_env()
        .format_timestamp_millis()
        .init();

    let mut cmd = build_cli();
    let matches = cmd.clone().get_matches();

    if matches.get_flag("list-embedded-fonts") {
        for f in fonts::known_embedded_families() {
            println!("{}", f);
        }
        process::exit(0);
    }

    if matches.get_flag("get-default-configuration") {
        println!("{}", config::default_config_toml());
        process::exit(0);
    }

    if !matches.contains_id("input") && !matches.contains_id("string") {
        let _ = cmd.print_help();
        println!();
        process::exit(1);
    }

    if let Err(e) = run(matches) {
        match &e {
            AppError::Invalid(errors) => {
                error!("[X] Invalid invoice:");
                for problem in errors.iter() {
                    error!("    {}", problem);
                }
            }
            AppError::Render(err) => error!("[X] {}\n    Suggestion: {}", err, err.suggestion()),
            other => error!("[X] {}", other),
        }
        process::exit(1);
    }
}

#[cfg(test)]
mod cli_tests {
    use super::*;

    const VALID: &str = r#"{
        "customer": {"name": "Juan Pérez", "identification": "1234567890", "email": "juan.perez@example.com"},
        "products": [{"name": "Producto A", "price": 50000.00, "quantity": 2, "total": 100000.00}]
    }"#;

    #[test]
    fn test_get_output_path_default_and_custom() {
        let matches = build_cli().get_matches_from(vec!["invoice2pdf"]);
        assert!(get_output_path(&matches).unwrap().ends_with("factura.pdf"));

        let matches = build_cli().get_matches_from(vec!["invoice2pdf", "-o", "mine.pdf"]);
        assert!(get_output_path(&matches).unwrap().ends_with("mine.pdf"));
    }

    #[test]
    fn test_get_invoice_input_from_string_and_file() {
        let matches = build_cli().get_matches_from(vec!["invoice2pdf", "-s", VALID]);
        assert!(get_invoice_input(&matches).unwrap().contains("Producto A"));

        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("invoice.json");
        fs::write(&file, VALID).unwrap();
        let matches =
            build_cli().get_matches_from(vec!["invoice2pdf", "-i", file.to_str().unwrap()]);
        assert!(get_invoice_input(&matches).unwrap().contains("juan.perez"));

        let matches = build_cli().get_matches_from(vec!["invoice2pdf", "-i", "/no/such/file.json"]);
        assert!(matches!(
            get_invoice_input(&matches),
            Err(AppError::FileRead { .. })
        ));
    }

    #[test]
    fn test_input_and_string_conflict() {
        let result =
            build_cli().try_get_matches_from(vec!["invoice2pdf", "-i", "a.json", "-s", "{}"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_get_config_source_explicit_config() {
        let matches = build_cli().get_matches_from(vec!["invoice2pdf", "--config", "theme.toml"]);
        match get_config_source(&matches) {
            ConfigSource::File(path) => assert_eq!(path, "theme.toml"),
            other => panic!("Expected File config source, got {:?}", other),
        }
    }

    #[test]
    fn test_font_config_only_when_requested() {
        let matches = build_cli().get_matches_from(vec!["invoice2pdf"]);
        assert!(get_font_config(&matches).is_none());

        let matches = build_cli().get_matches_from(vec![
            "invoice2pdf",
            "--font-path",
            "/a",
            "--font-path",
            "/b",
            "--default-font",
            "Liberation Sans",
        ]);
        let cfg = get_font_config(&matches).unwrap();
        assert_eq!(cfg.custom_paths, vec![PathBuf::from("/a"), PathBuf::from("/b")]);
        assert_eq!(cfg.default_font.as_deref(), Some("Liberation Sans"));
    }

    #[test]
    fn test_unknown_font_falls_back_to_embedded() {
        let cfg = FontConfig {
            custom_paths: Vec::new(),
            default_font: Some("No Such Family 7f3a9c".into()),
        };
        assert_eq!(get_font_source(Some(&cfg)).name(), fonts::EMBEDDED_FAMILY);
    }

    #[test]
    fn test_flags() {
        let matches = build_cli().get_matches_from(vec![
            "invoice2pdf",
            "--list-embedded-fonts",
            "--get-default-configuration",
            "--dry-run",
            "-v",
        ]);
        assert!(matches.get_flag("list-embedded-fonts"));
        assert!(matches.get_flag("get-default-configuration"));
        assert!(matches.get_flag("dry-run"));
        assert!(matches.get_flag("verbose"));
    }

    #[test]
    fn test_run_dry_run_returns_ok() {
        let matches = build_cli().get_matches_from(vec!["invoice2pdf", "-s", VALID, "--dry-run", "-q"]);
        assert!(run(matches).is_ok());
    }

    #[test]
    fn test_run_rejects_invalid_invoice() {
        let bad = VALID.replace("juan.perez@example.com", "not-an-email");
        let matches = build_cli().get_matches_from(vec!["invoice2pdf", "-s", bad.as_str(), "--dry-run"]);
        match run(matches) {
            Err(AppError::Invalid(errors)) => assert!(errors.has_field("customer.email")),
            other => panic!("expected validation failure, got {:?}", other),
        }
    }

    #[test]
    fn test_run_rejects_malformed_json() {
        let matches = build_cli().get_matches_from(vec!["invoice2pdf", "-s", "{not json", "--dry-run"]);
        assert!(matches!(run(matches), Err(AppError::Parse(_))));
    }
}
