//! Command-line interface for hotel-xml
//!
//! Prints three results: the validation of the valid document, the
//! validation of the document with errors, and the valid document as JSON.

#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
use hotel_xml::config::{DEFAULT_XML_ERRORS_URL, DEFAULT_XML_URL, DEFAULT_XSD_URL};
#[cfg(feature = "cli")]
use hotel_xml::{run, SeverityPolicy, Sources, ValidationOptions};

#[cfg(feature = "cli")]
#[derive(Parser, Debug)]
#[command(name = "hotel-xml")]
#[command(author, version, about = "Hotel XML validation and JSON conversion", long_about = None)]
struct Cli {
    /// Location of the valid hotels document (URL, path or inline XML)
    #[arg(long, value_name = "LOCATION", default_value = DEFAULT_XML_URL)]
    xml: String,

    /// Location of the hotels document with errors
    #[arg(long, value_name = "LOCATION", default_value = DEFAULT_XML_ERRORS_URL)]
    xml_errors: String,

    /// Location of the hotels schema
    #[arg(long, value_name = "LOCATION", default_value = DEFAULT_XSD_URL)]
    xsd: String,

    /// Report errors only, dropping warnings
    #[arg(long)]
    errors_only: bool,
}

#[cfg(feature = "cli")]
fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    // RUST_LOG overrides the default
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(feature = "cli")]
fn main() {
    let cli = Cli::parse();
    init_tracing();

    let sources = Sources::new()
        .with_xml(cli.xml)
        .with_xml_errors(cli.xml_errors)
        .with_xsd(cli.xsd);
    let severity = if cli.errors_only {
        SeverityPolicy::ErrorsOnly
    } else {
        SeverityPolicy::All
    };
    let options = ValidationOptions::new().with_severity(severity);

    for result in run(&sources, &options) {
        println!("{}", result);
    }
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Rebuild with --features cli");
    std::process::exit(1);
}
