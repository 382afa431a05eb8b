// checkheaders: find unneeded #include directives in C/C++ code

use std::path::PathBuf;

use clap::Parser;

use checkheaders::config::{Heuristics, SearchConfig};
use checkheaders::diagnostics::{Diagnostic, DiagnosticSink};
use checkheaders::logging;
use checkheaders::session::Session;
use checkheaders::source::DiskSource;

#[derive(Parser)]
#[command(
    name = "checkheaders",
    version,
    about = "Find #include directives that are not needed"
)]
struct Cli {
    /// Source files to check
    #[arg(value_name = "FILE", required = true)]
    files: Vec<PathBuf>,

    /// Directory to search for included headers (repeatable)
    #[arg(short = 'I', value_name = "DIR")]
    include: Vec<PathBuf>,

    /// Header name to never follow or check (repeatable)
    #[arg(long, value_name = "HEADER")]
    skip: Vec<String>,

    /// File with `include` and `skip` sections
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Report function bodies found in headers
    #[arg(long)]
    implementation: bool,

    /// Verbose progress output
    #[arg(long)]
    debug: bool,
}

/// Writes each diagnostic to stderr as it arrives.
struct StderrSink {
    reported: usize,
}

impl DiagnosticSink for StderrSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        eprintln!("{}", diagnostic);
        self.reported += 1;
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init_with_level(if cli.debug { "debug" } else { "warn" });

    let mut config = SearchConfig::default();
    if let Some(path) = &cli.config {
        config = config.load(path)?;
    }
    config.include_paths.extend(cli.include);
    config.skip.extend(cli.skip);

    let heuristics = Heuristics {
        check_implementation_in_headers: cli.implementation,
        ..Heuristics::default()
    };

    let mut files = cli.files;
    files.sort();

    let source = DiskSource;
    let session = Session::new(&source, &config, &heuristics);
    let mut sink = StderrSink { reported: 0 };

    for file in &files {
        println!("Checking {}...", file.display());
        if let Err(e) = session.check(file, &mut sink) {
            eprintln!("Error: {}", e);
        }
    }

    if cli.debug {
        eprintln!("{} diagnostics", sink.reported);
    }
    Ok(())
}
