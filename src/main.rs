use clap::{Parser, Subcommand};
use docsite::site::{self, Site};
use docsite::{config, links, output, search, server};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "docsite")]
#[command(about = "Static documentation site generator")]
#[command(long_about = "\
Static documentation site generator

Markdown and MDX files become styled HTML pages with a navbar, a sidebar,
an \"On this page\" table of contents, and a client-side search index.

Project structure:

  my-docs/
  ├── config.toml                  # Site config (optional, see gen-config)
  ├── navigation.toml              # Navbar → sidebar sections → items
  ├── content/docs/
  │   ├── readme.mdx               # /docs/readme.html
  │   ├── getting-started.md       # /docs/getting-started.html
  │   └── guides/
  │       ├── index.mdx            # /docs/guides.html
  │       └── deploy.mdx           # /docs/guides/deploy.html
  ├── public/                      # Copied to dist/assets/
  └── assets/
      ├── fonts/                   # Copied to dist/assets/fonts/
      └── favicon.svg              # Top-level files copied to dist/assets/

Without navigation.toml, navigation is derived from the content tree
(frontmatter `order`, then title).

Run 'docsite gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Project directory (holds config.toml and navigation.toml)
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// Show debug diagnostics (RUST_LOG overrides)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the static site into the output directory
    Build,
    /// Validate navigation, redirects, and links against the content
    Check,
    /// Serve the site with live rendering and a JSON API
    Serve {
        /// Port to listen on (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Query the search index
    Search {
        /// Search terms
        query: Vec<String>,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn init_tracing(verbose: bool) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Build => {
            println!("==> Building {}", cli.root.display());
            let site = match Site::load(&cli.root) {
                Ok(site) => site,
                Err(e) => {
                    eprintln!("{}", output::format_build_failure(&e));
                    return Ok(ExitCode::FAILURE);
                }
            };
            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_build_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let result = site::build(&site, Some(tx));
            printer.join().ok();
            match result {
                Ok(report) => {
                    println!();
                    output::print_build_report(&report);
                    if !report.is_success() {
                        return Ok(ExitCode::FAILURE);
                    }
                    println!("==> Build complete: {}", report.output_dir.display());
                }
                Err(e) => {
                    eprintln!("{}", output::format_build_failure(&e));
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Command::Check => {
            let site = Site::load(&cli.root)?;
            println!("==> Checking {}", site.paths.content.display());
            let report = links::check_links(&site.nav, &site.paths.content, &site.config.redirects)?;
            output::print_check_output(&site.nav, site.derived_nav, &report);
            if report.has_errors() {
                return Ok(ExitCode::FAILURE);
            }
            println!("==> Content is valid");
        }
        Command::Serve { port } => {
            let site = Site::load(&cli.root)?;
            let host = site.config.server.host.clone();
            let port = port.unwrap_or(site.config.server.port);
            println!("==> Serving {} at http://{}:{}", cli.root.display(), host, port);
            server::run(site, &host, port)?;
        }
        Command::Search { query } => {
            let site = Site::load(&cli.root)?;
            let query = query.join(" ");
            let index = site.search_index();
            let cfg = &site.config.search;
            let hits = search::query(&index, &query, cfg.min_query_len, cfg.max_results);
            output::print_search_results(&query, &hits);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(ExitCode::SUCCESS)
}
