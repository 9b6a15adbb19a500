use clap::{Parser, Subcommand};
use site_nav::config::{self, SiteConfig};
use site_nav::locale::LocaleId;
use site_nav::resolve::{self, RenderItem};
use site_nav::schema::MenuConfiguration;
use site_nav::sources::{
    FixedLocaleSource, InMemoryPageSource, LocaleSource, NegotiatingLocaleSource, PageId,
    RequestContext,
};
use site_nav::{generate, output, render, scaffold};
use std::path::PathBuf;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "site-nav")]
#[command(about = "Multilingual site navigation: check, resolve and render menus")]
#[command(long_about = "\
Multilingual site navigation: check, resolve and render menus

A site directory holds three files:

  site/
  ├── config.toml     # Languages, labels, colors, limits (optional)
  ├── menu.json       # The navigation menu (page links, external links, dropdowns)
  └── pages.json      # Pages and their translations

A menu entry points at a page id. At render time the page's translation in
the visitor's language is used, falling back to the default language; links
to unpublished pages disappear, and so do dropdowns left empty.

Run 'site-nav scaffold' to create a sample site, and
'site-nav gen-config' to print a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Site directory
    #[arg(long, default_value = ".", global = true)]
    dir: PathBuf,

    /// Menu document (default: <dir>/menu.json)
    #[arg(long, global = true)]
    menu: Option<PathBuf>,

    /// Pages document (default: <dir>/pages.json)
    #[arg(long, global = true)]
    pages: Option<PathBuf>,

    /// More logging (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

/// Which request to resolve the menu for.
#[derive(clap::Args, Clone)]
struct RequestArgs {
    /// Active locale. Negotiated from --path and --accept-language when omitted.
    #[arg(long)]
    locale: Option<String>,

    /// Request path, e.g. /fr/a-propos/
    #[arg(long, default_value = "/")]
    path: String,

    /// Accept-Language header value
    #[arg(long)]
    accept_language: Option<String>,

    /// Id of the page being served
    #[arg(long)]
    current: Option<u64>,
}

#[derive(Subcommand)]
enum Command {
    /// Validate the menu document and print an inventory
    Check,
    /// Print the resolved menu for one request
    Resolve {
        #[command(flatten)]
        request: RequestArgs,
        /// Print the render tree as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the navigation markup for one request
    Render {
        #[command(flatten)]
        request: RequestArgs,
        /// Print a complete preview document instead of the fragment
        #[arg(long)]
        document: bool,
    },
    /// Render a preview page for every live page in every language
    Build {
        /// Output directory
        #[arg(long, default_value = "dist")]
        output: PathBuf,
    },
    /// Write a sample site into --dir
    Scaffold {
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let menu_path = cli.menu.clone().unwrap_or_else(|| cli.dir.join(scaffold::MENU_FILE));
    let pages_path = cli.pages.clone().unwrap_or_else(|| cli.dir.join(scaffold::PAGES_FILE));

    match cli.command {
        Command::Check => {
            let config = config::load_config(&cli.dir)?;
            let menu = MenuConfiguration::load(&menu_path)?;
            let problems = menu.problems(&config.limits);
            if pages_path.exists() {
                warn_dangling_pages(&menu, &InMemoryPageSource::load(&pages_path)?);
            }
            output::print_check_output(&menu, &problems);
            println!("{}", output::format_languages_line(&config.locales));
            if !problems.is_empty() {
                return Err(format!("{} has {} problem(s)", menu_path.display(), problems.len()).into());
            }
        }
        Command::Resolve { request, json } => {
            let config = config::load_config(&cli.dir)?;
            let menu = MenuConfiguration::load(&menu_path)?;
            let pages = InMemoryPageSource::load(&pages_path)?;
            let (active, items) = resolve_for(&config, &menu, &pages, &request)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&items)?);
            } else {
                output::print_resolve_output(&items, &active);
            }
        }
        Command::Render { request, document } => {
            let config = config::load_config(&cli.dir)?;
            let menu = MenuConfiguration::load(&menu_path)?;
            let pages = InMemoryPageSource::load(&pages_path)?;
            let (active, items) = resolve_for(&config, &menu, &pages, &request)?;
            let markup = if document {
                let title = request
                    .current
                    .and_then(|id| pages.get(PageId(id)))
                    .map_or("Navigation preview", |p| p.title.as_str());
                render::render_preview_document(&items, &config, title, active.as_str())
            } else {
                render::render_navigation(&items, &config.nav)
            };
            println!("{}", markup.into_string());
        }
        Command::Build { output: output_dir } => {
            let config = config::load_config(&cli.dir)?;
            init_thread_pool(&config.processing);
            let menu = MenuConfiguration::load(&menu_path)?;
            menu.validate(&config.limits)?;
            let pages = InMemoryPageSource::load(&pages_path)?;
            println!("==> Building previews → {}", output_dir.display());
            let report = generate::generate(&menu, &pages, &config, &output_dir)?;
            output::print_build_output(&report, &output_dir);
        }
        Command::Scaffold { force } => {
            for path in scaffold::write_sample_site(&cli.dir, force)? {
                println!("Created {}", path.display());
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Log to stderr so stdout stays clean for JSON and markup.
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn,site_nav=info",
        1 => "warn,site_nav=debug",
        _ => "warn,site_nav=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores: user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

fn resolve_for(
    config: &SiteConfig,
    menu: &MenuConfiguration,
    pages: &InMemoryPageSource,
    args: &RequestArgs,
) -> Result<(LocaleId, Vec<RenderItem>), Box<dyn std::error::Error>> {
    let locales: Box<dyn LocaleSource> = match &args.locale {
        Some(code) => {
            let active = LocaleId::new(code);
            if !config.locales.is_available(&active) {
                warn!(locale = %active, "locale is not in locales.available_languages");
            }
            Box::new(FixedLocaleSource {
                active,
                default: config.locales.default_language.clone(),
            })
        }
        None => Box::new(NegotiatingLocaleSource::new(config.locales.clone())),
    };
    let request = RequestContext {
        path: args.path.clone(),
        page: args.current.map(PageId),
        accept_language: args.accept_language.clone(),
    };
    let active = locales.active_locale(&request)?;
    let items = resolve::resolve_request(menu, locales.as_ref(), pages, &request)?;
    Ok((active, items))
}

fn warn_dangling_pages(menu: &MenuConfiguration, pages: &InMemoryPageSource) {
    for page in menu.referenced_pages() {
        if pages.get(page).is_none() {
            warn!(page = %page, "menu links to a page that does not exist; it will be hidden");
        }
    }
}
