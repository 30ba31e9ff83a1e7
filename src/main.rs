use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use sweetshop::app::{Shop, ShopError};
use sweetshop::config::ShopConfig;
use sweetshop::net::http::ApiClient;
use sweetshop::net::types::{ApiError, ProductDraft, RegisterRequest, SearchQuery};
use sweetshop::router::Role;
use sweetshop::shell;
use sweetshop::state::admin::AdminError;
use sweetshop::state::catalog::FetchOutcome;
use sweetshop::state::notice::NoticeLevel;
use sweetshop::state::storage::{FileStorage, KeyValueStorage};
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Shop(#[from] ShopError),
    #[error(transparent)]
    Admin(#[from] AdminError),
    #[error("not signed in; run `sweetshop login` first")]
    NotSignedIn,
    #[error("could not load the catalog")]
    FetchFailed,
    #[error("invalid JSON output: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Parser, Debug)]
#[command(name = "sweetshop", about = "Sweet shop storefront and admin client")]
struct Cli {
    /// REST base URL; overrides SWEETSHOP_API_URL.
    #[arg(long)]
    api_url: Option<String>,

    /// File holding the persisted session token; overrides SWEETSHOP_STATE_FILE.
    #[arg(long)]
    state_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        email: String,
        password: String,
    },
    Register {
        email: String,
        password: String,
        #[arg(long, default_value = "user")]
        role: Role,
        #[arg(long, env = "SWEETSHOP_ADMIN_SECRET")]
        admin_secret: Option<String>,
    },
    Logout,
    Whoami,
    Sweets(SweetsCommand),
    Admin(AdminCommand),
    /// Interactive session with a cart.
    Shell,
}

#[derive(Args, Debug)]
struct SweetsCommand {
    #[command(subcommand)]
    command: SweetsSubcommand,
}

#[derive(Subcommand, Debug)]
enum SweetsSubcommand {
    List {
        /// Case-insensitive match on name or category.
        #[arg(long)]
        filter: Option<String>,
    },
    Search {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        price_min: Option<f64>,
        #[arg(long)]
        price_max: Option<f64>,
    },
}

#[derive(Args, Debug)]
struct AdminCommand {
    #[command(subcommand)]
    command: AdminSubcommand,
}

#[derive(Args, Debug)]
struct DraftArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    category: String,
    #[arg(long)]
    price: f64,
    #[arg(long, default_value_t = 0)]
    quantity: u32,
}

impl From<DraftArgs> for ProductDraft {
    fn from(args: DraftArgs) -> Self {
        Self { name: args.name, category: args.category, price: args.price, quantity: args.quantity }
    }
}

#[derive(Subcommand, Debug)]
enum AdminSubcommand {
    Create(DraftArgs),
    Update {
        id: String,
        #[command(flatten)]
        draft: DraftArgs,
    },
    Delete {
        id: String,
    },
    Restock {
        id: String,
        #[arg(allow_negative_numbers = true)]
        amount: i64,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = ShopConfig::from_env();
    if let Some(api_url) = cli.api_url {
        config = ShopConfig::new(api_url, config.state_file, config.timeouts);
    }
    if let Some(state_file) = cli.state_file {
        config.state_file = state_file;
    }
    tracing::debug!(api_url = %config.api_url, state_file = %config.state_file.display(), "config loaded");

    let storage: Arc<dyn KeyValueStorage> = Arc::new(FileStorage::new(config.state_file.clone()));
    let api = Arc::new(ApiClient::new(&config.api_url, config.timeouts, storage.clone())?);
    let mut shop = Shop::new(api, storage);

    let result = dispatch(&mut shop, cli.command).await;
    flush_notices(&mut shop);
    result
}

async fn dispatch(shop: &mut Shop<ApiClient>, command: Command) -> Result<(), CliError> {
    match command {
        Command::Login { email, password } => {
            shop.authenticate(&email, &password).await?;
            let identity = shop.session().identity().ok_or(CliError::NotSignedIn)?;
            print_json(identity)
        }
        Command::Register { email, password, role, admin_secret } => {
            let request = RegisterRequest { email, password, role, admin_secret };
            let summary = shop.register(&request).await?;
            print_json(&summary)
        }
        Command::Logout => {
            shop.sign_out();
            Ok(())
        }
        Command::Whoami => {
            shop.restore_session();
            let identity = shop.session().identity().ok_or(CliError::NotSignedIn)?;
            print_json(identity)
        }
        Command::Sweets(sweets) => run_sweets(shop, sweets).await,
        Command::Admin(admin) => run_admin(shop, admin).await,
        Command::Shell => run_shell(shop).await,
    }
}

async fn run_sweets(shop: &mut Shop<ApiClient>, sweets: SweetsCommand) -> Result<(), CliError> {
    shop.restore_session();
    let outcome = match sweets.command {
        SweetsSubcommand::List { filter } => {
            let outcome = shop.refresh_catalog().await;
            if let Some(filter) = filter {
                shop.catalog_mut().set_filter(filter);
            }
            outcome
        }
        SweetsSubcommand::Search { name, category, price_min, price_max } => {
            let query = SearchQuery { name, category, price_min, price_max };
            shop.search_catalog(&query).await
        }
    };
    if outcome == FetchOutcome::Failed {
        return Err(CliError::FetchFailed);
    }
    print_json(&shop.catalog().visible())
}

async fn run_admin(shop: &mut Shop<ApiClient>, admin: AdminCommand) -> Result<(), CliError> {
    shop.restore_session();
    match admin.command {
        AdminSubcommand::Create(draft) => {
            let product = shop.create_sweet(&draft.into()).await?;
            print_json(&product)
        }
        AdminSubcommand::Update { id, draft } => {
            let product = shop.update_sweet(&id, &draft.into()).await?;
            print_json(&product)
        }
        AdminSubcommand::Delete { id } => Ok(shop.delete_sweet(&id).await?),
        AdminSubcommand::Restock { id, amount } => {
            let product = shop.restock_sweet(&id, amount).await?;
            print_json(&product)
        }
    }
}

async fn run_shell(shop: &mut Shop<ApiClient>) -> Result<(), CliError> {
    shop.start().await;
    flush_notices(shop);
    println!("now at {}; type 'help' for commands", shop.current_route());

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("{}> ", shop.current_route());
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let command = match shell::parse_line(&line?) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(usage) => {
                eprintln!("{usage}");
                continue;
            }
        };
        let output = shell::execute(shop, command).await;
        for line in &output.lines {
            println!("{line}");
        }
        flush_notices(shop);
        if output.quit {
            break;
        }
    }
    Ok(())
}

fn flush_notices(shop: &mut Shop<ApiClient>) {
    for notice in shop.notices_mut().drain() {
        let tag = match notice.level {
            NoticeLevel::Success => "ok",
            NoticeLevel::Info => "info",
            NoticeLevel::Error => "error",
        };
        eprintln!("[{tag}] {}", notice.message);
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
