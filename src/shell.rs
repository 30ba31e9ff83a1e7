//! Interactive command shell over a [`Shop`].
//!
//! DESIGN
//! ======
//! The shell stands in for the browser page: one `Shop` lives for the whole
//! session, so the cart and notices persist between commands. Parsing is a
//! pure function over one input line; execution returns the lines to print
//! so both halves are testable without a terminal.

#[cfg(test)]
#[path = "shell_test.rs"]
mod shell_test;

use crate::app::Shop;
use crate::net::api::{AuthApi, CatalogApi};
use crate::net::types::{Product, ProductDraft, RegisterRequest, SearchQuery};
use crate::router::{Decision, Role, Route};
use crate::state::cart::Cart;

pub const HELP: &str = "\
commands:
  login <email> <password>            sign in
  register <email> <password> [admin <secret>]
  logout                              sign out
  whoami                              show the current identity
  open <path>                         open /dashboard, /cart, /admin, ...
  list                                re-fetch the catalog
  search [name=..] [category=..] [min=..] [max=..]
  filter [text]                       filter the shown catalog locally
  show                                print the shown catalog
  buy <id>                            add one unit to the cart
  cart                                print the cart
  qty <id> <n>                        set a cart line's quantity (0 removes)
  remove <id>                         remove a cart line
  clear                               empty the cart
  add <name> <category> <price> <qty>         (admin) create a sweet
  edit <id> <name> <category> <price> <qty>   (admin) update a sweet
  delete <id>                                 (admin) delete a sweet
  restock <id> <amount>                       (admin) add stock
  dismiss <notice-id>                 dismiss a notice
  help | quit";

#[derive(Clone, Debug, PartialEq)]
pub enum ShellCommand {
    Help,
    Quit,
    Login { email: String, password: String },
    Register { email: String, password: String, admin_secret: Option<String> },
    Logout,
    WhoAmI,
    Open(Route),
    List,
    Search(SearchQuery),
    Filter(String),
    Show,
    Buy(String),
    Cart,
    Quantity { id: String, quantity: i64 },
    Remove(String),
    Clear,
    Add(ProductDraft),
    Edit { id: String, draft: ProductDraft },
    Delete(String),
    Restock { id: String, amount: i64 },
    Dismiss(u64),
}

/// Split a line into words, keeping double-quoted runs together.
pub(crate) fn tokenize(line: &str) -> Result<Vec<String>, String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_word = false;

    for ch in line.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                has_word = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_word {
                    words.push(std::mem::take(&mut current));
                    has_word = false;
                }
            }
            c => {
                current.push(c);
                has_word = true;
            }
        }
    }
    if in_quotes {
        return Err("unterminated quote".to_owned());
    }
    if has_word {
        words.push(current);
    }
    Ok(words)
}

fn number<T: std::str::FromStr>(raw: &str, what: &str) -> Result<T, String> {
    raw.parse::<T>().map_err(|_| format!("{what} must be a number, got '{raw}'"))
}

fn draft(args: &[String]) -> Result<ProductDraft, String> {
    let [name, category, price, quantity] = args else {
        return Err("expected <name> <category> <price> <qty>".to_owned());
    };
    Ok(ProductDraft {
        name: name.clone(),
        category: category.clone(),
        price: number(price, "price")?,
        quantity: number(quantity, "quantity")?,
    })
}

fn search_query(args: &[String]) -> Result<SearchQuery, String> {
    let mut query = SearchQuery::default();
    for arg in args {
        let Some((key, value)) = arg.split_once('=') else {
            return Err(format!("expected key=value, got '{arg}'"));
        };
        match key {
            "name" => query.name = Some(value.to_owned()),
            "category" => query.category = Some(value.to_owned()),
            "min" => query.price_min = Some(number(value, "min")?),
            "max" => query.price_max = Some(number(value, "max")?),
            other => return Err(format!("unknown search field '{other}'")),
        }
    }
    Ok(query)
}

/// Parse one input line. Blank lines yield `Ok(None)`.
///
/// # Errors
///
/// Returns a usage message for unknown commands or malformed arguments.
pub fn parse_line(line: &str) -> Result<Option<ShellCommand>, String> {
    let words = tokenize(line)?;
    let Some((head, args)) = words.split_first() else {
        return Ok(None);
    };

    let one = |usage: &str| -> Result<String, String> {
        match args {
            [value] => Ok(value.clone()),
            _ => Err(format!("usage: {usage}")),
        }
    };

    let command = match (head.as_str(), args) {
        ("help" | "?", _) => ShellCommand::Help,
        ("quit" | "exit", _) => ShellCommand::Quit,
        ("login", [email, password]) => ShellCommand::Login { email: email.clone(), password: password.clone() },
        ("login", _) => return Err("usage: login <email> <password>".to_owned()),
        ("register", [email, password]) => {
            ShellCommand::Register { email: email.clone(), password: password.clone(), admin_secret: None }
        }
        ("register", [email, password, role, secret]) if role == "admin" => ShellCommand::Register {
            email: email.clone(),
            password: password.clone(),
            admin_secret: Some(secret.clone()),
        },
        ("register", _) => return Err("usage: register <email> <password> [admin <secret>]".to_owned()),
        ("logout", []) => ShellCommand::Logout,
        ("whoami", []) => ShellCommand::WhoAmI,
        ("open", _) => ShellCommand::Open(Route::parse(&one("open <path>")?)),
        ("list", []) => ShellCommand::List,
        ("search", _) => ShellCommand::Search(search_query(args)?),
        ("filter", _) => ShellCommand::Filter(args.join(" ")),
        ("show", []) => ShellCommand::Show,
        ("buy", _) => ShellCommand::Buy(one("buy <id>")?),
        ("cart", []) => ShellCommand::Cart,
        ("qty", [id, quantity]) => ShellCommand::Quantity { id: id.clone(), quantity: number(quantity, "quantity")? },
        ("qty", _) => return Err("usage: qty <id> <n>".to_owned()),
        ("remove", _) => ShellCommand::Remove(one("remove <id>")?),
        ("clear", []) => ShellCommand::Clear,
        ("add", _) => ShellCommand::Add(draft(args)?),
        ("edit", [id, rest @ ..]) => ShellCommand::Edit { id: id.clone(), draft: draft(rest)? },
        ("edit", _) => return Err("usage: edit <id> <name> <category> <price> <qty>".to_owned()),
        ("delete", _) => ShellCommand::Delete(one("delete <id>")?),
        ("restock", [id, amount]) => ShellCommand::Restock { id: id.clone(), amount: number(amount, "amount")? },
        ("restock", _) => return Err("usage: restock <id> <amount>".to_owned()),
        ("dismiss", _) => ShellCommand::Dismiss(number(&one("dismiss <notice-id>")?, "notice id")?),
        (other, _) => return Err(format!("unknown command '{other}' (try 'help')")),
    };
    Ok(Some(command))
}

// =============================================================================
// RENDERING
// =============================================================================

pub(crate) fn render_product(product: &Product) -> String {
    let stock = if product.in_stock() { format!("qty {}", product.quantity) } else { "out of stock".to_owned() };
    format!("{:<26} {:<20} [{}] ₹{:.2} {}", product.id, product.name, product.category, product.price, stock)
}

pub(crate) fn render_cart(cart: &Cart) -> Vec<String> {
    if cart.is_empty() {
        return vec!["Your cart is empty.".to_owned()];
    }
    let mut lines: Vec<String> = cart
        .lines()
        .iter()
        .map(|line| {
            format!(
                "{:<26} {:<20} ₹{:.2} x {} = ₹{:.2}",
                line.product.id,
                line.product.name,
                line.product.price,
                line.quantity,
                line.subtotal()
            )
        })
        .collect();
    lines.push(format!("Total Price: ₹{:.2}", cart.total()));
    lines
}

// =============================================================================
// EXECUTION
// =============================================================================

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ShellOutput {
    pub lines: Vec<String>,
    pub quit: bool,
}

impl ShellOutput {
    fn line(line: impl Into<String>) -> Self {
        Self { lines: vec![line.into()], quit: false }
    }

    fn lines(lines: Vec<String>) -> Self {
        Self { lines, quit: false }
    }
}

/// Run one command against `shop`. Failures are reported through the shop's
/// notices, so this never errors.
pub async fn execute<A>(shop: &mut Shop<A>, command: ShellCommand) -> ShellOutput
where
    A: AuthApi + CatalogApi + 'static,
{
    match command {
        ShellCommand::Help => ShellOutput::line(HELP),
        ShellCommand::Quit => ShellOutput { lines: Vec::new(), quit: true },
        ShellCommand::Login { email, password } => match shop.sign_in(&email, &password).await {
            Ok(role) => ShellOutput::line(format!("signed in as {role}; now at {}", shop.current_route())),
            Err(_) => ShellOutput::default(),
        },
        ShellCommand::Register { email, password, admin_secret } => {
            let role = if admin_secret.is_some() { Role::Admin } else { Role::User };
            let request = RegisterRequest { email, password, role, admin_secret };
            // The outcome is reported through notices either way.
            let _ = shop.register(&request).await;
            ShellOutput::default()
        }
        ShellCommand::Logout => {
            shop.sign_out();
            ShellOutput::line("signed out")
        }
        ShellCommand::WhoAmI => match shop.session().identity() {
            Some(identity) => ShellOutput::line(format!(
                "{} ({}) sub={}",
                identity.display_name(),
                identity.role,
                identity.sub.as_deref().unwrap_or("-")
            )),
            None => ShellOutput::line("not signed in"),
        },
        ShellCommand::Open(route) => match shop.open(route).await {
            Decision::Allow => ShellOutput::line(format!("now at {route}")),
            Decision::RedirectLogin => ShellOutput::line(format!("{route} is not available; redirected to /login")),
        },
        ShellCommand::List => {
            shop.refresh_catalog().await;
            show_catalog(shop)
        }
        ShellCommand::Search(query) => {
            shop.search_catalog(&query).await;
            show_catalog(shop)
        }
        ShellCommand::Filter(text) => {
            shop.catalog_mut().set_filter(text);
            show_catalog(shop)
        }
        ShellCommand::Show => show_catalog(shop),
        ShellCommand::Buy(id) => {
            shop.buy(&id);
            ShellOutput::default()
        }
        ShellCommand::Cart => ShellOutput::lines(render_cart(shop.cart())),
        ShellCommand::Quantity { id, quantity } => {
            shop.cart_mut().set_quantity(&id, quantity);
            ShellOutput::lines(render_cart(shop.cart()))
        }
        ShellCommand::Remove(id) => {
            shop.cart_mut().remove(&id);
            ShellOutput::lines(render_cart(shop.cart()))
        }
        ShellCommand::Clear => {
            shop.cart_mut().clear();
            ShellOutput::lines(render_cart(shop.cart()))
        }
        ShellCommand::Add(draft) => match shop.create_sweet(&draft).await {
            Ok(product) => ShellOutput::line(render_product(&product)),
            Err(_) => ShellOutput::default(),
        },
        ShellCommand::Edit { id, draft } => match shop.update_sweet(&id, &draft).await {
            Ok(product) => ShellOutput::line(render_product(&product)),
            Err(_) => ShellOutput::default(),
        },
        ShellCommand::Delete(id) => {
            let _ = shop.delete_sweet(&id).await;
            ShellOutput::default()
        }
        ShellCommand::Restock { id, amount } => match shop.restock_sweet(&id, amount).await {
            Ok(product) => ShellOutput::line(render_product(&product)),
            Err(_) => ShellOutput::default(),
        },
        ShellCommand::Dismiss(id) => {
            if shop.notices_mut().dismiss(id) {
                ShellOutput::default()
            } else {
                ShellOutput::line(format!("no notice {id}"))
            }
        }
    }
}

fn show_catalog<A>(shop: &Shop<A>) -> ShellOutput
where
    A: AuthApi + CatalogApi + 'static,
{
    let visible = shop.catalog().visible();
    if visible.is_empty() {
        return ShellOutput::line("No sweets found.");
    }
    ShellOutput::lines(visible.into_iter().map(render_product).collect())
}
