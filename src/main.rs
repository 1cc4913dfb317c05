use cat_adoption_cart::cart::helpers::parse_quantity;
use cat_adoption_cart::confirm::StdinConfirm;
use cat_adoption_cart::{CartConfig, CartController, CatId, MutationOutcome};
use std::io::BufRead;
use std::str::SplitWhitespace;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const HELP: &str = "\
Commands:
  cats              list adoptable cats
  cart              show the adoption cart
  add <id>          add a cat (again) to the cart
  remove <id>       remove a cat from the cart
  qty <id> <value>  set the quantity for a cat
  clear             empty the cart (asks first)
  total             show the cart total
  reload            fetch the catalog and remote cart again
  help              show this help
  quit              leave";

/// A single line of shell input.
#[derive(Debug, PartialEq)]
enum Command {
    Cats,
    Cart,
    Add(CatId),
    Remove(CatId),
    Quantity(CatId, Option<f64>),
    Clear,
    Total,
    Reload,
    Help,
    Quit,
}

fn parse_id(parts: &mut SplitWhitespace<'_>) -> Result<CatId, String> {
    let raw = parts.next().ok_or("missing cat id")?;
    raw.parse().map_err(|_| format!("invalid cat id: {raw}"))
}

fn parse_command(input: &str) -> Result<Command, String> {
    let mut parts = input.split_whitespace();
    let verb = parts.next().unwrap_or_default().to_ascii_lowercase();

    let command = match verb.as_str() {
        "cats" => Command::Cats,
        "cart" => Command::Cart,
        "add" => Command::Add(parse_id(&mut parts)?),
        "remove" | "rm" => Command::Remove(parse_id(&mut parts)?),
        "qty" => {
            let cat = parse_id(&mut parts)?;
            let value = parts.collect::<Vec<_>>().join(" ");
            Command::Quantity(cat, parse_quantity(&value))
        }
        "clear" => Command::Clear,
        "total" => Command::Total,
        "reload" => Command::Reload,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(format!("unknown command: {other} (try `help`)")),
    };
    Ok(command)
}

fn describe(outcome: MutationOutcome) -> &'static str {
    match outcome {
        MutationOutcome::Applied => "done",
        MutationOutcome::Synced => "done (synced)",
        MutationOutcome::RolledBack => "the server rejected the change; cart left as it was",
        MutationOutcome::NotFound => "no such cat",
        MutationOutcome::Declined => "cancelled",
    }
}

async fn read_line() -> Option<String> {
    tokio::task::spawn_blocking(|| {
        let mut line = String::new();
        match std::io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line),
        }
    })
    .await
    .ok()
    .flatten()
}

async fn run(controller: &CartController, command: Command) {
    match command {
        Command::Cats => {
            let message = controller.error_message().await;
            if !message.is_empty() {
                println!("{message}");
            }
            for cat in controller.catalog().await {
                println!("{:>4}  {:<20} {:>8.2}", cat.id, cat.name, cat.price);
            }
        }
        Command::Cart => {
            for line in controller.cart().await {
                println!(
                    "{:>4}  {:<20} {:>8.2} x {}",
                    line.id, line.name, line.price, line.quantity
                );
            }
            println!("total: {}", controller.total_price().await);
        }
        Command::Add(id) => println!("{}", describe(controller.add_item(id).await)),
        Command::Remove(id) => println!("{}", describe(controller.remove_item(id).await)),
        Command::Quantity(id, raw) => match controller.update_quantity(id, raw).await {
            Some(quantity) => println!("quantity set to {quantity}"),
            None => println!("no such cat in the cart"),
        },
        Command::Clear => println!("{}", describe(controller.clear_cart().await)),
        Command::Total => println!("{}", controller.total_price().await),
        Command::Reload => {
            controller.initialize().wait().await;
        }
        Command::Help => println!("{HELP}"),
        Command::Quit => {}
    }
}

#[tokio::main]
async fn main() -> cat_adoption_cart::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = CartConfig::from_env()?;
    tracing::info!(
        api = %config.api_base_url,
        sync = config.sync,
        storage = %config.storage_dir.display(),
        "Starting cat adoption cart"
    );

    let controller = CartController::from_config(&config, Arc::new(StdinConfirm));
    let (catalog_ok, cart) = controller.initialize().wait().await;
    tracing::debug!(catalog_ok, ?cart, "Initialization finished");

    println!("{HELP}");
    while let Some(line) = read_line().await {
        if line.trim().is_empty() {
            continue;
        }
        match parse_command(&line) {
            Ok(Command::Quit) => break,
            Ok(command) => run(&controller, command).await,
            Err(message) => println!("{message}"),
        }
    }

    controller.persist().await;
    Ok(())
}
