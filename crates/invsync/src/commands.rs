//! Command handlers: one function per subcommand.

use std::sync::Arc;
use std::time::Duration;

use owo_colors::OwoColorize;
use tabled::Tabled;
use url::Url;

use invsync_core::{ChannelState, Inventory, InventoryConfig, Product};

use crate::cli::{Cli, Command, GlobalOpts, ProductArgs};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ProductRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Brand")]
    brand: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Qty")]
    quantity: i64,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Updated")]
    updated: String,
}

impl From<&Product> for ProductRow {
    fn from(p: &Product) -> Self {
        Self {
            id: p.id,
            brand: p.brand.clone(),
            category: p.category.clone(),
            quantity: p.quantity,
            price: format!("{:.2}", p.price),
            updated: p
                .updated_at
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default(),
        }
    }
}

// ── Dispatch ────────────────────────────────────────────────────────

pub async fn run(cli: Cli) -> Result<(), CliError> {
    let live_updates = !matches!(cli.command, Command::Watch { no_live: true });
    let inventory = Inventory::new(build_config(&cli.global, live_updates)?)?;

    match cli.command {
        Command::List => list(&inventory, &cli.global).await,
        Command::Get { id } => get(&inventory, id, &cli.global).await,
        Command::Create(args) => create(&inventory, args, &cli.global).await,
        Command::Update(args) => update(&inventory, args, &cli.global).await,
        Command::Delete { id } => delete(&inventory, id, &cli.global).await,
        Command::Watch { .. } => watch(&inventory, &cli.global).await,
    }
}

fn build_config(global: &GlobalOpts, live_updates: bool) -> Result<InventoryConfig, CliError> {
    Ok(InventoryConfig {
        base_url: Url::parse(&global.server)?,
        ws_url: global.ws.as_deref().map(Url::parse).transpose()?,
        timeout: Duration::from_secs(global.timeout),
        live_updates,
    })
}

fn to_product(args: ProductArgs) -> Product {
    Product {
        id: args.id,
        brand: args.brand,
        category: args.category,
        quantity: args.quantity,
        price: args.price,
        created_at: None,
        updated_at: None,
    }
}

// ── Handlers ────────────────────────────────────────────────────────

async fn list(inventory: &Inventory, global: &GlobalOpts) -> Result<(), CliError> {
    inventory.refresh().await?;
    render_view(&inventory.products(), global);
    Ok(())
}

async fn get(inventory: &Inventory, id: i64, global: &GlobalOpts) -> Result<(), CliError> {
    let product = inventory.fetch(id).await?;
    let out = output::render_single(&global.output, &product, |p| ProductRow::from(p));
    output::print_output(&out, global.quiet);
    Ok(())
}

async fn create(
    inventory: &Inventory,
    args: ProductArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    inventory.create(&to_product(args)).await?;
    if !global.quiet {
        eprintln!("Product created");
    }
    render_view(&inventory.products(), global);
    Ok(())
}

async fn update(
    inventory: &Inventory,
    args: ProductArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    inventory.update(&to_product(args)).await?;
    if !global.quiet {
        eprintln!("Product updated");
    }
    render_view(&inventory.products(), global);
    Ok(())
}

async fn delete(inventory: &Inventory, id: i64, global: &GlobalOpts) -> Result<(), CliError> {
    inventory.remove(id).await?;
    if !global.quiet {
        eprintln!("Product {id} deleted");
    }
    Ok(())
}

/// Follow the live view: initial refresh, then re-render on every store
/// change until Ctrl-C. Channel closures are reported but not retried.
/// In poll-only mode the view is re-fetched on an interval instead.
async fn watch(inventory: &Inventory, global: &GlobalOpts) -> Result<(), CliError> {
    const POLL_INTERVAL: Duration = Duration::from_secs(10);

    let live = inventory.config().live_updates;
    let mut sub = inventory.subscribe();
    let mut state = inventory.channel_state();

    if live {
        inventory.connect_live().await?;
    }
    if let Err(e) = inventory.refresh().await {
        tracing::warn!(error = %e, "initial refresh failed, waiting for pushes");
    }

    render_view(&inventory.products(), global);

    let mut poll = tokio::time::interval(POLL_INTERVAL);
    poll.tick().await; // first tick completes immediately

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = poll.tick(), if !live => {
                if let Err(e) = inventory.refresh().await {
                    tracing::warn!(error = %e, "poll refresh failed, keeping stale view");
                }
            }
            snapshot = sub.changed() => {
                let Some(snapshot) = snapshot else { break };
                render_view(&snapshot, global);
            }
            changed = state.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = state.borrow_and_update().clone();
                report_state(&current, global.quiet);
            }
        }
    }

    inventory.shutdown().await;
    Ok(())
}

// ── Rendering helpers ───────────────────────────────────────────────

fn render_view(products: &[Arc<Product>], global: &GlobalOpts) {
    let out = output::render_list(
        &global.output,
        products,
        |p| ProductRow::from(p.as_ref()),
        |p| p.id.to_string(),
    );
    output::print_output(&out, global.quiet);
}

fn report_state(state: &ChannelState, quiet: bool) {
    if quiet {
        return;
    }
    match state {
        ChannelState::Connecting => eprintln!("{}", "… connecting".dimmed()),
        ChannelState::Connected => eprintln!("{}", "● live".green()),
        ChannelState::Disconnected { reason } => {
            let note = reason.as_deref().unwrap_or("closed");
            eprintln!("{} ({note})", "○ disconnected".red());
        }
    }
}
