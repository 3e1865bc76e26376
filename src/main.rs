//! Eassy Checkout CLI

use std::{io, process, sync::Arc};

use eassy_checkout::{
    api::HttpCheckoutApi,
    cart::{state::CartState, store::CartStore},
    checkout::CheckoutService,
    config::{CartArgs, Cli, Command, QuoteArgs},
    fixtures, logging,
    payments::calculator::calculate,
    receipt::{CANCELLATION_POLICY, write_breakdown},
};
use tracing::{info, warn};

#[tokio::main]
pub async fn main() {
    let cli = Cli::load().unwrap_or_else(|error| error.exit());

    if let Err(error) = logging::init_subscriber(&cli.logging) {
        #[expect(
            clippy::print_stderr,
            reason = "logging failed to initialise, must use eprintln"
        )]
        {
            eprintln!("Logging error: {error}");
        }

        process::exit(1);
    }

    if let Err(error) = run(cli.command).await {
        #[expect(
            clippy::print_stderr,
            reason = "command errors are reported to the terminal user"
        )]
        {
            eprintln!("{error}");
        }

        process::exit(1);
    }
}

async fn run(command: Command) -> Result<(), String> {
    match command {
        Command::Quote(args) => quote(&args),
        Command::Cart(args) => cart(args).await,
    }
}

fn quote(args: &QuoteArgs) -> Result<(), String> {
    let state = fixtures::load_snapshot(&args.snapshot).map_err(|error| error.to_string())?;

    info!(snapshot = %args.snapshot.display(), "pricing cart snapshot");

    print(&state, args.json, false)
}

async fn cart(args: CartArgs) -> Result<(), String> {
    let api = HttpCheckoutApi::new(args.api)
        .map_err(|error| format!("failed to build HTTP client: {error}"))?;
    let service = CheckoutService::new(Arc::new(api));
    let mut store = CartStore::new(args.flags);

    service
        .refresh_cart(&mut store)
        .await
        .map_err(|error| error.user_message())?;

    if let Err(error) = service.load_offers(&mut store).await {
        warn!(%error, "offers unavailable, pricing without them");
    }

    let state = store.snapshot();

    info!(status = %state.status, "cart loaded");

    print(&state, args.json, store.flags().cancellation_policy_visible)
}

fn print(state: &CartState, json: bool, cancellation_policy: bool) -> Result<(), String> {
    let amounts = calculate(state);
    let mut out = io::stdout().lock();

    if json {
        serde_json::to_writer_pretty(&mut out, &amounts).map_err(|error| error.to_string())?;

        io::Write::write_all(&mut out, b"\n").map_err(|error| error.to_string())
    } else {
        write_breakdown(&mut out, state, &amounts).map_err(|error| error.to_string())?;

        if cancellation_policy {
            io::Write::write_all(&mut out, format!("{CANCELLATION_POLICY}\n").as_bytes())
                .map_err(|error| error.to_string())?;
        }

        Ok(())
    }
}
