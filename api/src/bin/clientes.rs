use domain::Customer;
use tracing::error;

const DEFAULT_PORT: u16 = 3002;

// Customer registry entry point
#[tokio::main]
async fn main() {
    if let Err(e) = api::startup::run::<Customer>(DEFAULT_PORT).await {
        error!("Customer registry stopped: {}", e);
        std::process::exit(1);
    }
}
