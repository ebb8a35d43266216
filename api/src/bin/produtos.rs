use domain::Product;
use tracing::error;

const DEFAULT_PORT: u16 = 3001;

// Product catalog entry point
#[tokio::main]
async fn main() {
    if let Err(e) = api::startup::run::<Product>(DEFAULT_PORT).await {
        error!("Product catalog stopped: {}", e);
        std::process::exit(1);
    }
}
