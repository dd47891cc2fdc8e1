#![cfg(not(tarpaulin_include))]

use basket::app;

/// Main entry point for the web application
///
/// Initializes logging and runs the web server on the fixed bind address.
///
/// # Returns
/// * `Result<(), Box<dyn std::error::Error>>` - Success or error object
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    app::run().await
}
