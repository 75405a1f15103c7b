//! Kasir console entry point.
//!
//! All logic lives in the library so it can be tested with a scripted
//! terminal; this just starts the runtime.

#[tokio::main]
async fn main() {
    if let Err(e) = kasir_console::run().await {
        eprintln!("kasir-console: {}", e);
        std::process::exit(1);
    }
}
