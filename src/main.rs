//! # Ambient Scan Demo Entry Point
//!
//! Calls into the library's `run()` function, which sets up logging and walks an
//! observer through a generated world while the scanners run.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=debug cargo run --release -- [config.json]
//! ```

fn main() {
    if let Err(err) = ambient_scan::run() {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}
