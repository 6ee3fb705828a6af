//! Demo entry point (native).
//!
//! Runs a click/key script against the demo page and prints what each step
//! did. Pass a JSON script path to replace the built-in one.

#[cfg(feature = "native")]
fn main() {
    env_logger::init();
    log::info!("Starting DialogKit demo");

    let script = match std::env::args().nth(1) {
        Some(path) => match std::fs::read_to_string(&path) {
            Ok(script) => script,
            Err(err) => {
                log::error!("Failed to read {}: {}", path, err);
                std::process::exit(1);
            }
        },
        None => dialogkit_app::DEFAULT_SCRIPT.to_string(),
    };

    if let Err(err) = run(&script) {
        log::error!("{}", err);
        std::process::exit(1);
    }
}

#[cfg(feature = "native")]
fn run(script: &str) -> Result<(), dialogkit_app::DemoError> {
    let steps = dialogkit_app::parse_script(script)?;
    let mut page = dialogkit_app::DemoPage::build()?;

    println!("\n=== Dialog demo ===");
    for report in page.run_script(&steps)? {
        println!("  {}", report);
    }
    println!();
    Ok(())
}

#[cfg(not(feature = "native"))]
fn main() {
    panic!("Native feature not enabled. Use `cargo run --features native`");
}
