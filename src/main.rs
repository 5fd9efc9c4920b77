//! NIMBO currency inspector
//!
//! Loads the currency parameters (defaults, or a JSON file given as the
//! first argument), initializes the genesis block and prints a summary.
//! With `--genesis-tx` it prints a freshly generated genesis coinbase blob
//! for bootstrapping a new network instead.

use nimbo_core::consensus::MajorVersion;
use nimbo_core::currency::{Currency, CurrencyBuilder};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut print_genesis_tx = false;
    let mut config_path = None;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--genesis-tx" => print_genesis_tx = true,
            _ => config_path = Some(arg),
        }
    }

    let builder = match &config_path {
        Some(path) => CurrencyBuilder::from_json(&std::fs::read_to_string(path)?)?,
        None => CurrencyBuilder::new(),
    };
    let currency = builder.currency()?;

    if print_genesis_tx {
        let tx = currency.generate_genesis_transaction()?;
        println!("{}", hex::encode(tx.to_bytes()));
        return Ok(());
    }

    print_summary(&currency);
    Ok(())
}

fn print_summary(currency: &Currency) {
    let params = currency.params();

    println!("╔══════════════════════════════════════════════════════════╗");
    println!("║                  NIMBO CURRENCY                          ║");
    println!("╚══════════════════════════════════════════════════════════╝");
    println!();

    println!("Genesis Block:");
    println!("  Hash:           {}", currency.genesis_block_hash());
    println!("  Coinbase:       {} bytes", currency.genesis_block().base_transaction.binary_size());
    println!();

    println!("Emission:");
    println!("  Money supply:   {}", currency.format_amount(params.money_supply));
    println!("  Decimal places: {}", params.number_of_decimal_places);
    println!(
        "  Speed factor:   {} (v2 {} from height {})",
        params.emission_speed_factor, params.emission_speed_factor_v2, params.emission_speed_factor_v2_height
    );
    println!("  Minimum fee:    {}", currency.format_amount(params.minimum_fee));
    println!();

    println!("Upgrades:");
    for version in MajorVersion::ALL {
        println!(
            "  {}: after height {:<10} full reward zone {}",
            version,
            currency.upgrade_height(version),
            currency.block_granted_full_reward_zone(version)
        );
    }
    println!();

    println!("Blocks:");
    println!("  Target:         {} s", params.difficulty_target);
    println!("  Initial limit:  {} bytes", currency.max_block_cumulative_size(0));
    println!("  Address prefix: {}", params.public_address_base58_prefix);
}
