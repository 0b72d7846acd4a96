//! vAMM Core Simulation.
//!
//! Walks a pool through its lifecycle: creation, swaps across blocks, the
//! fluctuation guard, TWAP queries, governance edits with their costs, and a
//! genesis export/import.
//!
//! Usage: `vamm-sim [config.json]`. Without a file the preset named by
//! `VAMM_ENV` (development, testnet, mainnet) is used.

use rust_decimal_macros::dec;
use std::error::Error;
use std::time::Duration;
use vamm_core::*;

type SimResult = Result<(), Box<dyn Error>>;

// one block every 5 seconds
const BLOCK_MS: i64 = 5_000;

fn main() -> SimResult {
    let config = load_config()?;
    logging::init_logging(&config.logging);

    println!("vAMM Core Engine Simulation");
    println!("Constant Product Pools, Peg Multiplier, Block Snapshots\n");

    scenario_1_pool_creation(&config)?;
    scenario_2_swaps_and_bias(&config)?;
    scenario_3_fluctuation_guard(&config)?;
    scenario_4_twap(&config)?;
    scenario_5_governance_edits(&config)?;
    scenario_6_genesis_round_trip(&config)?;

    println!("\nAll simulations completed successfully.");
    Ok(())
}

fn load_config() -> Result<AppConfig, ConfigError> {
    if let Some(path) = std::env::args().nth(1) {
        return AppConfig::load(path);
    }
    let env = match std::env::var("VAMM_ENV") {
        Ok(name) => name.parse()?,
        Err(_) => Environment::Development,
    };
    let config = env.config();
    config.validate()?;
    Ok(config)
}

fn btc() -> Result<Pair, PairError> {
    Pair::new("ubtc", "unusd")
}

fn new_engine(config: &AppConfig, index_price: Dec) -> Result<Engine<MemStore, MockOracle>, PairError> {
    let oracle = MockOracle::new().with_price(btc()?, index_price);
    let mut engine = Engine::new(config.engine.clone(), MemStore::new(), oracle);
    engine.set_block(1, Timestamp::now());
    Ok(engine)
}

/// A pool seeded with equal reserves, priced through the peg.
fn scenario_1_pool_creation(config: &AppConfig) -> SimResult {
    println!("Scenario 1: Pool Creation\n");

    let mut engine = new_engine(config, Dec::from_int(40_000))?;
    engine.create_pool(
        btc()?,
        Dec::from_int(10_000_000),
        Dec::from_int(10_000_000),
        config.default_market.clone(),
        Dec::from_int(40_000),
    )?;

    let pool = engine.get_pool(&btc()?)?;
    println!("  Pool: {pool}");
    println!("  Mark price: {}", engine.get_mark_price(&btc()?)?);

    let prices = engine.get_pool_prices(&btc()?)?;
    println!("  Index price: {:?}, swap invariant: {}\n", prices.index_price, prices.swap_invariant);

    if let Err(err) = engine.create_pool(btc()?, Dec::ONE, Dec::from_int(2), MarketConfig::default(), Dec::ONE) {
        println!("  Unequal seeding rejected: {err}\n");
    }
    Ok(())
}

/// Longs and shorts moving reserves and the pool's net bias.
fn scenario_2_swaps_and_bias(config: &AppConfig) -> SimResult {
    println!("Scenario 2: Swaps and Bias\n");

    let mut engine = new_engine(config, Dec::ONE)?;
    engine.create_pool(
        btc()?,
        Dec::from_int(1_000_000),
        Dec::from_int(1_000_000),
        config.default_market.clone(),
        Dec::ONE,
    )?;
    engine.advance_block(BLOCK_MS);

    let long = engine.swap_quote_for_base(&btc()?, Direction::Long, Dec::from_int(10_000), Dec::ZERO, false)?;
    println!("  Long 10,000 quote -> {} base, mark {}", long.amount, long.market.get_mark_price());

    let short = engine.swap_base_for_quote(&btc()?, Direction::Long, Dec::from_int(2_000), Dec::ZERO, false)?;
    println!("  Sell 2,000 base -> {} quote, mark {}", short.amount, short.market.get_mark_price());
    println!("  Net bias: {}\n", short.market.bias);

    let limited = engine.swap_quote_for_base(&btc()?, Direction::Long, Dec::from_int(1_000), Dec::from_int(5_000), false);
    if let Err(err) = limited {
        println!("  Slippage guard: {err}\n");
    }
    Ok(())
}

/// Large single block moves are refused, governance bypasses the guard.
fn scenario_3_fluctuation_guard(config: &AppConfig) -> SimResult {
    println!("Scenario 3: Fluctuation Guard\n");

    let mut engine = new_engine(config, Dec::ONE)?;
    let market_config = config.default_market.with_trade_limit_ratio(Dec::ONE);
    engine.create_pool(btc()?, Dec::from_int(1_000), Dec::from_int(1_000), market_config, Dec::ONE)?;
    engine.advance_block(BLOCK_MS);

    match engine.swap_quote_for_base(&btc()?, Direction::Long, Dec::from_int(500), Dec::ZERO, false) {
        Ok(outcome) => println!("  Swap accepted, mark {}", outcome.market.get_mark_price()),
        Err(err) => println!("  Swap refused: {err}"),
    }

    let outcome = engine.swap_quote_for_base(&btc()?, Direction::Long, Dec::from_int(500), Dec::ZERO, true)?;
    println!("  Same swap with the check skipped, mark {}", outcome.market.get_mark_price());
    println!("  Over spread limit: {}\n", engine.is_over_spread_limit(&btc()?)?);
    Ok(())
}

/// TWAP over several blocks of trading.
fn scenario_4_twap(config: &AppConfig) -> SimResult {
    println!("Scenario 4: TWAP\n");

    let mut engine = new_engine(config, Dec::ONE)?;
    engine.create_pool(
        btc()?,
        Dec::from_int(1_000_000),
        Dec::from_int(1_000_000),
        config.default_market.clone(),
        Dec::ONE,
    )?;
    engine.end_blocker();

    for block in 0..6 {
        engine.advance_block(BLOCK_MS);
        let direction = if block % 2 == 0 { Direction::Long } else { Direction::Short };
        engine.swap_quote_for_base(&btc()?, direction, Dec::from_int(10_000), Dec::ZERO, false)?;
        engine.end_blocker();
        println!(
            "  Block {}: mark {}",
            engine.block().height,
            engine.get_mark_price(&btc()?)?
        );
    }

    let lookback = Duration::from_millis(20_000);
    println!("\n  Mark TWAP (20s): {}", engine.get_mark_price_twap(&btc()?, lookback)?);
    println!(
        "  Base asset TWAP for 100 base: {}",
        engine.get_base_asset_twap(&btc()?, Direction::Short, Dec::from_int(100), lookback)?
    );
    println!(
        "  Quote asset TWAP for 100 quote: {}\n",
        engine.get_quote_asset_twap(&btc()?, Direction::Long, Dec::from_int(100), lookback)?
    );
    Ok(())
}

/// Peg and depth edits with the quote cost they carry.
fn scenario_5_governance_edits(config: &AppConfig) -> SimResult {
    println!("Scenario 5: Governance Edits\n");

    let mut engine = new_engine(config, Dec::ONE)?;
    engine.create_pool(
        btc()?,
        Dec::from_int(1_000_000),
        Dec::from_int(1_000_000),
        config.default_market.clone(),
        Dec::ONE,
    )?;
    engine.advance_block(BLOCK_MS);
    engine.swap_quote_for_base(&btc()?, Direction::Long, Dec::from_int(20_000), Dec::ZERO, false)?;

    let repeg = engine.edit_pool_peg_multiplier(&btc()?, Dec::from(dec!(1.02)))?;
    println!("  Repeg to 1.02 costs {} ({:?})", repeg.cost, repeg.flow);

    let depth = engine.edit_swap_invariant(&btc()?, Dec::from_int(4))?;
    let pool = engine.get_pool(&btc()?)?;
    println!("  Invariant x4 costs {} ({:?}), depth now {}", depth.cost, depth.flow, pool.sqrt_depth);

    let stricter = pool.config.with_max_oracle_spread_ratio(Dec::from(dec!(0.01)));
    engine.edit_pool_config(&btc()?, stricter)?;
    println!(
        "  Spread ratio now {}, max leverage {}\n",
        engine.get_pool(&btc()?)?.config.max_oracle_spread_ratio,
        engine.get_max_leverage(&btc()?)?
    );
    Ok(())
}

/// Export the state and rebuild it in a fresh engine.
fn scenario_6_genesis_round_trip(config: &AppConfig) -> SimResult {
    println!("Scenario 6: Genesis Round Trip\n");

    let mut engine = new_engine(config, Dec::ONE)?;
    for base in ["ubtc", "ueth", "uatom"] {
        engine.create_pool(
            Pair::new(base, "unusd")?,
            Dec::from_int(500_000),
            Dec::from_int(500_000),
            config.default_market.clone(),
            Dec::ONE,
        )?;
    }
    engine.advance_block(BLOCK_MS);
    engine.end_blocker();

    let state = engine.export_genesis();
    let json = serde_json::to_string(&state)?;
    println!("  Exported {} markets, {} snapshots, {} bytes", state.markets.len(), state.snapshots.len(), json.len());

    let imported: GenesisState = serde_json::from_str(&json)?;
    let mut restored = new_engine(config, Dec::ONE)?;
    restored.init_genesis(imported)?;
    println!("  Restored pools match: {}", restored.get_all_pools() == engine.get_all_pools());
    Ok(())
}
