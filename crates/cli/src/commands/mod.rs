pub mod config_cmd;
pub mod pack;
pub mod usage;

use ctxpack_config::AppConfig;
use ctxpack_telemetry::{ModelPricing, PricingTable};

/// Default pricing with the config's custom entries layered on top.
pub fn pricing_table(config: &AppConfig) -> PricingTable {
    let mut table = PricingTable::with_defaults();
    for (model, p) in &config.custom_pricing {
        table.set(model.clone(), ModelPricing::new(p.input_per_m, p.output_per_m));
    }
    table
}

