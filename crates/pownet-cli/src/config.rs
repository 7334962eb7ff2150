//! TOML deserialization of [`SimConfig`] (spec section 6: "a config file
//! ... Parameters").
//!
//! `spin_reserve_factor`/`spin_reserve_mw` are mutually-exclusive config
//! keys on disk that collapse onto the single `SpinRequirement` enum, so
//! this module mirrors the on-disk shape with a separate struct and
//! converts it after parsing rather than teaching `SimConfig` itself about
//! TOML's flat key/value layout.

use anyhow::{bail, Context, Result};
use pownet_core::{DcOpfFormulation, SimConfig, SpinRequirement};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct RawConfig {
    sim_horizon: usize,
    num_sim_days: usize,
    spin_reserve_factor: Option<f64>,
    spin_reserve_mw: Option<f64>,
    #[serde(default = "default_use_spin_var")]
    use_spin_var: bool,
    #[serde(default)]
    use_nondispatch_status_var: bool,
    #[serde(default = "default_dc_opf")]
    dc_opf: DcOpfFormulation,
    #[serde(default)]
    gen_loss_factor: f64,
    #[serde(default)]
    line_loss_factor: f64,
    #[serde(default = "default_line_capacity_factor")]
    line_capacity_factor: f64,
    load_shortfall_penalty_factor: f64,
    load_curtail_penalty_factor: f64,
    spin_shortfall_penalty_factor: f64,
    #[serde(default = "default_curtailment_penalty_scale")]
    curtailment_penalty_scale: f64,
}

fn default_use_spin_var() -> bool {
    true
}

fn default_dc_opf() -> DcOpfFormulation {
    DcOpfFormulation::Kirchhoff
}

fn default_line_capacity_factor() -> f64 {
    1.0
}

fn default_curtailment_penalty_scale() -> f64 {
    1.0
}

pub fn load_sim_config(path: &Path) -> Result<SimConfig> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading config file {}", path.display()))?;
    let raw: RawConfig = toml::from_str(&text).with_context(|| format!("parsing config file {}", path.display()))?;

    let spin_requirement = match (raw.spin_reserve_factor, raw.spin_reserve_mw) {
        (Some(frac), None) => SpinRequirement::FractionOfDemand(frac),
        (None, Some(mw)) => SpinRequirement::AbsoluteMw(mw),
        (None, None) => bail!("config must set exactly one of spin_reserve_factor or spin_reserve_mw"),
        (Some(_), Some(_)) => bail!("config cannot set both spin_reserve_factor and spin_reserve_mw"),
    };

    Ok(SimConfig {
        sim_horizon: raw.sim_horizon,
        num_sim_days: raw.num_sim_days,
        spin_requirement,
        use_spin_var: raw.use_spin_var,
        use_nondispatch_status_var: raw.use_nondispatch_status_var,
        dc_opf: raw.dc_opf,
        gen_loss_factor: raw.gen_loss_factor,
        line_loss_factor: raw.line_loss_factor,
        line_capacity_factor: raw.line_capacity_factor,
        load_shortfall_penalty_factor: raw.load_shortfall_penalty_factor,
        load_curtail_penalty_factor: raw.load_curtail_penalty_factor,
        spin_shortfall_penalty_factor: raw.spin_shortfall_penalty_factor,
        curtailment_penalty_scale: raw.curtailment_penalty_scale,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_both_spin_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
            sim_horizon = 24
            num_sim_days = 365
            spin_reserve_factor = 0.15
            spin_reserve_mw = 500.0
            load_shortfall_penalty_factor = 1000.0
            load_curtail_penalty_factor = 500.0
            spin_shortfall_penalty_factor = 200.0
            "#,
        )
        .unwrap();

        assert!(load_sim_config(&path).is_err());
    }

    #[test]
    fn accepts_fractional_spin_requirement() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
            sim_horizon = 24
            num_sim_days = 365
            spin_reserve_factor = 0.15
            load_shortfall_penalty_factor = 1000.0
            load_curtail_penalty_factor = 500.0
            spin_shortfall_penalty_factor = 200.0
            "#,
        )
        .unwrap();

        let config = load_sim_config(&path).unwrap();
        assert_eq!(config.spin_requirement, SpinRequirement::FractionOfDemand(0.15));
    }
}
