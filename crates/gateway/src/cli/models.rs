//! `voicechat models`: print the model catalog.

use anyhow::Context;

use vc_domain::config::Config;
use vc_providers::ModelSelector;

pub fn run(config: &Config, coding: bool) -> anyhow::Result<()> {
    let selector = ModelSelector::from_config(&config.models).context("loading model catalog")?;
    let catalog = selector.catalog();

    if coding {
        for (task_type, info) in catalog.coding_models() {
            println!("{task_type} ({}, {})", info.model_key, info.size);
            println!("    {}", info.description);
            if !info.strengths.is_empty() {
                println!("    strengths: {}", info.strengths.join(", "));
            }
        }
        return Ok(());
    }

    let default = catalog.default_task_type();
    for d in catalog.iter() {
        let marker = if d.task_type == default { "*" } else { " " };
        println!("{marker} {:<14} {:<40} {}", d.task_type, d.model_id, d.display_name);
        for alias in selector.aliases().aliases_for(&d.task_type) {
            println!("    alias: {alias}");
        }
    }
    Ok(())
}
