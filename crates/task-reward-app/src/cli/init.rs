/*
[INPUT]:  Interactive user input via CLI
[OUTPUT]: Generated YAML configuration file
[POS]:    CLI initialization layer
[UPDATE]: When AppConfig schema changes
*/

use anyhow::{Context, Result};
use console::style;
use dialoguer::{Confirm, Input, theme::ColorfulTheme};
use std::path::PathBuf;

use task_reward_app::AppConfig;
use task_reward_app::config::parse_address;

pub fn run_init(output: PathBuf) -> Result<()> {
    println!("{}", style("Welcome to Task Reward Init").bold().cyan());
    println!(
        "{}",
        style("This will guide you through connecting to a node and a deployed contract.").dim()
    );

    let theme = ColorfulTheme::default();
    let defaults = AppConfig::default();

    println!("\n{}", style("--- Node ---").bold());
    let rpc_url: String = Input::with_theme(&theme)
        .with_prompt("RPC URL")
        .default(defaults.rpc_url.clone())
        .validate_with(|input: &String| -> Result<(), String> {
            url::Url::parse(input)
                .map(|_| ())
                .map_err(|err| err.to_string())
        })
        .interact_text()?;

    println!("\n{}", style("--- Contract ---").bold());
    let contract_address: String = Input::with_theme(&theme)
        .with_prompt("Contract address (leave empty to deploy later)")
        .allow_empty(true)
        .validate_with(validate_optional_address)
        .interact_text()?;

    let account: String = Input::with_theme(&theme)
        .with_prompt("Preferred account (empty = first wallet account)")
        .allow_empty(true)
        .validate_with(validate_optional_address)
        .interact_text()?;

    println!("\n{}", style("--- Polling ---").bold());
    let refresh_interval_secs: u64 = Input::with_theme(&theme)
        .with_prompt("Refresh interval in seconds (0 disables)")
        .default(defaults.refresh_interval_secs)
        .interact_text()?;

    let confirmation_timeout_secs: u64 = Input::with_theme(&theme)
        .with_prompt("Confirmation timeout in seconds")
        .default(defaults.confirmation_timeout_secs)
        .interact_text()?;

    let config = AppConfig {
        rpc_url,
        contract_address: non_empty(contract_address),
        account: non_empty(account),
        refresh_interval_secs,
        confirmation_timeout_secs,
        ..defaults
    };

    if output.exists() {
        let overwrite = Confirm::with_theme(&theme)
            .with_prompt(format!("{} exists. Overwrite?", output.display()))
            .default(false)
            .interact()?;
        if !overwrite {
            println!("{}", style("Aborted; nothing written.").yellow());
            return Ok(());
        }
    }

    let yaml = serde_yaml::to_string(&config).context("failed to serialize config to YAML")?;

    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(&output, yaml)
        .with_context(|| format!("failed to write config to {}", output.display()))?;

    println!("\n{}", style("SUCCESS!").bold().green());
    println!(
        "Configuration written to: {}",
        style(output.display()).cyan()
    );

    Ok(())
}

fn validate_optional_address(input: &String) -> Result<(), String> {
    if input.trim().is_empty() {
        return Ok(());
    }
    parse_address(input)
        .map(|_| ())
        .map_err(|err| err.to_string())
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_address_validation() {
        assert!(validate_optional_address(&String::new()).is_ok());
        assert!(
            validate_optional_address(&"0x5FbDB2315678afecb367f032d93F642f64180aa3".to_string())
                .is_ok()
        );
        assert!(validate_optional_address(&"0x5FbDB2315678afecb367f032d93F642f64180a".to_string()).is_err());
    }

    #[test]
    fn test_generated_yaml_loads_back() {
        let config = AppConfig {
            contract_address: non_empty(" 0x5FbDB2315678afecb367f032d93F642f64180aa3 ".to_string()),
            account: non_empty(String::new()),
            ..AppConfig::default()
        };
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(!yaml.contains("account:"));

        let parsed: AppConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, config);
    }
}
