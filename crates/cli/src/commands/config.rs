//! Configuration management commands.

use anyhow::Result;
use clap::Subcommand;
use stripe_config::{ConfigStore, Profile};

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Set a configuration field for the current profile
    Set {
        /// Field name (e.g. device_name)
        field: String,
        /// Value to store
        value: String,
    },

    /// Remove a configuration field from the current profile
    Unset {
        /// Field name to remove
        field: String,
    },

    /// Print all configuration fields for the current profile
    List,
}

pub fn run(profile: &Profile, store: &mut ConfigStore, command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Set { field, value } => {
            profile.write_config_field(store, &field, &value)?;
            println!("Set '{}' for profile '{}'.", field, profile.profile_name);
        }
        ConfigCommand::Unset { field } => {
            profile.delete_config_field(store, &field)?;
            println!("Removed '{}' from profile '{}'.", field, profile.profile_name);
        }
        ConfigCommand::List => {
            run_list(profile, store);
        }
    }

    Ok(())
}

fn run_list(profile: &Profile, store: &ConfigStore) {
    let prefix = format!("{}.", profile.profile_name);
    let mut empty = true;
    for (key, value) in store.iter() {
        if let Some(field) = key.strip_prefix(&prefix) {
            println!("{} = {}", field, value);
            empty = false;
        }
    }
    if empty {
        println!(
            "No configuration for profile '{}'. Use 'stripe config set <field> <value>' to add one.",
            profile.profile_name
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store_in(dir: &tempfile::TempDir) -> ConfigStore {
        ConfigStore::load(dir.path().join("config.toml")).unwrap()
    }

    #[test]
    fn test_set_persists_namespaced_field() {
        let dir = tempdir().unwrap();
        let mut store = store_in(&dir);
        let profile = Profile::new("default");

        run(
            &profile,
            &mut store,
            ConfigCommand::Set {
                field: "device_name".to_string(),
                value: "my-device".to_string(),
            },
        )
        .unwrap();

        let reloaded = store_in(&dir);
        assert_eq!(reloaded.get("default.device_name"), Some("my-device"));
    }

    #[test]
    fn test_unset_removes_field_and_errors_when_missing() {
        let dir = tempdir().unwrap();
        let mut store = store_in(&dir);
        let profile = Profile::new("default");

        store.set("default.device_name", "my-device");
        run(
            &profile,
            &mut store,
            ConfigCommand::Unset {
                field: "device_name".to_string(),
            },
        )
        .unwrap();
        assert!(!store.contains("default.device_name"));

        let err = run(
            &profile,
            &mut store,
            ConfigCommand::Unset {
                field: "device_name".to_string(),
            },
        );
        assert!(err.is_err());
    }
}
