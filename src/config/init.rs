// ABOUTME: Config scaffolding for new projects.
// ABOUTME: Creates skiff.yml template files.

use std::path::Path;

use super::CONFIG_FILENAME;
use super::address::Address;
use super::error::ConfigError;

const TEMPLATE_HOST: &str = "deploy@server.example.com";

pub fn init_config(dir: &Path, host: Option<&str>, force: bool) -> Result<(), ConfigError> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !force {
        return Err(ConfigError::AlreadyExists(config_path));
    }

    let host = host.unwrap_or(TEMPLATE_HOST);
    let address = Address::parse(host).map_err(ConfigError::InvalidConfig)?;

    std::fs::write(&config_path, generate_template_yaml(&address))?;
    Ok(())
}

fn generate_template_yaml(address: &Address) -> String {
    format!(
        r#"target:
  host: {}
  # Credentials are offered in this order: password, key_file, private_key, agent
  key_file: ~/.ssh/id_ed25519
  # password: {{ env: SKIFF_PASSWORD }}
  # agent_socket: {{ env: SSH_AUTH_SOCK }}
  timeout: 10s
  # Host key verification (default: known_hosts with trust on first use)
  # host_key: {{ mode: fingerprints, fingerprints: ["SHA256:..."] }}

# Reach the target through a jump host
# proxy:
#   host: bastion.example.com
#   agent_socket: {{ env: SSH_AUTH_SOCK }}

# destinations:
#   staging:
#     target: staging.internal
"#,
        address
    )
}
