//! Shared helpers for command handlers.

use std::future::Future;
use std::io::IsTerminal;
use std::path::Path;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use serde::de::DeserializeOwned;

use wgdash_core::{
    DeviceCreateOrUpdateRequest, ModalStore, PeerCreateOrUpdateRequest, PeerSort, PeerSortField,
};

use crate::cli::{DeviceSpec, PeerSpec};
use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Read and parse a JSON file for `--from-file` flags.
pub fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| CliError::Validation {
        field: "from-file".into(),
        reason: format!("invalid JSON in {}: {e}", path.display()),
    })
}

/// Parse `--sort`, listing the accepted fields on failure.
pub fn parse_sort(raw: &str) -> Result<PeerSort, CliError> {
    raw.parse().map_err(|_| {
        use strum::IntoEnumIterator;
        let fields: Vec<String> = PeerSortField::iter().map(|f| f.to_string()).collect();
        CliError::Validation {
            field: "sort".into(),
            reason: format!("'{raw}' is not one of: {} (prefix '-' to reverse)", fields.join(", ")),
        }
    })
}

fn non_empty(values: Vec<String>) -> Option<Vec<String>> {
    if values.is_empty() { None } else { Some(values) }
}

/// Build a device body from `--from-file` and flags; flags win.
pub fn device_body(
    name: Option<String>,
    spec: DeviceSpec,
) -> Result<DeviceCreateOrUpdateRequest, CliError> {
    let mut body: DeviceCreateOrUpdateRequest = match spec.from_file {
        Some(ref path) => read_json_file(path)?,
        None => DeviceCreateOrUpdateRequest::default(),
    };

    if name.is_some() {
        body.name = name;
    }
    body.listen_port = spec.listen_port.or(body.listen_port);
    body.private_key = spec.private_key.or(body.private_key);
    body.firewall_mark = spec.firewall_mark.or(body.firewall_mark);
    body.addresses = non_empty(spec.addresses).or(body.addresses);
    body.dns = non_empty(spec.dns).or(body.dns);
    body.mtu = spec.mtu.or(body.mtu);
    body.table = spec.table.or(body.table);
    Ok(body)
}

/// Build a peer body from `--from-file` and flags; flags win.
pub fn peer_body(spec: PeerSpec) -> Result<PeerCreateOrUpdateRequest, CliError> {
    let mut body: PeerCreateOrUpdateRequest = match spec.from_file {
        Some(ref path) => read_json_file(path)?,
        None => PeerCreateOrUpdateRequest::default(),
    };

    body.public_key = spec.public_key.or(body.public_key);
    body.private_key = spec.private_key.or(body.private_key);
    body.preshared_key = spec.preshared_key.or(body.preshared_key);
    body.allowed_ips = non_empty(spec.allowed_ips).or(body.allowed_ips);
    body.endpoint = spec.endpoint.or(body.endpoint);
    body.persistent_keepalive_interval = spec.keepalive.or(body.persistent_keepalive_interval);
    Ok(body)
}

/// Run `fut` under a stderr spinner.
///
/// The spinner is cleared as soon as a modal opens so it does not draw
/// over the token prompt.
pub async fn with_spinner<T, F>(message: &str, modal: &ModalStore, quiet: bool, fut: F) -> T
where
    F: Future<Output = T>,
{
    if quiet || !std::io::stderr().is_terminal() {
        return fut.await;
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_owned());
    spinner.enable_steady_tick(Duration::from_millis(100));

    let mut modal_rx = modal.subscribe();
    let watcher = {
        let spinner = spinner.clone();
        tokio::spawn(async move {
            if modal_rx.wait_for(|state| state.modal.is_some()).await.is_ok() {
                spinner.finish_and_clear();
            }
        })
    };

    let result = fut.await;
    watcher.abort();
    spinner.finish_and_clear();
    result
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn empty_device_spec() -> DeviceSpec {
        DeviceSpec {
            listen_port: None,
            private_key: None,
            firewall_mark: None,
            addresses: Vec::new(),
            dns: Vec::new(),
            mtu: None,
            table: None,
            from_file: None,
        }
    }

    #[test]
    fn sort_errors_list_accepted_fields() {
        assert!(parse_sort("-total_bytes").unwrap().descending);
        let err = parse_sort("size").unwrap_err();
        assert!(err.to_string().contains("sort"));
        let CliError::Validation { reason, .. } = err else {
            panic!("expected validation error");
        };
        assert!(reason.contains("last_handshake_time"));
    }

    #[test]
    fn flags_override_file_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path: PathBuf = dir.path().join("wg0.json");
        std::fs::write(&path, r#"{"listen_port": 51820, "mtu": 1420}"#).unwrap();

        let spec = DeviceSpec {
            listen_port: Some(51821),
            from_file: Some(path),
            ..empty_device_spec()
        };
        let body = device_body(Some("wg0".into()), spec).unwrap();

        assert_eq!(body.name.as_deref(), Some("wg0"));
        assert_eq!(body.listen_port, Some(51821));
        assert_eq!(body.mtu, Some(1420));
        assert!(body.addresses.is_none());
    }

    #[test]
    fn update_without_flags_is_empty() {
        let body = device_body(None, empty_device_spec()).unwrap();
        assert_eq!(body, DeviceCreateOrUpdateRequest::default());
    }
}
