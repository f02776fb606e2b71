//! `wgdash open <path>`: render one dashboard view.

use std::sync::Arc;

use wgdash_core::{Dashboard, Device, ViewData};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::devices::{self, DeviceRow};
use super::{peers, util};

fn device_table(devices: &[Arc<Device>]) -> String {
    let rows: Vec<DeviceRow> = devices.iter().map(|d| DeviceRow::from(d.as_ref())).collect();
    output::render_table(&rows)
}

pub async fn handle(
    dashboard: &mut Dashboard,
    path: &str,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let modal = Arc::clone(dashboard.modal());
    let screen = util::with_spinner(
        &format!("Loading {path}"),
        &modal,
        global.quiet,
        dashboard.open(path),
    )
    .await?;

    tracing::debug!(
        resolved = %screen.navigation.resolved.path,
        view = %screen.navigation.resolved.view,
        "view loaded"
    );

    let out = match &screen.data {
        ViewData::NotFound { .. } => {
            return Err(CliError::NotFound {
                resource_type: "view".into(),
                identifier: path.into(),
                list_command: "open /devices".into(),
            });
        }
        // Detail pages combine two tables; structured formats get the whole view.
        ViewData::DeviceDetail {
            device,
            peers: list,
        } if matches!(global.output, OutputFormat::Table) => format!(
            "{}\n\n{}",
            devices::detail(device),
            peers::render_peers(global, list)
        ),
        data => output::render_single(
            &global.output,
            data,
            |data| match data {
                ViewData::DeviceList { devices } => device_table(devices),
                ViewData::DeviceDetail { device, .. } => devices::detail(device),
                ViewData::NotFound { path } => path.clone(),
            },
            |data| match data {
                ViewData::DeviceList { devices } => devices
                    .iter()
                    .map(|d| d.name.clone())
                    .collect::<Vec<_>>()
                    .join("\n"),
                ViewData::DeviceDetail { peers, .. } => peers
                    .iter()
                    .map(|p| p.public_key.clone())
                    .collect::<Vec<_>>()
                    .join("\n"),
                ViewData::NotFound { path } => path.clone(),
            },
        ),
    };

    output::print_output(&out, global.quiet);
    Ok(())
}
