//! Device command handlers.

use std::sync::Arc;

use tabled::Tabled;
use wgdash_core::{Dashboard, Device, InterfaceStatus};

use crate::cli::{DevicesArgs, DevicesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
pub(crate) struct DeviceRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Port")]
    port: u16,
    #[tabled(rename = "Addresses")]
    addresses: String,
    #[tabled(rename = "Peers")]
    peers: u32,
    #[tabled(rename = "Running")]
    running: String,
    #[tabled(rename = "RX")]
    rx: String,
    #[tabled(rename = "TX")]
    tx: String,
}

impl From<&Device> for DeviceRow {
    fn from(d: &Device) -> Self {
        Self {
            name: d.name.clone(),
            port: d.listen_port,
            addresses: output::join_or_dash(&d.addresses),
            peers: d.peers_count,
            running: if d.running { "yes" } else { "no" }.into(),
            rx: output::format_bytes(d.total_receive_bytes),
            tx: output::format_bytes(d.total_transmit_bytes),
        }
    }
}

pub(crate) fn detail(d: &Device) -> String {
    let mut lines = vec![
        format!("Name:       {}", d.name),
        format!("Running:    {}", if d.running { "yes" } else { "no" }),
        format!("Port:       {}", d.listen_port),
        format!("Public key: {}", d.public_key),
        format!("Addresses:  {}", output::join_or_dash(&d.addresses)),
        format!("Peers:      {}", d.peers_count),
        format!("RX:         {}", output::format_bytes(d.total_receive_bytes)),
        format!("TX:         {}", output::format_bytes(d.total_transmit_bytes)),
    ];
    if d.firewall_mark != 0 {
        lines.push(format!("FwMark:     {}", d.firewall_mark));
    }
    if !d.dns.is_empty() {
        lines.push(format!("DNS:        {}", d.dns.join(", ")));
    }
    if let Some(mtu) = d.mtu {
        lines.push(format!("MTU:        {mtu}"));
    }
    if let Some(ref table) = d.table {
        lines.push(format!("Table:      {table}"));
    }
    lines.join("\n")
}

fn status_line(s: &InterfaceStatus) -> String {
    format!("{}: {}", s.interface, s.status)
}

// ── Handler ─────────────────────────────────────────────────────────

#[allow(clippy::too_many_lines)]
pub async fn handle(
    dashboard: &Dashboard,
    args: DevicesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let session = dashboard.session();
    let store = dashboard.devices();

    match args.command {
        DevicesCommand::List { all: true } => {
            let devices = util::with_spinner(
                "Fetching devices",
                dashboard.modal(),
                global.quiet,
                session.list_all_devices(),
            )
            .await?;
            let out = output::render_list(
                &global.output,
                &devices,
                |d| DeviceRow::from(d),
                |d| d.name.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DevicesCommand::List { all: false } => {
            util::with_spinner(
                "Fetching devices",
                dashboard.modal(),
                global.quiet,
                store.get_devices_list(session),
            )
            .await?;
            let snap = store.devices();
            let out = output::render_list(
                &global.output,
                snap.as_slice(),
                |d: &Arc<Device>| DeviceRow::from(d.as_ref()),
                |d| d.name.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DevicesCommand::Get { name } => {
            let device = store.refresh_device(session, &name).await?;
            let out = output::render_single(&global.output, &*device, detail, |d| {
                d.name.clone()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DevicesCommand::Create { name, spec } => {
            let body = util::device_body(Some(name), spec)?;
            let device = session.create_device(&body).await?;
            let out = output::render_single(&global.output, &device, detail, |d| d.name.clone());
            if !global.quiet {
                eprintln!("Device '{}' created", device.name);
            }
            store.upsert(device);
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DevicesCommand::Update { name, spec } => {
            let body = util::device_body(None, spec)?;
            if body == wgdash_core::DeviceCreateOrUpdateRequest::default() {
                return Err(CliError::Validation {
                    field: "update".into(),
                    reason: "no fields to change; pass at least one flag or --from-file".into(),
                });
            }
            let device = session.update_device(&name, &body).await?;
            let out = output::render_single(&global.output, &device, detail, |d| d.name.clone());
            if !global.quiet {
                eprintln!("Device '{}' updated", device.name);
            }
            store.upsert(device);
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DevicesCommand::Delete { name } => {
            if !util::confirm(&format!("Delete device {name}?"), "devices delete", global.yes)? {
                return Ok(());
            }
            session.delete_device(&name).await?;
            store.remove(&name);
            if !global.quiet {
                eprintln!("Device '{name}' deleted");
            }
            Ok(())
        }

        DevicesCommand::Up { name } => {
            let status = session.device_up(&name).await?;
            let out = output::render_single(&global.output, &status, status_line, |s| {
                s.status.clone()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DevicesCommand::Down { name } => {
            let status = session.device_down(&name).await?;
            let out = output::render_single(&global.output, &status, status_line, |s| {
                s.status.clone()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
