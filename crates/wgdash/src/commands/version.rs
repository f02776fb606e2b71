//! `wgdash version`: client, server and WireGuard versions.

use serde::Serialize;
use wgdash_core::{Dashboard, VersionInfo};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct Versions {
    wgdash: &'static str,
    #[serde(flatten)]
    server: VersionInfo,
}

fn detail(v: &Versions) -> String {
    [
        format!("wgdash:    {}", v.wgdash),
        format!("wgrest:    {}", v.server.wgrest),
        format!(
            "wireguard: {}",
            if v.server.wireguard.is_empty() {
                "-"
            } else {
                &v.server.wireguard
            }
        ),
    ]
    .join("\n")
}

pub async fn handle(dashboard: &Dashboard, global: &GlobalOpts) -> Result<(), CliError> {
    let server = dashboard.session().version().await?;
    let versions = Versions {
        wgdash: env!("CARGO_PKG_VERSION"),
        server,
    };
    let out = output::render_single(&global.output, &versions, detail, |v| {
        v.server.wgrest.clone()
    });
    output::print_output(&out, global.quiet);
    Ok(())
}
