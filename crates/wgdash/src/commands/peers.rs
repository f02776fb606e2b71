//! Peer command handlers.

use tabled::Tabled;
use wgdash_core::{Dashboard, PageRequest, Peer, PeerQuery};

use crate::cli::{GlobalOpts, PeersArgs, PeersCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
pub(crate) struct PeerRow {
    #[tabled(rename = "Public Key")]
    public_key: String,
    #[tabled(rename = "Allowed IPs")]
    allowed_ips: String,
    #[tabled(rename = "Endpoint")]
    endpoint: String,
    #[tabled(rename = "Handshake")]
    handshake: String,
    #[tabled(rename = "RX")]
    rx: String,
    #[tabled(rename = "TX")]
    tx: String,
}

impl From<&Peer> for PeerRow {
    fn from(p: &Peer) -> Self {
        Self {
            public_key: p.public_key.clone(),
            allowed_ips: output::join_or_dash(&p.allowed_ips),
            endpoint: p.endpoint.clone().unwrap_or_else(|| "-".into()),
            handshake: output::format_handshake(p.last_handshake()),
            rx: output::format_bytes(p.receive_bytes),
            tx: output::format_bytes(p.transmit_bytes),
        }
    }
}

fn detail(p: &Peer) -> String {
    let mut lines = vec![
        format!("Public key:  {}", p.public_key),
        format!("URL key:     {}", p.url_key()),
        format!("Allowed IPs: {}", output::join_or_dash(&p.allowed_ips)),
        format!("Endpoint:    {}", p.endpoint.as_deref().unwrap_or("-")),
        format!("Handshake:   {}", output::format_handshake(p.last_handshake())),
        format!("RX:          {}", output::format_bytes(p.receive_bytes)),
        format!("TX:          {}", output::format_bytes(p.transmit_bytes)),
    ];
    if let Some(ref keepalive) = p.persistent_keepalive_interval {
        lines.push(format!("Keepalive:   {keepalive}"));
    }
    if p.preshared_key.is_some() {
        lines.push("Preshared:   ****".into());
    }
    lines.join("\n")
}

pub(crate) fn render_peers(global: &GlobalOpts, peers: &[Peer]) -> String {
    output::render_list(
        &global.output,
        peers,
        |p| PeerRow::from(p),
        |p| p.public_key.clone(),
    )
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    dashboard: &Dashboard,
    args: PeersArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let session = dashboard.session();

    match args.command {
        PeersCommand::List {
            device,
            query,
            sort,
            page,
            per_page,
            all,
        } => {
            let query = PeerQuery {
                page: PageRequest::new(page, per_page),
                q: query,
                sort: sort.as_deref().map(util::parse_sort).transpose()?,
            };

            if all {
                let peers = util::with_spinner(
                    "Fetching peers",
                    dashboard.modal(),
                    global.quiet,
                    session.list_all_peers(&device, &query),
                )
                .await?;
                output::print_output(&render_peers(global, &peers), global.quiet);
                return Ok(());
            }

            let page = util::with_spinner(
                "Fetching peers",
                dashboard.modal(),
                global.quiet,
                session.list_peers(&device, &query),
            )
            .await?;
            output::print_output(&render_peers(global, &page.items), global.quiet);
            if let Some(next) = page.links.next.filter(|_| !global.quiet) {
                eprintln!(
                    "More peers available: --page {} (or --all to fetch everything)",
                    next.page
                );
            }
            Ok(())
        }

        PeersCommand::Get { device, key } => {
            let peer = session.get_peer(&device, &key).await?;
            let out = output::render_single(&global.output, &peer, detail, |p| {
                p.public_key.clone()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        PeersCommand::Create { device, spec } => {
            let body = util::peer_body(spec)?;
            let peer = session.create_peer(&device, &body).await?;
            if !global.quiet {
                eprintln!("Peer added to '{device}'");
            }
            let out = output::render_single(&global.output, &peer, detail, |p| {
                p.public_key.clone()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        PeersCommand::Update { device, key, spec } => {
            let body = util::peer_body(spec)?;
            if body == wgdash_core::PeerCreateOrUpdateRequest::default() {
                return Err(CliError::Validation {
                    field: "update".into(),
                    reason: "no fields to change; pass at least one flag or --from-file".into(),
                });
            }
            let peer = session.update_peer(&device, &key, &body).await?;
            if !global.quiet {
                eprintln!("Peer updated");
            }
            let out = output::render_single(&global.output, &peer, detail, |p| {
                p.public_key.clone()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        PeersCommand::Delete { device, key } => {
            if !util::confirm(
                &format!("Remove peer {key} from {device}?"),
                "peers delete",
                global.yes,
            )? {
                return Ok(());
            }
            session.delete_peer(&device, &key).await?;
            if !global.quiet {
                eprintln!("Peer removed from '{device}'");
            }
            Ok(())
        }
    }
}
