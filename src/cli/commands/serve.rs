//! Web server command.

use console::style;

use crate::config::Settings;

/// Start the web server.
pub async fn cmd_serve(settings: &Settings, bind: Option<&str>) -> anyhow::Result<()> {
    let mut settings = settings.clone();
    if let Some(bind) = bind {
        let (host, port) = parse_bind_address(bind, settings.port)?;
        settings.host = host;
        settings.port = port;
    }

    println!(
        "{} Mirroring {}",
        style("→").cyan(),
        style(&settings.base_url).bold()
    );
    println!(
        "{} Starting server at http://{}:{}",
        style("→").cyan(),
        settings.host,
        settings.port
    );
    println!("  Press Ctrl+C to stop");

    crate::server::serve(&settings).await
}

/// Parse a bind address that can be:
/// - Just a port: "3030" -> 127.0.0.1:3030
/// - Just a host: "0.0.0.0" -> 0.0.0.0:<default_port>
/// - Host and port: "0.0.0.0:3030" -> 0.0.0.0:3030
fn parse_bind_address(bind: &str, default_port: u16) -> anyhow::Result<(String, u16)> {
    if let Ok(port) = bind.parse::<u16>() {
        if port == 0 {
            anyhow::bail!("Port must be between 1 and 65535");
        }
        return Ok((crate::config::DEFAULT_HOST.to_string(), port));
    }

    if let Some((host, port_str)) = bind.rsplit_once(':') {
        if let Ok(port) = port_str.parse::<u16>() {
            if port == 0 {
                anyhow::bail!("Port must be between 1 and 65535");
            }
            return Ok((host.to_string(), port));
        }
    }

    Ok((bind.to_string(), default_port))
}
