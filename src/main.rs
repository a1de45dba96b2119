// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Cursus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Cursus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::error::Error;
use std::sync::mpsc;

use cursus::config::{ClientConfig, ServerConfig, DEFAULT_HTTP_PORT};
use cursus::logging::{self, LogTarget};
use cursus::model::{demo_program, ElementId, DEMO_ROOT_ID};
use cursus::server::ManagementServer;
use cursus::store::{StateFolder, WriteDurability};
use cursus::tui::BrowserSession;

const DEFAULT_STATE_DIR: &str = ".cursus";

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [--state-dir <dir>] [--http-port <port>] [--root <id>] [--durable-writes]\n  {program} --serve [--http-port <port>]\n  {program} --connect <url> [--state-dir <dir>] [--root <id>] [--durable-writes]\n\nTerminal mode (default) serves the demo program at `http://127.0.0.1:<port>` and browses it.\n--http-port selects the port (0 = ephemeral; default {DEFAULT_HTTP_PORT}).\n--serve only runs the management server until Ctrl-C.\n--connect browses a server that is already running and cannot be combined with --serve or --http-port.\n\n--state-dir holds the tree expansion state and cursus.log (default `{DEFAULT_STATE_DIR}`).\n--durable-writes opts into slower, best-effort durable persistence (fsync/sync where supported).\nSet CURSUS_LOG to change the log filter (default `info`)."
    );
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CliOptions {
    serve: bool,
    connect: Option<String>,
    state_dir: Option<String>,
    http_port: Option<u16>,
    root: Option<String>,
    durable_writes: bool,
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut options = CliOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--serve" => {
                if options.serve {
                    return Err(());
                }
                options.serve = true;
            }
            "--connect" => {
                if options.connect.is_some() {
                    return Err(());
                }
                options.connect = Some(args.next().ok_or(())?);
            }
            "--state-dir" => {
                if options.state_dir.is_some() {
                    return Err(());
                }
                options.state_dir = Some(args.next().ok_or(())?);
            }
            "--http-port" => {
                if options.http_port.is_some() {
                    return Err(());
                }
                let raw = args.next().ok_or(())?;
                let port: u16 = raw.parse().map_err(|_| ())?;
                options.http_port = Some(port);
            }
            "--root" => {
                if options.root.is_some() {
                    return Err(());
                }
                let raw = args.next().ok_or(())?;
                ElementId::new(raw.as_str()).map_err(|_| ())?;
                options.root = Some(raw);
            }
            "--durable-writes" => {
                if options.durable_writes {
                    return Err(());
                }
                options.durable_writes = true;
            }
            _ => return Err(()),
        }
    }

    if options.serve && options.connect.is_some() {
        return Err(());
    }
    if options.connect.is_some() && options.http_port.is_some() {
        return Err(());
    }
    // The server process keeps no browser state.
    if options.serve
        && (options.root.is_some() || options.state_dir.is_some() || options.durable_writes)
    {
        return Err(());
    }

    Ok(options)
}

fn open_state_folder(options: &CliOptions) -> Result<StateFolder, Box<dyn Error>> {
    let dir = options.state_dir.clone().unwrap_or_else(|| DEFAULT_STATE_DIR.to_owned());
    let durability =
        if options.durable_writes { WriteDurability::Durable } else { WriteDurability::BestEffort };
    Ok(StateFolder::open(dir)?.with_durability(durability))
}

fn main() {
    let result = (|| -> Result<(), Box<dyn Error>> {
        let mut args = std::env::args();
        let program = args.next().unwrap_or_else(|| "cursus".to_owned());

        let options = match parse_options(args) {
            Ok(options) => options,
            Err(()) => {
                print_usage(&program);
                std::process::exit(2);
            }
        };

        let http_port = options.http_port.unwrap_or(DEFAULT_HTTP_PORT);
        let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;

        if options.serve {
            logging::init(&LogTarget::Stderr)?;
            let server = ManagementServer::new(demo_program());
            runtime.block_on(async move {
                let running = server.spawn(&ServerConfig::with_port(http_port)).await?;
                eprintln!("cursus: serving on http://{}", running.addr());
                tokio::signal::ctrl_c().await?;
                running.shutdown().await;
                Ok::<(), Box<dyn Error>>(())
            })?;
            return Ok(());
        }

        let folder = open_state_folder(&options)?;
        logging::init(&LogTarget::File(folder.log_path()))?;

        let root_id = match options.root.as_deref() {
            Some(raw) => ElementId::new(raw)?,
            None => ElementId::new(DEMO_ROOT_ID)?,
        };

        let (running, client_config) = match options.connect.as_deref() {
            Some(url) => (None, ClientConfig::new(url)?),
            None => {
                let server = ManagementServer::new(demo_program());
                let running = runtime.block_on(server.spawn(&ServerConfig::with_port(http_port)))?;
                let config = ClientConfig::for_local_port(running.port());
                (Some(running), config)
            }
        };

        let (events_tx, events_rx) = mpsc::channel();
        let management_path = client_config.management_path().to_owned();
        let browser =
            cursus::client::HttpBrowser::new(client_config, runtime.handle().clone(), events_tx)?;
        let session = BrowserSession {
            browser: Box::new(browser),
            events: events_rx,
            store: Box::new(folder),
            root_id,
            management_path,
        };

        let tui_result = runtime.block_on(async move {
            let tui_join = tokio::task::spawn_blocking(move || {
                cursus::tui::run(session).map_err(|err| err.to_string())
            })
            .await;

            if let Some(running) = running {
                running.shutdown().await;
            }
            tui_join
        });

        let tui_result = tui_result.map_err(|err| -> Box<dyn Error> { Box::new(err) })?;
        tui_result.map_err(|err| {
            Box::new(std::io::Error::new(std::io::ErrorKind::Other, err)) as Box<dyn Error>
        })?;
        Ok(())
    })();

    if let Err(err) = result {
        eprintln!("cursus: {err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_options, CliOptions};

    fn args(raw: &[&str]) -> impl Iterator<Item = String> {
        raw.iter().map(|arg| (*arg).to_owned()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn parses_empty_args() {
        let options = parse_options(std::iter::empty()).expect("parse options");
        assert_eq!(options, CliOptions::default());
    }

    #[test]
    fn parses_serve_flag() {
        let options = parse_options(args(&["--serve"])).expect("parse options");
        assert!(options.serve);
        assert!(options.connect.is_none());
        assert_eq!(options.http_port, None);
    }

    #[test]
    fn parses_serve_with_port() {
        let options = parse_options(args(&["--serve", "--http-port", "0"])).expect("parse options");
        assert!(options.serve);
        assert_eq!(options.http_port, Some(0));
    }

    #[test]
    fn parses_connect_url() {
        let options = parse_options(args(&["--connect", "http://localhost:8000", "--root", "7"]))
            .expect("parse options");
        assert_eq!(options.connect.as_deref(), Some("http://localhost:8000"));
        assert_eq!(options.root.as_deref(), Some("7"));
        assert!(!options.serve);
    }

    #[test]
    fn parses_state_dir_and_durable_writes() {
        let options = parse_options(args(&["--durable-writes", "--state-dir", "some/dir"]))
            .expect("parse options");
        assert_eq!(options.state_dir.as_deref(), Some("some/dir"));
        assert!(options.durable_writes);
    }

    #[test]
    fn rejects_serve_with_connect() {
        parse_options(args(&["--serve", "--connect", "http://localhost:8000"])).unwrap_err();
    }

    #[test]
    fn rejects_http_port_with_connect() {
        parse_options(args(&["--connect", "http://localhost:8000", "--http-port", "1234"]))
            .unwrap_err();
    }

    #[test]
    fn rejects_browser_options_with_serve() {
        parse_options(args(&["--serve", "--root", "1"])).unwrap_err();
        parse_options(args(&["--serve", "--state-dir", "."])).unwrap_err();
        parse_options(args(&["--serve", "--durable-writes"])).unwrap_err();
    }

    #[test]
    fn rejects_invalid_values() {
        parse_options(args(&["--http-port", "70000"])).unwrap_err();
        parse_options(args(&["--root", ""])).unwrap_err();
        parse_options(args(&["--root", "1/2"])).unwrap_err();
    }

    #[test]
    fn rejects_unknown_args() {
        parse_options(args(&["--nope"])).unwrap_err();
        parse_options(args(&["positional"])).unwrap_err();
    }

    #[test]
    fn rejects_duplicate_flags() {
        parse_options(args(&["--serve", "--serve"])).unwrap_err();
        parse_options(args(&["--state-dir", ".", "--state-dir", "other"])).unwrap_err();
        parse_options(args(&["--http-port", "1", "--http-port", "2"])).unwrap_err();
    }

    #[test]
    fn rejects_missing_values() {
        parse_options(args(&["--connect"])).unwrap_err();
        parse_options(args(&["--root"])).unwrap_err();
    }
}
