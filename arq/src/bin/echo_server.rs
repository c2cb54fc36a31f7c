use arq::config::Config;
use arq::supervise::Scoped;
use clap::{App, Arg};
use std::net::UdpSocket;

fn main() {
    let matches = App::new("Echo Server")
        .version("1.0")
        .author("Bush Hammer Industries")
        .about("Reflects every payload it receives back to its sender over the ARQ layer.")
        .arg(
            Arg::with_name("BIND")
                .help("Local address to bind, e.g. 0.0.0.0:9000")
                .required(true),
        )
        .arg(
            Arg::with_name("LOG_LEVEL")
                .long("log-level")
                .takes_value(true)
                .help("Log severity (trace, debug, info, warning, error)"),
        )
        .get_matches();

    let bind_addr = matches.value_of("BIND").unwrap();
    let config = Config::default();
    let log_level = matches.value_of("LOG_LEVEL").unwrap_or(&config.log_level);
    let log = flux::logging::init(log_level);

    let socket = UdpSocket::bind(bind_addr).expect("failed to bind socket");
    flux::logging::info!(log, "listening on {}", bind_addr);

    let server_log = log.clone();

    let _supervisor = Scoped::spawn("echo-server", move |stop| {
        let result = arq::server::run_reliable_server(
            socket,
            config,
            server_log.clone(),
            move |peer, iq_rx, oq_tx| {
                flux::logging::info!(server_log, "session started"; "peer" => peer.to_string());
                while let Some(payload) = iq_rx.pull() {
                    let _ = oq_tx.push(payload);
                }
                flux::logging::info!(server_log, "session ended"; "peer" => peer.to_string());
            },
            stop,
        );

        if let Err(err) = result {
            flux::logging::error!(log, "server loop exited"; "error" => err.to_string());
        }
    });

    // Runs until the process is killed; the Scoped supervisor cancels and joins the server
    // loop (and, transitively, every live session) on drop.
    loop {
        std::thread::sleep(std::time::Duration::from_secs(60));
    }
}
