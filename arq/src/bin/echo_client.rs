use arq::config::Config;
use arq::queue;
use clap::{App, Arg};
use std::io::{self, BufRead, Write};
use std::net::UdpSocket;
use std::thread;
use std::time::Duration;

fn main() {
    let matches = App::new("Echo Client")
        .version("1.0")
        .author("Bush Hammer Industries")
        .about("Sends each line of stdin to an echo server over the ARQ layer and prints the reply.")
        .arg(
            Arg::with_name("SERVER")
                .help("Server address to connect to, e.g. 127.0.0.1:9000")
                .required(true),
        )
        .arg(
            Arg::with_name("LOG_LEVEL")
                .long("log-level")
                .takes_value(true)
                .help("Log severity (trace, debug, info, warning, error)"),
        )
        .get_matches();

    let server_addr = matches.value_of("SERVER").unwrap();
    let config = Config::default();
    let log_level = matches.value_of("LOG_LEVEL").unwrap_or(&config.log_level);
    let log = flux::logging::init(log_level);

    let peer = server_addr
        .parse()
        .expect("SERVER must be a valid socket address");
    let socket = UdpSocket::bind("0.0.0.0:0").expect("failed to bind socket");
    let (iq_tx, iq_rx) = queue::bounded(config.max_pending_packets());
    let (oq_tx, oq_rx) = queue::bounded(config.max_pending_packets());

    let reader_log = log.clone();
    let reader = thread::spawn(move || {
        while let Some(payload) = iq_rx.pull() {
            match String::from_utf8(payload) {
                Ok(line) => println!("{}", line),
                Err(_) => flux::logging::warn!(reader_log, "received non-utf8 reply"),
            }
        }
    });

    let client_log = log.clone();
    let client = thread::spawn(move || {
        match arq::client::run_reliable_client(socket, peer, &config, iq_tx, oq_rx, client_log.clone()) {
            Ok(Some(())) => {}
            Ok(None) => flux::logging::info!(client_log, "server disconnected"),
            Err(err) => flux::logging::error!(client_log, "client loop failed"; "error" => err.to_string()),
        }
    });

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(_) => break,
        };
        if oq_tx.push(line.into_bytes()).is_err() {
            break;
        }
    }

    // Dropping `oq_tx` lets the sender's next idle poll notice there's nothing left to send;
    // the process exits once both worker threads have wound down.
    drop(oq_tx);
    io::stdout().flush().ok();
    let _ = client.join();
    let _ = reader.join();
    thread::sleep(Duration::from_millis(50));
}
