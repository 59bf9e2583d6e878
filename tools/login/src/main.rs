use std::process::ExitCode;

use clap::Parser;

use libeq_net::login::play_status;
use libeq_net::LoginClient;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(long)]
    host: String,
    #[arg(long)]
    port: u16,
    #[arg(long)]
    user: String,
    #[arg(long)]
    password: String,
    /// Write every raw datagram sent/received to packet_<kind>_<timestamp>_<direction> files
    #[arg(long)]
    dump_packets: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), String> {
    let mut client = LoginClient::connect((cli.host.as_str(), cli.port))
        .map_err(|e| format!("connecting to {}:{}: {e}", cli.host, cli.port))?;

    if cli.dump_packets {
        let dir = std::env::temp_dir().join("eq-login-packets");
        client
            .enable_packet_dump(dir)
            .map_err(|e| format!("enabling packet dump: {e}"))?;
    }

    client
        .begin_get_chat_message()
        .map_err(|e| format!("sending chat message request: {e}"))?;
    let chat = client
        .end_get_chat_message()
        .map_err(|e| format!("reading chat message: {e}"))?;
    if !chat.is_empty() {
        println!("message of the day: {}", String::from_utf8_lossy(&chat));
    }

    client
        .begin_login(&cli.user, &cli.password)
        .map_err(|e| format!("sending login request: {e}"))?;
    let (success, user_id, session_key) = client
        .end_login()
        .map_err(|e| format!("reading login response: {e}"))?;

    if !success {
        return Err(format!("login denied for user {:?}", cli.user));
    }
    println!("logged in as user {user_id}, session key is {} bytes", session_key.len());

    client
        .begin_list_servers()
        .map_err(|e| format!("sending server list request: {e}"))?;
    let servers = client
        .end_list_servers()
        .map_err(|e| format!("reading server list: {e}"))?;

    for server in &servers {
        println!(
            "{} ({}:{:?}) players={} status={}",
            server.name, server.host, server.locale, server.players, server.status
        );
    }

    if let Some(server) = servers.first() {
        client
            .begin_play(server.runtime_id, 0)
            .map_err(|e| format!("sending play request: {e}"))?;
        let (allowed, status, server_id, sequence) = client
            .end_play()
            .map_err(|e| format!("reading play response: {e}"))?;
        println!(
            "play {} -> allowed={allowed} status={} server_id={server_id} sequence={sequence}",
            server.name,
            describe_status(status)
        );
    }

    client.disconnect().map_err(|e| format!("disconnecting: {e}"))?;
    Ok(())
}

fn describe_status(status: u16) -> &'static str {
    match status {
        play_status::ALLOWED => "allowed",
        play_status::WORLD_FULL => "world full",
        play_status::DENIED => "denied",
        play_status::SUSPENDED => "suspended",
        play_status::BANNED => "banned",
        _ => "unknown",
    }
}
