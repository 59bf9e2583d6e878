use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use hexyl::{BorderStyle, Printer};

use libeq_net::session::{schedule_for as session_schedule_for, SessionOpcode};
use libeq_net::{login, world, FragmentState, Message, Namespace, PacketInspector};

#[derive(Clone, Copy, ValueEnum)]
enum MessageNamespace {
    Lm,
    Wm,
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// CRC key used to verify packets
    #[arg(short = 'c', long, default_value_t = 0x11223344, value_parser = parse_crc)]
    crc: u32,
    /// Message namespace: LM for login messages, WM for world messages
    #[arg(short = 'n', long, value_enum, default_value = "wm")]
    namespace: MessageNamespace,
    #[arg(short, long)]
    verbose: bool,
    #[arg(short, long)]
    quiet: bool,
    /// Packet files to interpret
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

fn parse_crc(s: &str) -> Result<u32, String> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).map_err(|e| e.to_string())
    } else {
        s.parse::<u32>().map_err(|e| e.to_string())
    }
}

struct Inspector {
    args: Cli,
    inspector: PacketInspector,
    ns: Namespace,
    fragments: FragmentState,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Cli::parse();

    let ns = match args.namespace {
        MessageNamespace::Lm => Namespace::Login,
        MessageNamespace::Wm => Namespace::World,
    };
    let compressed = matches!(args.namespace, MessageNamespace::Wm);

    let mut inspector = Inspector {
        inspector: PacketInspector::new(args.crc, compressed),
        ns,
        fragments: FragmentState::new(),
        args,
    };

    let mut ok = true;
    let files = inspector.args.files.clone();
    for file in &files {
        let packet = match fs::read(file) {
            Ok(bytes) => bytes,
            Err(e) => {
                println!("error while reading packet '{}': {e}", file.display());
                ok = false;
                continue;
            }
        };
        if let Err(e) = inspector.info_session(file, &packet, false, 0) {
            println!("error while reading packet '{}': {e}", file.display());
            ok = false;
        }
    }

    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

impl Inspector {
    fn indent(&self, depth: usize) -> usize {
        if self.args.verbose {
            depth + 1
        } else {
            depth
        }
    }

    fn message(&self, text: &str, depth: usize) {
        let indent = " ".repeat(self.indent(depth) * 4);
        println!("{indent}{text}");
    }

    fn info_session(
        &mut self,
        file: &PathBuf,
        packet: &[u8],
        unwrapped: bool,
        depth: usize,
    ) -> Result<(), libeq_net::Error> {
        let msg = self.inspector.parse_packet(packet, unwrapped)?;
        let opcode = SessionOpcode::from_u16(msg.msg_type);
        let low_information = matches!(
            opcode,
            SessionOpcode::Ack
                | SessionOpcode::Fragment
                | SessionOpcode::Combined
                | SessionOpcode::AppPacket
                | SessionOpcode::Other(_)
        );
        let print_verbose = !low_information || self.args.verbose;

        let child_depth = if print_verbose {
            if depth == 0 && self.args.verbose {
                println!("Packet '{}' ({} bytes)", file.display(), packet.len());
            }
            self.message(&msg.describe(|t| SessionOpcode::from_u16(t).name()), depth);
            depth + 1
        } else {
            depth
        };

        match opcode {
            SessionOpcode::AppPacket => {
                let body = msg.body.unwrap_or_default();
                self.info_app(&body, child_depth);
            }
            SessionOpcode::Combined => {
                let body = msg.body.unwrap_or_default();
                for sub_packet in libeq_net::unpack_combined(&body)? {
                    self.info_session(file, &sub_packet, true, child_depth)?;
                }
            }
            SessionOpcode::Fragment => {
                let body = msg.body.unwrap_or_default();
                if let Some(whole_packet) = self.fragments.push(&body)? {
                    self.info_app(&whole_packet, child_depth);
                }
            }
            _ => {
                if let Some(body) = &msg.body {
                    if print_verbose && !self.args.quiet {
                        self.message(&hex_dump(body), depth);
                        println!();
                    }
                }
            }
        }
        Ok(())
    }

    fn info_app(&self, packet: &[u8], depth: usize) {
        let schedule = match self.ns {
            Namespace::Login => login::schedule_for(peek_type_le(packet)),
            Namespace::World => world::schedule_for(peek_type_le(packet)),
            Namespace::Session => session_schedule_for(SessionOpcode::from_u16(peek_type_le(packet))),
        };
        let app_msg = match Message::parse(self.ns, schedule, packet) {
            Ok(msg) => msg,
            Err(e) => {
                self.message(&format!("error while parsing application packet: {e}"), depth);
                return;
            }
        };

        let name = |t: u16| match self.ns {
            Namespace::Login => login::name_for(t),
            Namespace::World => world::name_for(t),
            Namespace::Session => SessionOpcode::from_u16(t).name(),
        };
        self.message(&app_msg.describe(name), depth);

        if !self.args.quiet {
            if let Some(body) = &app_msg.body {
                let truncated = &body[..body.len().min(512)];
                self.message(&hex_dump(truncated), depth);
                println!();
            }
        }
    }
}

fn peek_type_le(packet: &[u8]) -> u16 {
    match packet.get(0..2) {
        Some(bytes) => u16::from_le_bytes([bytes[0], bytes[1]]),
        None => 0,
    }
}

fn hex_dump(bytes: &[u8]) -> String {
    let mut out = Vec::new();
    let mut printer = Printer::new(&mut out, false, BorderStyle::Unicode, true);
    let _ = printer.print_all(bytes);
    String::from_utf8_lossy(&out).trim_end().to_string()
}
