//! CLI client for the `photolabd` daemon.
//!
//! Examples:
//!   photolab-cli status
//!   photolab-cli set light 80
//!   photolab-cli set temp 35
//!   photolab-cli pause
//!   photolab-cli history
//!   photolab-cli ask why does heat slow things down?
//!
//! By default it talks to 127.0.0.1:9877; override with `--addr host:port`.

use std::io::{BufRead, BufReader, Write};
use std::net::TcpStream;
use std::process;
use std::time::Duration;

use photolab::chat::Role;
use photolab::history::DataPoint;
use photolab::observer::LabSnapshot;
use photolab::protocol::{encode_line, Request, Response, DEFAULT_ADDR};
use photolab::state::ParameterUpdate;

fn usage() -> ! {
    eprintln!("photolab-cli (talks to photolabd @ {} by default)", DEFAULT_ADDR);
    eprintln!("Usage: photolab-cli [--addr host:port] <command> [args]\n");
    eprintln!("Commands:");
    eprintln!("  status                          Show controls, rate and clock");
    eprintln!("  history                         Show the rolling rate window");
    eprintln!("  chat                            Show the tutor conversation");
    eprintln!("  set <light|co2|temp> <value>    Change one control");
    eprintln!("  toggle | start | pause          Control the simulation clock");
    eprintln!("  ask <question...>               Ask the tutor");
    eprintln!("  shutdown                        Stop the daemon");
    eprintln!("  paths                           Show where the daemon looks for config.json");
    process::exit(1);
}

fn parse_args() -> (String, Vec<String>) {
    let mut args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        usage();
    }

    let mut addr = DEFAULT_ADDR.to_string();
    if args.len() >= 2 && args[0] == "--addr" {
        addr = args[1].clone();
        args.drain(0..2);
    }

    if args.is_empty() {
        usage();
    }

    (addr, args)
}

fn send_request(addr: &str, req: &Request, timeout: Duration) -> Result<Response, String> {
    let mut stream = TcpStream::connect(addr).map_err(|e| format!("connect: {e}"))?;
    stream
        .set_read_timeout(Some(timeout))
        .map_err(|e| format!("set_read_timeout: {e}"))?;
    let mut reader = BufReader::new(stream.try_clone().map_err(|e| format!("clone: {e}"))?);

    let line = encode_line(req).map_err(|e| format!("serialize: {e}"))?;
    stream
        .write_all(line.as_bytes())
        .map_err(|e| format!("send: {e}"))?;

    let mut resp_line = String::new();
    reader
        .read_line(&mut resp_line)
        .map_err(|e| format!("recv: {e}"))?;
    serde_json::from_str(&resp_line).map_err(|e| format!("parse response: {e}"))
}

fn print_state(s: LabSnapshot) {
    println!(
        "{} tick={} rate={:.1}% limiting={}",
        if s.state.is_simulating { "running" } else { "paused " },
        s.ticks,
        s.rate,
        s.limiting.label(),
    );
    println!(
        "controls: light={:.0}% co2={:.0}% temp={:.0}°C",
        s.state.params.light_intensity, s.state.params.co2_level, s.state.params.temperature,
    );
    println!(
        "factors: light={:.3} co2={:.3} temperature={:.3}",
        s.breakdown.light_factor, s.breakdown.co2_factor, s.breakdown.temperature_factor,
    );
    if s.tutor_busy {
        println!("tutor: thinking...");
    }
}

fn print_history(points: &[DataPoint]) {
    if points.is_empty() {
        println!("(no samples yet)");
        return;
    }
    for p in points {
        let bar = "#".repeat((p.rate / 2.0).round() as usize);
        println!("t={:>5} {:>6.2}% {}", p.time, p.rate, bar);
    }
}

fn parse_set(args: &[String]) -> Result<ParameterUpdate, String> {
    if args.len() < 3 {
        return Err("set needs <light|co2|temp> <value>".to_string());
    }
    let value: f64 = args[2]
        .parse()
        .map_err(|_| format!("not a number: {}", args[2]))?;
    let mut update = ParameterUpdate::default();
    match args[1].as_str() {
        "light" => update.light_intensity = Some(value),
        "co2" => update.co2_level = Some(value),
        "temp" | "temperature" => update.temperature = Some(value),
        other => return Err(format!("unknown control '{other}' (light|co2|temp)")),
    }
    Ok(update)
}

fn main() {
    let (addr, args) = parse_args();
    let cmd = &args[0];

    let make_error = |msg: &str| -> ! {
        eprintln!("{}", msg);
        process::exit(1);
    };

    let req = match cmd.as_str() {
        "status" => Request::GetState,
        "history" => Request::GetHistory,
        "chat" => Request::GetChat,
        "set" => match parse_set(&args) {
            Ok(update) => Request::set_parameters(update),
            Err(e) => make_error(&e),
        },
        "toggle" => Request::ToggleSimulation,
        "start" => Request::Start,
        "pause" => Request::Pause,
        "ask" => {
            if args.len() < 2 {
                usage();
            }
            Request::Ask {
                question: args[1..].join(" "),
            }
        }
        "shutdown" => Request::Shutdown,
        "paths" => {
            // Special command: doesn't need daemon, just print paths
            #[cfg(unix)]
            {
                if let Ok(home) = std::env::var("HOME") {
                    let data_dir = format!("{}/.local/share/photolab", home);
                    println!("Data directory: {}", data_dir);
                    println!("Config file: {}/config.json", data_dir);
                }
            }
            #[cfg(windows)]
            {
                if let Ok(appdata) = std::env::var("APPDATA") {
                    let data_dir = format!("{}\\photolab", appdata);
                    println!("Data directory: {}", data_dir);
                    println!("Config file: {}\\config.json", data_dir);
                }
            }
            process::exit(0);
        }
        _ => usage(),
    };

    // Tutor replies can take a while; everything else is immediate.
    let timeout = match req {
        Request::Ask { .. } => Duration::from_secs(60),
        _ => Duration::from_secs(5),
    };

    match send_request(&addr, &req, timeout) {
        Ok(Response::State(s)) => print_state(s),
        Ok(Response::History { points }) => print_history(&points),
        Ok(Response::Chat { messages }) => {
            for m in messages {
                let who = match m.role {
                    Role::User => "you",
                    Role::Assistant => "tutor",
                };
                println!("{who:>5}: {}", m.content);
            }
        }
        Ok(Response::Reply { content }) => println!("{content}"),
        Ok(Response::Success { message }) => println!("{message}"),
        Ok(Response::Error { message }) => {
            eprintln!("Error: {message}");
            process::exit(1);
        }
        Err(e) => {
            eprintln!("Failed: {e}");
            process::exit(1);
        }
    }
}
