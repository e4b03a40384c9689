use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

use minikv::commands::opcode;
use minikv::frame::Request;
use minikv::{Error, DEFAULT_PORT};

#[derive(Parser, Debug)]
#[command(
    name = "minikv-client",
    version,
    about = "Interactive line client for the minikv server"
)]
struct Args {
    /// Server host
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Server port
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,
}

fn command_opcode(name: &str) -> Option<u8> {
    match name {
        "PING" => Some(opcode::PING),
        "SET" => Some(opcode::SET),
        "GET" => Some(opcode::GET),
        "REPLACE" => Some(opcode::REPLACE),
        "TTL" => Some(opcode::SET_TTL),
        "DB" => Some(opcode::SELECT_DB),
        "LOGIN" => Some(opcode::LOGIN),
        "WHOAMI" => Some(opcode::WHOAMI),
        "DISCONNECT" => Some(opcode::DISCONNECT),
        _ => None,
    }
}

/// Turns one input line into a request frame: the first whitespace-separated
/// token is the command name, the rest become the argument tokens.
fn encode_line(line: &str) -> Result<(u8, Vec<u8>), String> {
    let mut tokens = line.split_whitespace();

    let name = tokens.next().ok_or("input is missing a command")?;
    let op =
        command_opcode(&name.to_uppercase()).ok_or_else(|| format!("unknown command: {name}"))?;

    let args = tokens.map(str::to_string).collect();
    let bytes = Request::new(op, args)
        .encode()
        .map_err(|e| e.to_string())?;

    Ok((op, bytes))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let args = Args::parse();

    let stream = TcpStream::connect((args.host.as_str(), args.port)).await?;
    let (read_half, mut write_half) = stream.into_split();
    let mut responses = BufReader::new(read_half);

    println!("Connected to {}:{}", args.host, args.port);

    let mut input = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = input.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let (op, bytes) = match encode_line(&line) {
            Ok(encoded) => encoded,
            Err(message) => {
                eprintln!("{message}");
                continue;
            }
        };

        write_half.write_all(&bytes).await?;

        let mut response = String::new();
        if responses.read_line(&mut response).await? == 0 {
            println!("server closed the connection");
            break;
        }
        print!("{response}");

        if op == opcode::DISCONNECT {
            break;
        }
    }

    Ok(())
}
