//! Interactive terminal session.
//!
//! Reads one command per line while honouring the coordinator's pending
//! auto-advance: the advance fires when its deadline passes, unless a command
//! cancels or replaces it first.

use crate::{fetch_artifact, is_yes, print_panel, print_performance, settle};
use anyhow::Result;
use hybridcrypt_contract::EncryptionMode;
use hybridcrypt_core::{
    config::ClientConfig,
    perf,
    workflow::{ArtifactKind, RESET_CONFIRMATION, RESET_DONE},
    AdvanceTicket, AlertKind, Step, WorkflowCoordinator,
};
use hybridcrypt_http::HttpGateway;
use std::io::{self, Write};
use std::path::PathBuf;
use tokio::io::{stdin, AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::time::{sleep_until, Instant};

const HELP: &str = "\
commands:
  generate                  generate Alice and Bob keypairs
  exchange                  run the key exchange
  file-encrypt <path>       choose the file to encrypt
  file-decrypt <path>       choose the file to decrypt
  mode <gcm|cbc>            choose the encryption mode
  encrypt | decrypt         run step 3 / step 4
  download <enc|dec>        save the last artifact
  goto <1-4>                open a step
  status                    show progress and controls
  perf [export]             show performance data
  reset                     reset the service and the session
  help | quit";

/// Parsed session command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Command {
    Generate,
    Exchange,
    SelectEncrypt(PathBuf),
    SelectDecrypt(PathBuf),
    Mode(EncryptionMode),
    Encrypt,
    Decrypt,
    Download(ArtifactKind),
    Goto(Step),
    Status,
    Performance { export: bool },
    Reset,
    Help,
    Quit,
}

pub(crate) fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word {
        "generate" | "gen" => Command::Generate,
        "exchange" | "ex" => Command::Exchange,
        "file-encrypt" | "fe" if !rest.is_empty() => Command::SelectEncrypt(PathBuf::from(rest)),
        "file-decrypt" | "fd" if !rest.is_empty() => Command::SelectDecrypt(PathBuf::from(rest)),
        "file-encrypt" | "fe" | "file-decrypt" | "fd" => {
            return Err(format!("`{word}` needs a file path"))
        }
        "mode" => Command::Mode(rest.parse()?),
        "encrypt" | "enc" => Command::Encrypt,
        "decrypt" | "dec" => Command::Decrypt,
        "download" | "dl" => match rest {
            "enc" | "encrypted" => Command::Download(ArtifactKind::Encrypted),
            "dec" | "decrypted" => Command::Download(ArtifactKind::Decrypted),
            other => return Err(format!("unknown artifact `{other}` (expected enc or dec)")),
        },
        "goto" | "step" => {
            let step = rest
                .parse::<u8>()
                .ok()
                .and_then(Step::from_number)
                .ok_or_else(|| format!("unknown step `{rest}` (expected 1-4)"))?;
            Command::Goto(step)
        }
        "status" | "st" => Command::Status,
        "perf" | "performance" => Command::Performance {
            export: rest == "export",
        },
        "reset" => Command::Reset,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(format!("unknown command `{other}`; type `help`")),
    };
    Ok(Some(command))
}

fn alert(kind: AlertKind, message: impl AsRef<str>) {
    println!("{} {}", kind.tag(), message.as_ref());
}

fn prompt(coordinator: &WorkflowCoordinator) {
    print!("[step {}] > ", coordinator.current_step().number());
    io::stdout().flush().ok();
}

fn print_status(coordinator: &WorkflowCoordinator) {
    for indicator in coordinator.indicators() {
        let marker = if indicator.current {
            ">"
        } else if indicator.active {
            "*"
        } else if indicator.reachable {
            "+"
        } else {
            " "
        };
        println!("  {marker} {}", indicator.step);
    }
    for control in coordinator.controls() {
        let state = if control.enabled { "enabled" } else { "disabled" };
        println!("    {:<28} {state}", control.caption());
    }
    match coordinator.encrypt_selection() {
        Some(file) => println!("  encrypt: {}", file.describe()),
        None => println!("  encrypt: no file selected"),
    }
    match coordinator.decrypt_selection() {
        Some(file) => println!("  decrypt: {}", file.describe()),
        None => println!("  decrypt: no file selected"),
    }
    println!("  mode: {}", coordinator.encryption_mode());
}

/// Deadline of the coordinator's pending advance, kept stable across prompts.
struct AdvanceClock {
    armed: Option<(AdvanceTicket, Instant)>,
}

impl AdvanceClock {
    fn sync(&mut self, coordinator: &WorkflowCoordinator) {
        self.armed = match (coordinator.pending_advance(), self.armed) {
            (Some(pending), Some((ticket, deadline))) if pending.ticket == ticket => {
                Some((ticket, deadline))
            }
            (Some(pending), _) => Some((pending.ticket, Instant::now() + pending.delay)),
            (None, _) => None,
        };
    }

    async fn elapsed(&self) -> AdvanceTicket {
        match self.armed {
            Some((ticket, deadline)) => {
                sleep_until(deadline).await;
                ticket
            }
            None => std::future::pending().await,
        }
    }
}

async fn confirm(lines: &mut Lines<BufReader<Stdin>>) -> Result<bool> {
    println!("{RESET_CONFIRMATION}");
    print!("Proceed? [y/N] ");
    io::stdout().flush().ok();
    Ok(lines.next_line().await?.is_some_and(|answer| is_yes(&answer)))
}

pub(crate) async fn run(
    config: &ClientConfig,
    gateway: &HttpGateway,
    coordinator: &mut WorkflowCoordinator,
) -> Result<()> {
    println!(
        "HybridCrypt session against {} (type `help` for commands)",
        gateway.base_url()
    );
    let mut lines = BufReader::new(stdin()).lines();
    let mut clock = AdvanceClock { armed: None };

    loop {
        clock.sync(coordinator);
        prompt(coordinator);

        let line = tokio::select! {
            line = lines.next_line() => line?,
            ticket = clock.elapsed() => {
                if let Some(step) = coordinator.fire_auto_advance(ticket) {
                    println!();
                    alert(AlertKind::Info, format!("moved to step {step}"));
                }
                continue;
            }
        };

        let Some(line) = line else {
            break;
        };
        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                alert(AlertKind::Warning, message);
                continue;
            }
        };

        if command == Command::Quit {
            break;
        }
        if let Err(err) = execute(command, config, gateway, coordinator, &mut lines).await {
            alert(AlertKind::Error, err.to_string());
        }
    }

    coordinator.teardown();
    Ok(())
}

async fn execute(
    command: Command,
    config: &ClientConfig,
    gateway: &HttpGateway,
    coordinator: &mut WorkflowCoordinator,
    lines: &mut Lines<BufReader<Stdin>>,
) -> Result<()> {
    match command {
        Command::Generate => {
            let outcome = coordinator.generate_keys(gateway).await;
            print_panel(&coordinator.panels().keys.ready().map(|keys| keys.lines()));
            settle(outcome)?;
        }
        Command::Exchange => {
            let outcome = coordinator.perform_key_exchange(gateway).await;
            print_panel(&coordinator.panels().exchange.ready().map(|ex| ex.lines()));
            settle(outcome)?;
        }
        Command::SelectEncrypt(path) => {
            let file = coordinator.select_encrypt_file(path)?;
            println!("  {}", file.describe());
        }
        Command::SelectDecrypt(path) => {
            let file = coordinator.select_decrypt_file(path)?;
            println!("  {}", file.describe());
        }
        Command::Mode(mode) => {
            coordinator.set_encryption_mode(mode);
            println!("  mode: {mode}");
        }
        Command::Encrypt => {
            if !coordinator.is_enabled(hybridcrypt_core::Action::EncryptFile) {
                alert(AlertKind::Warning, "run the key exchange first");
                return Ok(());
            }
            let outcome = coordinator.encrypt_file(gateway).await;
            print_panel(&coordinator.panels().encryption.ready().map(|enc| enc.lines()));
            settle(outcome)?;
        }
        Command::Decrypt => {
            if !coordinator.is_enabled(hybridcrypt_core::Action::DecryptFile) {
                alert(AlertKind::Warning, "run the key exchange first");
                return Ok(());
            }
            let outcome = coordinator.decrypt_file(gateway).await;
            print_panel(&coordinator.panels().decryption.ready().map(|dec| dec.lines()));
            settle(outcome)?;
        }
        Command::Download(kind) => {
            fetch_artifact(coordinator, gateway, kind, &config.download_dir()).await?;
        }
        Command::Goto(step) => {
            coordinator.navigate_to(step)?;
            println!("  {step}");
        }
        Command::Status => print_status(coordinator),
        Command::Performance { export } => {
            let report = settle(perf::load_performance(gateway).await)?;
            print_performance(&report);
            if export {
                let bundle = perf::bundle_snapshot(&report, None)?;
                alert(
                    AlertKind::Success,
                    format!("bundle written to {}", bundle.display()),
                );
            }
        }
        Command::Reset => {
            let confirmed = confirm(lines).await?;
            if settle(coordinator.reset_system(gateway, confirmed).await)? {
                alert(AlertKind::Success, RESET_DONE);
            }
        }
        Command::Help => println!("{HELP}"),
        Command::Quit => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands_with_arguments() {
        assert_eq!(parse_command("  "), Ok(None));
        assert_eq!(parse_command("gen"), Ok(Some(Command::Generate)));
        assert_eq!(
            parse_command("file-encrypt /tmp/my notes.txt"),
            Ok(Some(Command::SelectEncrypt(PathBuf::from("/tmp/my notes.txt"))))
        );
        assert_eq!(
            parse_command("mode CBC"),
            Ok(Some(Command::Mode(EncryptionMode::Cbc)))
        );
        assert_eq!(parse_command("goto 3"), Ok(Some(Command::Goto(Step::Encrypt))));
        assert_eq!(
            parse_command("perf export"),
            Ok(Some(Command::Performance { export: true }))
        );
        assert_eq!(
            parse_command("download dec"),
            Ok(Some(Command::Download(ArtifactKind::Decrypted)))
        );
    }

    #[test]
    fn rejects_malformed_commands() {
        assert!(parse_command("goto 9").is_err());
        assert!(parse_command("file-decrypt").is_err());
        assert!(parse_command("mode ecb").is_err());
        assert!(parse_command("launch").is_err());
    }
}
