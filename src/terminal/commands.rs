//! Built-in commands and the delayed steps they leave behind.

use log::{debug, info};

use super::{ADMIN_PROMPT, LineStyle, MinigameOutcome, TerminalSession, USER_PROMPT};
use crate::{
    config::Difficulty,
    data::{
        filesystem,
        hosts::{EXTRACTED_DATA, Host, HostCategory},
    },
    error::CommandError,
};

const SCAN_PORTS_MS: u64 = 1000;
const SCAN_HOSTS_MS: u64 = 1500;
const SCAN_REPORT_MS: u64 = 2000;
const CONNECT_MS: u64 = 1500;
const ANALYZE_MS: u64 = 2000;
const NO_VULNERABILITY_MS: u64 = 2000;
const BREACH_HANDOFF_MS: u64 = 1500;
const FILE_HACK_MS: u64 = 1000;
const DECRYPT_MS: u64 = 1500;
const EXTRACT_MS: u64 = 1500;
const EXIT_MS: u64 = 1000;

type CommandResult = Result<(), CommandError>;

/// Continuations of commands whose output is staggered in time.
#[derive(Debug)]
pub(crate) enum Step {
    ScanPorts,
    ScanHosts,
    ScanReport,
    ConnectResolved(Host),
    AnalyzeDefenses,
    NoVulnerability,
    BreachHandoff(Host),
    FileHackResolved(String),
    DecryptResolved { name: String, path: String },
    ExtractData,
    EndSession,
}

pub(crate) fn register_builtins(session: &mut TerminalSession) {
    session.register_command("help", "Show the list of available commands", help, None);
    session.register_command("clear", "Clear the terminal screen", clear, None);
    session.register_command("echo", "Print text", echo, Some("echo <text>"));
    session.register_command("ls", "List the current directory", ls, None);
    session.register_command("cd", "Change the current directory", cd, Some("cd <directory>"));
    session.register_command("cat", "Show the contents of a file", cat, Some("cat <file>"));
    session.register_command("scan", "Scan the network for hosts", scan, None);
    session.register_command(
        "connect",
        "Connect to a remote system",
        connect,
        Some("connect <address>"),
    );
    session.register_command("hack", "Start a breach", hack, Some("hack <target>"));
    session.register_command("decrypt", "Decrypt a file", decrypt, Some("decrypt <file>"));
    session.register_command("status", "Show system status", status, None);
    session.register_command("history", "Show previously entered commands", history, None);
    session.register_command("options", "Show game settings", options, None);
    session.register_command(
        "setopt",
        "Change a setting",
        setopt,
        Some("setopt <setting> <value>"),
    );
    session.register_command("exit", "Disconnect or leave the terminal", exit, None);
}

fn help(session: &mut TerminalSession, _args: &[String]) -> CommandResult {
    let lines: Vec<String> = session
        .commands()
        .iter()
        .map(|spec| match &spec.usage {
            Some(usage) => format!("{} - {} ({usage})", spec.name, spec.description),
            None => format!("{} - {}", spec.name, spec.description),
        })
        .collect();
    session.write("Available commands:");
    for line in lines {
        session.write(&line);
    }
    Ok(())
}

fn clear(session: &mut TerminalSession, _args: &[String]) -> CommandResult {
    session.clear_screen();
    Ok(())
}

fn echo(session: &mut TerminalSession, args: &[String]) -> CommandResult {
    session.write(&args.join(" "));
    Ok(())
}

fn ls(session: &mut TerminalSession, _args: &[String]) -> CommandResult {
    let Some(entries) = filesystem::listing(&session.state().current_directory) else {
        session.write_styled("No access to this directory", LineStyle::Error);
        return Ok(());
    };
    if entries.is_empty() {
        session.write("Directory is empty");
        return Ok(());
    }
    let (directories, files): (Vec<&str>, Vec<&str>) =
        entries.iter().copied().partition(|entry| entry.ends_with('/'));
    if !directories.is_empty() {
        session.write_styled(&directories.join("  "), LineStyle::Directory);
    }
    if !files.is_empty() {
        session.write_styled(&files.join("  "), LineStyle::File);
    }
    Ok(())
}

fn cd(session: &mut TerminalSession, args: &[String]) -> CommandResult {
    let current = session.state().current_directory.clone();
    let Some(target) = args.first() else {
        session.write(&format!("Current directory: {current}"));
        return Ok(());
    };

    match target.as_str() {
        "." => {}
        ".." => match filesystem::parent(&current) {
            Some(parent) => change_directory(session, parent),
            None => session.write("Already at the root directory"),
        },
        _ => {
            let name = target.strip_suffix('/').unwrap_or(target.as_str());
            if filesystem::subdirectories(&current)
                .iter()
                .any(|child| *child == name)
            {
                change_directory(session, filesystem::join(&current, name));
            } else {
                session.write_styled(
                    &format!("Directory \"{target}\" does not exist"),
                    LineStyle::Error,
                );
            }
        }
    }
    Ok(())
}

fn change_directory(session: &mut TerminalSession, directory: String) {
    session.write(&format!("Directory changed to: {directory}"));
    session.state_mut().current_directory = directory;
}

fn cat(session: &mut TerminalSession, args: &[String]) -> CommandResult {
    let Some(name) = args.first() else {
        session.write("Usage: cat <file>");
        return Ok(());
    };
    let path = filesystem::join(&session.state().current_directory, name);

    if let Some(lines) = filesystem::contents(&path) {
        session.write(&lines.join("\n"));
    } else if filesystem::is_encrypted(name) {
        session.write_lines(filesystem::CIPHER_TEXT, LineStyle::Normal);
        session.write("File is encrypted. Use the decrypt command to read it.");
    } else if filesystem::is_script(name) {
        session.write("Executable file. Use the \"run\" command to launch it.");
    } else {
        session.write_styled(&format!("File \"{name}\" not found"), LineStyle::Error);
    }
    Ok(())
}

fn scan(session: &mut TerminalSession, _args: &[String]) -> CommandResult {
    session.write("Initializing network scan...");
    session.schedule(SCAN_PORTS_MS, Step::ScanPorts);
    Ok(())
}

fn connect(session: &mut TerminalSession, args: &[String]) -> CommandResult {
    let Some(address) = args.first() else {
        session.write("Usage: connect <address>");
        return Ok(());
    };
    if session.state().discovered_hosts.is_none() {
        session.write("Run a network scan first (scan)");
        return Ok(());
    }
    let Some(host) = session.state().discovered(address).cloned() else {
        session.write_styled(&format!("Host {address} not found"), LineStyle::Error);
        return Ok(());
    };
    session.write(&format!("Connecting to {address}..."));
    session.schedule(CONNECT_MS, Step::ConnectResolved(host));
    Ok(())
}

fn hack(session: &mut TerminalSession, args: &[String]) -> CommandResult {
    let target = match args.first() {
        Some(target) => Some(target.clone()),
        None => session
            .state()
            .current_host
            .as_ref()
            .map(|host| host.address.clone()),
    };
    let Some(target) = target else {
        session.write("Usage: hack <target>");
        session.write("The target can be a host address or a local file identifier");
        return Ok(());
    };

    if !target.contains('.') {
        session.write_styled(&format!("Resource \"{target}\" not found."), LineStyle::Error);
        return Ok(());
    }
    match session.state().discovered(&target).cloned() {
        Some(host) => hack_host(session, host),
        None => {
            session.write(&format!("Attempting to breach file {target}..."));
            session.schedule(FILE_HACK_MS, Step::FileHackResolved(target));
        }
    }
    Ok(())
}

fn hack_host(session: &mut TerminalSession, host: Host) {
    match host.vulnerability {
        None => {
            session.write(&format!("Starting breach of {}...", host.address));
            session.schedule(ANALYZE_MS, Step::AnalyzeDefenses);
        }
        Some(vulnerability) => {
            session.write(&format!(
                "Starting breach of {} via {} vulnerability...",
                host.address,
                vulnerability.as_str()
            ));
            session.schedule(BREACH_HANDOFF_MS, Step::BreachHandoff(host));
        }
    }
}

fn decrypt(session: &mut TerminalSession, args: &[String]) -> CommandResult {
    let Some(name) = args.first() else {
        session.write("Usage: decrypt <file>");
        return Ok(());
    };
    if !filesystem::is_encrypted(name) {
        session.write_styled(&format!("File {name} is not encrypted"), LineStyle::Error);
        return Ok(());
    }
    let path = filesystem::join(&session.state().current_directory, name);
    session.write(&format!("Attempting to decrypt {name}..."));
    session.schedule(
        DECRYPT_MS,
        Step::DecryptResolved {
            name: name.clone(),
            path,
        },
    );
    Ok(())
}

fn status(session: &mut TerminalSession, _args: &[String]) -> CommandResult {
    let state = session.state();
    let lines = [
        "SYSTEM STATUS:".to_string(),
        String::new(),
        format!(
            "Current user: {}",
            if state.admin {
                "Administrator"
            } else {
                "Standard user"
            }
        ),
        format!("Current directory: {}", state.current_directory),
        format!(
            "Connected to: {}",
            state
                .current_host
                .as_ref()
                .map_or("local system", |host| host.address.as_str())
        ),
        String::new(),
        "STATISTICS:".to_string(),
        format!(
            "  Hosts discovered: {}",
            state.discovered_hosts.as_ref().map_or(0, Vec::len)
        ),
        format!("  Hosts breached: {}", state.hacked_hosts.len()),
        format!("  Files decrypted: {}", state.decrypted_files.len()),
    ];
    session.write(&lines.join("\n"));
    Ok(())
}

fn history(session: &mut TerminalSession, _args: &[String]) -> CommandResult {
    let lines: Vec<String> = session
        .state()
        .history
        .iter()
        .enumerate()
        .map(|(idx, line)| format!("{:>4}  {line}", idx + 1))
        .collect();
    for line in lines {
        session.write(&line);
    }
    Ok(())
}

fn options(session: &mut TerminalSession, _args: &[String]) -> CommandResult {
    let settings = session.settings();
    let lines = [
        "SETTINGS:".to_string(),
        String::new(),
        format!("  Difficulty: {}", settings.difficulty),
        format!("  Sound volume: {}%", settings.sound_volume),
        format!("  Music volume: {}%", settings.music_volume),
        format!("  Terminal speed: {}ms", settings.terminal_speed),
        String::new(),
        "To change a setting, use \"setopt\":".to_string(),
        "  setopt difficulty <easy|normal|hard>".to_string(),
        "  setopt soundVolume <0-100>".to_string(),
        "  setopt musicVolume <0-100>".to_string(),
        "  setopt terminalSpeed <10-50>".to_string(),
    ];
    session.write(&lines.join("\n"));
    Ok(())
}

fn setopt(session: &mut TerminalSession, args: &[String]) -> CommandResult {
    let [option, value, ..] = args else {
        session.write_styled(
            "Error: not enough arguments. Use \"setopt <setting> <value>\"",
            LineStyle::Error,
        );
        return Ok(());
    };
    let option = option.to_lowercase();

    let reply = match option.as_str() {
        "difficulty" => value.parse::<Difficulty>().ok().map(|difficulty| {
            session.settings_mut().difficulty = difficulty;
            format!("Difficulty set to: {difficulty}")
        }),
        "soundvolume" => parse_volume(value).map(|volume| {
            session.settings_mut().sound_volume = volume;
            format!("Sound volume set to: {volume}%")
        }),
        "musicvolume" => parse_volume(value).map(|volume| {
            session.settings_mut().music_volume = volume;
            format!("Music volume set to: {volume}%")
        }),
        "terminalspeed" => value
            .parse::<u32>()
            .ok()
            .filter(|speed| (10..=50).contains(speed))
            .map(|speed| {
                session.settings_mut().terminal_speed = speed;
                format!("Terminal speed set to: {speed}ms")
            }),
        _ => {
            session.write_styled(
                &format!("Error: unknown setting \"{option}\""),
                LineStyle::Error,
            );
            return Ok(());
        }
    };

    match reply {
        Some(reply) => {
            info!("setting {option} changed to {value}");
            session.write(&reply);
        }
        None => {
            let hint = match option.as_str() {
                "difficulty" => "Error: difficulty must be one of easy, normal, hard",
                "terminalspeed" => "Error: speed must be a number from 10 to 50",
                _ => "Error: volume must be a number from 0 to 100",
            };
            session.write_styled(hint, LineStyle::Error);
        }
    }
    Ok(())
}

fn parse_volume(value: &str) -> Option<u8> {
    value.parse::<u8>().ok().filter(|volume| *volume <= 100)
}

fn exit(session: &mut TerminalSession, _args: &[String]) -> CommandResult {
    if let Some(host) = session.state_mut().current_host.take() {
        session.write(&format!("Disconnecting from {}...", host.address));
        session.set_prompt(USER_PROMPT);
        return Ok(());
    }
    session.write("Ending terminal session...");
    session.schedule(EXIT_MS, Step::EndSession);
    Ok(())
}

pub(crate) fn run_step(session: &mut TerminalSession, step: Step) {
    debug!("step {step:?} at {}ms", session.now_ms());
    match step {
        Step::ScanPorts => {
            session.write("Searching for open ports...");
            session.schedule(SCAN_HOSTS_MS, Step::ScanHosts);
        }
        Step::ScanHosts => {
            session.write("Identifying active hosts...");
            session.schedule(SCAN_REPORT_MS, Step::ScanReport);
        }
        Step::ScanReport => scan_report(session),
        Step::ConnectResolved(host) => connect_resolved(session, host),
        Step::AnalyzeDefenses => {
            session.write("Analyzing defense mechanisms...");
            session.schedule(NO_VULNERABILITY_MS, Step::NoVulnerability);
        }
        Step::NoVulnerability => {
            session.write_styled("No exploitable vulnerabilities found.", LineStyle::Error);
            session.write(
                "Breach failed. More reconnaissance or another attack vector is required.",
            );
        }
        Step::BreachHandoff(host) => {
            let kind = match host.vulnerability {
                Some(vulnerability) => vulnerability.minigame(),
                None => return,
            };
            session.begin_breach(host, kind);
        }
        Step::FileHackResolved(target) => {
            if filesystem::is_encrypted(&target) {
                session.write("Encrypted file detected. Use the decrypt command.");
            } else {
                session.write(&format!(
                    "File {target} does not need breaching or does not exist."
                ));
            }
        }
        Step::DecryptResolved { name, path } => match filesystem::decrypted_contents(&path) {
            Some(lines) => {
                session.write_styled("Decryption successful!", LineStyle::Success);
                session.write("");
                session.write(&lines.join("\n"));
                let decrypted = &mut session.state_mut().decrypted_files;
                if !decrypted.contains(&path) {
                    decrypted.push(path);
                }
            }
            None => {
                debug!("no plaintext for {name} at {path}");
                session.write_styled(
                    "Could not decrypt the file. Unknown format or corrupted data.",
                    LineStyle::Error,
                );
            }
        },
        Step::ExtractData => extract_data(session),
        Step::EndSession => session.end(),
    }
}

fn scan_report(session: &mut TerminalSession) {
    let hosts = session.config().hosts.clone();
    session.write("Scan complete.");
    session.write("");
    session.write(&format!("Hosts found: {}", hosts.len()));
    for (idx, host) in hosts.iter().enumerate() {
        session.write("");
        session.write(&format!("HOST {}:", idx + 1));
        session.write(&format!("  Address: {}", host.address));
        session.write(&format!("  Type: {}", host.category.as_str()));
        session.write(&format!("  Ports: {}", host.ports.join(", ")));
        session.write(&format!(
            "  Vulnerability: {}",
            host.vulnerability
                .map_or("None detected", |vulnerability| vulnerability.description())
        ));
    }
    info!("scan discovered {} hosts", hosts.len());
    session.state_mut().discovered_hosts = Some(hosts);
}

fn connect_resolved(session: &mut TerminalSession, host: Host) {
    let prompt = match host.category {
        HostCategory::Firewall => {
            session.write_styled(
                "Connection blocked by firewall. Bypass required.",
                LineStyle::Error,
            );
            return;
        }
        HostCategory::Server => {
            session.write_styled("Connection established.", LineStyle::Success);
            session.write("Authentication required. Enter credentials:");
            format!("[GUEST@{}]$", host.address)
        }
        HostCategory::Database => {
            session.write_styled("Database connection established.", LineStyle::Success);
            session.write("SQL>");
            format!("[SQL@{}]>", host.address)
        }
        HostCategory::Workstation
        | HostCategory::DomainController
        | HostCategory::BackupServer => {
            session.write_styled("Connection established.", LineStyle::Success);
            format!("[REMOTE@{}]$", host.address)
        }
    };
    session.set_prompt(&prompt);
    session.state_mut().current_host = Some(host);
}

pub(crate) fn finish_breach(session: &mut TerminalSession, host: Host, outcome: MinigameOutcome) {
    match outcome {
        MinigameOutcome::Success => {
            session.write_styled("Breach successful!", LineStyle::Success);
            session.write("Access granted.");
            let hacked = &mut session.state_mut().hacked_hosts;
            if !hacked.contains(&host.address) {
                hacked.push(host.address.clone());
            }

            if host.category == HostCategory::Database {
                session.write("");
                session.write("Extracting data...");
                session.schedule(EXTRACT_MS, Step::ExtractData);
                return;
            }
            session.write("Privileges escalated.");
            session.write("Administrator access obtained.");
            let prompt = match &session.state().current_host {
                Some(current) => format!("[ADMIN@{}]#", current.address),
                None => ADMIN_PROMPT.to_string(),
            };
            session.set_prompt(&prompt);
            session.state_mut().admin = true;
        }
        MinigameOutcome::Failure => {
            session.write_styled("Breach failed!", LineStyle::Error);
            session.write("Security system logged an unauthorized access attempt.");
            session.write("Connection terminated.");
            session.set_prompt(USER_PROMPT);
            session.state_mut().current_host = None;
        }
    }
}

fn extract_data(session: &mut TerminalSession) {
    session.write(&EXTRACTED_DATA.join("\n"));
    let backup = session.config().backup_host.clone();
    let Some(discovered) = session.state_mut().discovered_hosts.as_mut() else {
        return;
    };
    if discovered.iter().any(|host| host.address == backup.address) {
        return;
    }
    let address = backup.address.clone();
    discovered.push(backup);
    session.write("");
    session.write_styled(&format!("New host discovered: {address}"), LineStyle::Success);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::TerminalConfig, terminal::TerminalEvent};

    fn session() -> TerminalSession {
        let mut session = TerminalSession::new(TerminalConfig::default());
        session.drain_events();
        session
    }

    fn run(session: &mut TerminalSession, line: &str) -> Vec<String> {
        let start = session.scrollback().len();
        session.process_line(line);
        session.run_pending();
        session
            .scrollback()
            .iter()
            .skip(start)
            .map(|line| line.text.clone())
            .collect()
    }

    #[test]
    fn ls_splits_directories_and_files() {
        let mut session = session();
        session.process_line("ls");
        let lines: Vec<_> = session.scrollback().iter().rev().take(2).cloned().collect();
        assert_eq!(lines[1].text, "documents/  downloads/  scripts/");
        assert_eq!(lines[1].style, LineStyle::Directory);
        assert_eq!(lines[0].text, ".bash_history  notes.txt");
        assert_eq!(lines[0].style, LineStyle::File);
    }

    #[test]
    fn ls_outside_the_table_denies_access() {
        let mut session = session();
        run(&mut session, "cd ..");
        run(&mut session, "cd admin");
        let lines = run(&mut session, "ls");
        assert_eq!(lines.last().map(String::as_str), Some("No access to this directory"));
    }

    #[test]
    fn cd_accepts_trailing_slash_and_stops_at_root() {
        let mut session = session();
        run(&mut session, "cd scripts/");
        assert_eq!(session.state().current_directory, "/home/user/scripts");
        run(&mut session, "cd ..");
        run(&mut session, "cd ..");
        run(&mut session, "cd ..");
        assert_eq!(session.state().current_directory, "/");
        let lines = run(&mut session, "cd ..");
        assert_eq!(lines.last().map(String::as_str), Some("Already at the root directory"));
        let lines = run(&mut session, "cd nowhere");
        assert_eq!(
            lines.last().map(String::as_str),
            Some("Directory \"nowhere\" does not exist")
        );
        assert_eq!(session.state().current_directory, "/");
    }

    #[test]
    fn cat_distinguishes_encrypted_scripts_and_missing() {
        let mut session = session();
        run(&mut session, "cd documents");
        let lines = run(&mut session, "cat passwords.enc");
        assert_eq!(
            lines.last().map(String::as_str),
            Some("File is encrypted. Use the decrypt command to read it.")
        );
        run(&mut session, "cd ..");
        run(&mut session, "cd scripts");
        let lines = run(&mut session, "cat exploit.py");
        assert_eq!(
            lines.last().map(String::as_str),
            Some("Executable file. Use the \"run\" command to launch it.")
        );
        let lines = run(&mut session, "cat missing.txt");
        assert_eq!(lines.last().map(String::as_str), Some("File \"missing.txt\" not found"));
    }

    #[test]
    fn decrypt_records_the_file_once() {
        let mut session = session();
        run(&mut session, "cd documents");
        let lines = run(&mut session, "decrypt passwords.enc");
        assert!(lines.contains(&"Decryption successful!".to_string()));
        assert!(lines.contains(&"M@sterKey2023X".to_string()));
        run(&mut session, "decrypt passwords.enc");
        assert_eq!(
            session.state().decrypted_files,
            vec!["/home/user/documents/passwords.enc".to_string()]
        );
        let lines = run(&mut session, "decrypt notes.txt");
        assert_eq!(lines.last().map(String::as_str), Some("File notes.txt is not encrypted"));
        let lines = run(&mut session, "decrypt vault.enc");
        assert_eq!(
            lines.last().map(String::as_str),
            Some("Could not decrypt the file. Unknown format or corrupted data.")
        );
    }

    #[test]
    fn connect_requires_a_scan() {
        let mut session = session();
        let lines = run(&mut session, "connect 192.168.1.20");
        assert_eq!(lines.last().map(String::as_str), Some("Run a network scan first (scan)"));
        assert!(session.state().current_host.is_none());
    }

    #[test]
    fn connect_prompt_follows_host_category() {
        let mut session = session();
        run(&mut session, "scan");
        run(&mut session, "connect 192.168.1.10");
        assert!(session.state().current_host.is_none());
        assert_eq!(session.prompt(), USER_PROMPT);

        run(&mut session, "connect 192.168.1.20");
        assert_eq!(session.prompt(), "[GUEST@192.168.1.20]$");
        run(&mut session, "connect 192.168.1.40");
        assert_eq!(session.prompt(), "[SQL@192.168.1.40]>");
        run(&mut session, "connect 192.168.1.30");
        assert_eq!(session.prompt(), "[REMOTE@192.168.1.30]$");

        let lines = run(&mut session, "connect 10.0.0.1");
        assert_eq!(lines.last().map(String::as_str), Some("Host 10.0.0.1 not found"));
    }

    #[test]
    fn hack_without_vulnerability_fails_after_analysis() {
        let mut session = session();
        run(&mut session, "scan");
        let lines = run(&mut session, "hack 192.168.1.30");
        assert_eq!(
            lines,
            vec![
                "[USER@SYSTEM]$ hack 192.168.1.30",
                "Starting breach of 192.168.1.30...",
                "Analyzing defense mechanisms...",
                "No exploitable vulnerabilities found.",
                "Breach failed. More reconnaissance or another attack vector is required.",
            ]
        );
        assert!(session.pending_breach().is_none());
    }

    #[test]
    fn hack_classifies_non_host_targets() {
        let mut session = session();
        let lines = run(&mut session, "hack mainframe");
        assert_eq!(lines.last().map(String::as_str), Some("Resource \"mainframe\" not found."));
        let lines = run(&mut session, "hack secrets.enc");
        assert_eq!(
            lines.last().map(String::as_str),
            Some("Encrypted file detected. Use the decrypt command.")
        );
        let lines = run(&mut session, "hack readme.md");
        assert_eq!(
            lines.last().map(String::as_str),
            Some("File readme.md does not need breaching or does not exist.")
        );
    }

    #[test]
    fn breach_handoff_carries_the_target() {
        let mut session = session();
        run(&mut session, "scan");
        session.drain_events();
        run(&mut session, "hack 192.168.1.20");
        let launch = session
            .drain_events()
            .into_iter()
            .find(|event| matches!(event, TerminalEvent::LaunchMinigame { .. }));
        match launch {
            Some(TerminalEvent::LaunchMinigame { kind, host, difficulty }) => {
                assert_eq!(kind, crate::data::hosts::MinigameKind::Network);
                assert_eq!(host.address, "192.168.1.20");
                assert_eq!(difficulty, Difficulty::Normal);
            }
            other => panic!("expected a launch, got {other:?}"),
        }
        assert_eq!(
            session.pending_breach().map(|host| host.address.as_str()),
            Some("192.168.1.20")
        );
    }

    #[test]
    fn database_breach_extracts_data_and_reveals_backup() {
        let mut session = session();
        run(&mut session, "scan");
        run(&mut session, "hack 192.168.1.40");
        assert!(session.resolve_minigame(MinigameOutcome::Success));
        session.run_pending();
        assert!(!session.state().admin);
        assert!(session.state().discovered("192.168.1.60").is_some());
        assert_eq!(session.state().hacked_hosts, vec!["192.168.1.40".to_string()]);

        run(&mut session, "hack 192.168.1.40");
        session.resolve_minigame(MinigameOutcome::Success);
        session.run_pending();
        let backups = session
            .state()
            .discovered_hosts
            .as_ref()
            .map_or(0, |hosts| {
                hosts
                    .iter()
                    .filter(|host| host.address == "192.168.1.60")
                    .count()
            });
        assert_eq!(backups, 1);
    }

    #[test]
    fn server_breach_grants_admin_on_connected_host() {
        let mut session = session();
        run(&mut session, "scan");
        run(&mut session, "connect 192.168.1.20");
        run(&mut session, "hack");
        session.resolve_minigame(MinigameOutcome::Success);
        assert!(session.state().admin);
        assert_eq!(session.prompt(), "[ADMIN@192.168.1.20]#");
    }

    #[test]
    fn failed_breach_disconnects() {
        let mut session = session();
        run(&mut session, "scan");
        run(&mut session, "connect 192.168.1.20");
        run(&mut session, "hack");
        session.resolve_minigame(MinigameOutcome::Failure);
        assert!(session.state().current_host.is_none());
        assert!(!session.state().admin);
        assert_eq!(session.prompt(), USER_PROMPT);
        assert!(session.state().hacked_hosts.is_empty());
    }

    #[test]
    fn setopt_validates_values() {
        let mut session = session();
        run(&mut session, "setopt difficulty hard");
        run(&mut session, "setopt soundVolume 40");
        let lines = run(&mut session, "setopt musicVolume 140");
        assert_eq!(
            lines.last().map(String::as_str),
            Some("Error: volume must be a number from 0 to 100")
        );
        let lines = run(&mut session, "setopt terminalSpeed 5");
        assert_eq!(
            lines.last().map(String::as_str),
            Some("Error: speed must be a number from 10 to 50")
        );
        let lines = run(&mut session, "setopt brightness 3");
        assert_eq!(
            lines.last().map(String::as_str),
            Some("Error: unknown setting \"brightness\"")
        );
        assert_eq!(session.settings().difficulty, Difficulty::Hard);
        assert_eq!(session.settings().sound_volume, 40);
        assert_eq!(session.settings().music_volume, 50);
    }

    #[test]
    fn exit_disconnects_before_ending() {
        let mut session = session();
        run(&mut session, "scan");
        run(&mut session, "connect 192.168.1.30");
        run(&mut session, "exit");
        assert!(session.state().current_host.is_none());
        assert!(!session.is_ended());
        run(&mut session, "exit");
        assert!(session.is_ended());
        assert!(session.drain_events().contains(&TerminalEvent::SessionEnded));
    }

    #[test]
    fn history_lists_numbered_entries() {
        let mut session = session();
        run(&mut session, "echo hi");
        let lines = run(&mut session, "history");
        assert_eq!(lines[1..], ["   1  echo hi", "   2  history"]);
    }
}
