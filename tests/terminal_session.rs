//! End-to-end terminal sessions: typed lines in, scrollback and events out.

use netrunner::{
    ConfigError, Difficulty, TerminalConfig,
    data::hosts::{HostCategory, MinigameKind},
    terminal::{
        ADMIN_PROMPT, LineStyle, MinigameOutcome, Submission, TerminalEvent, TerminalSession,
        USER_PROMPT,
    },
};
use proptest::prelude::*;

// ── Helpers ────────────────────────────────────────────────────────────

fn session() -> TerminalSession {
    let mut session = TerminalSession::new(TerminalConfig::default());
    session.drain_events();
    session
}

/// Submits a line, plays out every delayed step, and returns the text printed.
fn run(session: &mut TerminalSession, line: &str) -> Vec<String> {
    session.process_line(line);
    session.run_pending();
    outputs(session)
}

fn outputs(session: &mut TerminalSession) -> Vec<String> {
    session
        .drain_events()
        .into_iter()
        .filter_map(|event| match event {
            TerminalEvent::Output(line) => Some(line.text),
            _ => None,
        })
        .collect()
}

fn echo(line: &str) -> String {
    format!("{USER_PROMPT} {line}")
}

fn launched(events: &[TerminalEvent]) -> Option<(MinigameKind, String)> {
    events.iter().find_map(|event| match event {
        TerminalEvent::LaunchMinigame { kind, host, .. } => Some((*kind, host.address.clone())),
        _ => None,
    })
}

// ── Example scenarios ──────────────────────────────────────────────────

#[test]
fn cd_into_documents_and_back() {
    let mut session = session();
    assert_eq!(
        run(&mut session, "cd documents"),
        vec![
            echo("cd documents"),
            "Directory changed to: /home/user/documents".to_string(),
        ]
    );
    assert_eq!(session.state().current_directory, "/home/user/documents");

    let out = run(&mut session, "cd ..");
    assert_eq!(out.last().map(String::as_str), Some("Directory changed to: /home/user"));
    assert_eq!(session.state().current_directory, "/home/user");
}

#[test]
fn cat_notes_prints_the_file() {
    let mut session = session();
    let out = run(&mut session, "cat notes.txt");
    assert_eq!(out[0], echo("cat notes.txt"));
    assert_eq!(
        out[1..],
        [
            "NOTES:",
            "- Check the system for vulnerabilities",
            "- Encrypt the important data",
            "- Contact the fixer about the new mission",
            "- FTP password: zxc123456",
        ]
    );
}

#[test]
fn dotfiles_in_the_listing_have_no_contents() {
    let mut session = session();
    assert_eq!(
        run(&mut session, "cat .bash_history").last().map(String::as_str),
        Some("File \".bash_history\" not found")
    );
}

#[test]
fn hack_with_nothing_to_target_prints_usage() {
    let mut session = session();
    let out = run(&mut session, "hack");
    assert_eq!(
        out,
        vec![
            echo("hack"),
            "Usage: hack <target>".to_string(),
            "The target can be a host address or a local file identifier".to_string(),
        ]
    );
    assert!(session.state().discovered_hosts.is_none());
    assert!(!session.state().admin);
    assert!(!session.is_busy());
}

#[test]
fn help_lists_every_builtin() {
    let mut session = session();
    let out = run(&mut session, "help");
    assert_eq!(out[1], "Available commands:");
    for name in [
        "help", "clear", "echo", "ls", "cd", "cat", "scan", "connect", "hack", "decrypt",
        "status", "history", "options", "setopt", "exit",
    ] {
        assert!(
            out.iter().any(|line| line.starts_with(&format!("{name} - "))),
            "{name} missing from help"
        );
    }
}

#[test]
fn scan_reports_on_the_virtual_clock() {
    let mut session = session();
    session.process_line("scan");
    session.advance(4_499);
    assert!(session.state().discovered_hosts.is_none());
    assert!(session.is_busy());

    session.advance(1);
    assert!(!session.is_busy());
    assert_eq!(session.now_ms(), 4_500);
    let hosts = session.state().discovered_hosts.clone().unwrap_or_default();
    assert_eq!(hosts.len(), 5);

    let out = outputs(&mut session);
    assert!(out.contains(&"Searching for open ports...".to_string()));
    assert!(out.contains(&"Identifying active hosts...".to_string()));
    assert!(out.contains(&"Hosts found: 5".to_string()));
    assert!(out.contains(&"  Vulnerability: Outdated FTP server version".to_string()));
}

#[test]
fn firewall_refuses_connections() {
    let mut session = session();
    run(&mut session, "scan");
    let out = run(&mut session, "connect 192.168.1.10");
    assert_eq!(
        out.last().map(String::as_str),
        Some("Connection blocked by firewall. Bypass required.")
    );
    assert_eq!(session.prompt(), USER_PROMPT);
    assert!(session.state().current_host.is_none());
}

#[test]
fn server_breach_from_connection_to_admin() {
    let mut session = session();
    run(&mut session, "scan");
    run(&mut session, "connect 192.168.1.20");
    assert_eq!(session.prompt(), "[GUEST@192.168.1.20]$");

    session.process_line("hack");
    session.run_pending();
    let events = session.drain_events();
    assert_eq!(
        launched(&events),
        Some((MinigameKind::Network, "192.168.1.20".to_string()))
    );
    assert!(events.iter().any(|event| matches!(
        event,
        TerminalEvent::LaunchMinigame {
            difficulty: Difficulty::Normal,
            ..
        }
    )));

    let history_len = session.state().history.len();
    assert_eq!(session.process_line("ls"), Submission::Busy);
    assert_eq!(session.state().history.len(), history_len);

    assert!(session.resolve_minigame(MinigameOutcome::Success));
    assert!(!session.resolve_minigame(MinigameOutcome::Success));
    assert_eq!(session.prompt(), "[ADMIN@192.168.1.20]#");
    assert!(session.state().admin);
    assert_eq!(session.state().hacked_hosts, vec!["192.168.1.20".to_string()]);

    let out = run(&mut session, "exit");
    assert!(out.contains(&"Disconnecting from 192.168.1.20...".to_string()));
    assert_eq!(session.prompt(), USER_PROMPT);
    assert!(!session.is_ended());
}

#[test]
fn database_breach_reveals_the_backup_server() {
    let mut session = session();
    run(&mut session, "scan");
    session.process_line("hack 192.168.1.40");
    session.run_pending();
    assert_eq!(
        launched(&session.drain_events()),
        Some((MinigameKind::Password, "192.168.1.40".to_string()))
    );

    session.resolve_minigame(MinigameOutcome::Success);
    session.run_pending();
    let out = outputs(&mut session);
    assert!(out.contains(&"Extracting data...".to_string()));
    assert!(out.contains(&"  backup_server: 192.168.1.60".to_string()));
    assert_eq!(
        out.last().map(String::as_str),
        Some("New host discovered: 192.168.1.60")
    );
    assert!(!session.state().admin);

    let backup = session.state().discovered("192.168.1.60").cloned();
    assert_eq!(
        backup.map(|host| host.category),
        Some(HostCategory::BackupServer)
    );

    session.process_line("hack 192.168.1.60");
    session.run_pending();
    assert_eq!(
        launched(&session.drain_events()),
        Some((MinigameKind::Code, "192.168.1.60".to_string()))
    );
}

#[test]
fn failed_breach_drops_the_connection() {
    let mut session = session();
    run(&mut session, "scan");
    run(&mut session, "connect 192.168.1.40");
    assert_eq!(session.prompt(), "[SQL@192.168.1.40]>");
    run(&mut session, "hack");
    session.resolve_minigame(MinigameOutcome::Failure);
    let out = outputs(&mut session);
    assert_eq!(
        out,
        vec![
            "Breach failed!".to_string(),
            "Security system logged an unauthorized access attempt.".to_string(),
            "Connection terminated.".to_string(),
        ]
    );
    assert_eq!(session.prompt(), USER_PROMPT);
    assert!(session.state().current_host.is_none());
    assert!(session.state().hacked_hosts.is_empty());
}

#[test]
fn decrypting_the_password_vault() {
    let mut session = session();
    run(&mut session, "cd documents");
    let out = run(&mut session, "decrypt passwords.enc");
    assert!(out.contains(&"Decryption successful!".to_string()));
    assert_eq!(
        session.state().decrypted_files,
        vec!["/home/user/documents/passwords.enc".to_string()]
    );
}

#[test]
fn lines_typed_during_output_run_in_order() {
    let mut session = session();
    assert_eq!(session.process_line("scan"), Submission::Dispatched);
    assert_eq!(session.process_line("connect 192.168.1.30"), Submission::Queued);
    assert_eq!(session.process_line("echo done"), Submission::Queued);
    session.advance(10_000);

    let out = outputs(&mut session);
    let report = out.iter().position(|line| line == "Scan complete.");
    let connect = out.iter().position(|line| line == &echo("connect 192.168.1.30"));
    let done = out.iter().position(|line| line == "done");
    assert!(report < connect && connect < done, "{out:?}");
    assert_eq!(session.prompt(), "[REMOTE@192.168.1.30]$");
    assert_eq!(
        session.state().history,
        vec!["scan", "connect 192.168.1.30", "echo done"]
    );
}

#[test]
fn exit_ends_the_session_and_closes_input() {
    let mut session = session();
    session.process_line("exit");
    assert!(!session.is_ended());
    session.advance(1_000);
    assert!(session.is_ended());
    assert!(session.drain_events().contains(&TerminalEvent::SessionEnded));

    assert_eq!(session.process_line("ls"), Submission::Closed);
    assert_eq!(session.state().history, vec!["exit"]);
    assert_eq!(
        session.scrollback().back().map(|line| (line.text.as_str(), line.style)),
        Some(("Session closed.", LineStyle::Error))
    );
}

#[test]
fn custom_commands_dispatch_case_insensitively() {
    let mut session = session();
    session.register_command(
        "whoami",
        "Print the current identity",
        |session, _args| {
            let who = if session.state().admin { "admin" } else { "user" };
            session.write(who);
            Ok(())
        },
        Some("whoami"),
    );
    assert_eq!(session.commands().last().map(|spec| spec.name.as_str()), Some("whoami"));

    let out = run(&mut session, "WhoAmI");
    assert_eq!(out.last().map(String::as_str), Some("user"));
    let help = run(&mut session, "help");
    assert!(help.contains(&"whoami - Print the current identity (whoami)".to_string()));
}

#[test]
fn checked_construction_rejects_an_empty_scrollback() {
    let result = TerminalSession::try_new(TerminalConfig {
        max_lines: 0,
        ..TerminalConfig::default()
    });
    assert!(matches!(
        result,
        Err(ConfigError::Invalid {
            field: "max_lines",
            ..
        })
    ));
    assert!(TerminalSession::try_new(TerminalConfig::default()).is_ok());
}

#[test]
fn admin_prompt_without_a_connection() {
    let mut session = session();
    run(&mut session, "scan");
    run(&mut session, "hack 192.168.1.20");
    session.resolve_minigame(MinigameOutcome::Success);
    assert_eq!(session.prompt(), ADMIN_PROMPT);
}

// ── Properties ─────────────────────────────────────────────────────────

const SCRIPTED_LINES: &[&str] = &[
    "ls",
    "cd ..",
    "cd documents",
    "cd var",
    "cat notes.txt",
    "cat passwords.enc",
    "scan",
    "connect 192.168.1.50",
    "hack 192.168.1.30",
    "hack secret.enc",
    "decrypt passwords.enc",
    "status",
    "history",
    "setopt difficulty hard",
    "",
];

fn command_line() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => prop::sample::select(SCRIPTED_LINES).prop_map(str::to_string),
        1 => "[a-z]{1,8}( [a-z0-9.]{1,8})?",
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn same_input_same_transcript(lines in prop::collection::vec(command_line(), 1..20)) {
        let mut a = session();
        let mut b = session();
        for line in &lines {
            prop_assert_eq!(a.process_line(line), b.process_line(line));
            a.run_pending();
            b.run_pending();
        }
        prop_assert_eq!(a.drain_events(), b.drain_events());
        prop_assert_eq!(a.state(), b.state());
        prop_assert_eq!(a.prompt(), b.prompt());
    }

    #[test]
    fn history_keeps_every_accepted_line(lines in prop::collection::vec(command_line(), 1..20)) {
        let mut session = session();
        let mut expected = Vec::new();
        for line in &lines {
            let outcome = session.process_line(line);
            if matches!(outcome, Submission::Dispatched | Submission::Queued) && !line.trim().is_empty() {
                expected.push(line.trim().to_string());
            }
            session.run_pending();
            if session.pending_breach().is_some() {
                session.resolve_minigame(MinigameOutcome::Failure);
            }
        }
        prop_assert_eq!(&session.state().history, &expected);
    }

    #[test]
    fn scrollback_never_exceeds_its_cap(
        max_lines in 1usize..30,
        lines in prop::collection::vec(command_line(), 1..20),
    ) {
        let mut session = TerminalSession::new(TerminalConfig {
            max_lines,
            ..TerminalConfig::default()
        });
        for line in &lines {
            session.process_line(line);
            session.run_pending();
            prop_assert!(session.scrollback().len() <= max_lines);
        }
    }
}
