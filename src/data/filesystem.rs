//! The fixed virtual filesystem the terminal browses.
//!
//! Directory entries ending in `/` are subdirectories. Paths are absolute and
//! never carry a trailing slash except the root itself.

pub fn listing(directory: &str) -> Option<&'static [&'static str]> {
    let entries: &'static [&'static str] = match directory {
        "/" => &["home/", "var/", "etc/", "usr/", "bin/"],
        "/home" => &["user/", "admin/"],
        "/home/user" => &[
            "documents/",
            "downloads/",
            "scripts/",
            ".bash_history",
            "notes.txt",
        ],
        "/home/user/documents" => &["mission_briefing.txt", "contacts.txt", "passwords.enc"],
        "/home/user/downloads" => &["exploit.sh", "decoder.bin", "network_map.dat"],
        "/home/user/scripts" => &["scan_network.sh", "decrypt_file.py", "crack_password.js"],
        "/var" => &["log/", "tmp/", "www/"],
        "/var/log" => &["system.log", "access.log", "network.log", "errors.log"],
        "/etc" => &["passwd", "shadow", "hosts", "config/"],
        _ => return None,
    };
    Some(entries)
}

/// Directories `cd` may enter from `directory`.
pub fn subdirectories(directory: &str) -> &'static [&'static str] {
    match directory {
        "/" => &["home", "var", "etc", "usr", "bin"],
        "/home" => &["user", "admin"],
        "/home/user" => &["documents", "downloads", "scripts"],
        "/var" => &["log", "tmp", "www"],
        "/etc" => &["config"],
        _ => &[],
    }
}

pub fn contents(path: &str) -> Option<&'static [&'static str]> {
    let lines: &'static [&'static str] = match path {
        "/home/user/notes.txt" => &[
            "NOTES:",
            "- Check the system for vulnerabilities",
            "- Encrypt the important data",
            "- Contact the fixer about the new mission",
            "- FTP password: zxc123456",
        ],
        "/home/user/documents/mission_briefing.txt" => &[
            "MISSION: \"h4ck/me\"",
            "",
            "Objective: gain access to the protected data of the CyberTech corporation",
            "",
            "Stages:",
            "1. Scan the network to find vulnerable hosts",
            "2. Breach the security perimeter",
            "3. Bypass the defence systems",
            "4. Extract the data",
            "",
            "WARNING: keep a low profile to avoid detection.",
        ],
        "/home/user/documents/contacts.txt" => &[
            "CONTACTS:",
            "",
            "Hacker \"Phantom\" - firewall bypass specialist",
            "  > Channel: encrypted line #7842",
            "",
            "Engineer \"Cobalt\" - hardware security specialist",
            "  > Channel: secure terminal only",
            "",
            "Broker \"Nexus\" - liaison with the client",
            "  > Channel: virtual meeting, coordinates in vault.dat",
        ],
        "/var/log/access.log" => &[
            "192.168.1.253 - - [02/Feb/2023:12:34:56 +0000] \"GET /admin HTTP/1.1\" 403 287",
            "192.168.1.253 - - [02/Feb/2023:12:35:10 +0000] \"GET /login HTTP/1.1\" 200 1024",
            "192.168.1.253 - - [02/Feb/2023:12:35:30 +0000] \"POST /login HTTP/1.1\" 302 0",
            "10.0.0.5 - - [02/Feb/2023:13:15:42 +0000] \"GET /dashboard HTTP/1.1\" 200 8192",
            "10.0.0.5 - - [02/Feb/2023:13:20:15 +0000] \"GET /files HTTP/1.1\" 200 4096",
            "10.0.0.5 - - [02/Feb/2023:13:25:33 +0000] \"GET /files/secret.doc HTTP/1.1\" 403 287",
            "45.89.123.5 - - [02/Feb/2023:15:42:18 +0000] \"GET / HTTP/1.1\" 200 1536",
            "45.89.123.5 - - [02/Feb/2023:15:42:30 +0000] \"GET /api HTTP/1.1\" 404 560",
        ],
        _ => return None,
    };
    Some(lines)
}

pub fn decrypted_contents(path: &str) -> Option<&'static [&'static str]> {
    let lines: &'static [&'static str] = match path {
        "/home/user/documents/passwords.enc" => &[
            "PASSWORD LIST:",
            "",
            "FTP server: user/p@ssw0rd",
            "Database: admin/database123",
            "Mailbox: user@example.com/mail2023",
            "VPN: vpn_user/secure456",
            "",
            "Master password for the data vault:",
            "M@sterKey2023X",
        ],
        _ => return None,
    };
    Some(lines)
}

/// Shown by `cat` for any encrypted file, followed by a hint line.
pub const CIPHER_TEXT: &[&str] = &[
    "ÖØÕþæûçû×ñûìþØÕûñä×ÖØ×ñûØëþØöûçû×êäìû×û",
    "Öìêûë×ûØÕìþûìþëþç×ÕìçûçÕììý×êØÖçìëûþØêäØþ",
    "ëþûïçûìýÖ×ØëêæçûæØäþç×êäìûýûØìýìýæûþØÖçêþ",
];

pub const SCRIPT_SUFFIXES: &[&str] = &[".sh", ".py", ".js"];

pub fn is_encrypted(name: &str) -> bool {
    name.ends_with(".enc")
}

pub fn is_script(name: &str) -> bool {
    SCRIPT_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}

/// Joins a directory and an entry name without doubling the root slash.
pub fn join(directory: &str, name: &str) -> String {
    if directory == "/" {
        format!("/{name}")
    } else {
        format!("{directory}/{name}")
    }
}

/// Parent of an absolute path, `None` at the root.
pub fn parent(directory: &str) -> Option<String> {
    if directory == "/" {
        return None;
    }
    match directory.rfind('/') {
        Some(0) | None => Some("/".to_string()),
        Some(idx) => Some(directory[..idx].to_string()),
    }
}
