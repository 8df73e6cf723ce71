use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostCategory {
    Firewall,
    Server,
    Workstation,
    Database,
    DomainController,
    BackupServer,
}

impl HostCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            HostCategory::Firewall => "Firewall",
            HostCategory::Server => "Server",
            HostCategory::Workstation => "Workstation",
            HostCategory::Database => "Database",
            HostCategory::DomainController => "Domain controller",
            HostCategory::BackupServer => "Backup server",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vulnerability {
    Ftp,
    Password,
    Backup,
}

impl Vulnerability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Vulnerability::Ftp => "ftp",
            Vulnerability::Password => "password",
            Vulnerability::Backup => "backup",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Vulnerability::Ftp => "Outdated FTP server version",
            Vulnerability::Password => "Weak administrator password",
            Vulnerability::Backup => "Unpatched backup agent",
        }
    }

    /// Puzzle that resolves an exploit of this weakness.
    pub fn minigame(&self) -> MinigameKind {
        match self {
            Vulnerability::Ftp => MinigameKind::Network,
            Vulnerability::Password => MinigameKind::Password,
            Vulnerability::Backup => MinigameKind::Code,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MinigameKind {
    Network,
    Password,
    Code,
}

impl MinigameKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MinigameKind::Network => "network",
            MinigameKind::Password => "password",
            MinigameKind::Code => "code",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Host {
    pub address: String,
    pub category: HostCategory,
    #[serde(default)]
    pub ports: Vec<String>,
    #[serde(default)]
    pub vulnerability: Option<Vulnerability>,
}

impl Host {
    pub fn new(
        address: &str,
        category: HostCategory,
        ports: &[&str],
        vulnerability: Option<Vulnerability>,
    ) -> Self {
        Self {
            address: address.to_string(),
            category,
            ports: ports.iter().map(|port| port.to_string()).collect(),
            vulnerability,
        }
    }
}

pub fn scan_table() -> Vec<Host> {
    vec![
        Host::new(
            "192.168.1.10",
            HostCategory::Firewall,
            &["22 (SSH)", "443 (HTTPS)"],
            None,
        ),
        Host::new(
            "192.168.1.20",
            HostCategory::Server,
            &["21 (FTP)", "22 (SSH)", "80 (HTTP)", "3306 (MySQL)"],
            Some(Vulnerability::Ftp),
        ),
        Host::new(
            "192.168.1.30",
            HostCategory::Workstation,
            &["445 (SMB)"],
            None,
        ),
        Host::new(
            "192.168.1.40",
            HostCategory::Database,
            &["1433 (MSSQL)"],
            Some(Vulnerability::Password),
        ),
        Host::new(
            "192.168.1.50",
            HostCategory::DomainController,
            &["53 (DNS)", "389 (LDAP)"],
            None,
        ),
    ]
}

pub fn backup_host() -> Host {
    Host::new(
        "192.168.1.60",
        HostCategory::BackupServer,
        &["873 (rsync)"],
        Some(Vulnerability::Backup),
    )
}

/// Dump shown after a database host falls.
pub const EXTRACTED_DATA: &[&str] = &[
    "Data retrieved:",
    "",
    "USERS:",
    "  admin:hash(s3cur3P@ssw0rd)",
    "  user1:hash(qwerty123)",
    "  system:hash(syst3mR00t)",
    "",
    "CONFIGURATION:",
    "  security_level: medium",
    "  encryption: aes-256",
    "  backup_server: 192.168.1.60",
];
