use std::path::PathBuf;

use crate::acl::Permission;
use crate::cred::Encoding;
use crate::subject::Subject;

/// Upper bound on resources per ACE and on types/interfaces per resource.
pub const MAX_ENTITIES: usize = 16;
pub const MAX_PIN_LEN: usize = 32;

#[derive(clap::Parser, Debug, Clone)]
#[command(name = "svrdb", about = "Inspect and edit an SVR database")]
pub struct Config {
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
    /// SVR database file.
    pub db: PathBuf,
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Config {
    /// Whether the command writes to the database.
    pub fn is_mutating(&self) -> bool {
        match &self.command {
            Some(Command::Cred(c)) => !matches!(c, CredCommand::List | CredCommand::Certs { .. }),
            Some(Command::Acl(a)) => !matches!(a, AclCommand::List),
            Some(Command::Print { .. }) | None => false,
        }
    }
}

#[derive(clap::Subcommand, Debug, Clone)]
pub enum Command {
    /// Print every resource.
    Print {
        #[arg(long)]
        json: bool,
    },
    #[command(subcommand)]
    Cred(CredCommand),
    #[command(subcommand)]
    Acl(AclCommand),
}

#[derive(clap::Subcommand, Debug, Clone)]
pub enum CredCommand {
    List,
    Remove {
        id: u16,
    },
    /// Decode the certificates stored for a usage and credential id.
    Certs {
        #[arg(long, default_value = crate::cred::usage::TRUST_CA)]
        usage: String,
        #[arg(long)]
        id: u16,
    },
    AddPin {
        #[arg(long)]
        subject: Subject,
        #[arg(long)]
        pin: String,
    },
    /// Store a trust-anchor certificate chain.
    AddTrustCa {
        /// Use the manufacturer trust-CA usage.
        #[arg(long, conflicts_with = "usage")]
        mfg: bool,
        #[arg(long)]
        usage: Option<String>,
        #[arg(long, value_enum)]
        encoding: EncodingArg,
        chain: PathBuf,
    },
    /// Store the device's own key and certificate.
    AddCert {
        #[arg(long, conflicts_with = "usage")]
        mfg: bool,
        #[arg(long)]
        usage: Option<String>,
        #[arg(long)]
        key: PathBuf,
        #[arg(long, value_enum, default_value_t = EncodingArg::Raw)]
        key_encoding: EncodingArg,
        #[arg(long)]
        cert: PathBuf,
        #[arg(long, value_enum)]
        cert_encoding: EncodingArg,
    },
}

#[derive(clap::Subcommand, Debug, Clone)]
pub enum AclCommand {
    List,
    /// Append an ACE granting `permission` on each `--href`.
    Add {
        #[arg(long)]
        subject: Subject,
        #[arg(long = "href", required = true)]
        hrefs: Vec<String>,
        #[arg(long = "rt", required = true)]
        types: Vec<String>,
        #[arg(long = "if", required = true)]
        interfaces: Vec<String>,
        #[arg(long)]
        rel: Option<String>,
        /// Decimal bits, `full`, `none` or letters from `crwdn`.
        #[arg(long, default_value = "r")]
        permission: Permission,
        #[arg(long)]
        period: Option<String>,
        #[arg(long = "recurrence", requires = "period")]
        recurrences: Vec<String>,
    },
    /// Remove the ACE at a 1-based index.
    Remove {
        index: usize,
    },
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingArg {
    Raw,
    Base64,
    Pem,
    Der,
}

impl From<EncodingArg> for Encoding {
    fn from(arg: EncodingArg) -> Self {
        match arg {
            EncodingArg::Raw => Encoding::Raw,
            EncodingArg::Base64 => Encoding::Base64,
            EncodingArg::Pem => Encoding::Pem,
            EncodingArg::Der => Encoding::Der,
        }
    }
}
