use clap::{ArgGroup, Parser, Subcommand, ValueEnum};

use crate::domain::POLICIES_ROOT;

#[derive(Parser, Debug)]
#[command(
    name = "gpo-manager",
    version,
    about = "Inspect and modify Group Policy Objects and their registry-backed settings"
)]
pub struct Cli {
    #[arg(short, long, global = true, help = "Show detailed log output on stderr")]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List GPOs
    List {
        #[arg(long, help = "Domain to query; local policy when omitted")]
        domain: Option<String>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Show one GPO by id or name
    #[command(group(ArgGroup::new("selector").required(true).args(["id", "name"])))]
    Get {
        #[arg(long)]
        id: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        domain: Option<String>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Create a GPO (domain only)
    Create {
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        domain: Option<String>,
    },
    /// Delete a GPO (domain only)
    Delete {
        #[arg(long)]
        id: String,
        #[arg(long)]
        domain: Option<String>,
    },
    /// List the settings of a GPO
    Settings {
        #[arg(long)]
        gpo_id: String,
        #[arg(long)]
        domain: Option<String>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Create or overwrite a policy setting
    Set {
        #[arg(long)]
        gpo_id: String,
        #[arg(long, help = "Registry value name")]
        name: String,
        #[arg(long, allow_negative_numbers = true)]
        value: String,
        #[arg(long = "type", value_enum, ignore_case = true, default_value_t = SettingKind::String)]
        kind: SettingKind,
        #[arg(long, default_value = POLICIES_ROOT, help = "Registry key path under the scope root")]
        path: String,
        #[arg(long, value_enum, default_value_t = SettingScope::Computer)]
        scope: SettingScope,
        #[arg(long)]
        domain: Option<String>,
    },
    /// Remove a policy setting by value name
    Remove {
        #[arg(long)]
        gpo_id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        domain: Option<String>,
    },
    /// Link a GPO to an organizational unit (domain only)
    Link {
        #[arg(long)]
        gpo_id: String,
        #[arg(long)]
        ou: String,
        #[arg(long)]
        domain: Option<String>,
    },
    /// Unlink a GPO from an organizational unit (domain only)
    Unlink {
        #[arg(long)]
        gpo_id: String,
        #[arg(long)]
        ou: String,
        #[arg(long)]
        domain: Option<String>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

/// Value type accepted by `set`
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum SettingKind {
    String,
    Integer,
    Boolean,
}

/// Which hive `set` writes to
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum SettingScope {
    Computer,
    User,
}

impl Commands {
    /// The `--domain` flag of whichever command was given
    pub fn domain(&self) -> Option<&str> {
        match self {
            Commands::List { domain, .. }
            | Commands::Get { domain, .. }
            | Commands::Create { domain, .. }
            | Commands::Delete { domain, .. }
            | Commands::Settings { domain, .. }
            | Commands::Set { domain, .. }
            | Commands::Remove { domain, .. }
            | Commands::Link { domain, .. }
            | Commands::Unlink { domain, .. } => domain.as_deref(),
        }
    }

    pub fn format(&self) -> OutputFormat {
        match self {
            Commands::List { format, .. }
            | Commands::Get { format, .. }
            | Commands::Settings { format, .. } => *format,
            _ => OutputFormat::Table,
        }
    }
}
