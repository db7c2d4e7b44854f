//! racf-admin binary — reconcile RACF users, certificates and key rings from the command line.
//!
//! Results are printed to stdout as JSON; logs go to stderr.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use miette::{Result, WrapErr};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use racf_admin::command::certificate::DistinguishedName;
use racf_admin::command::user::{GroupRequest, OmvsAttributes, TsoAttributes};
use racf_admin::reconcile::{CertificateRequest, KeyRingRequest, UserRequest};
use racf_admin::{
    AdminConfig, ConnectAuthority, DesiredState, Reconciler, TsoCommandExecutor, UserSegment,
};

/// Idempotent RACF administration through TSO commands.
#[derive(Parser)]
#[command(name = "racf-admin", version, about = "Manage RACF users, certificates and key rings")]
struct Cli {
    /// TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// User ID the TSO session runs as.
    #[arg(long, global = true)]
    acting_user: Option<String>,

    /// Report the commands that would be issued without running them.
    #[arg(long, global = true)]
    check: bool,

    /// Only list the resource; ignore the requested state.
    #[arg(long, global = true)]
    list_only: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage a user profile and its group connections.
    User(UserArgs),
    /// Manage a digital certificate.
    Cert(CertArgs),
    /// Manage a key ring and its certificates.
    Keyring(KeyringArgs),
}

#[derive(Args)]
struct UserArgs {
    /// User ID.
    name: String,

    /// present, absent, connect or remove; required unless --list-only.
    #[arg(long)]
    state: Option<DesiredState>,

    /// Segments to list (TSO, OMVS, CICS, DFP, CSDATA).
    #[arg(long = "segment")]
    segments: Vec<UserSegment>,

    /// Default group.
    #[arg(long)]
    default_group: Option<String>,

    /// The user's name.
    #[arg(long = "user-name")]
    user_name: Option<String>,

    /// Profile owner.
    #[arg(long)]
    owner: Option<String>,

    /// Initial password.
    #[arg(long)]
    password: Option<String>,

    /// Create a protected user.
    #[arg(long)]
    no_password: bool,

    /// OMVS UID, or `auto`.
    #[arg(long)]
    uid: Option<String>,

    /// OMVS home directory.
    #[arg(long)]
    home: Option<String>,

    /// OMVS initial program.
    #[arg(long)]
    program: Option<String>,

    /// TSO account number.
    #[arg(long)]
    acctnum: Option<String>,

    /// TSO logon procedure.
    #[arg(long = "proc")]
    logon_proc: Option<String>,

    /// Groups to connect or remove.
    #[arg(long = "group")]
    groups: Vec<String>,

    /// Connect authority for the requested groups.
    #[arg(long)]
    authority: Option<ConnectAuthority>,

    /// Owner of the connect entries.
    #[arg(long)]
    group_owner: Option<String>,
}

#[derive(Args)]
struct CertArgs {
    /// Certificate label; defaults to the common name.
    #[arg(long)]
    label: Option<String>,

    /// present or absent; required unless --list-only.
    #[arg(long)]
    state: Option<DesiredState>,

    /// Owning user.
    #[arg(long)]
    owner: Option<String>,

    /// Subject common name (CN).
    #[arg(long)]
    cn: Option<String>,

    /// Subject title (T).
    #[arg(long)]
    title: Option<String>,

    /// Subject organizational unit (OU).
    #[arg(long)]
    ou: Option<String>,

    /// Subject organization (O).
    #[arg(long)]
    org: Option<String>,

    /// Subject locality (L).
    #[arg(long)]
    locality: Option<String>,

    /// Subject country (C).
    #[arg(long)]
    country: Option<String>,

    /// Subject state or province (SP).
    #[arg(long)]
    province: Option<String>,
}

#[derive(Args)]
struct KeyringArgs {
    /// Key ring name.
    name: String,

    /// present, absent, connect or remove; required unless --list-only.
    #[arg(long)]
    state: Option<DesiredState>,

    /// Ring owner.
    #[arg(long)]
    owner: Option<String>,

    /// Owner of the certificate to connect or remove.
    #[arg(long)]
    cert_owner: Option<String>,

    /// Label of the certificate to connect or remove.
    #[arg(long)]
    cert_label: Option<String>,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("racf_admin=info,warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AdminConfig::from_file(path)
            .wrap_err_with(|| format!("Failed to load config: {}", path.display()))?,
        None => AdminConfig::default(),
    };
    if cli.acting_user.is_some() {
        config.acting_user = cli.acting_user.clone();
    }
    config.check_mode |= cli.check;

    let executor = TsoCommandExecutor::from_config(&config.executor);
    let mut reconciler = Reconciler::new(executor, config);

    match cli.command {
        Commands::User(args) => {
            if cli.list_only {
                print_json(&reconciler.list_user(&args.name, &args.segments)?);
            } else {
                let state = required_state(args.state)?;
                print_json(&reconciler.reconcile_user(&user_request(args, state))?);
            }
        }
        Commands::Cert(args) => {
            if cli.list_only {
                // The state is never consulted when only listing.
                let request = cert_request(args, DesiredState::Present);
                let listing = reconciler
                    .list_certificates(request.effective_label(), request.owner.as_deref())?;
                print_json(&listing);
            } else {
                let state = required_state(args.state)?;
                print_json(&reconciler.reconcile_certificate(&cert_request(args, state))?);
            }
        }
        Commands::Keyring(args) => {
            if cli.list_only {
                print_json(&reconciler.list_keyring(&args.name, args.owner.as_deref())?);
            } else {
                let state = required_state(args.state)?;
                print_json(&reconciler.reconcile_keyring(&keyring_request(args, state))?);
            }
        }
    }

    Ok(())
}

/// Mutations need an explicit target state.
fn required_state(state: Option<DesiredState>) -> Result<DesiredState> {
    state.ok_or_else(|| {
        miette::miette!(
            help = "pass --state present|absent|connect|remove, or --list-only to only list",
            "--state is required unless --list-only is set"
        )
    })
}

fn user_request(args: UserArgs, state: DesiredState) -> UserRequest {
    let mut request = UserRequest::new(args.name, state);
    request.segments = args.segments;
    request.attributes.default_group = args.default_group;
    request.attributes.name = args.user_name;
    request.attributes.owner = args.owner;
    request.attributes.password = args.password;
    request.attributes.no_password = args.no_password;
    if args.uid.is_some() || args.home.is_some() || args.program.is_some() {
        request.attributes.omvs = Some(OmvsAttributes {
            uid: args.uid,
            home: args.home,
            program: args.program,
            ..OmvsAttributes::default()
        });
    }
    if args.acctnum.is_some() || args.logon_proc.is_some() {
        request.attributes.tso = Some(TsoAttributes {
            acctnum: args.acctnum,
            logon_proc: args.logon_proc,
            ..TsoAttributes::default()
        });
    }
    request.groups = args
        .groups
        .into_iter()
        .map(|group| GroupRequest {
            group_name: group,
            authority: args.authority,
            owner: args.group_owner.clone(),
        })
        .collect();
    request
}

fn cert_request(args: CertArgs, state: DesiredState) -> CertificateRequest {
    CertificateRequest {
        label: args.label,
        owner: args.owner,
        subject: DistinguishedName {
            common_name: args.cn,
            title: args.title,
            organization_unit: args.ou,
            organization: args.org,
            locality: args.locality,
            country: args.country,
            state: args.province,
        },
        state,
    }
}

fn keyring_request(args: KeyringArgs, state: DesiredState) -> KeyRingRequest {
    KeyRingRequest {
        name: args.name,
        owner: args.owner,
        state,
        certificate_owner: args.cert_owner,
        certificate_label: args.cert_label,
    }
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize JSON: {}", e),
    }
}
