//! Command-line interface for building, signing, and inspecting wallet passes.
//!
//! Signs a `pass.json` document plus an asset directory into a `.pkpass`
//! archive with `openssl`, in-process CMS, or the `signpass` tool, and reads
//! archives back.

use clap::{Parser, Subcommand, ValueEnum};
use pkpass::codec::{encode_pass, from_slice};
use pkpass::model::update_barcode;
use pkpass::{load_pass, verify_archive, PassSigner, SigningBackend};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pkpass")]
#[command(about = "Wallet pass signing tool")]
struct Cli {
    /// Log pipeline steps (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign a pass into <OUT>/<ID>.pkpass
    Sign(SignArgs),
    /// Print the pass.json of an archive
    Inspect {
        archive: PathBuf,
    },
    /// Check archive entries against manifest.json
    Verify {
        archive: PathBuf,
    },
    /// Print a fresh pass identifier
    Id,
}

#[derive(Clone, Copy, ValueEnum)]
enum Backend {
    /// `openssl smime` child process
    Openssl,
    /// In-process CMS through the openssl library
    Native,
    /// `signpass` with the keychain identity
    Tool,
}

impl From<Backend> for SigningBackend {
    fn from(backend: Backend) -> Self {
        match backend {
            Backend::Openssl => SigningBackend::OpensslCommand,
            Backend::Native => SigningBackend::NativeCms,
            Backend::Tool => SigningBackend::PassTool,
        }
    }
}

#[derive(clap::Args)]
struct SignArgs {
    /// pass.json document to sign
    #[arg(long = "pass")]
    pass_json: PathBuf,

    /// Asset directory (icon.png, logo.png, ...)
    #[arg(short, long)]
    assets: PathBuf,

    /// Destination directory
    #[arg(short, long)]
    out: PathBuf,

    /// Use this identifier instead of generating one
    #[arg(long)]
    id: Option<String>,

    /// Copy the identifier into the barcode message and alt text
    #[arg(long)]
    mirror_barcode: bool,

    #[arg(short, long, value_enum, default_value_t = Backend::Openssl)]
    backend: Backend,

    /// Certificate file (PEM, or DER with the native backend)
    #[arg(short = 'c', long, env = "PKPASS_CERTIFICATE")]
    certificate: Option<PathBuf>,

    /// Private key file
    #[arg(short = 'k', long, env = "PKPASS_PRIVATE_KEY")]
    private_key: Option<PathBuf>,

    /// Chain certificate [default: wwdr.pem]
    #[arg(long, env = "PKPASS_WWDR")]
    wwdr: Option<PathBuf>,

    /// Passphrase of the private key
    #[arg(long, env = "PKPASS_KEY_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// openssl executable
    #[arg(long)]
    openssl: Option<PathBuf>,

    /// signpass executable
    #[arg(long)]
    signpass: Option<PathBuf>,

    /// Timeout for each external tool, in seconds
    #[arg(long, default_value = "60")]
    timeout: u64,

    /// ZIP compression level (0-9)
    #[arg(short = 'z', long, default_value = "6")]
    zip_level: u32,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Sign(args) => sign(args)?,
        Command::Inspect { archive } => {
            let pass = load_pass(&archive)?
                .ok_or_else(|| format!("{} has no pass.json", archive.display()))?;
            println!("{}", serde_json::to_string_pretty(&encode_pass(&pass)?)?);
        }
        Command::Verify { archive } => {
            let report = verify_archive(&archive)?;
            for name in &report.verified {
                println!("ok         {name}");
            }
            for name in &report.mismatched {
                println!("mismatch   {name}");
            }
            for name in &report.missing {
                println!("missing    {name}");
            }
            for name in &report.unlisted {
                println!("unlisted   {name}");
            }
            if !report.has_signature {
                println!("missing    signature");
            }
            if !report.is_consistent() {
                return Err(format!("{} does not match its manifest", archive.display()).into());
            }
        }
        Command::Id => println!("{}", pkpass::generate_pass_id()),
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn signer(args: &SignArgs) -> PassSigner {
    let mut signer = PassSigner::new()
        .backend(args.backend.into())
        .timeout(Duration::from_secs(args.timeout))
        .compression_level(args.zip_level);

    // The tool backend ignores file credentials, even when they come from the environment
    if !matches!(args.backend, Backend::Tool) {
        if let Some(ref cert) = args.certificate {
            signer = signer.certificate(cert);
        }
        if let Some(ref key) = args.private_key {
            signer = signer.private_key(key);
        }
        if let Some(ref wwdr) = args.wwdr {
            signer = signer.wwdr_certificate(wwdr);
        }
        if let Some(ref password) = args.password {
            signer = signer.key_password(password.clone());
        }
    }
    if let Some(ref openssl) = args.openssl {
        signer = signer.openssl_program(openssl);
    }
    if let Some(ref signpass) = args.signpass {
        signer = signer.pass_tool_program(signpass);
    }
    signer
}

fn sign(args: SignArgs) -> Result<(), Box<dyn std::error::Error>> {
    let pass = from_slice(&std::fs::read(&args.pass_json)?)?;
    tracing::debug!(document = %args.pass_json.display(), "loaded pass");
    let signer = signer(&args);
    signer.validate()?;

    let (archive, id) = match args.id {
        Some(ref id) => {
            let pass = if args.mirror_barcode { update_barcode(id, pass) } else { pass };
            (signer.sign_with_id(id, &args.assets, &args.out, pass)?, id.clone())
        }
        None if args.mirror_barcode => {
            signer.sign_with(&args.assets, &args.out, pass, update_barcode)?
        }
        None => signer.sign(&args.assets, &args.out, pass)?,
    };

    println!("Signed: {} ({id})", archive.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_sign() {
        let cli = Cli::try_parse_from([
            "pkpass", "sign", "--pass", "pass.json", "-a", "assets", "-o", "out",
            "-c", "cert.pem", "-k", "key.pem", "--mirror-barcode", "-b", "native", "-z", "0",
        ])
        .unwrap();

        let Command::Sign(args) = cli.command else {
            panic!("expected sign");
        };
        assert_eq!(args.pass_json, PathBuf::from("pass.json"));
        assert!(args.mirror_barcode);
        assert!(matches!(args.backend, Backend::Native));
        assert_eq!(args.zip_level, 0);
        assert_eq!(args.timeout, 60);
        assert!(signer(&args).validate().is_ok());
    }

    #[test]
    fn test_tool_backend_ignores_file_credentials() {
        let cli = Cli::try_parse_from([
            "pkpass", "sign", "--pass", "p.json", "-a", "a", "-o", "o", "-b", "tool", "-c", "cert.pem",
        ])
        .unwrap();
        let Command::Sign(args) = cli.command else {
            panic!("expected sign");
        };
        assert!(signer(&args).validate().is_ok());
    }

    #[test]
    fn test_no_pkcs12_input() {
        let parsed = Cli::try_parse_from([
            "pkpass", "sign", "--pass", "p.json", "-a", "a", "-o", "o", "-b", "native", "-p", "id.p12",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_parse_verify() {
        let cli = Cli::try_parse_from(["pkpass", "-v", "verify", "x.pkpass"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Command::Verify { .. }));
    }
}
