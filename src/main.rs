use clap::{Parser, Subcommand};
use filesig::io::write_keypair;
use filesig::keygen::{DEFAULT_EXPONENT_BITS, DEFAULT_PRIME_BITS};
use filesig::{generate_keypair, sign_file, verify_file, KeyGenConfig};
use log::LevelFilter;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "filesig")]
#[command(about = "Append, verify and strip RSA signatures on files", long_about = None)]
#[command(version)]
struct Cli {
    /// Log every verification step
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a key pair as PublicKey<id> and PrivateKey<id>
    Keygen {
        /// Directory the key files are written to
        #[arg(short, long, default_value = ".")]
        out: PathBuf,

        /// Size of each RSA prime in bits
        #[arg(long, default_value_t = DEFAULT_PRIME_BITS)]
        prime_bits: u64,

        /// Size of the public exponent candidate in bits
        #[arg(long, default_value_t = DEFAULT_EXPONENT_BITS)]
        exponent_bits: u64,
    },

    /// Sign a file, producing <FILE>.sig
    Sign {
        /// File to sign
        file: PathBuf,

        /// Private key file
        private_key: PathBuf,
    },

    /// Verify a signed file and restore the original
    Verify {
        /// Signed file
        file: PathBuf,

        /// Public key file
        public_key: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    match run(cli.command) {
        Ok(message) => {
            println!("{}", message);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> filesig::Result<String> {
    match command {
        Commands::Keygen {
            out,
            prime_bits,
            exponent_bits,
        } => {
            let config = KeyGenConfig {
                prime_bits,
                exponent_bits,
                ..KeyGenConfig::default()
            };
            let mut rng = rand::thread_rng();
            let keypair = generate_keypair(&mut rng, &config)?;
            let (public, private) = write_keypair(&keypair, &out, &mut rng)?;
            Ok(format!(
                "Public key: {}\nPrivate key: {}",
                public.display(),
                private.display()
            ))
        }
        Commands::Sign { file, private_key } => {
            let signed = sign_file(&file, &private_key)?;
            Ok(format!(
                "The file is signed successfully: {}",
                signed.display()
            ))
        }
        Commands::Verify { file, public_key } => {
            let restored = verify_file(&file, &public_key)?;
            Ok(format!(
                "Signature verified, file has not been modified: {}",
                restored.display()
            ))
        }
    }
}
