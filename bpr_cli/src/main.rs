use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::Parser;

use bpr_core::MAGIC;

// ── CLI definition ─────────────────────────────────────────────────────────

/// Compress a whitespace-separated integer height grid into a BPR5
/// container, or decompress a container back to text. The direction is
/// chosen by sniffing the input's magic bytes.
#[derive(Parser)]
#[command(name = "bpr", version)]
struct Cli {
    /// Text grid to encode, or BPR5 container to decode
    input: PathBuf,
    /// Destination file
    output: PathBuf,
    /// After encoding, decode the fresh container and compare it
    /// byte-for-byte against the input (encode only)
    #[arg(long)]
    verify: bool,
}

/// The container decoded back to something other than the input.
#[derive(Debug)]
struct VerifyMismatch;

impl std::fmt::Display for VerifyMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "verify failed: decoded output differs from the input")
    }
}

impl std::error::Error for VerifyMismatch {}

// ── helpers ────────────────────────────────────────────────────────────────

fn human_bytes(n: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut v = n as f64;
    let mut unit = 0;
    while v >= 1024.0 && unit < UNITS.len() - 1 {
        v /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", n)
    } else {
        format!("{:.2} {}", v, UNITS[unit])
    }
}

/// A file is a container exactly when it starts with the BPR5 magic.
fn is_container(path: &Path) -> anyhow::Result<bool> {
    let mut file =
        File::open(path).with_context(|| format!("opening input file {:?}", path))?;
    let mut magic = [0u8; 4];
    match file.read_exact(&mut magic) {
        Ok(()) => Ok(&magic == MAGIC),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(e).with_context(|| format!("reading input file {:?}", path)),
    }
}

fn report(mode: &str, in_bytes: u64, out_bytes: u64, elapsed: f64) {
    eprintln!("  mode        : {}", mode);
    eprintln!("  input       : {}", human_bytes(in_bytes));
    eprintln!("  output      : {}", human_bytes(out_bytes));
    if mode == "encode" && out_bytes > 0 {
        eprintln!("  ratio       : {:.2}x", in_bytes as f64 / out_bytes as f64);
    }
    eprintln!(
        "  throughput  : {}/s",
        human_bytes((in_bytes as f64 / elapsed) as u64)
    );
    eprintln!("  elapsed     : {:.3}s", elapsed);
}

// ── modes ──────────────────────────────────────────────────────────────────

fn run_encode(input: &Path, output: &Path, verify: bool) -> anyhow::Result<()> {
    let src = File::open(input).with_context(|| format!("opening input file {:?}", input))?;
    let dst =
        File::create(output).with_context(|| format!("creating output file {:?}", output))?;

    let t0 = Instant::now();
    bpr_core::encode(BufReader::new(src), BufWriter::new(dst))
        .with_context(|| format!("encoding {:?}", input))?;
    let elapsed = t0.elapsed().as_secs_f64();

    let in_bytes = fs::metadata(input)?.len();
    let out_bytes = fs::metadata(output)?.len();
    report("encode", in_bytes, out_bytes, elapsed);

    if verify {
        let scratch = tempfile::NamedTempFile::new().context("creating verify scratch file")?;
        let container =
            File::open(output).with_context(|| format!("reopening output {:?}", output))?;
        let copy = File::create(scratch.path())?;
        bpr_core::decode(BufReader::new(container), BufWriter::new(copy))
            .context("decoding freshly written container")?;

        let original = fs::read(input)?;
        let recovered = fs::read(scratch.path())?;
        if original != recovered {
            return Err(VerifyMismatch.into());
        }
        eprintln!("  verify      : ok");
    }

    Ok(())
}

fn run_decode(input: &Path, output: &Path) -> anyhow::Result<()> {
    let src = File::open(input).with_context(|| format!("opening input file {:?}", input))?;
    let dst =
        File::create(output).with_context(|| format!("creating output file {:?}", output))?;

    let t0 = Instant::now();
    bpr_core::decode(BufReader::new(src), BufWriter::new(dst))
        .with_context(|| format!("decoding {:?}", input))?;
    let elapsed = t0.elapsed().as_secs_f64();

    let in_bytes = fs::metadata(input)?.len();
    let out_bytes = fs::metadata(output)?.len();
    report("decode", in_bytes, out_bytes, elapsed);

    Ok(())
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    if is_container(&cli.input)? {
        run_decode(&cli.input, &cli.output)
    } else {
        run_encode(&cli.input, &cli.output, cli.verify)
    }
}

// ── entry point ────────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(&cli) {
        // never leave a partial or unfaithful output behind
        let _ = fs::remove_file(&cli.output);
        eprintln!("error: {err:#}");
        let code = if err.is::<VerifyMismatch>() { 2 } else { 1 };
        std::process::exit(code);
    }
}
