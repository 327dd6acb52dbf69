use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use stickerkit::{
    BatchOpts, DirectoryTarget, DownloadTarget, NamingPolicy, OutputFormat, RenameOutcome,
    SourceImage, StickerConfig, StickerSession,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "stickerkit", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert images into stickers and write the zip archive(s).
    Make(MakeArgs),
    /// Convert images and print per-file status and assigned names only.
    Inspect(InputArgs),
}

#[derive(Parser, Debug)]
struct InputArgs {
    /// Input image files or folders (folders are walked recursively).
    #[arg(long = "in", required = true, num_args = 1..)]
    in_paths: Vec<PathBuf>,

    /// JSON config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Draw the two-tone outline around each subject.
    #[arg(long, default_value_t = false)]
    outline: bool,

    /// Keep original file names instead of `NNN_` prefixes.
    #[arg(long, default_value_t = false)]
    keep_names: bool,

    /// Override rayon worker threads.
    #[arg(long)]
    threads: Option<usize>,

    /// Rename a sticker after processing, e.g. `--rename 001_cat.png=kitty.webp`.
    #[arg(long = "rename", value_name = "OLD=NEW")]
    renames: Vec<String>,
}

#[derive(Parser, Debug)]
struct MakeArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Output directory.
    #[arg(long)]
    out: PathBuf,

    /// Archive format(s) to write.
    #[arg(long, value_enum, default_value_t = FormatArg::Png)]
    format: FormatArg,

    /// Also write every sticker as an individual file.
    #[arg(long, default_value_t = false)]
    singles: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatArg {
    Png,
    Webp,
    Both,
}

impl FormatArg {
    fn formats(self) -> &'static [OutputFormat] {
        match self {
            Self::Png => &[OutputFormat::Png],
            Self::Webp => &[OutputFormat::Webp],
            Self::Both => &[OutputFormat::Png, OutputFormat::Webp],
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Make(args) => cmd_make(args),
        Command::Inspect(args) => cmd_inspect(args),
    }
}

fn cmd_make(args: MakeArgs) -> anyhow::Result<()> {
    let session = run_batch(&args.input)?;
    print_status(&session);

    let mut target = DirectoryTarget::new(&args.out);
    for &format in args.format.formats() {
        let build = session.export_zip(format)?;
        target.deliver(&build.file_name, &build.bytes)?;
        eprintln!(
            "wrote {} ({} stickers)",
            args.out.join(&build.file_name).display(),
            build.entries.len()
        );
    }

    if args.singles {
        for sticker in session.stickers() {
            target.deliver(sticker.assigned_name(), sticker.image().bytes())?;
        }
        eprintln!(
            "wrote {} single stickers to {}",
            session.stickers().len(),
            args.out.display()
        );
    }
    Ok(())
}

fn cmd_inspect(args: InputArgs) -> anyhow::Result<()> {
    let session = run_batch(&args)?;
    print_status(&session);
    for sticker in session.stickers() {
        let flag = if sticker.is_oversize() { " oversize" } else { "" };
        println!(
            "{}\t{}x{}\t{} bytes{flag}",
            sticker.assigned_name(),
            sticker.width(),
            sticker.height(),
            sticker.image().len()
        );
    }
    Ok(())
}

fn run_batch(args: &InputArgs) -> anyhow::Result<StickerSession> {
    let mut config = match &args.config {
        Some(path) => StickerConfig::from_path(path)?,
        None => StickerConfig::default(),
    };
    if args.threads.is_some() {
        config.threads = args.threads;
    }

    let mut files = Vec::new();
    for path in &args.in_paths {
        collect_files(path, &mut files)?;
    }
    let sources = files
        .iter()
        .map(SourceImage::from_path)
        .collect::<Result<Vec<_>, _>>()?;

    let opts = BatchOpts {
        add_outline: args.outline,
        naming: if args.keep_names {
            NamingPolicy::KeepOriginal
        } else {
            NamingPolicy::Prefixed
        },
    };
    let mut session = StickerSession::new(config)?;
    let report = session.process_batch(sources, &opts)?;
    eprintln!(
        "processed {} files: {} stickers, {} failed, {} skipped",
        report.submitted, report.succeeded, report.failed, report.skipped
    );

    for pair in &args.renames {
        apply_rename(&mut session, pair)?;
    }
    Ok(session)
}

fn apply_rename(session: &mut StickerSession, pair: &str) -> anyhow::Result<()> {
    let (old, new) = pair
        .split_once('=')
        .with_context(|| format!("rename '{pair}' must look like OLD=NEW"))?;
    let id = session
        .stickers()
        .iter()
        .find(|s| s.assigned_name() == old)
        .map(|s| s.id().clone())
        .with_context(|| format!("no sticker named '{old}'"))?;

    match session.rename(&id, new)? {
        RenameOutcome::Renamed { from, to } => eprintln!("renamed {from} -> {to}"),
        RenameOutcome::Unchanged { name } => eprintln!("{name} unchanged"),
        RenameOutcome::Rejected { kept, reason } => {
            anyhow::bail!("cannot rename {kept} to '{new}': {reason}")
        }
    }
    Ok(())
}

fn collect_files(path: &Path, out: &mut Vec<PathBuf>) -> anyhow::Result<()> {
    let meta =
        std::fs::metadata(path).with_context(|| format!("stat input '{}'", path.display()))?;
    if !meta.is_dir() {
        out.push(path.to_path_buf());
        return Ok(());
    }

    let mut entries = std::fs::read_dir(path)
        .with_context(|| format!("read dir '{}'", path.display()))?
        .map(|e| e.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("read dir '{}'", path.display()))?;
    entries.sort();
    for entry in entries {
        collect_files(&entry, out)?;
    }
    Ok(())
}

fn print_status(session: &StickerSession) {
    for (_, entry) in session.status().iter() {
        eprintln!("{}: {}", entry.file_name, entry.status);
    }
}
