use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use glyphcast::{
    load_config, output, write_frame, write_sequence, ColorMode, ConversionRequest, ExportFormat,
    GlyphPalette, LoopMode, MediaKind, PlaybackSession, Session, SessionOutcome, Tick,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    Text,
    Ansi,
    Html,
}

impl From<FormatArg> for ExportFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Text => ExportFormat::Text,
            FormatArg::Ansi => ExportFormat::Ansi,
            FormatArg::Html => ExportFormat::Html,
        }
    }
}

#[derive(Parser, Debug)]
#[command(version, about = "Convert images, GIFs and videos to glyph art and play them in the terminal.")]
struct Args {
    /// Input image, GIF or video file
    input: PathBuf,

    /// Export rendered frames to this directory instead of playing
    #[arg(long)]
    out: Option<PathBuf>,

    /// Target width in characters (default: 80 for stills, 78 for motion)
    #[arg(long)]
    width: Option<u32>,

    /// Palette preset name from the config, or a literal dense→sparse ramp
    #[arg(long)]
    palette: Option<String>,

    /// Glyphs only, no per-cell color
    #[arg(long, default_value_t = false)]
    mono: bool,

    /// Force looping playback (default: GIFs loop, videos play once)
    #[arg(long = "loop", default_value_t = false, conflicts_with = "once")]
    loop_playback: bool,

    /// Force single-pass playback
    #[arg(long, default_value_t = false)]
    once: bool,

    /// File format when exporting with --out
    #[arg(long, value_enum, default_value_t = FormatArg::Text)]
    format: FormatArg,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = load_config()?;
    let ramp = config.resolve_ramp(args.palette.as_deref())?;
    let palette = GlyphPalette::new(&ramp).context("building glyph palette")?;

    let kind = MediaKind::of_path(&args.input);
    let width = args.width.unwrap_or(if kind.is_still() {
        config.still_width
    } else {
        config.motion_width
    });
    let mode = if args.mono {
        ColorMode::Monochrome
    } else {
        ColorMode::Color
    };
    let loop_override = if args.loop_playback {
        Some(LoopMode::Loop)
    } else if args.once {
        Some(LoopMode::Once)
    } else {
        None
    };

    let mut session = Session::new();
    session.start(ConversionRequest {
        path: args.input.clone(),
        width,
        palette,
        mode,
        loop_override,
    })?;

    // Progress bar is created lazily, once the first event tells us whether
    // the total frame count is known.
    let mut bar: Option<ProgressBar> = None;
    let outcome = session.run_to_completion(|progress| {
        if progress.total == 0 {
            return;
        }
        let bar = bar.get_or_insert_with(|| {
            let bar = ProgressBar::new(progress.total as u64);
            bar.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%)")
                    .unwrap()
                    .progress_chars("#>-"),
            );
            bar.set_message("Converting frames");
            bar
        });
        bar.set_position(progress.processed as u64);
    })?;
    if let Some(bar) = bar {
        bar.finish_with_message("Frames ready");
    }

    match outcome {
        SessionOutcome::Still(frame) => {
            if let Some(dir) = &args.out {
                let path = dir.join(format!(
                    "{}.{}",
                    args.input
                        .file_stem()
                        .and_then(|stem| stem.to_str())
                        .unwrap_or("frame"),
                    ExportFormat::from(args.format).extension()
                ));
                write_frame(&frame, &path, args.format.into())?;
                println!("Wrote {}", path.display());
            } else if args.mono {
                print!("{}", output::plain_text(&frame));
            } else {
                print!("{}", output::ansi(&frame));
            }
        }
        SessionOutcome::Motion(playback) => {
            if let Some(dir) = &args.out {
                let count = write_sequence(playback.sequence(), dir, args.format.into())?;
                println!("Wrote {} frames to {}", count, dir.display());
            } else {
                play(playback)?;
            }
        }
        SessionOutcome::Cancelled => {
            println!("Conversion cancelled.");
        }
    }

    session.stop();
    Ok(())
}

/// Drives the playback scheduler at a 10 ms tick until it signals the end.
fn play(mut playback: PlaybackSession) -> Result<()> {
    let mut stdout = io::stdout();
    loop {
        match playback.tick(Instant::now()) {
            Tick::Show(index) => {
                if let Some(frame) = playback.sequence().get(index) {
                    write!(stdout, "\x1b[2J\x1b[H{}", output::ansi(frame))
                        .context("writing frame to terminal")?;
                    stdout.flush().context("flushing terminal")?;
                }
            }
            Tick::Hold => {}
            Tick::Ended => break,
        }
        thread::sleep(Duration::from_millis(10));
    }
    Ok(())
}
